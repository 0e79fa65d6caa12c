//! Feta Derive: typed mocks for traits.
//!
//! `#[mockable]` on a trait keeps the trait unchanged and generates a
//! `<Trait>Mock` struct implementing it by dispatching every method through a
//! `feta::MockObject`, so `mock`/`when`/`restore` work on a statically typed
//! interface.
//!
//! ```ignore
//! use feta::prelude::*;
//!
//! #[mockable]
//! pub trait Greeter {
//!     fn greet(&self, name: &str) -> String;
//! }
//!
//! struct English;
//! impl Greeter for English {
//!     fn greet(&self, name: &str) -> String {
//!         format!("Hello {name}")
//!     }
//! }
//!
//! // Methods of a real implementation, listed by name
//! let greeter = GreeterMock::from_object(mock(&GreeterMock::register(English)));
//! when(greeter.object(), "greet").assert_params(["Bob"]).then_return("Hi Bob");
//! assert_eq!(greeter.greet("Bob"), "Hi Bob");
//! ```
//!
//! Supported methods take `&self`, have no type parameters, and use
//! parameter and return types that serialize; a `&T` parameter is decoded
//! as `T::Owned` on the way into a registered implementation. A failed call
//! (poisoned method, rejected arguments) panics with the error message.

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, FnArg, Ident, ItemTrait, Pat, PatIdent, ReturnType, Signature, TraitItem,
    TraitItemFn, Type,
};

/// Generate a `<Trait>Mock` dispatching through a `feta::MockObject`.
///
/// # Attributes
///
/// - `#[mockable(CustomName)]` - Override the generated struct name
///
/// # Generated items
///
/// - `new()` - Blank object with no methods (ready for `when`)
/// - `from_object(object)` / `object()` - Wrap or expose the handle
/// - `register(real)` - Object whose methods call `real`
/// - `impl Trait for <Trait>Mock`
#[proc_macro_attribute]
pub fn mockable(attr: TokenStream, item: TokenStream) -> TokenStream {
    let custom_name = if attr.is_empty() {
        None
    } else {
        Some(parse_macro_input!(attr as Ident))
    };
    let item_trait = parse_macro_input!(item as ItemTrait);

    match expand(&item_trait, custom_name) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// A trait method prepared for code generation
struct MockMethod {
    sig: Signature,
    name: String,
    args: Vec<Ident>,
    owned_types: Vec<proc_macro2::TokenStream>,
    call_args: Vec<proc_macro2::TokenStream>,
    output: proc_macro2::TokenStream,
}

fn expand(item_trait: &ItemTrait, custom_name: Option<Ident>) -> syn::Result<proc_macro2::TokenStream> {
    if !item_trait.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &item_trait.generics,
            "#[mockable] does not support generic traits",
        ));
    }

    let trait_ident = &item_trait.ident;
    let vis = &item_trait.vis;
    let mock_ident = custom_name.unwrap_or_else(|| format_ident!("{}Mock", trait_ident));
    let label = to_snake_case(&trait_ident.to_string());

    let methods = item_trait
        .items
        .iter()
        .filter_map(|item| match item {
            TraitItem::Fn(method) => Some(prepare_method(method)),
            _ => None,
        })
        .collect::<syn::Result<Vec<_>>>()?;

    let impls = methods.iter().map(|method| {
        let sig = &method.sig;
        let name = &method.name;
        let args = &method.args;
        let output = &method.output;
        quote! {
            #sig {
                match self.object.invoke::<_, #output>(#name, (#(#args,)*)) {
                    ::std::result::Result::Ok(value) => value,
                    ::std::result::Result::Err(err) => ::std::panic!("{}", err),
                }
            }
        }
    });

    let registrations = methods.iter().map(|method| {
        let ident = &method.sig.ident;
        let name = &method.name;
        let args = &method.args;
        let owned_types = &method.owned_types;
        let call_args = &method.call_args;
        quote! {
            {
                let real = ::std::rc::Rc::clone(&real);
                object.define_typed(#name, move |(#(#args,)*): (#(#owned_types,)*)| {
                    real.#ident(#(#call_args),*)
                });
            }
        }
    });

    Ok(quote! {
        #item_trait

        #[doc = concat!("Mock implementation of [`", stringify!(#trait_ident), "`]")]
        #[derive(Debug, Clone)]
        #vis struct #mock_ident {
            object: ::feta::MockObject,
        }

        impl #mock_ident {
            /// Mock backed by a blank object; stub each method with `when`
            #[must_use]
            pub fn new() -> Self {
                Self {
                    object: ::feta::mock(None),
                }
            }

            /// Mock dispatching through an existing object
            #[must_use]
            pub fn from_object(object: ::feta::MockObject) -> Self {
                Self { object }
            }

            /// Object every call dispatches through
            #[must_use]
            pub fn object(&self) -> &::feta::MockObject {
                &self.object
            }

            /// Object whose methods delegate to `real`
            #[must_use]
            pub fn register<T: #trait_ident + 'static>(real: T) -> ::feta::MockObject {
                let real = ::std::rc::Rc::new(real);
                let object = ::feta::MockObject::new(#label);
                #(#registrations)*
                object
            }
        }

        impl ::std::default::Default for #mock_ident {
            fn default() -> Self {
                Self::new()
            }
        }

        impl #trait_ident for #mock_ident {
            #(#impls)*
        }
    })
}

fn prepare_method(method: &TraitItemFn) -> syn::Result<MockMethod> {
    let mut sig = method.sig.clone();

    if sig.asyncness.is_some() {
        return Err(syn::Error::new_spanned(
            &method.sig,
            "#[mockable] does not support async methods",
        ));
    }
    if sig.generics.type_params().next().is_some() || sig.generics.const_params().next().is_some()
    {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "#[mockable] does not support generic methods",
        ));
    }

    let mut inputs = sig.inputs.iter_mut();
    match inputs.next() {
        Some(FnArg::Receiver(receiver))
            if receiver.reference.is_some() && receiver.mutability.is_none() => {}
        _ => {
            return Err(syn::Error::new_spanned(
                &method.sig,
                "#[mockable] methods must take &self",
            ))
        }
    }

    let mut args = Vec::new();
    let mut owned_types = Vec::new();
    let mut call_args = Vec::new();
    for (index, input) in inputs.enumerate() {
        let FnArg::Typed(pat_type) = input else {
            continue;
        };
        let ident = format_ident!("arg{}", index);
        *pat_type.pat = Pat::Ident(PatIdent {
            attrs: Vec::new(),
            by_ref: None,
            mutability: None,
            ident: ident.clone(),
            subpat: None,
        });

        match &*pat_type.ty {
            Type::Reference(reference) => {
                if reference.mutability.is_some() {
                    return Err(syn::Error::new_spanned(
                        reference,
                        "#[mockable] does not support &mut parameters",
                    ));
                }
                let inner = &reference.elem;
                owned_types.push(quote! { <#inner as ::std::borrow::ToOwned>::Owned });
                call_args.push(quote! { ::std::borrow::Borrow::<#inner>::borrow(&#ident) });
            }
            ty => {
                owned_types.push(quote! { #ty });
                call_args.push(quote! { #ident });
            }
        }
        args.push(ident);
    }

    let output = match &sig.output {
        ReturnType::Default => quote! { () },
        ReturnType::Type(_, ty) => quote! { #ty },
    };

    Ok(MockMethod {
        name: sig.ident.to_string(),
        sig,
        args,
        owned_types,
        call_args,
        output,
    })
}

/// Convert PascalCase to snake_case
fn to_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_lower {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else {
            result.push(c);
            prev_lower = true;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand_str(input: &str) -> syn::Result<String> {
        let item: ItemTrait = syn::parse_str(input)?;
        expand(&item, None).map(|tokens| tokens.to_string())
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("Greeter"), "greeter");
        assert_eq!(to_snake_case("UserStore"), "user_store");
        assert_eq!(to_snake_case("HTTPClient"), "httpclient");
    }

    #[test]
    fn test_generates_mock_struct() {
        let out = expand_str("pub trait Greeter { fn greet(&self, name: &str) -> String; }")
            .unwrap();
        assert!(out.contains("struct GreeterMock"));
        assert!(out.contains("impl Greeter for GreeterMock"));
        assert!(out.contains("\"greet\""));
        assert!(out.contains("ToOwned"));
    }

    #[test]
    fn test_custom_name() {
        let item: ItemTrait = syn::parse_str("trait Store { fn len(&self) -> usize; }").unwrap();
        let out = expand(&item, Some(format_ident!("FakeStore")))
            .unwrap()
            .to_string();
        assert!(out.contains("struct FakeStore"));
    }

    #[test]
    fn test_rejects_mut_receiver() {
        let err = expand_str("trait Counter { fn bump(&mut self); }").unwrap_err();
        assert!(err.to_string().contains("&self"));
    }

    #[test]
    fn test_rejects_generic_method() {
        let err = expand_str("trait Sink { fn put<T>(&self, value: T); }").unwrap_err();
        assert!(err.to_string().contains("generic"));
    }

    #[test]
    fn test_rejects_async_method() {
        let err = expand_str("trait Remote { async fn fetch(&self) -> u8; }").unwrap_err();
        assert!(err.to_string().contains("async"));
    }

    #[test]
    fn test_rejects_generic_trait() {
        let err = expand_str("trait Repo<T> { fn get(&self) -> T; }").unwrap_err();
        assert!(err.to_string().contains("generic traits"));
    }
}
