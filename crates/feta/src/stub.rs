//! The `when(..)` stub builder and the interceptors it installs.
//!
//! ```ignore
//! when(&greeter, "greet")
//!     .assert_params(["World!"])
//!     .then(|args| Ok(json!(format!("Hello {}", args[0]))));
//! ```

use crate::assertion::assert_arg_equals;
use crate::config::ValidationBinding;
use crate::object::{decode_args, MethodSlot, MockObject};
use crate::result::{FetaError, FetaResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Argument validation callback; fails by returning an error
pub type Validator = Rc<dyn Fn(&[Value]) -> FetaResult<()>>;

/// Scripted stub behavior
pub type Behavior = Rc<dyn Fn(&[Value]) -> FetaResult<Value>>;

type SharedValidator = Rc<RefCell<Option<Validator>>>;

enum ValidationSource {
    Live(SharedValidator),
    Snapshot(Option<Validator>),
}

impl ValidationSource {
    fn current(&self) -> Option<Validator> {
        match self {
            Self::Live(shared) => shared.borrow().clone(),
            Self::Snapshot(validator) => validator.clone(),
        }
    }
}

/// The function installed on an object by [`StubBinding::then`]
pub struct Interceptor {
    method: String,
    calls: Cell<usize>,
    validation: ValidationSource,
    behavior: Behavior,
}

impl fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptor")
            .field("method", &self.method)
            .field("calls", &self.calls.get())
            .field("validated", &self.has_validation())
            .finish()
    }
}

impl Interceptor {
    /// Number of invocations so far, including ones rejected by validation
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    /// Name of the stubbed method
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Whether a validation callback would run on the next call
    #[must_use]
    pub fn has_validation(&self) -> bool {
        self.validation.current().is_some()
    }

    /// Count the call, validate the arguments, then run the behavior.
    ///
    /// A validation error is returned unchanged and the behavior is skipped.
    pub fn invoke(&self, args: &[Value]) -> FetaResult<Value> {
        self.calls.set(self.calls.get() + 1);
        tracing::trace!(method = %self.method, calls = self.calls.get(), "stub invoked");

        if let Some(validate) = self.validation.current() {
            validate(args)?;
        }
        (self.behavior)(args)
    }
}

/// Fluent builder bound to one method of one object
pub struct StubBinding {
    object: MockObject,
    method: String,
    validator: SharedValidator,
    binding: ValidationBinding,
}

impl fmt::Debug for StubBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StubBinding")
            .field("object", &self.object.label())
            .field("method", &self.method)
            .field("validated", &self.validator.borrow().is_some())
            .field("binding", &self.binding)
            .finish()
    }
}

impl StubBinding {
    /// Bind to `object.method`; nothing changes on the object until `then`
    #[must_use]
    pub fn new(object: &MockObject, method: impl Into<String>, binding: ValidationBinding) -> Self {
        Self {
            object: object.clone(),
            method: method.into(),
            validator: Rc::new(RefCell::new(None)),
            binding,
        }
    }

    /// Target object
    #[must_use]
    pub fn object(&self) -> &MockObject {
        &self.object
    }

    /// Target method name
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Validate call-time arguments with `callback`, replacing any earlier one.
    ///
    /// With [`ValidationBinding::Live`], this also affects a stub that was
    /// already installed from this binding.
    pub fn assert<F>(&self, callback: F) -> &Self
    where
        F: Fn(&[Value]) -> FetaResult<()> + 'static,
    {
        *self.validator.borrow_mut() = Some(Rc::new(callback));
        self
    }

    /// Expect each leading argument to deep-equal the matching value.
    ///
    /// Expected values are serialized on each call. Extra call-time arguments
    /// are not checked. The first mismatch fails with
    /// [`FetaError::AssertionFailed`]; a value that cannot be serialized
    /// fails with [`FetaError::Json`].
    pub fn assert_params<I, V>(&self, expected: I) -> &Self
    where
        I: IntoIterator<Item = V>,
        V: Serialize + 'static,
    {
        let expected: Vec<V> = expected.into_iter().collect();
        self.assert(move |args| {
            for (index, value) in expected.iter().enumerate() {
                assert_arg_equals(args.get(index), value)?;
            }
            Ok(())
        })
    }

    /// Install `behavior` as the method, replacing whatever answered before
    pub fn then<F>(&self, behavior: F)
    where
        F: Fn(&[Value]) -> FetaResult<Value> + 'static,
    {
        let validation = match self.binding {
            ValidationBinding::Live => ValidationSource::Live(Rc::clone(&self.validator)),
            ValidationBinding::Snapshot => {
                ValidationSource::Snapshot(self.validator.borrow().clone())
            }
        };
        let interceptor = Interceptor {
            method: self.method.clone(),
            calls: Cell::new(0),
            validation,
            behavior: Rc::new(behavior),
        };
        tracing::debug!(
            object = %self.object.label(),
            method = %self.method,
            binding = ?self.binding,
            "stub installed"
        );
        self.object
            .set_slot(self.method.clone(), MethodSlot::Stubbed(Rc::new(interceptor)));
    }

    /// Install a typed behavior; arguments decode as the tuple `A`
    pub fn then_typed<A, R, F>(&self, behavior: F)
    where
        A: DeserializeOwned,
        R: Serialize,
        F: Fn(A) -> R + 'static,
    {
        let method = self.method.clone();
        self.then(move |args| {
            let decoded = decode_args(&method, args)?;
            Ok(serde_json::to_value(behavior(decoded))?)
        });
    }

    /// Always return `value`, whatever the arguments
    pub fn then_return(&self, value: impl Into<Value>) {
        let value = value.into();
        self.then(move |_| Ok(value.clone()));
    }

    /// Always return nothing (`null`)
    pub fn then_return_void(&self) {
        self.then(|_| Ok(Value::Null));
    }

    /// Always fail with the error built by `error`
    pub fn then_fail<F>(&self, error: F)
    where
        F: Fn() -> FetaError + 'static,
    {
        self.then(move |_| Err(error()));
    }
}
