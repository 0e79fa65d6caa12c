//! Mockable objects: a shared handle over a table of named method slots.
//!
//! Every call dispatches through the handle, so replacing a slot changes what
//! all holders of the handle observe. Arguments and return values are
//! `serde_json::Value`s; [`MockObject::invoke`] layers typed encoding on top.

use crate::result::{FetaError, FetaResult};
use crate::stub::Interceptor;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};
use uuid::Uuid;

/// A callable method body
pub type Method = Rc<dyn Fn(&[Value]) -> FetaResult<Value>>;

/// Stable identity of a [`MockObject`], shared by all clones of the handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MockId(Uuid);

impl MockId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for MockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// What currently answers calls to a method name
#[derive(Clone)]
pub enum MethodSlot {
    /// A real implementation
    Original(Method),
    /// Fails with [`FetaError::MethodNotMocked`] when called
    Poisoned,
    /// An installed stub
    Stubbed(Rc<Interceptor>),
}

impl fmt::Debug for MethodSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Original(_) => f.write_str("Original"),
            Self::Poisoned => f.write_str("Poisoned"),
            Self::Stubbed(interceptor) => f
                .debug_tuple("Stubbed")
                .field(&interceptor.calls())
                .finish(),
        }
    }
}

struct ObjectInner {
    id: MockId,
    label: String,
    slots: RefCell<BTreeMap<String, MethodSlot>>,
}

/// Non-owning handle used by the registry to notice dropped objects
#[derive(Clone)]
pub(crate) struct WeakObject(Weak<ObjectInner>);

impl WeakObject {
    pub(crate) fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

/// Shared handle to an object whose methods can be mocked.
///
/// Cloning the handle does not copy the object.
///
/// ```ignore
/// let greeter = MockObject::new("greeter")
///     .with_method("greet", |_| Ok(json!("hi")));
/// assert_eq!(greeter.call("greet", &[])?, json!("hi"));
/// ```
#[derive(Clone)]
pub struct MockObject {
    inner: Rc<ObjectInner>,
}

impl fmt::Debug for MockObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockObject")
            .field("id", &self.inner.id)
            .field("label", &self.inner.label)
            .field("slots", &*self.inner.slots.borrow())
            .finish()
    }
}

impl MockObject {
    /// Create an object with no methods
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(ObjectInner {
                id: MockId::new(),
                label: label.into(),
                slots: RefCell::new(BTreeMap::new()),
            }),
        }
    }

    /// Add a method (builder form of [`define`](Self::define))
    #[must_use]
    pub fn with_method<F>(self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&[Value]) -> FetaResult<Value> + 'static,
    {
        self.define(name, method);
        self
    }

    /// Add a typed method (builder form of [`define_typed`](Self::define_typed))
    #[must_use]
    pub fn with_typed_method<A, R, F>(self, name: impl Into<String>, method: F) -> Self
    where
        A: DeserializeOwned,
        R: Serialize,
        F: Fn(A) -> R + 'static,
    {
        self.define_typed(name, method);
        self
    }

    /// Set `name` to a real implementation, replacing whatever was there
    pub fn define<F>(&self, name: impl Into<String>, method: F)
    where
        F: Fn(&[Value]) -> FetaResult<Value> + 'static,
    {
        self.set_slot(name.into(), MethodSlot::Original(Rc::new(method)));
    }

    /// Set `name` to a typed implementation.
    ///
    /// Positional arguments are decoded as a tuple `A`, the result is encoded
    /// back to a value.
    pub fn define_typed<A, R, F>(&self, name: impl Into<String>, method: F)
    where
        A: DeserializeOwned,
        R: Serialize,
        F: Fn(A) -> R + 'static,
    {
        let name = name.into();
        let method_name = name.clone();
        self.define(name, move |args| {
            let decoded = decode_args(&method_name, args)?;
            Ok(serde_json::to_value(method(decoded))?)
        });
    }

    /// Identity shared by every clone of this handle
    #[must_use]
    pub fn id(&self) -> MockId {
        self.inner.id
    }

    /// Label used in diagnostics
    #[must_use]
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// Whether a slot exists under `name`
    #[must_use]
    pub fn has_method(&self, name: &str) -> bool {
        self.inner.slots.borrow().contains_key(name)
    }

    /// Method names in sorted order
    #[must_use]
    pub fn method_names(&self) -> Vec<String> {
        self.inner.slots.borrow().keys().cloned().collect()
    }

    /// Current slot for `name`
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<MethodSlot> {
        self.inner.slots.borrow().get(name).cloned()
    }

    /// Whether `name` is poisoned
    #[must_use]
    pub fn is_poisoned(&self, name: &str) -> bool {
        matches!(self.slot(name), Some(MethodSlot::Poisoned))
    }

    /// The interceptor currently installed under `name`, if any
    #[must_use]
    pub fn interceptor(&self, name: &str) -> Option<Rc<Interceptor>> {
        match self.slot(name) {
            Some(MethodSlot::Stubbed(interceptor)) => Some(interceptor),
            _ => None,
        }
    }

    /// Call count of the interceptor currently installed under `name`
    #[must_use]
    pub fn call_count(&self, name: &str) -> Option<usize> {
        self.interceptor(name).map(|interceptor| interceptor.calls())
    }

    /// Call `name` with positional arguments.
    ///
    /// The slot table is not borrowed while the method runs, so a method may
    /// call back into this object or install new stubs on it.
    pub fn call(&self, name: &str, args: &[Value]) -> FetaResult<Value> {
        let slot = self.slot(name);
        match slot {
            Some(MethodSlot::Original(method)) => method(args),
            Some(MethodSlot::Stubbed(interceptor)) => interceptor.invoke(args),
            Some(MethodSlot::Poisoned) => {
                tracing::debug!(object = %self.label(), method = name, "poisoned method called");
                Err(FetaError::MethodNotMocked {
                    method: name.to_string(),
                })
            }
            None => Err(FetaError::UnknownMethod {
                object: self.label().to_string(),
                method: name.to_string(),
            }),
        }
    }

    /// Typed call: `args` is encoded with [`encode_args`], the result decoded as `R`
    pub fn invoke<A, R>(&self, name: &str, args: A) -> FetaResult<R>
    where
        A: Serialize,
        R: DeserializeOwned,
    {
        let args = encode_args(args)?;
        let value = self.call(name, &args)?;
        decode_return(name, value)
    }

    pub(crate) fn downgrade(&self) -> WeakObject {
        WeakObject(Rc::downgrade(&self.inner))
    }

    pub(crate) fn set_slot(&self, name: String, slot: MethodSlot) {
        self.inner.slots.borrow_mut().insert(name, slot);
    }

    pub(crate) fn snapshot(&self) -> BTreeMap<String, MethodSlot> {
        self.inner.slots.borrow().clone()
    }

    pub(crate) fn poison_all(&self) {
        for slot in self.inner.slots.borrow_mut().values_mut() {
            *slot = MethodSlot::Poisoned;
        }
    }
}

/// Encode typed arguments as a positional list.
///
/// Tuples and sequences spread into one argument per element. `()` and other
/// zero-sized values serializing to `null` (unit structs) are the empty list.
/// Anything else, including `None`, is a single argument.
pub fn encode_args<A: Serialize>(args: A) -> FetaResult<Vec<Value>> {
    let zero_sized = std::mem::size_of::<A>() == 0;
    Ok(match serde_json::to_value(args)? {
        Value::Array(values) => values,
        Value::Null if zero_sized => Vec::new(),
        value => vec![value],
    })
}

/// Decode a positional list into a tuple (or `()` when empty)
pub fn decode_args<A: DeserializeOwned>(method: &str, args: &[Value]) -> FetaResult<A> {
    match serde_json::from_value(Value::Array(args.to_vec())) {
        Ok(decoded) => Ok(decoded),
        Err(_) if args.is_empty() => {
            serde_json::from_value(Value::Null).map_err(|err| FetaError::ArgumentDecode {
                method: method.to_string(),
                message: err.to_string(),
            })
        }
        Err(err) => Err(FetaError::ArgumentDecode {
            method: method.to_string(),
            message: err.to_string(),
        }),
    }
}

/// Decode a method's return value
pub fn decode_return<R: DeserializeOwned>(method: &str, value: Value) -> FetaResult<R> {
    serde_json::from_value(value).map_err(|err| FetaError::ReturnDecode {
        method: method.to_string(),
        message: err.to_string(),
    })
}
