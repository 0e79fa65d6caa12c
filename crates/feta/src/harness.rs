//! The `Feta` facade and the thread-local default instance behind the free
//! functions.

use crate::assertion;
use crate::config::FetaConfig;
use crate::object::MockObject;
use crate::registry::MockRegistry;
use crate::result::FetaResult;
use crate::stub::StubBinding;
use serde::Serialize;
use std::cell::RefCell;

/// Mock registry plus the configuration its stubs are built with
#[derive(Debug, Default)]
pub struct Feta {
    registry: MockRegistry,
    config: FetaConfig,
}

impl Feta {
    /// Create with the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with `config`
    #[must_use]
    pub fn with_config(config: FetaConfig) -> Self {
        Self {
            registry: MockRegistry::new(),
            config,
        }
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &FetaConfig {
        &self.config
    }

    /// Replace the configuration; already-installed stubs keep their binding
    pub fn set_config(&mut self, config: FetaConfig) {
        self.config = config;
    }

    /// Registry of mocked objects
    #[must_use]
    pub const fn registry(&self) -> &MockRegistry {
        &self.registry
    }

    /// Mock `object` in place, or create a blank object ready to be stubbed
    pub fn mock<'a>(&mut self, object: impl Into<Option<&'a MockObject>>) -> MockObject {
        self.registry.mock(object.into(), self.config.poison_unstubbed)
    }

    /// Start stubbing `object.method`
    #[must_use]
    pub fn when(&self, object: &MockObject, method: &str) -> StubBinding {
        StubBinding::new(object, method, self.config.validation)
    }

    /// Restore the methods `object` had when it was mocked
    pub fn restore(&self, object: &MockObject) -> FetaResult<()> {
        self.registry.restore(object)
    }

    /// Drop the record kept for `object`; see [`MockRegistry::forget`]
    pub fn forget(&mut self, object: &MockObject) -> bool {
        self.registry.forget(object).is_some()
    }

    /// Deep-equality assertion; see [`assertion::assert_equals`]
    pub fn assert_equals<A, E>(&self, actual: &A, expected: &E) -> FetaResult<bool>
    where
        A: Serialize + ?Sized,
        E: Serialize + ?Sized,
    {
        assertion::assert_equals(actual, expected)
    }
}

thread_local! {
    static DEFAULT: RefCell<Feta> = RefCell::new(Feta::new());
}

fn with_default<T>(f: impl FnOnce(&mut Feta) -> T) -> T {
    DEFAULT.with(|feta| f(&mut feta.borrow_mut()))
}

/// Replace the configuration of this thread's default instance
pub fn configure(config: FetaConfig) {
    with_default(|feta| feta.set_config(config));
}

/// Mock `object` in place with this thread's default instance.
///
/// Passing `None` creates a blank object ready for `when`.
pub fn mock<'a>(object: impl Into<Option<&'a MockObject>>) -> MockObject {
    let object = object.into();
    with_default(|feta| feta.mock(object))
}

/// Start stubbing `object.method` with this thread's default configuration
#[must_use]
pub fn when(object: &MockObject, method: &str) -> StubBinding {
    with_default(|feta| feta.when(object, method))
}

/// Restore an object mocked on this thread
pub fn restore(object: &MockObject) -> FetaResult<()> {
    with_default(|feta| feta.restore(object))
}

/// Drop the record this thread keeps for `object`.
///
/// Returns whether a record existed; a later `restore` fails with `NotMocked`.
pub fn forget(object: &MockObject) -> bool {
    with_default(|feta| feta.forget(object))
}

/// Assert that two values have identical canonical serialized forms
pub fn assert_equals<A, E>(actual: &A, expected: &E) -> FetaResult<bool>
where
    A: Serialize + ?Sized,
    E: Serialize + ?Sized,
{
    assertion::assert_equals(actual, expected)
}
