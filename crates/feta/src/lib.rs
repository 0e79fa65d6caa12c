//! Feta: a small test-double library.
//!
//! Mock an object to block out its real methods, stub the ones a test needs
//! with `when(..).then(..)`, then put the originals back with `restore`.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  mock()   ┌──────────────┐  when()   ┌──────────────┐
//! │ MockObject   │──────────►│ MockRegistry │           │ StubBinding  │
//! │ (method      │◄──────────│ (originals,  │           │ assert()     │
//! │  slots)      │ restore() │  by MockId)  │           │ then()       │
//! └──────────────┘           └──────────────┘           └──────┬───────┘
//!        ▲                                                     │
//!        └──────────────── installs Interceptor ───────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use feta::prelude::*;
//! use serde_json::json;
//!
//! let greeter = MockObject::new("greeter").with_method("greet", |_| Ok(json!("hi")));
//! let greeter = mock(&greeter);
//!
//! // Forgetting a stub fails loudly
//! assert!(greeter.call("greet", &[]).is_err());
//!
//! when(&greeter, "greet")
//!     .assert_params(["World"])
//!     .then_return("Hello World");
//! assert_eq!(greeter.call("greet", &[json!("World")])?, json!("Hello World"));
//! assert_eq!(greeter.call_count("greet"), Some(1));
//!
//! restore(&greeter)?;
//! ```

#![warn(missing_docs)]

mod assertion;
mod config;
mod harness;
mod registry;
mod result;

/// Log output for mock lifecycle events
pub mod logging;

/// Mockable objects and argument encoding
pub mod object;

/// Stub builder and interceptors
pub mod stub;

pub use assertion::{canonical_form, check_equals, AssertionResult};
pub use config::{FetaConfig, ValidationBinding};
pub use harness::{assert_equals, configure, forget, mock, restore, when, Feta};
pub use object::{MethodSlot, MockId, MockObject};
pub use registry::{MockRegistry, OriginalRecord};
pub use result::{FetaError, FetaResult};
pub use stub::{Interceptor, StubBinding};

#[cfg(feature = "derive")]
pub use feta_derive::mockable;

/// Prelude for convenient imports
pub mod prelude {
    pub use super::{
        assert_equals, mock, restore, when, FetaError, FetaResult, MockObject, StubBinding,
    };
    #[cfg(feature = "derive")]
    pub use super::mockable;
}
