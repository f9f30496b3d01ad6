//! # propschema
//!
//! A declarative property schema, filter pipeline, and typed value
//! validation framework.
//!
//! A kind declares named, typed, constrained attributes ("slots") that
//! are validated, defaulted, and optionally nested into sub-models. A
//! composable filter pipeline transforms and validates single values with
//! short-circuiting and multi-error collection, and a family of typed
//! value wrappers combines pipeline and configuration into reusable
//! scalar and collection holders.
//!
//! ## Example
//!
//! ```rust
//! use propschema::{Kind, Slot, TypeTag, Value};
//!
//! let person = Kind::builder("Person")
//!     .slot("name", Slot::new().with_types([TypeTag::Str]).nullable(false)
//!         .with_default("unnamed"))
//!     .slot("age", Slot::new().with_types([TypeTag::Int]).with_default(0))
//!     .build()?;
//!
//! let mut instance = person.instantiate()?;
//! instance.set("age", 36)?;
//! assert_eq!(instance.get("age")?, Value::from(36));
//! # Ok::<(), propschema::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod messages;
pub mod value;

// Validation building blocks
pub mod exceptions;
pub mod filters;
pub mod options;

// Property schema and containers
pub mod props;

// Typed value wrappers
pub mod values;

// Re-exports for convenience
pub use error::{Error, Result};
pub use exceptions::{ErrorKind, ValidationError};
pub use filters::{run_filters, FilterFn, FilterResult};
pub use options::Options;
pub use props::{Instance, Kind, Model, Registry, Schema, Slot};
pub use value::{TypeTag, Value};
pub use values::{TypedValue, WrapperKind};

/// Version of the propschema library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
