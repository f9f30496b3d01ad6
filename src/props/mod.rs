//! Declarative property schema and container
//!
//! A [`Kind`] declares an ordered set of named, constrained [`Slot`]s.
//! The slot table is materialized into a shared [`Schema`] exactly once,
//! on first instantiation; every [`Instance`] of the kind shares that
//! schema while owning its own private value storage.
//!
//! Slots enforce their constraints in a fixed order on every write and
//! can delegate to a [`Model`] to build nested validated sub-objects.

pub mod instance;
pub mod model;
pub mod schema;
pub mod slot;

pub use instance::Instance;
pub use model::Model;
pub use schema::{Kind, KindBuilder, Registry, Schema};
pub use slot::{Slot, ValidatorFn};
