//! Nested-value factories
//!
//! A [`Model`] is an opaque factory a [`crate::props::Slot`] uses to
//! produce a fresh nested value whenever it is reset or receives raw data
//! instead of an already-typed instance.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::props::schema::Kind;
use crate::value::Value;

/// Factory for a slot's nested value
#[derive(Clone)]
pub struct Model {
    kind_name: Option<String>,
    construct: Arc<dyn Fn() -> Result<Value> + Send + Sync>,
}

impl Model {
    /// A model producing fresh instances of a kind
    pub fn of_kind(kind: &Arc<Kind>) -> Self {
        let kind = Arc::clone(kind);
        Self {
            kind_name: Some(kind.name().to_string()),
            construct: Arc::new(move || Ok(Value::Instance(kind.instantiate()?))),
        }
    }

    /// A model backed by an arbitrary construction function.
    ///
    /// Such a model has no product kind, so incoming values always take
    /// the construct-and-import path.
    pub fn from_fn<F>(construct: F) -> Self
    where
        F: Fn() -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            kind_name: None,
            construct: Arc::new(construct),
        }
    }

    /// Declare the product kind of a [`Model::from_fn`] factory
    pub fn with_product_kind(mut self, name: impl Into<String>) -> Self {
        self.kind_name = Some(name.into());
        self
    }

    /// Name of the kind this model produces, if declared
    pub fn kind_name(&self) -> Option<&str> {
        self.kind_name.as_deref()
    }

    /// Build a fresh nested value
    pub fn construct(&self) -> Result<Value> {
        (self.construct)()
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("kind_name", &self.kind_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fn_constructs() {
        let model = Model::from_fn(|| Ok(Value::from(0)));
        assert_eq!(model.kind_name(), None);
        assert_eq!(model.construct().unwrap(), Value::from(0));
    }

    #[test]
    fn test_product_kind() {
        let model = Model::from_fn(|| Ok(Value::Null)).with_product_kind("Address");
        assert_eq!(model.kind_name(), Some("Address"));
    }
}
