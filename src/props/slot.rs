//! Property slots
//!
//! A [`Slot`] describes one named, constrained attribute: default value,
//! nullability, read-only flag, accepted primitive types, accepted kinds,
//! an optional custom validator, and an optional [`Model`] producing a
//! nested validated sub-object.
//!
//! A slot write either fully succeeds or fails; slots never soft-collect
//! errors. Constraints run in a fixed order: null check, read-only check,
//! primitive-type check, kind check, custom validator, model import.

use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Error, Result};
use crate::exceptions::{ErrorKind, ValidationError};
use crate::props::instance::Instance;
use crate::props::model::Model;
use crate::value::{TypeTag, Value};

/// A custom per-slot validator; the `Err` string becomes the wrapped
/// failure reason.
pub type ValidatorFn = Arc<dyn Fn(&Value) -> std::result::Result<(), String> + Send + Sync>;

/// One declared property
#[derive(Clone)]
pub struct Slot {
    name: OnceCell<String>,
    index: OnceCell<usize>,
    doc: String,
    nullable: bool,
    read_only: bool,
    default: Option<Value>,
    model: Option<Model>,
    valid_types: Option<Vec<TypeTag>>,
    valid_kinds: Option<Vec<String>>,
    validator: Option<ValidatorFn>,
}

impl Default for Slot {
    fn default() -> Self {
        Self::new()
    }
}

impl Slot {
    /// Create a slot with no constraints: nullable, writable, no default
    pub fn new() -> Self {
        Self {
            name: OnceCell::new(),
            index: OnceCell::new(),
            doc: String::new(),
            nullable: true,
            read_only: false,
            default: None,
            model: None,
            valid_types: None,
            valid_kinds: None,
            validator: None,
        }
    }

    /// Set the documentation string
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Set whether null is an accepted value
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Set whether the slot rejects writes once a value is stored
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Set the default value assigned on reset
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Set the nested-value model; takes precedence over the default
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = Some(model);
        self
    }

    /// Restrict accepted primitive types
    pub fn with_types(mut self, types: impl IntoIterator<Item = TypeTag>) -> Self {
        self.valid_types = Some(types.into_iter().collect());
        self
    }

    /// Restrict accepted instance kinds
    pub fn with_kinds<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.valid_kinds = Some(kinds.into_iter().map(Into::into).collect());
        self
    }

    /// Attach a custom validator
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Value) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// The bound property name, if the schema has been materialized
    pub fn name(&self) -> Option<&str> {
        self.name.get().map(String::as_str)
    }

    /// The documentation string
    pub fn doc(&self) -> &str {
        &self.doc
    }

    /// Whether null is accepted
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Whether the slot rejects rewrites
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// The default value, if any
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// The nested-value model, if any
    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    /// Assign the property name and storage key. Binding is idempotent:
    /// rebinding under the same name is a no-op, rebinding under a
    /// different name is a schema error.
    pub(crate) fn bind(&self, name: &str, index: usize) -> Result<()> {
        if let Some(existing) = self.name.get() {
            if existing == name {
                return Ok(());
            }
            return Err(Error::Schema(format!(
                "slot already bound as '{}', cannot rebind as '{}'",
                existing, name
            )));
        }
        let _ = self.name.set(name.to_string());
        let _ = self.index.set(index);
        Ok(())
    }

    fn key(&self) -> Result<usize> {
        self.index
            .get()
            .copied()
            .ok_or_else(|| Error::Schema("slot is not bound to a schema".to_string()))
    }

    fn bound_name(&self) -> &str {
        self.name().unwrap_or("<unbound>")
    }

    /// Read the current value from an instance. An unset slot reads as
    /// null when nullable and fails with a Null-value error otherwise.
    pub fn get(&self, instance: &Instance) -> Result<Value> {
        let key = self.key()?;
        match instance.storage_get(key) {
            Some(value) => Ok(value.clone()),
            None if self.nullable => Ok(Value::Null),
            None => Err(ValidationError::new(ErrorKind::NullValue)
                .with_field("property", self.bound_name())
                .into()),
        }
    }

    /// Write a value into an instance, enforcing every constraint.
    pub fn set(&self, instance: &mut Instance, value: Value) -> Result<()> {
        let key = self.key()?;
        debug!(property = self.bound_name(), value = %value, "slot set");

        // Null check comes first; a null accepted here skips the
        // remaining type constraints.
        if value.is_null() {
            if !self.nullable {
                return Err(ValidationError::new(ErrorKind::NullValue)
                    .with_field("property", self.bound_name())
                    .into());
            }
            self.check_read_only(instance, key)?;
            instance.storage_set(key, Value::Null);
            return Ok(());
        }

        self.check_read_only(instance, key)?;

        // A value that already is the model's product bypasses the type
        // constraints and is stored as-is.
        if let (Some(model), Value::Instance(nested)) = (&self.model, &value) {
            if model.kind_name() == Some(nested.kind_name()) {
                instance.storage_set(key, value);
                return Ok(());
            }
        }

        if let Some(types) = &self.valid_types {
            if !types.contains(&value.type_tag()) {
                return Err(ValidationError::new(ErrorKind::BadType)
                    .with_field("property", self.bound_name())
                    .with_field(
                        "expected_types",
                        Value::List(types.iter().map(|t| Value::from(t.as_str())).collect()),
                    )
                    .with_field("type", value.type_tag().as_str())
                    .into());
            }
        }

        if let Some(kinds) = &self.valid_kinds {
            let accepted = matches!(
                &value,
                Value::Instance(nested) if kinds.iter().any(|k| k == nested.kind_name())
            );
            if !accepted {
                return Err(ValidationError::new(ErrorKind::BadInstance)
                    .with_field("property", self.bound_name())
                    .with_field(
                        "expected_kinds",
                        Value::List(kinds.iter().map(|k| Value::from(k.as_str())).collect()),
                    )
                    .with_field("type", value.type_tag().as_str())
                    .into());
            }
        }

        if let Some(validate) = &self.validator {
            if let Err(reason) = validate(&value) {
                return Err(ValidationError::new(ErrorKind::Validator)
                    .with_field("property", self.bound_name())
                    .with_field("reason", reason)
                    .into());
            }
        }

        match &self.model {
            Some(model) => {
                // Raw data: build a fresh nested value and import into it.
                let fresh = model.construct()?;
                match fresh {
                    Value::Instance(mut nested) => {
                        nested.import_data(&value)?;
                        instance.storage_set(key, Value::Instance(nested));
                    }
                    _ => {
                        return Err(ValidationError::new(ErrorKind::BadInstance)
                            .with_field("property", self.bound_name())
                            .with_field("reason", "model product cannot import raw data")
                            .into());
                    }
                }
            }
            None => instance.storage_set(key, value),
        }
        Ok(())
    }

    /// Re-derive the value from the model or the default, through the
    /// same `set` path so constraints apply to defaults too. An absent or
    /// null default leaves the slot unset.
    pub fn reset(&self, instance: &mut Instance) -> Result<()> {
        let key = self.key()?;
        instance.storage_remove(key);

        if let Some(model) = &self.model {
            let fresh = model.construct()?;
            return self.set(instance, fresh);
        }
        if let Some(default) = &self.default {
            if !default.is_null() {
                return self.set(instance, default.clone());
            }
        }
        Ok(())
    }

    fn check_read_only(&self, instance: &Instance, key: usize) -> Result<()> {
        if self.read_only && instance.storage_has(key) {
            return Err(ValidationError::new(ErrorKind::ReadOnly)
                .with_field("property", self.bound_name())
                .into());
        }
        Ok(())
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("name", &self.name.get())
            .field("nullable", &self.nullable)
            .field("read_only", &self.read_only)
            .field("default", &self.default)
            .field("model", &self.model)
            .field("valid_types", &self.valid_types)
            .field("valid_kinds", &self.valid_kinds)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}
