//! Property container instances
//!
//! An [`Instance`] owns a private mapping from slot storage key to current
//! value. Instances of one kind share the kind's [`Schema`] but never
//! share storage; destroying an instance destroys only its own values.

use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::exceptions::{ErrorKind, ValidationError};
use crate::props::schema::Schema;
use crate::value::Value;

/// One instance of a kind: shared schema, private storage
#[derive(Debug, Clone)]
pub struct Instance {
    schema: Arc<Schema>,
    values: HashMap<usize, Value>,
}

impl Instance {
    pub(crate) fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            values: HashMap::new(),
        }
    }

    /// Name of this instance's kind
    pub fn kind_name(&self) -> &str {
        self.schema.kind_name()
    }

    /// The shared schema
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Read a property by name
    pub fn get(&self, name: &str) -> Result<Value> {
        let schema = Arc::clone(&self.schema);
        schema.slot(name)?.get(self)
    }

    /// Write a property by name
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let schema = Arc::clone(&self.schema);
        schema.slot(name)?.set(self, value.into())
    }

    /// Reset one property to its model or default
    pub fn reset(&mut self, name: &str) -> Result<()> {
        let schema = Arc::clone(&self.schema);
        schema.slot(name)?.reset(self)
    }

    /// Reset every property, in schema declaration order
    pub fn reset_all(&mut self) -> Result<()> {
        debug!(kind = self.kind_name(), "resetting all properties");
        let schema = Arc::clone(&self.schema);
        for (_, slot) in schema.iter() {
            slot.reset(self)?;
        }
        Ok(())
    }

    /// Import raw data: a map (or another instance's snapshot) is written
    /// property by property through the ordinary constraint checks.
    pub fn import_data(&mut self, raw: &Value) -> Result<()> {
        match raw {
            Value::Map(entries) => {
                for (name, value) in entries {
                    self.set(name, value.clone())?;
                }
                Ok(())
            }
            Value::Instance(other) => {
                for (name, value) in other.to_map()? {
                    self.set(&name, value)?;
                }
                Ok(())
            }
            _ => Err(ValidationError::new(ErrorKind::BadInstance)
                .with_field("kind", self.kind_name())
                .with_field("type", raw.type_tag().as_str())
                .into()),
        }
    }

    /// Snapshot every property in schema order
    pub fn to_map(&self) -> Result<IndexMap<String, Value>> {
        let mut map = IndexMap::new();
        for (name, slot) in self.schema.iter() {
            map.insert(name.to_string(), slot.get(self)?);
        }
        Ok(map)
    }

    pub(crate) fn storage_get(&self, key: usize) -> Option<&Value> {
        self.values.get(&key)
    }

    pub(crate) fn storage_has(&self, key: usize) -> bool {
        self.values.contains_key(&key)
    }

    pub(crate) fn storage_set(&mut self, key: usize, value: Value) {
        self.values.insert(key, value);
    }

    pub(crate) fn storage_remove(&mut self, key: usize) {
        self.values.remove(&key);
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.kind_name() == other.kind_name() && self.values == other.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::schema::Kind;
    use crate::props::slot::Slot;
    use crate::value::TypeTag;
    use pretty_assertions::assert_eq;

    fn person() -> Arc<Kind> {
        Kind::builder("Person")
            .slot("name", Slot::new().with_types([TypeTag::Str]))
            .slot("age", Slot::new().with_types([TypeTag::Int]).with_default(0))
            .build()
            .unwrap()
    }

    #[test]
    fn test_instances_do_not_share_storage() {
        let kind = person();
        let mut a = kind.instantiate().unwrap();
        let b = kind.instantiate().unwrap();

        a.set("name", "ada").unwrap();
        assert_eq!(a.get("name").unwrap(), Value::from("ada"));
        assert_eq!(b.get("name").unwrap(), Value::Null);
    }

    #[test]
    fn test_defaults_applied_on_instantiate() {
        let kind = person();
        let instance = kind.instantiate().unwrap();
        assert_eq!(instance.get("age").unwrap(), Value::from(0));
    }

    #[test]
    fn test_import_data_from_map() {
        let kind = person();
        let mut instance = kind.instantiate().unwrap();
        let mut raw = IndexMap::new();
        raw.insert("name".to_string(), Value::from("ada"));
        raw.insert("age".to_string(), Value::from(36));
        instance.import_data(&Value::Map(raw)).unwrap();
        assert_eq!(instance.get("age").unwrap(), Value::from(36));
    }

    #[test]
    fn test_import_data_rejects_scalars() {
        let kind = person();
        let mut instance = kind.instantiate().unwrap();
        let err = instance.import_data(&Value::from(5)).unwrap_err();
        assert_eq!(err.as_validation().unwrap().kind(), ErrorKind::BadInstance);
    }

    #[test]
    fn test_import_data_unknown_property() {
        let kind = person();
        let mut instance = kind.instantiate().unwrap();
        let mut raw = IndexMap::new();
        raw.insert("ghost".to_string(), Value::from(1));
        let err = instance.import_data(&Value::Map(raw)).unwrap_err();
        assert_eq!(err.as_validation().unwrap().kind(), ErrorKind::UnknownSlot);
    }

    #[test]
    fn test_to_map_follows_schema_order() {
        let kind = person();
        let mut instance = kind.instantiate().unwrap();
        instance.set("name", "ada").unwrap();
        let map = instance.to_map().unwrap();
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "age"]);
    }
}
