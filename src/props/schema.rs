//! Kinds, schemas, and the kind registry
//!
//! A [`Kind`] owns the declared slot list for one class of instances.
//! The declarations are materialized into a shared [`Schema`] lazily, on
//! the first instantiation: each slot is assigned its name and storage
//! key exactly once, in declaration order. Later instantiations reuse the
//! bound schema; binding never runs twice for one kind.

use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::error::{Error, Result};
use crate::exceptions::{ErrorKind, ValidationError};
use crate::props::instance::Instance;
use crate::props::slot::Slot;

/// A named kind: the declaration site of a schema
#[derive(Debug)]
pub struct Kind {
    name: String,
    declarations: Vec<(String, Slot)>,
    schema: OnceCell<Arc<Schema>>,
    bind_passes: AtomicUsize,
}

impl Kind {
    /// Start declaring a kind
    pub fn builder(name: impl Into<String>) -> KindBuilder {
        KindBuilder {
            name: name.into(),
            declarations: Vec::new(),
        }
    }

    /// The kind's name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True once the schema has been materialized
    pub fn is_bound(&self) -> bool {
        self.schema.get().is_some()
    }

    /// Number of schema-initialization passes that have run (0 or 1)
    pub fn bind_passes(&self) -> usize {
        self.bind_passes.load(Ordering::Relaxed)
    }

    /// The bound schema, materializing it on first use.
    pub fn schema(&self) -> Result<Arc<Schema>> {
        self.schema
            .get_or_try_init(|| {
                self.bind_passes.fetch_add(1, Ordering::Relaxed);
                debug!(kind = %self.name, slots = self.declarations.len(), "binding schema");

                let mut slots = IndexMap::new();
                for (index, (name, slot)) in self.declarations.iter().enumerate() {
                    slot.bind(name, index)?;
                    slots.insert(name.clone(), slot.clone());
                }
                Ok(Arc::new(Schema {
                    kind: self.name.clone(),
                    slots,
                }))
            })
            .map(Arc::clone)
    }

    /// Create an instance of this kind. The first call binds the schema;
    /// the new instance gets every slot reset to its model or default.
    pub fn instantiate(&self) -> Result<Instance> {
        let schema = self.schema()?;
        let mut instance = Instance::new(schema);
        instance.reset_all()?;
        Ok(instance)
    }
}

/// Collects slot declarations for a [`Kind`]
#[derive(Debug)]
pub struct KindBuilder {
    name: String,
    declarations: Vec<(String, Slot)>,
}

impl KindBuilder {
    /// Declare a slot. Declaration order is the schema order.
    pub fn slot(mut self, name: impl Into<String>, slot: Slot) -> Self {
        self.declarations.push((name.into(), slot));
        self
    }

    /// Finish the declaration. Duplicate slot names are a schema error.
    pub fn build(self) -> Result<Arc<Kind>> {
        let mut seen = std::collections::HashSet::new();
        for (name, _) in &self.declarations {
            if !seen.insert(name.as_str()) {
                return Err(Error::Schema(format!(
                    "kind '{}' declares slot '{}' twice",
                    self.name, name
                )));
            }
        }
        Ok(Arc::new(Kind {
            name: self.name,
            declarations: self.declarations,
            schema: OnceCell::new(),
            bind_passes: AtomicUsize::new(0),
        }))
    }
}

/// The bound, shared form of a kind's slot table
#[derive(Debug)]
pub struct Schema {
    kind: String,
    slots: IndexMap<String, Slot>,
}

impl Schema {
    /// Name of the owning kind
    pub fn kind_name(&self) -> &str {
        &self.kind
    }

    /// Look up a slot, failing with an Unknown-slot error
    pub fn slot(&self, name: &str) -> Result<&Slot> {
        self.slots.get(name).ok_or_else(|| {
            ValidationError::new(ErrorKind::UnknownSlot)
                .with_field("property", name)
                .with_field("kind", self.kind.as_str())
                .into()
        })
    }

    /// Look up a slot without raising
    pub fn get(&self, name: &str) -> Option<&Slot> {
        self.slots.get(name)
    }

    /// Iterate slots in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Slot)> {
        self.slots.iter().map(|(name, slot)| (name.as_str(), slot))
    }

    /// Number of declared slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True if no slots are declared
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// An explicit, non-global registry of kinds
#[derive(Debug, Default)]
pub struct Registry {
    kinds: IndexMap<String, Arc<Kind>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kind. Re-registering a name is a schema error.
    pub fn register(&mut self, kind: Arc<Kind>) -> Result<()> {
        let name = kind.name().to_string();
        if self.kinds.contains_key(&name) {
            return Err(Error::Schema(format!("kind '{}' is already registered", name)));
        }
        self.kinds.insert(name, kind);
        Ok(())
    }

    /// Look up a kind by name
    pub fn get(&self, name: &str) -> Option<&Arc<Kind>> {
        self.kinds.get(name)
    }

    /// Instantiate a registered kind by name
    pub fn instantiate(&self, name: &str) -> Result<Instance> {
        match self.get(name) {
            Some(kind) => kind.instantiate(),
            None => Err(Error::Schema(format!("unknown kind '{}'", name))),
        }
    }

    /// Iterate registered kinds in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Kind>> {
        self.kinds.values()
    }
}
