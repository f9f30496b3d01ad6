//! Configuration options for typed values
//!
//! An [`Options`] bag maps option names to either plain values or filter
//! lists. Consumers take options out by name with typed accessors; once
//! construction finishes, [`Options::check_unused`] reports any option
//! that was supplied but never consulted.

use indexmap::IndexMap;
use std::collections::HashSet;
use std::fmt;

use crate::error::{Error, Result};
use crate::exceptions::{ErrorKind, ValidationError};
use crate::filters::FilterFn;
use crate::value::Value;

/// One configured option: a plain value or a list of filter callables
#[derive(Clone)]
pub enum OptionValue {
    /// A plain value
    Value(Value),
    /// An ordered list of filter callables
    Filters(Vec<FilterFn>),
}

impl fmt::Debug for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Value(v) => write!(f, "Value({:?})", v),
            OptionValue::Filters(fs) => write!(f, "Filters(len={})", fs.len()),
        }
    }
}

/// A named option bag with consumption tracking
#[derive(Debug, Default, Clone)]
pub struct Options {
    entries: IndexMap<String, OptionValue>,
    consumed: HashSet<String>,
}

impl Options {
    /// Create an empty option bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a plain-value option
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries
            .insert(name.into(), OptionValue::Value(value.into()));
        self
    }

    /// Set a filter-list option
    pub fn set_filters(mut self, name: impl Into<String>, filters: Vec<FilterFn>) -> Self {
        self.entries
            .insert(name.into(), OptionValue::Filters(filters));
        self
    }

    /// True if the option was supplied
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    fn consume(&mut self, name: &str) -> Option<&OptionValue> {
        self.consumed.insert(name.to_string());
        self.entries.get(name)
    }

    /// Consume an option as a raw value
    pub fn take_value(&mut self, name: &str) -> Result<Option<Value>> {
        match self.consume(name) {
            None => Ok(None),
            Some(OptionValue::Value(v)) => Ok(Some(v.clone())),
            Some(OptionValue::Filters(_)) => Err(Error::Option(format!(
                "option '{}' holds a filter list, expected a value",
                name
            ))),
        }
    }

    /// Consume a boolean option, falling back to a default
    pub fn take_bool(&mut self, name: &str, default: bool) -> Result<bool> {
        match self.take_value(name)? {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(b),
            Some(other) => Err(Error::Option(format!(
                "option '{}' expects a bool, got {}",
                name,
                other.type_tag()
            ))),
        }
    }

    /// Consume an integer option
    pub fn take_int(&mut self, name: &str) -> Result<Option<i64>> {
        match self.take_value(name)? {
            None => Ok(None),
            Some(Value::Int(i)) => Ok(Some(i)),
            Some(other) => Err(Error::Option(format!(
                "option '{}' expects an int, got {}",
                name,
                other.type_tag()
            ))),
        }
    }

    /// Consume a non-negative length option
    pub fn take_length(&mut self, name: &str) -> Result<Option<usize>> {
        match self.take_int(name)? {
            None => Ok(None),
            Some(i) if i >= 0 => Ok(Some(i as usize)),
            Some(i) => Err(Error::Option(format!(
                "option '{}' expects a non-negative length, got {}",
                name, i
            ))),
        }
    }

    /// Consume a string option
    pub fn take_str(&mut self, name: &str) -> Result<Option<String>> {
        match self.take_value(name)? {
            None => Ok(None),
            Some(Value::Str(s)) => Ok(Some(s)),
            Some(other) => Err(Error::Option(format!(
                "option '{}' expects a string, got {}",
                name,
                other.type_tag()
            ))),
        }
    }

    /// Consume a filter-list option. An empty list is returned when the
    /// option is absent. An option present under this name but holding a
    /// plain value is a programming error, not a validation failure.
    pub fn take_filters(&mut self, name: &str) -> Result<Vec<FilterFn>> {
        match self.consume(name) {
            None => Ok(Vec::new()),
            Some(OptionValue::Filters(fs)) => Ok(fs.clone()),
            Some(OptionValue::Value(v)) => Err(Error::BadCallable(format!(
                "option '{}' holds '{}', expected filter callables",
                name, v
            ))),
        }
    }

    /// Report any option that was supplied but never consumed.
    pub fn check_unused(&self) -> Result<()> {
        let unused: Vec<Value> = self
            .entries
            .keys()
            .filter(|name| !self.consumed.contains(*name))
            .map(|name| Value::from(name.as_str()))
            .collect();

        if unused.is_empty() {
            return Ok(());
        }
        Err(ValidationError::new(ErrorKind::UnusedOption)
            .with_field("options", Value::List(unused))
            .into())
    }
}
