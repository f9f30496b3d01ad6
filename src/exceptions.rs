//! Validation exception set
//!
//! Structured, immutable error records describing what failed and why.
//! Each record carries a machine-readable [`ErrorKind`], an optional
//! message template, and an ordered mapping of fields that the template
//! substitutes (see [`crate::messages`]).
//!
//! These records are values, not control flow: filters collect them in
//! lists, and only fail-fast boundaries convert one into a hard error.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::messages::fill_template;
use crate::value::Value;

/// Machine-readable classification of a validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// A non-nullable slot or value received null
    NullValue,
    /// A write was attempted on an already-set read-only slot
    ReadOnly,
    /// The primitive type is not in the accepted set
    BadType,
    /// The value is not an instance of any accepted kind, or a nested
    /// import failed
    BadInstance,
    /// A custom validator rejected the value
    Validator,
    /// A length fell below the minimum bound
    TooShort,
    /// A length exceeded the maximum bound
    TooLong,
    /// A regular-expression bound did not match
    PatternMismatch,
    /// A numeric value fell below the minimum bound
    IntTooLow,
    /// A numeric value exceeded the maximum bound
    IntTooHigh,
    /// Indexed access to an undeclared property name
    UnknownSlot,
    /// A configuration option was supplied but never consulted
    UnusedOption,
}

impl ErrorKind {
    /// Class-style name of this kind, used in the default rendering
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::NullValue => "NullValue",
            ErrorKind::ReadOnly => "ReadOnly",
            ErrorKind::BadType => "BadType",
            ErrorKind::BadInstance => "BadInstance",
            ErrorKind::Validator => "Validator",
            ErrorKind::TooShort => "TooShort",
            ErrorKind::TooLong => "TooLong",
            ErrorKind::PatternMismatch => "PatternMismatch",
            ErrorKind::IntTooLow => "IntTooLow",
            ErrorKind::IntTooHigh => "IntTooHigh",
            ErrorKind::UnknownSlot => "UnknownSlot",
            ErrorKind::UnusedOption => "UnusedOption",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single validation failure
///
/// Immutable once constructed, except that the message template may be
/// explicitly cleared to fall back to the default rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    kind: ErrorKind,
    message: Option<String>,
    fields: IndexMap<String, Value>,
}

impl ValidationError {
    /// Create a new validation error of the given kind
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            fields: IndexMap::new(),
        }
    }

    /// Set the message template
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach a machine-readable field
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// The failure classification
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The message template, if one was set
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Look up a single field
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// All fields, in insertion order
    pub fn fields(&self) -> &IndexMap<String, Value> {
        &self.fields
    }

    /// Drop the message template, reverting to the default rendering.
    /// This is the only mutation the record permits.
    pub fn clear_message(&mut self) {
        self.message = None;
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(template) => write!(f, "{}", fill_template(template, &self.fields)),
            None => {
                write!(f, "<{}", self.kind.name())?;
                for (key, value) in &self.fields {
                    write!(f, " {}='{}'", key, value)?;
                }
                write!(f, ">")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_rendering() {
        let err = ValidationError::new(ErrorKind::IntTooLow)
            .with_field("min_value", 0)
            .with_field("value", -1);
        assert_eq!(format!("{}", err), "<IntTooLow min_value='0' value='-1'>");
    }

    #[test]
    fn test_template_rendering() {
        let err = ValidationError::new(ErrorKind::TooLong)
            .with_message("got %(length)i characters, maximum is %(max_length)i")
            .with_field("length", 4)
            .with_field("max_length", 3);
        assert_eq!(format!("{}", err), "got 4 characters, maximum is 3");
    }

    #[test]
    fn test_clear_message() {
        let mut err = ValidationError::new(ErrorKind::NullValue).with_message("custom");
        assert_eq!(format!("{}", err), "custom");
        err.clear_message();
        assert_eq!(format!("{}", err), "<NullValue>");
    }

    #[test]
    fn test_fields_preserve_order() {
        let err = ValidationError::new(ErrorKind::BadType)
            .with_field("expected_type", "int")
            .with_field("type", "str");
        let keys: Vec<&str> = err.fields().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["expected_type", "type"]);
    }
}
