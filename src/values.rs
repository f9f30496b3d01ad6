//! Typed value wrappers
//!
//! A [`TypedValue`] is a self-contained validated value holder. Every
//! assignment keeps the raw input, builds a filter pipeline (pre-filters,
//! a not-none guard, the kind-specific filter, post-filters), runs it, and
//! stores the resulting value together with every collected validation
//! error. Validation failures are recoverable by default; configuring
//! `raise_on_error` turns the first collected error into a hard failure
//! of the assignment itself.

use regex::Regex;
use std::fmt;
use tracing::debug;

use crate::error::{Error, Result};
use crate::exceptions::{ErrorKind, ValidationError};
use crate::filters::{filter, filter_booleanize, filter_not_none, run_filters, FilterFn, FilterResult};
use crate::options::Options;
use crate::value::Value;

/// The closed set of wrapper kinds, each carrying its own filter
#[derive(Debug, Clone)]
pub enum WrapperKind {
    /// Coerces non-null input to boolean truthiness
    Boolean,
    /// Integer constrained to an optional `[min_value, max_value]` range
    BoundedInt {
        /// Inclusive lower bound; `Some(0)` is a real bound
        min_value: Option<i64>,
        /// Inclusive upper bound
        max_value: Option<i64>,
    },
    /// String constrained by optional length bounds and a pattern
    BoundedString {
        /// Minimum length in characters
        min_length: Option<usize>,
        /// Maximum length in characters
        max_length: Option<usize>,
        /// Regular expression the whole value must match
        pattern: Option<Regex>,
    },
    /// List whose elements must all be strings
    StringList,
    /// Map whose values must all be strings
    StringMap,
}

impl WrapperKind {
    /// Short name used in renderings
    pub fn name(&self) -> &'static str {
        match self {
            WrapperKind::Boolean => "boolean",
            WrapperKind::BoundedInt { .. } => "bounded_int",
            WrapperKind::BoundedString { .. } => "bounded_string",
            WrapperKind::StringList => "string_list",
            WrapperKind::StringMap => "string_map",
        }
    }

    /// The kind-specific pipeline filter
    pub fn type_filter(&self, value: &Value) -> FilterResult {
        match self {
            WrapperKind::Boolean => filter_booleanize(value),

            WrapperKind::BoundedInt { min_value, max_value } => {
                let mut result = FilterResult::new(value.clone());
                match value {
                    Value::Int(i) => {
                        if let Some(min) = min_value {
                            if i < min {
                                result = result.with_error(
                                    ValidationError::new(ErrorKind::IntTooLow)
                                        .with_field("min_value", *min)
                                        .with_field("value", *i),
                                );
                            }
                        }
                        if let Some(max) = max_value {
                            if i > max {
                                result = result.with_error(
                                    ValidationError::new(ErrorKind::IntTooHigh)
                                        .with_field("max_value", *max)
                                        .with_field("value", *i),
                                );
                            }
                        }
                    }
                    other => {
                        result = result.with_error(
                            ValidationError::new(ErrorKind::BadType)
                                .with_field("expected_type", "int")
                                .with_field("type", other.type_tag().as_str()),
                        );
                    }
                }
                result
            }

            WrapperKind::BoundedString {
                min_length,
                max_length,
                pattern,
            } => {
                let mut result = FilterResult::new(value.clone());
                match value {
                    Value::Str(s) => {
                        let length = s.chars().count();
                        if let Some(min) = min_length {
                            if length < *min {
                                result = result.with_error(
                                    ValidationError::new(ErrorKind::TooShort)
                                        .with_field("min_length", *min as i64)
                                        .with_field("length", length as i64),
                                );
                            }
                        }
                        if let Some(max) = max_length {
                            if length > *max {
                                result = result.with_error(
                                    ValidationError::new(ErrorKind::TooLong)
                                        .with_field("max_length", *max as i64)
                                        .with_field("length", length as i64),
                                );
                            }
                        }
                        if let Some(re) = pattern {
                            if !re.is_match(s) {
                                result = result.with_error(
                                    ValidationError::new(ErrorKind::PatternMismatch)
                                        .with_field("pattern", re.as_str())
                                        .with_field("value", s.as_str()),
                                );
                            }
                        }
                    }
                    other => {
                        result = result.with_error(
                            ValidationError::new(ErrorKind::BadInstance)
                                .with_field("expected_type", "str")
                                .with_field("type", other.type_tag().as_str()),
                        );
                    }
                }
                result
            }

            WrapperKind::StringList => {
                let mut result = FilterResult::new(value.clone());
                match value {
                    Value::List(items) => {
                        // Stop at the first offending element
                        for (index, item) in items.iter().enumerate() {
                            if !matches!(item, Value::Str(_)) {
                                result = result.with_error(
                                    ValidationError::new(ErrorKind::BadType)
                                        .with_field("expected_type", "string list")
                                        .with_field("index", index as i64)
                                        .with_field("type", item.type_tag().as_str()),
                                );
                                break;
                            }
                        }
                    }
                    other => {
                        result = result.with_error(
                            ValidationError::new(ErrorKind::BadType)
                                .with_field("expected_type", "string list")
                                .with_field("type", other.type_tag().as_str()),
                        );
                    }
                }
                result
            }

            WrapperKind::StringMap => {
                let mut result = FilterResult::new(value.clone());
                match value {
                    Value::Map(entries) => {
                        // Keys are strings by construction; check values
                        for (key, item) in entries {
                            if !matches!(item, Value::Str(_)) {
                                result = result.with_error(
                                    ValidationError::new(ErrorKind::BadType)
                                        .with_field("expected_type", "string map")
                                        .with_field("key", key.as_str())
                                        .with_field("type", item.type_tag().as_str()),
                                );
                                break;
                            }
                        }
                    }
                    other => {
                        result = result.with_error(
                            ValidationError::new(ErrorKind::BadType)
                                .with_field("expected_type", "string map")
                                .with_field("type", other.type_tag().as_str()),
                        );
                    }
                }
                result
            }
        }
    }
}

/// A validated value holder wired to a filter pipeline
#[derive(Clone)]
pub struct TypedValue {
    kind: WrapperKind,
    raw_value: Value,
    value: Value,
    errors: Vec<ValidationError>,
    allow_none: bool,
    raise_on_error: bool,
    pre_filters: Vec<FilterFn>,
    post_filters: Vec<FilterFn>,
}

impl TypedValue {
    /// Boolean wrapper
    pub fn boolean(options: Options) -> Result<Self> {
        Self::with_kind(WrapperKind::Boolean, options)
    }

    /// Bounded integer wrapper; consumes `min_value` / `max_value`
    pub fn bounded_int(mut options: Options) -> Result<Self> {
        let min_value = options.take_int("min_value")?;
        let max_value = options.take_int("max_value")?;
        Self::with_kind(WrapperKind::BoundedInt { min_value, max_value }, options)
    }

    /// Bounded/pattern string wrapper; consumes `min_length` /
    /// `max_length` / `pattern`
    pub fn bounded_string(mut options: Options) -> Result<Self> {
        let min_length = options.take_length("min_length")?;
        let max_length = options.take_length("max_length")?;
        let pattern = match options.take_str("pattern")? {
            Some(p) => Some(Regex::new(&p).map_err(|e| {
                Error::Option(format!("option 'pattern' is not a valid regular expression: {}", e))
            })?),
            None => None,
        };
        Self::with_kind(
            WrapperKind::BoundedString {
                min_length,
                max_length,
                pattern,
            },
            options,
        )
    }

    /// Homogeneous string list wrapper
    pub fn string_list(options: Options) -> Result<Self> {
        Self::with_kind(WrapperKind::StringList, options)
    }

    /// String-to-string map wrapper
    pub fn string_map(options: Options) -> Result<Self> {
        Self::with_kind(WrapperKind::StringMap, options)
    }

    fn with_kind(kind: WrapperKind, mut options: Options) -> Result<Self> {
        let allow_none = options.take_bool("allow_none", false)?;
        let pre_filters = options.take_filters("pre_filter_callables")?;
        let post_filters = options.take_filters("post_filter_callables")?;
        let raise_on_error = options.take_bool("raise_on_error", false)?;
        let initial = options.take_value("value")?.unwrap_or(Value::Null);

        let mut wrapper = Self {
            kind,
            raw_value: Value::Null,
            value: Value::Null,
            errors: Vec::new(),
            allow_none,
            raise_on_error,
            pre_filters,
            post_filters,
        };
        wrapper.set_value(initial)?;
        options.check_unused()?;
        Ok(wrapper)
    }

    /// Assign a new value through the filter pipeline.
    ///
    /// The raw input is kept verbatim and the error list is replaced by
    /// this run's errors. With `raise_on_error`, the first collected
    /// error fails the call and the previous value stays committed.
    pub fn set_value(&mut self, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        debug!(kind = self.kind.name(), value = %value, "set_value");

        self.raw_value = value.clone();
        self.errors.clear();

        let mut filters: Vec<FilterFn> = self.pre_filters.clone();

        if self.allow_none && value.is_null() {
            // Null allowed and received: bypass the remaining filters.
        } else {
            if !self.allow_none {
                filters.push(filter(filter_not_none));
            }
            let kind = self.kind.clone();
            filters.push(filter(move |v: &Value| kind.type_filter(v)));
            filters.extend(self.post_filters.iter().cloned());
        }

        let result = run_filters(value, &filters);

        if self.raise_on_error {
            if let Some(first) = result.errors.first() {
                return Err(Error::Validation(first.clone()));
            }
        }

        self.value = result.value;
        self.errors = result.errors;
        Ok(())
    }

    /// The current (filtered) value
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The raw, unfiltered input of the last assignment
    pub fn raw_value(&self) -> &Value {
        &self.raw_value
    }

    /// Errors collected by the last assignment
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// True iff the last assignment collected no errors
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The wrapper kind
    pub fn kind(&self) -> &WrapperKind {
        &self.kind
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{} value='{}' valid='{}' errors='{}'>",
            self.kind.name(),
            self.value,
            self.is_valid(),
            self.errors.len()
        )
    }
}

impl fmt::Debug for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedValue")
            .field("kind", &self.kind)
            .field("raw_value", &self.raw_value)
            .field("value", &self.value)
            .field("errors", &self.errors)
            .field("allow_none", &self.allow_none)
            .field("raise_on_error", &self.raise_on_error)
            .finish_non_exhaustive()
    }
}
