//! Filter pipeline
//!
//! A filter is a pure function from a value to a [`FilterResult`]: a new
//! value, zero or more validation errors, and a verdict on whether the
//! chain should continue. [`run_filters`] threads one value through an
//! ordered list of filters, accumulating errors and stopping as soon as a
//! filter halts the chain.
//!
//! Filters must not share mutable state; everything a filter decides is
//! in its returned result.

use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::exceptions::{ErrorKind, ValidationError};
use crate::value::Value;

/// A pipeline entry: a shareable filter callable
pub type FilterFn = Arc<dyn Fn(&Value) -> FilterResult + Send + Sync>;

/// Wrap a closure or function into a pipeline entry
pub fn filter<F>(f: F) -> FilterFn
where
    F: Fn(&Value) -> FilterResult + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Outcome of one filter, and the running state of a pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct FilterResult {
    /// The (possibly transformed) value
    pub value: Value,
    /// Validation errors collected so far, in order of appearance
    pub errors: Vec<ValidationError>,
    /// Whether the remaining filters should run
    pub continue_filtering: bool,
}

impl FilterResult {
    /// A clean result: no errors, chain continues
    pub fn new(value: Value) -> Self {
        Self {
            value,
            errors: Vec::new(),
            continue_filtering: true,
        }
    }

    /// Append an error, leaving the verdict untouched
    pub fn with_error(mut self, error: ValidationError) -> Self {
        self.errors.push(error);
        self
    }

    /// Stop the chain after this filter
    pub fn halting(mut self) -> Self {
        self.continue_filtering = false;
        self
    }

    /// True iff no errors were collected
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for FilterResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<FilterResult value='{}' type='{}' errors='{}' continue_filtering='{}'>",
            self.value,
            self.value.type_tag(),
            self.errors.len(),
            self.continue_filtering
        )
    }
}

/// Run an ordered list of filters on a value.
///
/// The result seeds with the input value and an empty error list. Each
/// filter sees the current value, its output value overwrites the running
/// value, its errors append to the running list, and its verdict decides
/// whether the next filter runs.
pub fn run_filters(value: Value, filter_callables: &[FilterFn]) -> FilterResult {
    let mut result = FilterResult::new(value);

    for (i, filter_callable) in filter_callables.iter().enumerate() {
        debug!(
            filter_loop = i + 1,
            value = %result.value,
            "run_filters: invoking filter"
        );

        let step = filter_callable(&result.value);
        debug!(filter_loop = i + 1, step_result = %step, "run_filters: filter returned");

        result.value = step.value;
        result.errors.extend(step.errors);
        result.continue_filtering = step.continue_filtering;

        // Stop filtering if the last filter said so
        if !result.continue_filtering {
            break;
        }
    }

    debug!(final_result = %result, "run_filters: done");
    result
}

/// Reject null: halts the chain with a Null-value error on null input
pub fn filter_not_none(value: &Value) -> FilterResult {
    if value.is_null() {
        FilterResult::new(Value::Null)
            .with_error(ValidationError::new(ErrorKind::NullValue))
            .halting()
    } else {
        FilterResult::new(value.clone())
    }
}

/// Coerce to boolean truthiness; null passes through unchanged
pub fn filter_booleanize(value: &Value) -> FilterResult {
    if value.is_null() {
        // no null-to-false conversion here
        return FilterResult::new(Value::Null);
    }
    FilterResult::new(Value::Bool(value.is_truthy()))
}

/// Coerce to boolean truthiness, mapping null to `false`
pub fn filter_booleanize_none(value: &Value) -> FilterResult {
    if value.is_null() {
        return filter_booleanize(&Value::Bool(false));
    }
    filter_booleanize(value)
}

/// Replace any falsy value with the empty string
pub fn filter_none_to_empty_str(value: &Value) -> FilterResult {
    if !value.is_truthy() {
        FilterResult::new(Value::Str(String::new()))
    } else {
        FilterResult::new(value.clone())
    }
}

/// Coerce to an integer and reject negatives
pub fn filter_positive_number(value: &Value) -> FilterResult {
    match value.coerce_int() {
        Some(i) if i < 0 => FilterResult::new(Value::Int(i)).with_error(
            ValidationError::new(ErrorKind::IntTooLow)
                .with_field("min_value", 0)
                .with_field("value", i),
        ),
        Some(i) => FilterResult::new(Value::Int(i)),
        None => FilterResult::new(value.clone()).with_error(
            ValidationError::new(ErrorKind::BadType)
                .with_field("expected_type", "int")
                .with_field("type", value.type_tag().as_str()),
        ),
    }
}
