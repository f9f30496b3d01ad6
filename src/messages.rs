//! Error-message template substitution
//!
//! Validation errors carry an optional message template plus a mapping of
//! machine-readable fields. Templates use `%`-style named placeholders:
//!
//! ```text
//! "String was '%(length)i' characters long but the maximum allowable is '%(max_length)i' characters."
//! ```
//!
//! Placeholders with no matching field are left verbatim; `%%` renders a
//! literal percent sign.

use indexmap::IndexMap;

use crate::value::Value;

lazy_static::lazy_static! {
    static ref TEMPLATE_VAR: regex::Regex =
        regex::Regex::new(r"%\((\w+)\)[sdif]").unwrap();
}

/// Substitute `fields` into a `%`-style message template.
pub fn fill_template(template: &str, fields: &IndexMap<String, Value>) -> String {
    let filled = TEMPLATE_VAR.replace_all(template, |caps: &regex::Captures<'_>| {
        match fields.get(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        }
    });
    filled.replace("%%", "%")
}
