//! Update directives
//!
//! Named directives live in a `DirectiveRegistry`. Keys without a directive
//! go through the fallback chain (inline handler, method, property,
//! attribute).

mod attributes;
mod class_list;
mod dataset;
mod fallback;
mod listeners;
mod registry;
mod style;

pub use fallback::apply_fallback;
pub use registry::{Directive, DirectiveRegistry};

use fos_dom::Element;

use crate::{UpdateError, Value};

/// What a directive handler sees
pub struct DirectiveContext<'a> {
    pub element: &'a Element,
    /// Skip writes that would not change the DOM
    pub fine_grained: bool,
}

impl<'a> DirectiveContext<'a> {
    pub fn new(element: &'a Element, fine_grained: bool) -> Self {
        Self {
            element,
            fine_grained,
        }
    }

    pub fn set_attribute(&self, name: &str, value: &str) -> Result<(), UpdateError> {
        if self.fine_grained && self.element.get_attribute(name).as_deref() == Some(value) {
            return Ok(());
        }
        Ok(self.element.set_attribute(name, value)?)
    }

    pub fn set_style(&self, name: &str, value: &str) -> Result<(), UpdateError> {
        if self.fine_grained && self.element.style_property(name).as_deref() == Some(value) {
            return Ok(());
        }
        Ok(self.element.set_style_property(name, value)?)
    }

    pub fn set_dataset(&self, key: &str, value: &str) -> Result<(), UpdateError> {
        if self.fine_grained && self.element.dataset_get(key).as_deref() == Some(value) {
            return Ok(());
        }
        Ok(self.element.dataset_set(key, value)?)
    }
}

/// Object payload or an `InvalidValue` error
pub(crate) fn expect_object<'v>(value: &'v Value) -> Result<&'v crate::Updates, UpdateError> {
    value
        .as_object()
        .ok_or_else(|| UpdateError::invalid("object", value))
}

/// Single string or array of strings
pub(crate) fn string_list(value: &Value) -> Result<Vec<String>, UpdateError> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|v| match v {
                Value::Array(_) | Value::Object(_) | Value::Handler(_) => {
                    Err(UpdateError::invalid("string", v))
                }
                other => Ok(other.to_attr_string()),
            })
            .collect(),
        Value::Object(_) | Value::Handler(_) => Err(UpdateError::invalid("string or array", value)),
        other => Ok(vec![other.to_attr_string()]),
    }
}

/// Keep going after a failed entry; report the first failure
pub(crate) fn first_error(
    results: impl IntoIterator<Item = Result<(), UpdateError>>,
) -> Result<(), UpdateError> {
    let mut first = None;
    for result in results {
        if let Err(err) = result {
            first.get_or_insert(err);
        }
    }
    first.map_or(Ok(()), Err)
}
