//! Element Attributes
//!
//! Attribute manipulation: get, set, remove, has.

use std::collections::HashMap;

use crate::{DomError, DomResult};

/// Named node map (attribute collection)
#[derive(Debug, Clone, Default)]
pub struct NamedNodeMap {
    attributes: Vec<Attr>,
    by_name: HashMap<String, usize>,
}

/// Single attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub value: String,
}

impl Attr {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn is_id(&self) -> bool {
        self.name == "id"
    }
}

/// Validate an attribute name.
///
/// Names are ASCII-lowercased by the caller; anything with whitespace,
/// quotes, `=`, `/`, `>` or control characters is rejected.
pub(crate) fn validate_name(name: &str) -> DomResult<()> {
    let invalid = name.is_empty()
        || name.chars().any(|c| {
            c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '>' | '/' | '=' | '<')
        });
    if invalid {
        return Err(DomError::InvalidCharacter(name.to_string()));
    }
    Ok(())
}

impl NamedNodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get number of attributes
    pub fn length(&self) -> usize {
        self.attributes.len()
    }

    /// Get attribute by index
    pub fn item(&self, index: usize) -> Option<&Attr> {
        self.attributes.get(index)
    }

    /// Get attribute by name
    pub fn get_named_item(&self, name: &str) -> Option<&Attr> {
        self.by_name.get(name).and_then(|&i| self.attributes.get(i))
    }

    /// Get attribute value
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.get_named_item(name).map(|a| a.value.as_str())
    }

    /// Set attribute, returning the previous one
    pub fn set_named_item(&mut self, attr: Attr) -> Option<Attr> {
        if let Some(&index) = self.by_name.get(&attr.name) {
            Some(std::mem::replace(&mut self.attributes[index], attr))
        } else {
            let index = self.attributes.len();
            self.by_name.insert(attr.name.clone(), index);
            self.attributes.push(attr);
            None
        }
    }

    /// Set attribute by name/value, validating the name
    pub fn set_attribute(&mut self, name: &str, value: &str) -> DomResult<()> {
        validate_name(name)?;
        self.set_named_item(Attr::new(name, value));
        Ok(())
    }

    /// Remove attribute by name
    pub fn remove_named_item(&mut self, name: &str) -> Option<Attr> {
        let index = self.by_name.remove(name)?;
        // Update indices for items after removed
        for idx in self.by_name.values_mut() {
            if *idx > index {
                *idx -= 1;
            }
        }
        Some(self.attributes.remove(index))
    }

    /// Check if attribute exists
    pub fn has_attribute(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Toggle attribute, returning whether it is now present
    pub fn toggle_attribute(&mut self, name: &str, force: Option<bool>) -> DomResult<bool> {
        validate_name(name)?;
        let present = self.has_attribute(name);
        let want = force.unwrap_or(!present);
        if want && !present {
            self.set_named_item(Attr::new(name, ""));
        } else if !want && present {
            self.remove_named_item(name);
        }
        Ok(want)
    }

    /// Get attribute names
    pub fn get_attribute_names(&self) -> Vec<&str> {
        self.attributes.iter().map(|a| a.name.as_str()).collect()
    }

    /// Iterate over attributes
    pub fn iter(&self) -> impl Iterator<Item = &Attr> {
        self.attributes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_attribute() {
        let mut attrs = NamedNodeMap::new();
        attrs.set_attribute("class", "btn").unwrap();
        attrs.set_attribute("id", "submit").unwrap();

        assert_eq!(attrs.length(), 2);
        assert_eq!(attrs.get_attribute("class"), Some("btn"));
        assert_eq!(attrs.get_attribute("id"), Some("submit"));
    }

    #[test]
    fn test_remove_attribute_reindexes() {
        let mut attrs = NamedNodeMap::new();
        attrs.set_attribute("a", "1").unwrap();
        attrs.set_attribute("b", "2").unwrap();
        attrs.set_attribute("c", "3").unwrap();

        attrs.remove_named_item("a");
        assert!(!attrs.has_attribute("a"));
        assert_eq!(attrs.get_attribute("c"), Some("3"));
        assert_eq!(attrs.get_attribute_names(), vec!["b", "c"]);
    }

    #[test]
    fn test_toggle_attribute() {
        let mut attrs = NamedNodeMap::new();

        assert!(attrs.toggle_attribute("disabled", None).unwrap());
        assert!(attrs.has_attribute("disabled"));

        assert!(!attrs.toggle_attribute("disabled", None).unwrap());
        assert!(!attrs.has_attribute("disabled"));

        assert!(attrs.toggle_attribute("disabled", Some(true)).unwrap());
        assert!(attrs.toggle_attribute("disabled", Some(true)).unwrap());
        assert!(attrs.has_attribute("disabled"));
    }

    #[test]
    fn test_invalid_names_rejected() {
        let mut attrs = NamedNodeMap::new();
        assert!(matches!(attrs.set_attribute("bad name", "x"), Err(DomError::InvalidCharacter(_))));
        assert!(attrs.set_attribute("", "x").is_err());
        assert!(attrs.set_attribute("a=b", "x").is_err());
        assert_eq!(attrs.length(), 0);
    }
}
