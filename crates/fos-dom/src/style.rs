//! Inline Style Declaration
//!
//! The element's live `style` map. Accepts camelCase (`backgroundColor`) or
//! kebab-case (`background-color`) names and custom properties (`--gap`).

use crate::dataset::to_kebab_case;
use crate::{DomError, DomResult};

/// Inline CSS declarations, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssStyleDeclaration {
    declarations: Vec<(String, String)>,
}

/// Normalize a property name to its kebab-case form
pub(crate) fn normalize_property(name: &str) -> DomResult<String> {
    if name.starts_with("--") {
        if name.len() == 2 || name.chars().any(|c| c.is_whitespace() || c == ':' || c == ';') {
            return Err(DomError::InvalidStyleProperty(name.to_string()));
        }
        return Ok(name.to_string());
    }

    let kebab = match name {
        "cssFloat" => "float".to_string(),
        _ => to_kebab_case(name),
    };
    let valid = !kebab.is_empty()
        && !kebab.starts_with(|c: char| c.is_ascii_digit())
        && !kebab.ends_with('-')
        && kebab
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid {
        return Err(DomError::InvalidStyleProperty(name.to_string()));
    }
    Ok(kebab)
}

impl CssStyleDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from `style` attribute text. Malformed declarations are skipped.
    pub fn parse(text: &str) -> Self {
        let mut style = Self::new();
        for decl in text.split(';') {
            let Some((name, value)) = decl.split_once(':') else {
                continue;
            };
            let (name, value) = (name.trim(), value.trim());
            // Invalid entries are dropped the way a CSS parser would
            let _ = style.set_property(name, value);
        }
        style
    }

    /// Get a property value
    pub fn get_property_value(&self, name: &str) -> Option<&str> {
        let name = normalize_property(name).ok()?;
        self.declarations
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set a property. An empty value removes the declaration.
    pub fn set_property(&mut self, name: &str, value: &str) -> DomResult<()> {
        let name = normalize_property(name)?;
        let value = value.trim();
        if value.is_empty() {
            self.declarations.retain(|(n, _)| *n != name);
            return Ok(());
        }
        match self.declarations.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.declarations.push((name, value.to_string())),
        }
        Ok(())
    }

    /// Remove a property, returning the old value
    pub fn remove_property(&mut self, name: &str) -> Option<String> {
        let name = normalize_property(name).ok()?;
        let pos = self.declarations.iter().position(|(n, _)| *n == name)?;
        Some(self.declarations.remove(pos).1)
    }

    pub fn length(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Serialized form, as reflected by the `style` attribute
    pub fn css_text(&self) -> String {
        self.declarations
            .iter()
            .map(|(n, v)| format!("{n}: {v};"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_and_kebab_names() {
        let mut style = CssStyleDeclaration::new();
        style.set_property("backgroundColor", "red").unwrap();

        assert_eq!(style.get_property_value("background-color"), Some("red"));
        assert_eq!(style.get_property_value("backgroundColor"), Some("red"));
        assert_eq!(style.css_text(), "background-color: red;");
    }

    #[test]
    fn test_empty_value_removes() {
        let mut style = CssStyleDeclaration::new();
        style.set_property("color", "blue").unwrap();
        style.set_property("color", "").unwrap();
        assert!(style.is_empty());
    }

    #[test]
    fn test_invalid_names() {
        let mut style = CssStyleDeclaration::new();
        assert!(style.set_property("not a prop", "x").is_err());
        assert!(style.set_property("", "x").is_err());
        assert!(style.set_property("1st", "x").is_err());
        assert!(style.set_property("--", "x").is_err());
        assert!(style.set_property("--gap", "4px").is_ok());
        assert!(style.set_property("cssFloat", "left").is_ok());
        assert_eq!(style.get_property_value("float"), Some("left"));
    }

    #[test]
    fn test_parse_round_trip() {
        let style = CssStyleDeclaration::parse("color: red; font-size: 12px; bogus; : x");
        assert_eq!(style.length(), 2);
        assert_eq!(style.css_text(), "color: red; font-size: 12px;");
    }
}
