//! DOMStringMap (dataset)
//!
//! Name conversion between dataset keys and data-* attributes.

/// Read-only view of an element's data-* attributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DOMStringMap {
    data: Vec<(String, String)>,
}

impl DOMStringMap {
    /// Create from attribute (name, value) pairs; non data-* names are ignored
    pub fn from_attributes<'a>(attrs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let data = attrs
            .into_iter()
            .filter_map(|(name, value)| {
                name.strip_prefix("data-")
                    .map(|key| (to_camel_case(key), value.to_string()))
            })
            .collect();
        Self { data }
    }

    /// Get value by camelCase key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Check if key exists
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Get all keys, in attribute order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Convert key to attribute name
    pub fn to_attribute_name(key: &str) -> String {
        format!("data-{}", to_kebab_case(key))
    }
}

/// Convert kebab-case to camelCase
pub fn to_camel_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut capitalize_next = false;

    for c in s.chars() {
        if c == '-' {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }

    result
}

/// Convert camelCase to kebab-case
pub fn to_kebab_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);

    for c in s.chars() {
        if c.is_ascii_uppercase() {
            result.push('-');
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_attributes() {
        let attrs = [
            ("data-user-id", "123"),
            ("data-active", "true"),
            ("class", "ignored"),
        ];

        let map = DOMStringMap::from_attributes(attrs);

        assert_eq!(map.get("userId"), Some("123"));
        assert_eq!(map.get("active"), Some("true"));
        assert!(!map.has("class"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(to_camel_case("user-id"), "userId");
        assert_eq!(to_camel_case("first-name"), "firstName");
        assert_eq!(to_camel_case("simple"), "simple");
    }

    #[test]
    fn test_kebab_case() {
        assert_eq!(to_kebab_case("userId"), "user-id");
        assert_eq!(to_kebab_case("firstName"), "first-name");
        assert_eq!(DOMStringMap::to_attribute_name("userName"), "data-user-name");
    }
}
