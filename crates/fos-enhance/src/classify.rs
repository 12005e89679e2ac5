//! Update key classification
//!
//! Splits an update object into index keys (targeting one collection
//! element) and bulk keys (applied to every element). A key is an index
//! key when it parses as an `i64` whose decimal rendering is the key
//! itself, so `"+1"`, `"01"`, `"-0"`, `"1e2"` and `"3.14"` are bulk keys.

use crate::{PropertyKey, Updates, Value};

/// One index-targeted entry
#[derive(Debug, Clone, PartialEq)]
pub struct IndexUpdate {
    /// Key as written
    pub key: String,
    /// Parsed index, possibly negative
    pub index: i64,
    pub value: Value,
}

/// Classified update object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classified {
    pub index_updates: Vec<IndexUpdate>,
    pub bulk_updates: Updates,
}

/// Parse an index key using the strict round-trip rule
pub fn parse_index_key(key: &str) -> Option<i64> {
    let index: i64 = key.parse().ok()?;
    (index.to_string() == key).then_some(index)
}

/// Partition string keys into index and bulk buckets, keeping insertion
/// order. Symbol keys land in neither.
pub fn classify_update_keys(updates: &Updates) -> Classified {
    let mut classified = Classified::default();
    for (key, value) in updates.iter() {
        let PropertyKey::String(key) = key else {
            continue;
        };
        match parse_index_key(key) {
            Some(index) => classified.index_updates.push(IndexUpdate {
                key: key.clone(),
                index,
                value: value.clone(),
            }),
            None => {
                classified.bulk_updates.insert(key.as_str(), value.clone());
            }
        }
    }
    classified
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Symbol;
    use rstest::rstest;

    #[rstest]
    #[case("0", Some(0))]
    #[case("42", Some(42))]
    #[case("-1", Some(-1))]
    #[case("-9223372036854775808", Some(i64::MIN))]
    #[case("3.14", None)]
    #[case("1e2", None)]
    #[case("+1", None)]
    #[case("01", None)]
    #[case("-0", None)]
    #[case(" 1", None)]
    #[case("", None)]
    #[case("abc", None)]
    #[case("99999999999999999999", None)]
    fn test_parse_index_key(#[case] key: &str, #[case] expected: Option<i64>) {
        assert_eq!(parse_index_key(key), expected);
    }

    #[test]
    fn test_every_key_lands_in_one_bucket() {
        let updates = Updates::new()
            .with("style", 1)
            .with("0", 2)
            .with("3.14", 3)
            .with("-1", 4)
            .with("textContent", 5);
        let classified = classify_update_keys(&updates);

        let index_keys: Vec<&str> = classified.index_updates.iter().map(|u| u.key.as_str()).collect();
        let bulk_keys: Vec<&str> = classified.bulk_updates.string_entries().map(|(k, _)| k).collect();
        assert_eq!(index_keys, ["0", "-1"]);
        assert_eq!(bulk_keys, ["style", "3.14", "textContent"]);
        assert_eq!(classified.index_updates[1].index, -1);
    }

    #[test]
    fn test_symbols_are_excluded() {
        let updates = Updates::new().with(Symbol::new("meta"), 1).with("0", 2);
        let classified = classify_update_keys(&updates);
        assert_eq!(classified.index_updates.len(), 1);
        assert!(classified.bulk_updates.is_empty());
    }
}
