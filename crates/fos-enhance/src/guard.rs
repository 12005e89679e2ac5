//! Idempotence guard
//!
//! Marks elements and collections as enhanced through a hidden slot. The
//! marker is defined locked (non-enumerable, non-configurable, read-only).
//! Sealed targets refuse the definition, so the marker falls back to a
//! plain write; frozen targets refuse both.

use fos_dom::{ArrayLike, Element, ElementArray, HtmlCollection, NodeList, SlotAttrs, SlotError};

/// Anything that can carry a hidden marker slot
pub trait Markable {
    fn read_slot(&self, key: &str) -> Option<bool>;
    fn define_slot(&self, key: &str, attrs: SlotAttrs) -> Result<(), SlotError>;
    /// Plain write; false if it was dropped
    fn assign_slot(&self, key: &str) -> bool;
}

impl Markable for Element {
    fn read_slot(&self, key: &str) -> Option<bool> {
        self.with_slots(|s| s.get(key)).flatten()
    }

    fn define_slot(&self, key: &str, attrs: SlotAttrs) -> Result<(), SlotError> {
        self.with_slots_mut(|s| s.define(key, true, attrs))
            .unwrap_or_else(|| Err(SlotError::NotExtensible(key.to_string())))
    }

    fn assign_slot(&self, key: &str) -> bool {
        self.with_slots_mut(|s| s.assign(key, true)).unwrap_or(false)
    }
}

impl<'a> Markable for dyn ArrayLike + 'a {
    fn read_slot(&self, key: &str) -> Option<bool> {
        self.slots().borrow().get(key)
    }

    fn define_slot(&self, key: &str, attrs: SlotAttrs) -> Result<(), SlotError> {
        self.slots().borrow_mut().define(key, true, attrs)
    }

    fn assign_slot(&self, key: &str) -> bool {
        self.slots().borrow_mut().assign(key, true)
    }
}

macro_rules! markable_collection {
    ($($ty:ty),*) => {$(
        impl Markable for $ty {
            fn read_slot(&self, key: &str) -> Option<bool> {
                (self as &dyn ArrayLike).read_slot(key)
            }

            fn define_slot(&self, key: &str, attrs: SlotAttrs) -> Result<(), SlotError> {
                (self as &dyn ArrayLike).define_slot(key, attrs)
            }

            fn assign_slot(&self, key: &str) -> bool {
                (self as &dyn ArrayLike).assign_slot(key)
            }
        }
    )*};
}

markable_collection!(HtmlCollection, NodeList, ElementArray);

/// How a marker ended up recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    /// Marker was already present
    AlreadyMarked,
    /// Locked marker defined
    Defined,
    /// Definition refused; plain write used instead
    Assigned,
    /// Target refuses all writes
    Refused,
}

impl MarkOutcome {
    /// Marker is readable after the call
    pub fn is_marked(self) -> bool {
        self != Self::Refused
    }
}

/// Check the marker
pub fn is_enhanced<T: Markable + ?Sized>(target: &T, key: &str) -> bool {
    target.read_slot(key) == Some(true)
}

/// Record the marker, falling back to a plain write when definition fails
pub fn mark_enhanced<T: Markable + ?Sized>(target: &T, key: &str) -> MarkOutcome {
    if is_enhanced(target, key) {
        return MarkOutcome::AlreadyMarked;
    }
    match target.define_slot(key, SlotAttrs::LOCKED) {
        Ok(()) => MarkOutcome::Defined,
        Err(err) => {
            tracing::debug!("[Guard] Marker definition refused ({}), assigning", err);
            if target.assign_slot(key) {
                MarkOutcome::Assigned
            } else {
                MarkOutcome::Refused
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_dom::Document;

    const KEY: &str = "__test";

    #[test]
    fn test_marker_is_hidden_and_locked() {
        let doc = Document::default();
        let el = doc.create_element("div");

        assert!(!is_enhanced(&el, KEY));
        assert_eq!(mark_enhanced(&el, KEY), MarkOutcome::Defined);
        assert!(is_enhanced(&el, KEY));
        assert_eq!(mark_enhanced(&el, KEY), MarkOutcome::AlreadyMarked);

        let (count, enumerable, attrs) = el
            .with_slots(|s| (s.len(), s.enumerable_keys().count(), s.attrs(KEY)))
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(enumerable, 0);
        assert_eq!(attrs, Some(SlotAttrs::LOCKED));
    }

    #[test]
    fn test_sealed_falls_back_to_assignment() {
        let arr = ElementArray::default();
        arr.slots().borrow_mut().seal();

        assert_eq!(mark_enhanced(&arr, KEY), MarkOutcome::Assigned);
        assert!(is_enhanced(&arr, KEY));
    }

    #[test]
    fn test_frozen_refuses() {
        let arr = ElementArray::default();
        arr.slots().borrow_mut().freeze();

        let outcome = mark_enhanced(&arr, KEY);
        assert_eq!(outcome, MarkOutcome::Refused);
        assert!(!outcome.is_marked());
        assert!(!is_enhanced(&arr, KEY));
    }

    #[test]
    fn test_freed_element_cannot_be_marked() {
        let doc = Document::default();
        let el = doc.create_element("div");
        el.free().unwrap();
        assert_eq!(mark_enhanced(&el, KEY), MarkOutcome::Refused);
    }
}
