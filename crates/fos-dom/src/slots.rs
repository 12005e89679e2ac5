//! Hidden Slots
//!
//! Per-object property store used for host-side bookkeeping flags (the
//! equivalent of script expando properties). Entries carry descriptor
//! attributes, and the store as a whole carries an integrity level.
//!
//! Integrity levels:
//! - `Extensible`: anything goes
//! - `Sealed`: no new properties may be *defined* with explicit attributes,
//!   but plain writes are still recorded as ordinary enumerable entries
//! - `Frozen`: no definitions and no writes

/// Object integrity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Integrity {
    #[default]
    Extensible,
    Sealed,
    Frozen,
}

/// Property descriptor attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotAttrs {
    pub enumerable: bool,
    pub configurable: bool,
    pub writable: bool,
}

impl SlotAttrs {
    /// Attributes of a plain assignment
    pub const PLAIN: SlotAttrs = SlotAttrs {
        enumerable: true,
        configurable: true,
        writable: true,
    };

    /// Invisible and immutable once defined
    pub const LOCKED: SlotAttrs = SlotAttrs {
        enumerable: false,
        configurable: false,
        writable: false,
    };
}

/// Property definition failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    #[error("cannot define property '{0}': object is not extensible")]
    NotExtensible(String),

    #[error("cannot redefine non-configurable property '{0}'")]
    NotConfigurable(String),
}

#[derive(Debug, Clone)]
struct SlotEntry {
    name: String,
    value: bool,
    attrs: SlotAttrs,
}

/// Hidden slot storage
#[derive(Debug, Clone, Default)]
pub struct HiddenSlots {
    entries: Vec<SlotEntry>,
    integrity: Integrity,
}

impl HiddenSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a property with explicit attributes
    pub fn define(&mut self, name: &str, value: bool, attrs: SlotAttrs) -> Result<(), SlotError> {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) {
            if !entry.attrs.configurable {
                // Redefining with identical state is allowed
                if entry.value == value && entry.attrs == attrs {
                    return Ok(());
                }
                return Err(SlotError::NotConfigurable(name.to_string()));
            }
            if self.integrity == Integrity::Frozen {
                return Err(SlotError::NotConfigurable(name.to_string()));
            }
            entry.value = value;
            entry.attrs = attrs;
            return Ok(());
        }

        if self.integrity != Integrity::Extensible {
            return Err(SlotError::NotExtensible(name.to_string()));
        }
        self.entries.push(SlotEntry {
            name: name.to_string(),
            value,
            attrs,
        });
        Ok(())
    }

    /// Plain write. Returns false when the write was silently dropped.
    pub fn assign(&mut self, name: &str, value: bool) -> bool {
        if self.integrity == Integrity::Frozen {
            return false;
        }
        if let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) {
            if !entry.attrs.writable {
                return entry.value == value;
            }
            entry.value = value;
            return true;
        }
        self.entries.push(SlotEntry {
            name: name.to_string(),
            value,
            attrs: SlotAttrs::PLAIN,
        });
        true
    }

    /// Read a slot value
    pub fn get(&self, name: &str) -> Option<bool> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.value)
    }

    /// Read a slot's attributes
    pub fn attrs(&self, name: &str) -> Option<SlotAttrs> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.attrs)
    }

    /// Keys visible to enumeration (copying, serialization)
    pub fn enumerable_keys(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| e.attrs.enumerable)
            .map(|e| e.name.as_str())
    }

    /// Number of slots, hidden ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn integrity(&self) -> Integrity {
        self.integrity
    }

    pub fn seal(&mut self) {
        if self.integrity == Integrity::Extensible {
            self.integrity = Integrity::Sealed;
        }
    }

    pub fn freeze(&mut self) {
        self.integrity = Integrity::Frozen;
    }
}
