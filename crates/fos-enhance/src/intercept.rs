//! Accessor interception
//!
//! An `Accessor` is a shortcut object: property-style `get`, optionally
//! call-style `call`, optionally an `update` of its own. `Intercepted`
//! wraps one so that elements and collections come back enhanced while
//! everything else passes through untouched.
//!
//! `Shortcuts` holds the named accessors and remembers the original of
//! each wrapped one so it can be restored.

use std::fmt;
use std::rc::Rc;

use fos_dom::{ArrayLike, Element, NodeRef};
use indexmap::IndexMap;

use crate::{AccessError, EnhancedCollection, EnhancedElement, Enhancer, UpdateReport, Updates, Value};

/// What an accessor hands back
#[derive(Clone)]
pub enum Lookup {
    Element(Element),
    Collection(Rc<dyn ArrayLike>),
    /// Non-element node
    Node(NodeRef),
    /// Anything else the accessor exposes
    Value(Value),
    Missing,
}

impl Lookup {
    pub fn is_missing(&self) -> bool {
        matches!(self, Lookup::Missing)
    }
}

impl From<Value> for Lookup {
    fn from(value: Value) -> Self {
        Lookup::Value(value)
    }
}

impl fmt::Debug for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::Element(el) => f.debug_tuple("Element").field(el).finish(),
            Lookup::Collection(c) => write!(f, "Collection(length: {})", c.length()),
            Lookup::Node(node) => f.debug_tuple("Node").field(node).finish(),
            Lookup::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Lookup::Missing => f.write_str("Missing"),
        }
    }
}

/// A lookup after interception
#[derive(Debug, Clone)]
pub enum Resolved {
    Element(EnhancedElement),
    Collection(EnhancedCollection),
    /// Passed through unchanged
    Raw(Lookup),
}

impl Resolved {
    pub fn as_element(&self) -> Option<&EnhancedElement> {
        match self {
            Resolved::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&EnhancedCollection> {
        match self {
            Resolved::Collection(c) => Some(c),
            _ => None,
        }
    }

    /// Back to a plain lookup, keeping the enhanced collection wrapper
    pub fn into_lookup(self) -> Lookup {
        match self {
            Resolved::Element(el) => Lookup::Element(el.into_element()),
            Resolved::Collection(c) => Lookup::Collection(Rc::new(c)),
            Resolved::Raw(lookup) => lookup,
        }
    }

    /// Apply an update to whatever was resolved
    pub fn update_with_report(&self, key: &str, updates: &Value) -> UpdateReport {
        match self {
            Resolved::Element(el) => el.update_with_report(updates.clone()),
            Resolved::Collection(c) => c.update_with_report(updates.clone()),
            Resolved::Raw(lookup) => {
                let mut report = UpdateReport::new();
                let message = if lookup.is_missing() {
                    format!("nothing found for '{key}'")
                } else {
                    format!("'{key}' is not an element or collection")
                };
                tracing::warn!("[Intercept] {}", message);
                report.warn(Some(key), message);
                report
            }
        }
    }
}

/// Shortcut accessor contract
pub trait Accessor {
    fn name(&self) -> &str;

    /// Property-style access
    fn get(&self, key: &str) -> Lookup;

    /// Call-style access
    fn call(&self, _args: &[&str]) -> Result<Lookup, AccessError> {
        Err(AccessError::NotCallable(self.name().to_string()))
    }

    /// Whether the accessor has an update convention of its own
    fn has_native_update(&self) -> bool {
        false
    }

    fn native_update(&self, _updates: &Updates) -> Result<UpdateReport, AccessError> {
        Err(AccessError::NoNativeUpdate(self.name().to_string()))
    }

    fn as_intercepted(&self) -> Option<&Intercepted> {
        None
    }
}

/// Keys that read as CSS selectors rather than index/bulk directives
pub fn looks_like_selector(key: &str) -> bool {
    key.starts_with(['#', '.', '[', '*']) || key.contains([' ', '>', '+', '~', ':', '['])
}

/// An accessor whose elements and collections come back enhanced
#[derive(Clone)]
pub struct Intercepted {
    inner: Rc<dyn Accessor>,
    enhancer: Enhancer,
}

impl Intercepted {
    /// Wrap `inner`. An accessor that is already intercepted is returned
    /// as is rather than wrapped twice.
    pub fn new(inner: Rc<dyn Accessor>, enhancer: Enhancer) -> Self {
        if let Some(existing) = inner.as_intercepted() {
            tracing::debug!("[Intercept] '{}' is already intercepted", inner.name());
            return existing.clone();
        }
        Self { inner, enhancer }
    }

    /// The wrapped accessor
    pub fn inner(&self) -> &Rc<dyn Accessor> {
        &self.inner
    }

    pub fn resolve(&self, key: &str) -> Resolved {
        self.enhance(self.inner.get(key))
    }

    pub fn invoke(&self, args: &[&str]) -> Result<Resolved, AccessError> {
        Ok(self.enhance(self.inner.call(args)?))
    }

    fn enhance(&self, lookup: Lookup) -> Resolved {
        match lookup {
            Lookup::Element(el) => self
                .enhancer
                .enhance_element(&el)
                .map_or(Resolved::Raw(Lookup::Missing), Resolved::Element),
            Lookup::Node(node) if node.is_element() => self
                .enhancer
                .enhance_node(&node)
                .map_or(Resolved::Raw(Lookup::Node(node)), Resolved::Element),
            Lookup::Collection(raw) => Resolved::Collection(self.enhancer.enhance_shared(raw)),
            other => Resolved::Raw(other),
        }
    }

    /// Update through the accessor.
    ///
    /// When every key reads as a selector and the wrapped accessor has its
    /// own update, the whole object goes to it. Otherwise each key is
    /// resolved and its value applied to the element or collection found.
    pub fn update(&self, updates: impl Into<Value>) -> UpdateReport {
        let updates = updates.into();
        let Some(map) = updates.as_object() else {
            let mut report = UpdateReport::new();
            let message = format!("update() expects an object, got {}", updates.kind());
            tracing::warn!("[Intercept] {}", message);
            report.warn(None, message);
            return report;
        };

        if self.delegates(map) {
            tracing::debug!("[Intercept] Selector keys, using '{}' update", self.inner.name());
            return match self.inner.native_update(map) {
                Ok(report) => report,
                Err(err) => {
                    let mut report = UpdateReport::new();
                    tracing::warn!("[Intercept] {}", err);
                    report.warn(None, err.to_string());
                    report
                }
            };
        }

        let mut report = UpdateReport::new();
        for (key, value) in map.string_entries() {
            report.absorb(self.resolve(key).update_with_report(key, value));
        }
        report
    }

    fn delegates(&self, map: &Updates) -> bool {
        self.enhancer.config().selector_delegation
            && self.inner.has_native_update()
            && !map.is_empty()
            && map.string_entries().all(|(key, _)| looks_like_selector(key))
    }
}

impl Accessor for Intercepted {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn get(&self, key: &str) -> Lookup {
        self.resolve(key).into_lookup()
    }

    fn call(&self, args: &[&str]) -> Result<Lookup, AccessError> {
        Ok(self.invoke(args)?.into_lookup())
    }

    fn has_native_update(&self) -> bool {
        self.inner.has_native_update()
    }

    fn native_update(&self, updates: &Updates) -> Result<UpdateReport, AccessError> {
        self.inner.native_update(updates)
    }

    fn as_intercepted(&self) -> Option<&Intercepted> {
        Some(self)
    }
}

impl fmt::Debug for Intercepted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Intercepted({})", self.inner.name())
    }
}

struct Slot {
    current: Rc<dyn Accessor>,
    original: Option<Rc<dyn Accessor>>,
}

/// Named shortcut accessors with install/restore of interception
#[derive(Default)]
pub struct Shortcuts {
    slots: IndexMap<String, Slot>,
}

impl Shortcuts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install an accessor under `name`, replacing any previous one
    pub fn register(&mut self, name: &str, accessor: Rc<dyn Accessor>) {
        self.slots.insert(
            name.to_string(),
            Slot {
                current: accessor,
                original: None,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn Accessor>> {
        self.slots.get(name).map(|slot| slot.current.clone())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    /// Property-style lookup through the accessor currently installed
    pub fn resolve(&self, name: &str, key: &str) -> Result<Resolved, AccessError> {
        let accessor = self
            .get(name)
            .ok_or_else(|| AccessError::UnknownShortcut(name.to_string()))?;
        Ok(match accessor.as_intercepted() {
            Some(intercepted) => intercepted.resolve(key),
            None => Resolved::Raw(accessor.get(key)),
        })
    }

    /// Intercept every installed accessor. Returns how many were wrapped.
    pub fn install_interception(&mut self, enhancer: &Enhancer) -> usize {
        let mut wrapped = 0;
        for (name, slot) in self.slots.iter_mut() {
            if wrap_slot(slot, enhancer) {
                tracing::debug!("[Intercept] Intercepted '{}'", name);
                wrapped += 1;
            }
        }
        wrapped
    }

    /// Intercept one accessor. `Ok(false)` if it already was.
    pub fn intercept(&mut self, name: &str, enhancer: &Enhancer) -> Result<bool, AccessError> {
        let slot = self
            .slots
            .get_mut(name)
            .ok_or_else(|| AccessError::UnknownShortcut(name.to_string()))?;
        Ok(wrap_slot(slot, enhancer))
    }

    /// Put back the accessor that was installed before interception.
    /// `Ok(false)` if there was nothing to undo.
    pub fn restore(&mut self, name: &str) -> Result<bool, AccessError> {
        let slot = self
            .slots
            .get_mut(name)
            .ok_or_else(|| AccessError::UnknownShortcut(name.to_string()))?;
        match slot.original.take() {
            Some(original) => {
                slot.current = original;
                tracing::info!("[Intercept] Restored original '{}'", name);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn restore_all(&mut self) -> usize {
        let names: Vec<String> = self.slots.keys().cloned().collect();
        names
            .iter()
            .filter(|name| matches!(self.restore(name), Ok(true)))
            .count()
    }

    pub fn is_intercepted(&self, name: &str) -> bool {
        self.slots
            .get(name)
            .is_some_and(|slot| slot.current.as_intercepted().is_some())
    }
}

fn wrap_slot(slot: &mut Slot, enhancer: &Enhancer) -> bool {
    if slot.current.as_intercepted().is_some() {
        return false;
    }
    let original = slot.current.clone();
    slot.current = Rc::new(enhancer.intercept(original.clone()));
    slot.original = Some(original);
    true
}

impl fmt::Debug for Shortcuts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.slots
                    .iter()
                    .map(|(name, slot)| (name, slot.current.as_intercepted().is_some())),
            )
            .finish()
    }
}
