//! Enhanced elements
//!
//! `EnhancedElement` is an element handle plus the enhancer that applies
//! its updates. It compares equal to the underlying `Element` and derefs to
//! it, so identity-sensitive callers see the same node.
//!
//! An element may carry its own update method (`NativeUpdate`). When it
//! does, that method receives the whole update object and neither the
//! delegate nor the built-in directives run.

use std::any::Any;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use fos_dom::{DomError, Element, SlotAttrs, SlotError};

use crate::directives::{apply_fallback, DirectiveContext};
use crate::guard::Markable;
use crate::{Enhancer, PropertyKey, UpdateError, UpdateReport, Updates, Value};

/// Expando name an element's own update method is stored under
pub const NATIVE_UPDATE_SLOT: &str = "update";

type UpdateFn = dyn Fn(&Element, &Updates) -> UpdateReport;

/// An element's own update method
#[derive(Clone)]
pub struct NativeUpdate(Rc<UpdateFn>);

impl NativeUpdate {
    pub fn new(f: impl Fn(&Element, &Updates) -> UpdateReport + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Attach to `element`, replacing any previous method
    pub fn install(&self, element: &Element) -> Result<(), DomError> {
        let hook: Rc<dyn Any> = Rc::new(self.clone());
        element.set_expando(NATIVE_UPDATE_SLOT, Some(hook))
    }

    pub fn uninstall(element: &Element) -> Result<(), DomError> {
        element.set_expando(NATIVE_UPDATE_SLOT, None)
    }

    /// Method attached to `element`, if any
    pub fn of(element: &Element) -> Option<Self> {
        element
            .expando(NATIVE_UPDATE_SLOT)
            .and_then(|hook| hook.downcast_ref::<NativeUpdate>().cloned())
    }

    pub fn call(&self, element: &Element, updates: &Updates) -> UpdateReport {
        (self.0)(element, updates)
    }
}

impl fmt::Debug for NativeUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NativeUpdate")
    }
}

/// Element with a declarative `update`
#[derive(Clone)]
pub struct EnhancedElement {
    element: Element,
    enhancer: Enhancer,
}

impl EnhancedElement {
    pub(crate) fn new(element: Element, enhancer: Enhancer) -> Self {
        Self { element, enhancer }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn into_element(self) -> Element {
        self.element
    }

    pub fn enhancer(&self) -> &Enhancer {
        &self.enhancer
    }

    /// Apply an update object. Never fails; problems are logged.
    pub fn update(&self, updates: impl Into<Value>) -> &Self {
        self.update_with_report(updates);
        self
    }

    /// Same as `update`, returning what happened
    pub fn update_with_report(&self, updates: impl Into<Value>) -> UpdateReport {
        apply_updates(&self.enhancer, &self.element, &updates.into())
    }
}

/// Apply every string-keyed entry of `updates` to `element`, isolating
/// failures per key. An element with its own update method gets the whole
/// object instead.
pub(crate) fn apply_updates(enhancer: &Enhancer, element: &Element, updates: &Value) -> UpdateReport {
    let mut report = UpdateReport::new();
    let Some(map) = updates.as_object() else {
        let message = format!("update() expects an object, got {}", updates.kind());
        tracing::warn!("[Element] {}", message);
        report.warn(None, message);
        enhancer.record(&report);
        return report;
    };

    if let Some(native) = NativeUpdate::of(element) {
        tracing::trace!("[Element] {:?} handles its own update", element);
        let report = native.call(element, map);
        enhancer.record(&report);
        return report;
    }

    let ctx = DirectiveContext::new(element, enhancer.config().fine_grained);
    for (key, value) in map.iter() {
        let PropertyKey::String(key) = key else {
            tracing::trace!("[Element] Skipping symbol key {:?}", key);
            continue;
        };
        match apply_directive(enhancer, &ctx, key, value) {
            Ok(()) => report.applied += 1,
            Err(err) => {
                tracing::warn!("[Element] Failed to apply '{}': {}", key, err);
                report.warn(Some(key), err.to_string());
            }
        }
    }

    enhancer.record(&report);
    report
}

/// Delegate first, then the directive registry, then the fallback chain
fn apply_directive(
    enhancer: &Enhancer,
    ctx: &DirectiveContext<'_>,
    key: &str,
    value: &Value,
) -> Result<(), UpdateError> {
    if let Some(result) = enhancer
        .delegate()
        .and_then(|d| d.apply(ctx.element, key, value))
    {
        return result;
    }
    match enhancer.directive(key) {
        Some(directive) => directive(ctx, value),
        None => apply_fallback(ctx, key, value),
    }
}

impl Deref for EnhancedElement {
    type Target = Element;

    fn deref(&self) -> &Element {
        &self.element
    }
}

impl PartialEq for EnhancedElement {
    fn eq(&self, other: &Self) -> bool {
        self.element == other.element
    }
}

impl PartialEq<Element> for EnhancedElement {
    fn eq(&self, other: &Element) -> bool {
        self.element == *other
    }
}

impl PartialEq<EnhancedElement> for Element {
    fn eq(&self, other: &EnhancedElement) -> bool {
        *self == other.element
    }
}

impl From<EnhancedElement> for Element {
    fn from(el: EnhancedElement) -> Self {
        el.element
    }
}

impl Markable for EnhancedElement {
    fn read_slot(&self, key: &str) -> Option<bool> {
        self.element.read_slot(key)
    }

    fn define_slot(&self, key: &str, attrs: SlotAttrs) -> Result<(), SlotError> {
        self.element.define_slot(key, attrs)
    }

    fn assign_slot(&self, key: &str) -> bool {
        self.element.assign_slot(key)
    }
}

impl fmt::Debug for EnhancedElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Enhanced({:?})", self.element)
    }
}
