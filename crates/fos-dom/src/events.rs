//! DOM Events
//!
//! Event objects, handler identity and per-element listener storage.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::Element;

/// Event callback.
///
/// Identity is the allocation: two clones of the same handler are equal,
/// two handlers built from identical closures are not.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&Event)>);

impl EventHandler {
    pub fn new(f: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, event: &Event) {
        (self.0)(event)
    }

    /// Reference equality
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

/// Listener options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    pub capture: bool,
    pub passive: bool,
    pub once: bool,
}

/// DOM event
pub struct Event {
    event_type: String,
    bubbles: bool,
    cancelable: bool,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
    target: RefCell<Option<Element>>,
    current_target: RefCell<Option<Element>>,
}

impl Event {
    /// Create a bubbling, non-cancelable event
    pub fn new(event_type: &str) -> Self {
        Self {
            event_type: event_type.to_string(),
            bubbles: true,
            cancelable: false,
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
            target: RefCell::new(None),
            current_target: RefCell::new(None),
        }
    }

    /// Create a non-bubbling event (focus, blur)
    pub fn non_bubbling(event_type: &str) -> Self {
        Self {
            bubbles: false,
            ..Self::new(event_type)
        }
    }

    /// Create a bubbling, cancelable event (click, submit)
    pub fn cancelable(event_type: &str) -> Self {
        Self {
            cancelable: true,
            ..Self::new(event_type)
        }
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    pub fn target(&self) -> Option<Element> {
        self.target.borrow().clone()
    }

    pub fn current_target(&self) -> Option<Element> {
        self.current_target.borrow().clone()
    }

    /// Prevent default action
    pub fn prevent_default(&self) {
        if self.cancelable {
            self.default_prevented.set(true);
        }
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    /// Stop propagation
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }

    pub(crate) fn set_target(&self, target: &Element) {
        *self.target.borrow_mut() = Some(target.clone());
    }

    pub(crate) fn set_current_target(&self, current: Option<&Element>) {
        *self.current_target.borrow_mut() = current.cloned();
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("type", &self.event_type)
            .field("bubbles", &self.bubbles)
            .field("cancelable", &self.cancelable)
            .field("default_prevented", &self.default_prevented.get())
            .finish()
    }
}

#[derive(Debug, Clone)]
struct Listener {
    event_type: String,
    handler: EventHandler,
    options: ListenerOptions,
}

/// Listeners registered on one element
#[derive(Debug, Clone, Default)]
pub struct EventListenerList {
    listeners: Vec<Listener>,
}

impl EventListenerList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener. Returns false when the same (type, handler, capture)
    /// triple is already registered.
    pub fn add(&mut self, event_type: &str, handler: EventHandler, options: ListenerOptions) -> bool {
        let duplicate = self.listeners.iter().any(|l| {
            l.event_type == event_type && l.handler.ptr_eq(&handler) && l.options.capture == options.capture
        });
        if duplicate {
            return false;
        }
        self.listeners.push(Listener {
            event_type: event_type.to_string(),
            handler,
            options,
        });
        true
    }

    /// Remove a listener. Returns whether one was removed.
    pub fn remove(&mut self, event_type: &str, handler: &EventHandler, capture: bool) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| {
            !(l.event_type == event_type && l.handler.ptr_eq(handler) && l.options.capture == capture)
        });
        self.listeners.len() < before
    }

    /// Handlers for a type in registration order; `once` listeners are
    /// removed as they are taken.
    pub fn take_for_dispatch(&mut self, event_type: &str) -> Vec<EventHandler> {
        let handlers = self
            .listeners
            .iter()
            .filter(|l| l.event_type == event_type)
            .map(|l| l.handler.clone())
            .collect();
        self.listeners
            .retain(|l| !(l.event_type == event_type && l.options.once));
        handlers
    }

    /// Number of listeners for a type
    pub fn count(&self, event_type: &str) -> usize {
        self.listeners
            .iter()
            .filter(|l| l.event_type == event_type)
            .count()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_identity() {
        let a = EventHandler::new(|_| {});
        let b = a.clone();
        let c = EventHandler::new(|_| {});

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_listener_dedup() {
        let mut list = EventListenerList::new();
        let handler = EventHandler::new(|_| {});

        assert!(list.add("click", handler.clone(), ListenerOptions::default()));
        assert!(!list.add("click", handler.clone(), ListenerOptions::default()));
        // Capture phase is a distinct registration
        let capture = ListenerOptions {
            capture: true,
            ..Default::default()
        };
        assert!(list.add("click", handler.clone(), capture));
        assert_eq!(list.count("click"), 2);

        assert!(list.remove("click", &handler, false));
        assert!(!list.remove("click", &handler, false));
        assert_eq!(list.count("click"), 1);
    }

    #[test]
    fn test_once_listeners_are_consumed() {
        let mut list = EventListenerList::new();
        let once = ListenerOptions {
            once: true,
            ..Default::default()
        };
        list.add("load", EventHandler::new(|_| {}), once);

        assert_eq!(list.take_for_dispatch("load").len(), 1);
        assert_eq!(list.take_for_dispatch("load").len(), 0);
    }

    #[test]
    fn test_prevent_default_requires_cancelable() {
        let plain = Event::new("input");
        plain.prevent_default();
        assert!(!plain.is_default_prevented());

        let click = Event::cancelable("click");
        click.prevent_default();
        assert!(click.is_default_prevented());
    }
}
