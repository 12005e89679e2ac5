//! Enhancer context
//!
//! Holds everything the enhancement layer shares: configuration, the
//! directive registry, an optional delegate, statistics and the lookup
//! cache. Cloning is cheap and clones share state.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use fos_dom::{ArrayLike, Document, Element, NodeRef};
use serde::Serialize;

use crate::directives::{Directive, DirectiveContext, DirectiveRegistry};
use crate::guard::{is_enhanced, mark_enhanced, Markable};
use crate::intercept::{Accessor, Intercepted};
use crate::lookup::{Collections, Elements, QueryCache, Selector};
use crate::{
    Config, EnhancedCollection, EnhancedElement, NativeUpdate, UpdateDelegate, UpdateError, UpdateReport, Value,
};

/// Enhancement statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnhanceStats {
    pub elements_enhanced: usize,
    pub collections_enhanced: usize,
    pub updates_applied: usize,
    pub warnings: usize,
}

struct Inner {
    config: Config,
    directives: RefCell<DirectiveRegistry>,
    delegate: Option<Rc<dyn UpdateDelegate>>,
    stats: Cell<EnhanceStats>,
    queries: RefCell<QueryCache>,
}

/// Shared enhancement context
#[derive(Clone)]
pub struct Enhancer {
    inner: Rc<Inner>,
}

impl Enhancer {
    pub fn new(config: Config) -> Self {
        Self::build(config, None)
    }

    /// Enhancer that offers every element and directive to `delegate` first
    pub fn with_delegate(config: Config, delegate: Rc<dyn UpdateDelegate>) -> Self {
        Self::build(config, Some(delegate))
    }

    fn build(config: Config, delegate: Option<Rc<dyn UpdateDelegate>>) -> Self {
        let queries = QueryCache::new(config.max_cached_queries);
        Self {
            inner: Rc::new(Inner {
                config,
                directives: RefCell::new(DirectiveRegistry::with_builtins()),
                delegate,
                stats: Cell::new(EnhanceStats::default()),
                queries: RefCell::new(queries),
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Add or replace a directive. Returns the one it replaced.
    pub fn register_directive(
        &self,
        name: &str,
        handler: impl Fn(&DirectiveContext<'_>, &Value) -> Result<(), UpdateError> + 'static,
    ) -> Option<Directive> {
        self.inner.directives.borrow_mut().register(name, handler)
    }

    pub fn unregister_directive(&self, name: &str) -> Option<Directive> {
        self.inner.directives.borrow_mut().unregister(name)
    }

    pub(crate) fn directive(&self, name: &str) -> Option<Directive> {
        self.inner.directives.borrow().get(name)
    }

    pub(crate) fn delegate(&self) -> Option<&Rc<dyn UpdateDelegate>> {
        self.inner.delegate.as_ref()
    }

    /// Enhance an element. `None` once its node has been released.
    ///
    /// Marked elements are returned as they are. An element with its own
    /// `NativeUpdate` is wrapped but left unmarked, and its updates go to
    /// that method; otherwise the delegate is offered the element before
    /// the marker is set.
    pub fn enhance_element(&self, element: &Element) -> Option<EnhancedElement> {
        if !element.is_live() {
            return None;
        }
        let key = self.marker_key();
        if !is_enhanced(element, key) {
            if NativeUpdate::of(element).is_some() {
                tracing::debug!("[Element] {:?} has its own update, leaving it", element);
            } else {
                if let Some(delegate) = self.delegate() {
                    if delegate.enhance(element) {
                        tracing::debug!("[Element] Delegate attached to {:?}", element);
                    }
                }
                if mark_enhanced(element, key).is_marked() {
                    self.bump(|s| s.elements_enhanced += 1);
                }
            }
        }
        Some(EnhancedElement::new(element.clone(), self.clone()))
    }

    /// Enhance a node if it is an element
    pub fn enhance_node(&self, node: &NodeRef) -> Option<EnhancedElement> {
        self.enhance_element(&node.as_element()?)
    }

    pub fn enhance_collection<C: ArrayLike + 'static>(&self, collection: C) -> EnhancedCollection {
        self.enhance_shared(Rc::new(collection))
    }

    /// Enhance a collection that is already shared.
    ///
    /// An enhanced collection comes back as the same wrapper. Otherwise the
    /// source collection is marked when it accepts the marker, and the
    /// returned wrapper carries its own marker, so it reports enhanced even
    /// when the source is frozen.
    pub fn enhance_shared(&self, raw: Rc<dyn ArrayLike>) -> EnhancedCollection {
        let key = self.marker_key();
        let existing = raw
            .as_any()
            .and_then(|any| any.downcast_ref::<EnhancedCollection>())
            .filter(|coll| is_enhanced(*coll, key));
        if let Some(existing) = existing {
            return existing.clone();
        }
        if !is_enhanced(&*raw, key) {
            let outcome = mark_enhanced(&*raw, key);
            if !outcome.is_marked() {
                tracing::debug!("[Collection] Source collection refuses the marker");
            }
            self.bump(|s| s.collections_enhanced += 1);
        }
        let enhanced = EnhancedCollection::new(raw, self.clone());
        mark_enhanced(&enhanced, key);
        enhanced
    }

    pub fn is_enhanced<T: Markable + ?Sized>(&self, target: &T) -> bool {
        is_enhanced(target, self.marker_key())
    }

    /// Wrap an accessor so its elements and collections come back enhanced
    pub fn intercept(&self, accessor: Rc<dyn Accessor>) -> Intercepted {
        Intercepted::new(accessor, self.clone())
    }

    /// Elements by id
    pub fn elements(&self, doc: &Document) -> Elements {
        Elements::new(doc.clone(), self.clone())
    }

    /// Live collections by class, tag or name
    pub fn collections(&self, doc: &Document) -> Collections {
        Collections::new(doc.clone(), self.clone())
    }

    /// CSS selector queries
    pub fn selector(&self, doc: &Document) -> Selector {
        Selector::new(doc.clone(), self.clone())
    }

    pub fn stats(&self) -> EnhanceStats {
        self.inner.stats.get()
    }

    pub(crate) fn queries(&self) -> RefMut<'_, QueryCache> {
        self.inner.queries.borrow_mut()
    }

    pub fn query_cache(&self) -> Ref<'_, QueryCache> {
        self.inner.queries.borrow()
    }

    pub(crate) fn record(&self, report: &UpdateReport) {
        self.bump(|s| {
            s.updates_applied += report.applied;
            s.warnings += report.warning_count();
        });
    }

    /// Clear statistics and cached lookups
    pub fn reset(&self) {
        self.inner.stats.set(EnhanceStats::default());
        self.inner.queries.borrow_mut().clear();
        tracing::debug!("Enhancer reset");
    }

    fn marker_key(&self) -> &str {
        &self.inner.config.marker_key
    }

    fn bump(&self, f: impl FnOnce(&mut EnhanceStats)) {
        let mut stats = self.inner.stats.get();
        f(&mut stats);
        self.inner.stats.set(stats);
    }
}

impl Default for Enhancer {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl fmt::Debug for Enhancer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Enhancer")
            .field("config", &self.inner.config)
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_dom::ElementArray;
    use std::cell::Cell;

    #[test]
    fn test_enhance_is_idempotent() {
        let doc = Document::default();
        let el = doc.create_element("div");
        let enhancer = Enhancer::default();

        let a = enhancer.enhance_element(&el).unwrap();
        let b = enhancer.enhance_element(&a).unwrap();
        assert_eq!(a, b);
        assert!(enhancer.is_enhanced(&el));
        assert_eq!(enhancer.stats().elements_enhanced, 1);
        assert_eq!(el.with_slots(|s| s.len()), Some(1));
    }

    #[test]
    fn test_non_elements_pass_through() {
        let doc = Document::default();
        let text = doc.create_text_node("x");
        let el = doc.create_element("p");
        el.free().unwrap();

        let enhancer = Enhancer::default();
        assert!(enhancer.enhance_node(&text).is_none());
        assert!(enhancer.enhance_element(&el).is_none());
    }

    #[test]
    fn test_native_update_hook_left_alone() {
        let doc = Document::default();
        let el = doc.create_element("div");
        NativeUpdate::new(|_, _| UpdateReport::new()).install(&el).unwrap();
        let delegate = Rc::new(Claiming(Cell::new(0)));

        let enhancer = Enhancer::with_delegate(Config::default(), delegate.clone());
        assert!(enhancer.enhance_element(&el).is_some());
        assert!(!enhancer.is_enhanced(&el));
        assert_eq!(enhancer.stats().elements_enhanced, 0);
        assert_eq!(delegate.0.get(), 0);
    }

    struct Claiming(Cell<u32>);

    impl UpdateDelegate for Claiming {
        fn enhance(&self, _element: &Element) -> bool {
            self.0.set(self.0.get() + 1);
            true
        }

        fn apply(&self, _: &Element, _: &str, _: &crate::Value) -> Option<Result<(), crate::UpdateError>> {
            None
        }
    }

    #[test]
    fn test_delegate_offered_once() {
        let doc = Document::default();
        let el = doc.create_element("div");
        let delegate = Rc::new(Claiming(Cell::new(0)));
        let enhancer = Enhancer::with_delegate(Config::default(), delegate.clone());

        enhancer.enhance_element(&el);
        enhancer.enhance_element(&el);
        assert_eq!(delegate.0.get(), 1);
    }

    #[test]
    fn test_frozen_collection_still_reports_enhanced() {
        let arr = ElementArray::default();
        arr.slots().borrow_mut().freeze();
        let shared: Rc<dyn ArrayLike> = Rc::new(arr);

        let enhancer = Enhancer::default();
        let coll = enhancer.enhance_shared(shared.clone());
        assert!(!enhancer.is_enhanced(&*shared));
        assert!(enhancer.is_enhanced(&coll));
        assert_eq!(enhancer.stats().collections_enhanced, 1);
    }

    #[test]
    fn test_enhanced_collection_comes_back_unchanged() {
        let doc = Document::default();
        doc.body().append_child(&doc.create_element("li")).unwrap();
        let enhancer = Enhancer::default();

        let first = enhancer.enhance_collection(doc.get_elements_by_tag_name("li"));
        let again = enhancer.enhance_collection(first.clone());
        let shared = enhancer.enhance_shared(Rc::new(again.clone()));

        assert!(again.ptr_eq(&first));
        assert!(shared.ptr_eq(&first));
        assert_eq!(enhancer.stats().collections_enhanced, 1);
    }

    #[test]
    fn test_reset_clears_stats() {
        let doc = Document::default();
        let enhancer = Enhancer::default();
        enhancer.enhance_element(&doc.create_element("div"));
        enhancer.reset();
        assert_eq!(enhancer.stats(), EnhanceStats::default());
    }
}
