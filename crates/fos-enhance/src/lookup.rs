//! Lookup accessors
//!
//! Shortcut accessors over a document: elements by id, live collections by
//! class/tag/name, and CSS selector queries. Each one has its own `update`
//! convention that the interception layer can hand selector-style keys to.
//!
//! Id and selector results are memoised in a `QueryCache` that is checked
//! against the document generation on every hit.

use std::rc::Rc;

use fos_dom::{ArrayLike, Document, Generation, HtmlCollection, NodeId, NodeList, WeakDocument};
use indexmap::IndexMap;

use crate::intercept::{Accessor, Lookup};
use crate::{AccessError, Enhancer, UpdateReport, Updates};

/// Query flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    ById,
    Selector,
}

/// Cache key for lookups
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub kind: QueryKind,
    pub query: String,
}

impl QueryKey {
    pub fn new(kind: QueryKind, query: &str) -> Self {
        Self {
            kind,
            query: query.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct CachedResult {
    doc: WeakDocument,
    generation: Generation,
    ids: Vec<NodeId>,
}

impl CachedResult {
    fn is_valid_for(&self, doc: &Document) -> bool {
        self.doc.is(doc) && self.generation == doc.generation()
    }

    fn is_stale(&self) -> bool {
        match self.doc.upgrade() {
            Some(doc) => self.generation != doc.generation(),
            None => true,
        }
    }
}

/// Lookup result cache with generation validation
#[derive(Debug)]
pub struct QueryCache {
    entries: IndexMap<QueryKey, CachedResult>,
    max_entries: usize,
    hits: u64,
    misses: u64,
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

impl QueryCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: IndexMap::new(),
            max_entries,
            hits: 0,
            misses: 0,
        }
    }

    /// Cached ids, if still valid for `doc`
    pub fn get(&mut self, doc: &Document, key: &QueryKey) -> Option<Vec<NodeId>> {
        match self.entries.get(key) {
            Some(cached) if cached.is_valid_for(doc) => {
                self.hits += 1;
                Some(cached.ids.clone())
            }
            _ => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn set(&mut self, doc: &Document, key: QueryKey, ids: Vec<NodeId>) {
        if self.max_entries == 0 {
            return;
        }
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.evict();
        }
        self.entries.insert(
            key,
            CachedResult {
                doc: doc.downgrade(),
                generation: doc.generation(),
                ids,
            },
        );
    }

    /// Drop stale entries, then the oldest if still full
    fn evict(&mut self) {
        self.entries.retain(|_, v| !v.is_stale());
        if self.entries.len() >= self.max_entries {
            self.entries.shift_remove_index(0);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}

fn cached_ids(
    enhancer: &Enhancer,
    doc: &Document,
    key: QueryKey,
    run: impl FnOnce() -> Result<Vec<NodeId>, AccessError>,
) -> Result<Vec<NodeId>, AccessError> {
    if let Some(ids) = enhancer.queries().get(doc, &key) {
        return Ok(ids);
    }
    let ids = run()?;
    enhancer.queries().set(doc, key, ids.clone());
    Ok(ids)
}

/// Elements by id, property-style (`elements.get("main")`)
pub struct Elements {
    doc: Document,
    enhancer: Enhancer,
}

impl Elements {
    pub fn new(doc: Document, enhancer: Enhancer) -> Self {
        Self { doc, enhancer }
    }

    fn lookup(&self, id: &str) -> Option<fos_dom::Element> {
        let ids = cached_ids(&self.enhancer, &self.doc, QueryKey::new(QueryKind::ById, id), || {
            Ok(self.doc.get_element_by_id(id).map(|el| el.node_id()).into_iter().collect())
        })
        .ok()?;
        ids.first().and_then(|&id| self.doc.element(id))
    }
}

impl Accessor for Elements {
    fn name(&self) -> &str {
        "elements"
    }

    fn get(&self, key: &str) -> Lookup {
        self.lookup(key).map_or(Lookup::Missing, Lookup::Element)
    }

    fn has_native_update(&self) -> bool {
        true
    }

    /// Keys are element ids
    fn native_update(&self, updates: &Updates) -> Result<UpdateReport, AccessError> {
        let mut report = UpdateReport::new();
        for (id, value) in updates.string_entries() {
            match self.lookup(id).and_then(|el| self.enhancer.enhance_element(&el)) {
                Some(el) => report.absorb(el.update_with_report(value.clone())),
                None => {
                    tracing::warn!("[Lookup] No element with id '{}'", id);
                    report.warn(Some(id), format!("no element with id '{id}'"));
                }
            }
        }
        Ok(report)
    }
}

/// Live collections. Keys are `class:`, `tag:` or `name:` prefixed; a bare
/// key is a class list.
pub struct Collections {
    doc: Document,
    enhancer: Enhancer,
}

impl Collections {
    pub fn new(doc: Document, enhancer: Enhancer) -> Self {
        Self { doc, enhancer }
    }

    pub fn by_class_name(&self, names: &str) -> HtmlCollection {
        self.doc.get_elements_by_class_name(names)
    }

    pub fn by_tag_name(&self, tag: &str) -> HtmlCollection {
        self.doc.get_elements_by_tag_name(tag)
    }

    pub fn by_name(&self, name: &str) -> NodeList {
        self.doc.get_elements_by_name(name)
    }

    fn collection(&self, key: &str) -> Rc<dyn ArrayLike> {
        match key.split_once(':') {
            Some(("tag", tag)) => Rc::new(self.by_tag_name(tag)),
            Some(("name", name)) => Rc::new(self.by_name(name)),
            Some(("class", names)) => Rc::new(self.by_class_name(names)),
            _ => Rc::new(self.by_class_name(key)),
        }
    }
}

impl Accessor for Collections {
    fn name(&self) -> &str {
        "collections"
    }

    fn get(&self, key: &str) -> Lookup {
        Lookup::Collection(self.collection(key))
    }

    fn call(&self, args: &[&str]) -> Result<Lookup, AccessError> {
        let key = args
            .first()
            .ok_or_else(|| AccessError::MissingArgument(self.name().to_string()))?;
        Ok(self.get(key))
    }

    fn has_native_update(&self) -> bool {
        true
    }

    /// Each value is applied to the whole collection its key names
    fn native_update(&self, updates: &Updates) -> Result<UpdateReport, AccessError> {
        let mut report = UpdateReport::new();
        for (key, value) in updates.string_entries() {
            let collection = self.enhancer.enhance_shared(self.collection(key));
            report.absorb(collection.update_with_report(value.clone()));
        }
        Ok(report)
    }
}

/// CSS selector queries: property-style access returns every match,
/// call-style returns the first.
pub struct Selector {
    doc: Document,
    enhancer: Enhancer,
}

impl Selector {
    pub fn new(doc: Document, enhancer: Enhancer) -> Self {
        Self { doc, enhancer }
    }

    pub fn query(&self, selector: &str) -> Result<Option<fos_dom::Element>, AccessError> {
        Ok(self.query_all(selector)?.get(0).and_then(|node| node.as_element()))
    }

    pub fn query_all(&self, selector: &str) -> Result<NodeList, AccessError> {
        let key = QueryKey::new(QueryKind::Selector, selector);
        let ids = cached_ids(&self.enhancer, &self.doc, key, || {
            let list = self.doc.query_selector_all(selector)?;
            Ok(list.to_vec().iter().map(|node| node.node_id()).collect())
        })?;
        Ok(NodeList::snapshot(self.doc.clone(), ids))
    }
}

impl Accessor for Selector {
    fn name(&self) -> &str {
        "selector"
    }

    fn get(&self, key: &str) -> Lookup {
        match self.query_all(key) {
            Ok(list) => Lookup::Collection(Rc::new(list)),
            Err(err) => {
                tracing::warn!("[Lookup] Selector '{}' failed: {}", key, err);
                Lookup::Missing
            }
        }
    }

    fn call(&self, args: &[&str]) -> Result<Lookup, AccessError> {
        let selector = args
            .first()
            .ok_or_else(|| AccessError::MissingArgument(self.name().to_string()))?;
        Ok(self.query(selector)?.map_or(Lookup::Missing, Lookup::Element))
    }

    fn has_native_update(&self) -> bool {
        true
    }

    /// Keys are selectors; each value goes to every match as is
    fn native_update(&self, updates: &Updates) -> Result<UpdateReport, AccessError> {
        let mut report = UpdateReport::new();
        for (selector, value) in updates.string_entries() {
            let matches = match self.query_all(selector) {
                Ok(list) => list,
                Err(err) => {
                    tracing::warn!("[Lookup] Selector '{}' failed: {}", selector, err);
                    report.warn(Some(selector), err.to_string());
                    continue;
                }
            };
            for node in matches.to_vec() {
                if let Some(el) = self.enhancer.enhance_node(&node) {
                    report.absorb(el.update_with_report(value.clone()));
                }
            }
        }
        Ok(report)
    }
}
