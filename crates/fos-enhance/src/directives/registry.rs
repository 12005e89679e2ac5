//! Directive registry

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::{attributes, class_list, dataset, listeners, style, DirectiveContext};
use crate::{UpdateError, Value};

/// Directive handler
pub type Directive = Rc<dyn Fn(&DirectiveContext<'_>, &Value) -> Result<(), UpdateError>>;

/// Directive name to handler
#[derive(Clone, Default)]
pub struct DirectiveRegistry {
    handlers: HashMap<String, Directive>,
}

impl DirectiveRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in directives
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("style", style::apply);
        registry.register("classList", class_list::apply);
        registry.register("dataset", dataset::apply);
        registry.register("setAttribute", attributes::set);
        registry.register("removeAttribute", attributes::remove);
        registry.register("addEventListener", listeners::add);
        registry.register("removeEventListener", listeners::remove);
        registry
    }

    /// Add or replace a directive
    pub fn register(
        &mut self,
        name: &str,
        handler: impl Fn(&DirectiveContext<'_>, &Value) -> Result<(), UpdateError> + 'static,
    ) -> Option<Directive> {
        self.handlers.insert(name.to_string(), Rc::new(handler))
    }

    pub fn unregister(&mut self, name: &str) -> Option<Directive> {
        self.handlers.remove(name)
    }

    /// Handler for `name`, cloned out so no registry borrow outlives the call
    pub fn get(&self, name: &str) -> Option<Directive> {
        self.handlers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for DirectiveRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("DirectiveRegistry").field("names", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins() {
        let registry = DirectiveRegistry::with_builtins();
        for name in ["style", "classList", "dataset", "setAttribute", "removeAttribute", "addEventListener", "removeEventListener"] {
            assert!(registry.contains(name), "missing {name}");
        }
        assert_eq!(registry.len(), 7);
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = DirectiveRegistry::with_builtins();
        assert!(registry.register("style", |_, _| Ok(())).is_some());
        assert!(registry.register("tooltip", |_, _| Ok(())).is_none());
        assert!(registry.unregister("tooltip").is_some());
        assert_eq!(registry.len(), 7);
    }
}
