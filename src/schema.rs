//! Class Schema Resolution
//!
//! The synthesizer never inspects source declarations itself. It asks a
//! [`ClassResolver`] for the shape of a qualified class name and walks the
//! inheritance chain as a linearized sequence of those answers.

use serde::Deserialize;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::model::ClassModel;

// ═══════════════════════════════════════════════════════════════════════════════
// RESOLVER TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Answers "what does class `qualified_name` look like?" or `None` for an
/// unknown class.
pub trait ClassResolver {
    fn resolve_class(&self, qualified_name: &str) -> Option<Rc<ClassModel>>;
}

impl<R: ClassResolver + ?Sized> ClassResolver for &R {
    fn resolve_class(&self, qualified_name: &str) -> Option<Rc<ClassModel>> {
        (**self).resolve_class(qualified_name)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// IN-MEMORY SCHEMA
// ═══════════════════════════════════════════════════════════════════════════════

/// Class declarations keyed by qualified name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    classes: HashMap<String, Rc<ClassModel>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        SchemaRegistry::default()
    }

    /// Loads `{ "qualified.Name": ClassModel, ... }`. A class without an
    /// explicit `name` takes the simple name from its key.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        #[serde(transparent)]
        struct Classes(HashMap<String, ClassModel>);

        let Classes(classes) = serde_json::from_str(json)?;
        let mut registry = SchemaRegistry::new();
        for (qualified_name, class) in classes {
            registry.insert(&qualified_name, class);
        }
        Ok(registry)
    }

    pub fn insert(&mut self, qualified_name: &str, mut class: ClassModel) {
        if class.name.is_empty() {
            class.name = crate::model::class_name(qualified_name).to_string();
        }
        self.classes.insert(qualified_name.to_string(), Rc::new(class));
    }

    pub fn with_class(mut self, qualified_name: &str, class: ClassModel) -> Self {
        self.insert(qualified_name, class);
        self
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl ClassResolver for SchemaRegistry {
    fn resolve_class(&self, qualified_name: &str) -> Option<Rc<ClassModel>> {
        self.classes.get(qualified_name).cloned()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MEMOIZATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Memoizes another resolver by qualified name, including negative answers.
/// Chain walks re-resolve the same classes many times during one pass.
pub struct CachingResolver<R> {
    inner: R,
    cache: RefCell<HashMap<String, Option<Rc<ClassModel>>>>,
}

impl<R: ClassResolver> CachingResolver<R> {
    pub fn new(inner: R) -> Self {
        CachingResolver {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: ClassResolver> ClassResolver for CachingResolver<R> {
    fn resolve_class(&self, qualified_name: &str) -> Option<Rc<ClassModel>> {
        if let Some(hit) = self.cache.borrow().get(qualified_name) {
            return hit.clone();
        }
        let resolved = self.inner.resolve_class(qualified_name);
        tracing::trace!(
            class = qualified_name,
            found = resolved.is_some(),
            "schema cache miss"
        );
        self.cache
            .borrow_mut()
            .insert(qualified_name.to_string(), resolved.clone());
        resolved
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// INHERITANCE CHAIN
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// The named class (the start, or a declared superclass) is unknown.
    Missing(String),
    /// Following superclasses revisited the named class.
    Cycle(String),
}

/// The linearized supertype sequence of `qualified_name`, most-derived first.
pub fn class_chain<R: ClassResolver + ?Sized>(
    resolver: &R,
    qualified_name: &str,
) -> Result<Vec<Rc<ClassModel>>, ChainError> {
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    let mut current = Some(qualified_name.to_string());

    while let Some(name) = current {
        if !seen.insert(name.clone()) {
            return Err(ChainError::Cycle(name));
        }
        let class = resolver
            .resolve_class(&name)
            .ok_or_else(|| ChainError::Missing(name.clone()))?;
        current = class.superclass.clone();
        chain.push(class);
    }

    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn class(superclass: Option<&str>) -> ClassModel {
        ClassModel {
            superclass: superclass.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_chain_is_most_derived_first() {
        let registry = SchemaRegistry::new()
            .with_class("ext.Component", class(None))
            .with_class("ext.Container", class(Some("ext.Component")))
            .with_class("ext.Panel", class(Some("ext.Container")));

        let chain = class_chain(&registry, "ext.Panel").unwrap();
        let names: Vec<&str> = chain.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Panel", "Container", "Component"]);
    }

    #[test]
    fn test_chain_reports_missing_superclass() {
        let registry = SchemaRegistry::new().with_class("ext.Panel", class(Some("ext.Gone")));
        assert_eq!(
            class_chain(&registry, "ext.Panel"),
            Err(ChainError::Missing("ext.Gone".to_string()))
        );
    }

    #[test]
    fn test_chain_detects_cycles() {
        let registry = SchemaRegistry::new()
            .with_class("a.A", class(Some("a.B")))
            .with_class("a.B", class(Some("a.A")));
        assert_eq!(
            class_chain(&registry, "a.A"),
            Err(ChainError::Cycle("a.A".to_string()))
        );
    }

    struct CountingResolver {
        calls: Cell<usize>,
        registry: SchemaRegistry,
    }

    impl ClassResolver for CountingResolver {
        fn resolve_class(&self, qualified_name: &str) -> Option<Rc<ClassModel>> {
            self.calls.set(self.calls.get() + 1);
            self.registry.resolve_class(qualified_name)
        }
    }

    #[test]
    fn test_caching_resolver_memoizes_hits_and_misses() {
        let resolver = CachingResolver::new(CountingResolver {
            calls: Cell::new(0),
            registry: SchemaRegistry::new().with_class("ext.Panel", class(None)),
        });

        assert!(resolver.resolve_class("ext.Panel").is_some());
        assert!(resolver.resolve_class("ext.Panel").is_some());
        assert!(resolver.resolve_class("ext.Missing").is_none());
        assert!(resolver.resolve_class("ext.Missing").is_none());

        assert_eq!(resolver.cached_len(), 2);
        assert_eq!(resolver.into_inner().calls.get(), 2);
    }

    #[test]
    fn test_registry_from_json() {
        let registry = SchemaRegistry::from_json(
            r#"{
                "ext.Panel": {
                    "superclass": "ext.Component",
                    "dynamic": true,
                    "members": {
                        "title": { "kind": "field", "name": "title", "type": "String" }
                    }
                },
                "ext.Component": {}
            }"#,
        )
        .unwrap();

        assert_eq!(registry.len(), 2);
        let panel = registry.resolve_class("ext.Panel").unwrap();
        assert_eq!(panel.name, "Panel");
        assert!(panel.dynamic);
        assert_eq!(panel.get_member("title").unwrap().type_name(), "String");
    }
}
