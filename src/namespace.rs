//! Namespace Resolution
//!
//! Maps an element's `(namespace URI, local name)` to a qualified class name.
//! Package namespaces (`*`, `com.acme.*`) encode the package directly and are
//! confirmed against the class schema; every other URI goes through the
//! registered component table.

use serde::Deserialize;
use std::collections::HashMap;

use crate::model::qualified_name;
use crate::options::MXML_2009_NAMESPACE;
use crate::schema::ClassResolver;

/// Primitive names the markup namespace exposes as value elements.
pub const MXML_PRIMITIVES: &[&str] = &["String", "Boolean", "Number", "int", "uint", "Object", "Array"];

/// Extracts the package a namespace URI encodes, if it encodes one.
///
/// `*` is the top-level package, `com.acme.*` is `com.acme`.
pub fn parse_package_from_namespace(uri: &str) -> Option<&str> {
    if uri == "*" {
        return Some("");
    }
    let package = uri.strip_suffix(".*")?;
    let is_package = !package.is_empty()
        && package.split('.').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        });
    if is_package {
        Some(package)
    } else {
        None
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPONENT REGISTRY
// ═══════════════════════════════════════════════════════════════════════════════

/// Registered `(URI, local name) -> qualified name` table for shorthand
/// component namespaces.
#[derive(Debug, Clone, Default)]
pub struct NamespaceRegistry {
    components: HashMap<String, HashMap<String, String>>,
}

impl NamespaceRegistry {
    pub fn new() -> Self {
        NamespaceRegistry::default()
    }

    /// A registry with the markup namespace's primitive value types.
    pub fn with_defaults() -> Self {
        let mut registry = NamespaceRegistry::new();
        for primitive in MXML_PRIMITIVES {
            registry.register(MXML_2009_NAMESPACE, primitive, primitive);
        }
        registry
    }

    /// Loads `{ "uri": { "LocalName": "qualified.Name" } }` on top of the
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        #[serde(transparent)]
        struct Table(HashMap<String, HashMap<String, String>>);

        let Table(table) = serde_json::from_str(json)?;
        let mut registry = NamespaceRegistry::with_defaults();
        for (uri, components) in table {
            for (local_name, class_name) in components {
                registry.register(&uri, &local_name, &class_name);
            }
        }
        Ok(registry)
    }

    pub fn register(&mut self, uri: &str, local_name: &str, class_name: &str) {
        self.components
            .entry(uri.to_string())
            .or_default()
            .insert(local_name.to_string(), class_name.to_string());
    }

    pub fn with_component(mut self, uri: &str, local_name: &str, class_name: &str) -> Self {
        self.register(uri, local_name, class_name);
        self
    }

    pub fn get_class_name(&self, uri: &str, local_name: &str) -> Option<&str> {
        self.components
            .get(uri)
            .and_then(|components| components.get(local_name))
            .map(String::as_str)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESOLVER
// ═══════════════════════════════════════════════════════════════════════════════

pub struct NamespaceResolver<'a, R: ?Sized> {
    registry: &'a NamespaceRegistry,
    classes: &'a R,
}

impl<'a, R: ClassResolver + ?Sized> NamespaceResolver<'a, R> {
    pub fn new(registry: &'a NamespaceRegistry, classes: &'a R) -> Self {
        NamespaceResolver { registry, classes }
    }

    pub fn resolve(&self, uri: &str, local_name: &str) -> Option<String> {
        match parse_package_from_namespace(uri) {
            Some(package) => {
                let qname = qualified_name(package, local_name);
                self.classes.resolve_class(&qname).map(|_| qname)
            }
            None => self
                .registry
                .get_class_name(uri, local_name)
                .map(str::to_string),
        }
    }
}
