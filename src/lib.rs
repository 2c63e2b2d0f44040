//! # MXML Compiler Ground Truth
//!
//! Turns a component markup document into the class model of a subclass of
//! the root element's class.
//!
//! ## Synthesis Invariants
//!
//! 1. **Superclass**: the root element names the superclass. A component never
//!    extends itself (MX-ERR-CLASS-002).
//!
//! 2. **Constructor Contract**: the constructor body is, in order:
//!    - `$bindings = [];`
//!    - config assembly, then `super(config)`, when the superclass constructor
//!      takes a config map
//!    - direct assignments, listener registrations and live bindings
//!    - `for each (var $binding in $bindings) $binding.execute();`
//!
//! 3. **Identity**: an element with `id="x"` becomes a read/write property `x`
//!    of the synthesized class.
//!
//! 4. **Resolution Order**: attribute names are looked up per inheritance level,
//!    most-derived first. At each level a property or field wins over an event.
//!    Unknown names are errors (MX-ERR-MEMBER-001) unless the class is dynamic
//!    or the attribute uses the force-dynamic namespace.
//!
//! 5. **Fail Fast**: the first error aborts the invocation and no partial model
//!    is returned.

#[cfg(feature = "napi")]
use napi_derive::napi;

mod document;
mod emit;
mod error;
mod model;
mod namespace;
mod options;
mod schema;
mod synthesize;
mod values;

#[cfg(test)]
mod synthesize_tests;

pub use document::{parse_markup, MarkupAttribute, MarkupDocument, MarkupElement};
pub use emit::{render_statements, CodeEmitter, Expr, Statement};
pub use error::*;
pub use model::*;
pub use namespace::{parse_package_from_namespace, NamespaceRegistry, NamespaceResolver};
pub use options::{SynthesisOptions, MXML_2009_NAMESPACE, MXML_UNTYPED_NAMESPACE};
pub use schema::{class_chain, CachingResolver, ChainError, ClassResolver, SchemaRegistry};
pub use synthesize::{synthesize_markup, Synthesizer};

/// Synthesizes one unit from JSON-encoded schema, namespace table and options,
/// returning the output model as JSON. Failures surface as a serialized
/// [`CompilerError`] in the error reason.
#[cfg(feature = "napi")]
#[napi]
pub fn synthesize_native(
    source: String,
    qualified_name: String,
    schema_json: String,
    namespaces_json: String,
    options_json: Option<String>,
) -> napi::Result<serde_json::Value> {
    let schema = SchemaRegistry::from_json(&schema_json)
        .map_err(|e| napi::Error::from_reason(e.to_string()))?;
    let namespaces = NamespaceRegistry::from_json(&namespaces_json)
        .map_err(|e| napi::Error::from_reason(e.to_string()))?;
    let options = match options_json {
        Some(json) => SynthesisOptions::from_json(&json)
            .map_err(|e| napi::Error::from_reason(e.to_string()))?,
        None => SynthesisOptions::default(),
    };

    let resolver = CachingResolver::new(schema);
    let unit = synthesize_markup(&source, &qualified_name, &resolver, &namespaces, &options)
        .map_err(|err| {
            let record = err.into_compiler_error(&qualified_name);
            let reason = serde_json::to_string(&record).unwrap_or(record.message);
            napi::Error::from_reason(reason)
        })?;
    serde_json::to_value(unit).map_err(|e| napi::Error::from_reason(e.to_string()))
}

#[cfg(feature = "napi")]
#[napi]
pub fn compile_bridge() -> String {
    "MXML Native Bridge Connected".to_string()
}
