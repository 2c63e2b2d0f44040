use serde::{Deserialize, Serialize};

pub const MXML_2009_NAMESPACE: &str = "http://ns.adobe.com/mxml/2009";
pub const MXML_UNTYPED_NAMESPACE: &str = "mxml:untyped";

// ═══════════════════════════════════════════════════════════════════════════════
// SYNTHESIS OPTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Knobs for one synthesis run. The runtime names end up verbatim in the
/// generated constructor, so they must match the runtime library in use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SynthesisOptions {
    /// Namespaces whose elements are markup directives, not classes.
    pub reserved_namespaces: Vec<String>,
    /// Attributes in this namespace may create dynamic properties on any class.
    pub force_dynamic_namespace: String,
    pub id_attribute: String,
    pub bindings_field: String,
    pub binding_class: String,
    pub listener_hook: String,
    pub resource_manager: String,
    /// The open key-value map type used for config objects.
    pub config_type: String,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        SynthesisOptions {
            reserved_namespaces: vec![MXML_2009_NAMESPACE.to_string()],
            force_dynamic_namespace: MXML_UNTYPED_NAMESPACE.to_string(),
            id_attribute: "id".to_string(),
            bindings_field: "$bindings".to_string(),
            binding_class: "joo.binding.Binding".to_string(),
            listener_hook: "joo.addEventListener".to_string(),
            resource_manager: "mx.resources.ResourceManager".to_string(),
            config_type: "Object".to_string(),
        }
    }
}

impl SynthesisOptions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn is_reserved_namespace(&self, uri: &str) -> bool {
        self.reserved_namespaces.iter().any(|ns| ns == uri)
    }
}
