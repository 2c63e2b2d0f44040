//! Class model types.
//!
//! The same shapes describe both the synthesized output class and the classes
//! handed back by a [`crate::schema::ClassResolver`].

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::emit::{render_statements, Statement};

pub const EVENT_ANNOTATION: &str = "Event";
pub const DEFAULT_PROPERTY_ANNOTATION: &str = "DefaultProperty";
pub const RESOURCE_BUNDLE_ANNOTATION: &str = "ResourceBundle";
pub const CONSTRUCTOR_PARAMETER_ANNOTATION: &str = "ConstructorParameter";
pub const ALLOW_CONSTRUCTOR_PARAMETERS_ANNOTATION: &str = "AllowConstructorParameters";

/// The open ("any") type used for ad hoc dynamic fields.
pub const ANY_TYPE: &str = "*";

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILATION UNIT
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilationUnitModel {
    pub package: String,
    pub class: ClassModel,
    pub imports: IndexSet<String>,
}

impl CompilationUnitModel {
    pub fn new(qualified_name: &str) -> Self {
        CompilationUnitModel {
            package: package_name(qualified_name).to_string(),
            class: ClassModel::new(class_name(qualified_name)),
            imports: IndexSet::new(),
        }
    }

    pub fn qualified_name(&self) -> String {
        qualified_name(&self.package, &self.class.name)
    }

    /// Records an import. Top-level names need no import and are ignored.
    pub fn add_import(&mut self, name: &str) {
        if name.contains('.') {
            self.imports.insert(name.to_string());
        }
    }
}

/// Joins a package and a simple class name.
pub fn qualified_name(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", package, name)
    }
}

pub fn package_name(qualified_name: &str) -> &str {
    match qualified_name.rfind('.') {
        Some(idx) => &qualified_name[..idx],
        None => "",
    }
}

pub fn class_name(qualified_name: &str) -> &str {
    match qualified_name.rfind('.') {
        Some(idx) => &qualified_name[idx + 1..],
        None => qualified_name,
    }
}

/// Derives a qualified class name from a source path relative to its source
/// root, e.g. `com/acme/Panel.mxml` becomes `com.acme.Panel`.
pub fn qualified_name_from_relative_path(relative_path: &str) -> String {
    let normalized = relative_path.replace('\\', "/");
    let without_extension = match normalized.rfind('.') {
        Some(dot) if dot > normalized.rfind('/').map(|s| s + 1).unwrap_or(0) => {
            &normalized[..dot]
        }
        _ => normalized.as_str(),
    };
    without_extension
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLASS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassModel {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub superclass: Option<String>,
    #[serde(default)]
    pub dynamic: bool,
    #[serde(default)]
    pub constructor: Option<ConstructorModel>,
    #[serde(default)]
    pub members: IndexMap<String, Member>,
    /// Class-level annotations, including `[Event]` declarations.
    #[serde(default)]
    pub annotations: Vec<AnnotationModel>,
    /// Verbatim class body code from script blocks.
    #[serde(default)]
    pub body_code: Vec<String>,
    /// Verbatim annotation code from metadata blocks.
    #[serde(default)]
    pub annotation_code: Vec<String>,
}

impl ClassModel {
    pub fn new(name: &str) -> Self {
        ClassModel {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn get_member(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    pub fn add_member(&mut self, member: Member) {
        self.members.insert(member.name().to_string(), member);
    }

    pub fn get_method(&self, name: &str) -> Option<&MethodModel> {
        match self.members.get(name) {
            Some(Member::Method(method)) => Some(method),
            _ => None,
        }
    }

    /// Finds an `[Event(name="...")]` declaration by event name.
    pub fn get_event(&self, name: &str) -> Option<&AnnotationModel> {
        self.annotations
            .iter()
            .filter(|a| a.name == EVENT_ANNOTATION)
            .find(|a| a.get(Some("name")) == Some(name))
    }

    pub fn get_annotation(&self, name: &str) -> Option<&AnnotationModel> {
        self.annotations.iter().find(|a| a.name == name)
    }

    /// Members (fields or properties) carrying the given annotation on their
    /// field, setter or getter, in declaration order.
    pub fn properties_with_annotation<'a>(
        &'a self,
        annotation: &'a str,
    ) -> impl Iterator<Item = &'a Member> + 'a {
        self.members
            .values()
            .filter(move |member| member.has_annotation(annotation))
    }

    pub fn add_body_code(&mut self, code: &str) {
        self.body_code.push(code.to_string());
    }

    pub fn add_annotation_code(&mut self, code: &str) {
        self.annotation_code.push(code.to_string());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructorModel {
    #[serde(default)]
    pub params: Vec<ParamModel>,
    #[serde(default)]
    pub body: Vec<Statement>,
}

impl ConstructorModel {
    pub fn add_param(&mut self, param: ParamModel) {
        self.params.push(param);
    }

    pub fn render_body(&self) -> String {
        render_statements(&self.body)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MEMBERS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Internal,
    Private,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Member {
    Field(FieldModel),
    Property(PropertyModel),
    Method(MethodModel),
}

impl Member {
    pub fn name(&self) -> &str {
        match self {
            Member::Field(field) => &field.name,
            Member::Property(property) => &property.name,
            Member::Method(method) => &method.name,
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Member::Field(field) => &field.type_name,
            Member::Property(property) => &property.type_name,
            Member::Method(method) => &method.return_type,
        }
    }

    /// Whether this member can be resolved as a markup property.
    pub fn is_property_like(&self) -> bool {
        match self {
            Member::Field(_) | Member::Property(_) => true,
            Member::Method(_) => false,
        }
    }

    /// A property is writable iff it has a setter; a const field never is.
    pub fn is_writable(&self) -> bool {
        match self {
            Member::Field(field) => !field.is_const,
            Member::Property(property) => property.setter.is_some(),
            Member::Method(_) => false,
        }
    }

    /// Annotations on the write side: the setter of a property, or a
    /// non-const field itself.
    pub fn setter_annotations(&self) -> &[AnnotationModel] {
        match self {
            Member::Field(field) if !field.is_const => &field.annotations,
            Member::Field(_) => &[],
            Member::Property(property) => property
                .setter
                .as_ref()
                .map(|setter| setter.annotations.as_slice())
                .unwrap_or(&[]),
            Member::Method(_) => &[],
        }
    }

    /// Annotations on the read side: the getter of a property, or the field.
    pub fn getter_annotations(&self) -> &[AnnotationModel] {
        match self {
            Member::Field(field) => &field.annotations,
            Member::Property(property) => property
                .getter
                .as_ref()
                .map(|getter| getter.annotations.as_slice())
                .unwrap_or(&[]),
            Member::Method(method) => &method.annotations,
        }
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        self.is_property_like()
            && (self.setter_annotations().iter().any(|a| a.name == name)
                || self.getter_annotations().iter().any(|a| a.name == name))
    }

    pub fn setter_annotation(&self, name: &str) -> Option<&AnnotationModel> {
        self.setter_annotations().iter().find(|a| a.name == name)
    }

    pub fn getter_annotation(&self, name: &str) -> Option<&AnnotationModel> {
        self.getter_annotations().iter().find(|a| a.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldModel {
    pub name: String,
    #[serde(rename = "type", default = "any_type")]
    pub type_name: String,
    #[serde(default)]
    pub namespace: Visibility,
    #[serde(default)]
    pub is_const: bool,
    #[serde(default)]
    pub annotations: Vec<AnnotationModel>,
}

impl FieldModel {
    pub fn new(name: &str, type_name: &str) -> Self {
        FieldModel {
            name: name.to_string(),
            type_name: type_name.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyModel {
    pub name: String,
    #[serde(rename = "type", default = "any_type")]
    pub type_name: String,
    #[serde(default)]
    pub getter: Option<MethodModel>,
    #[serde(default)]
    pub setter: Option<MethodModel>,
}

impl PropertyModel {
    /// A public property with both accessors.
    pub fn read_write(name: &str, type_name: &str) -> Self {
        PropertyModel {
            name: name.to_string(),
            type_name: type_name.to_string(),
            getter: Some(MethodModel::new(name, type_name)),
            setter: Some(MethodModel {
                params: vec![ParamModel::new("value", type_name)],
                ..MethodModel::new(name, "void")
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodModel {
    pub name: String,
    #[serde(default = "void_type")]
    pub return_type: String,
    #[serde(default)]
    pub params: Vec<ParamModel>,
    #[serde(default)]
    pub namespace: Visibility,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub annotations: Vec<AnnotationModel>,
}

impl MethodModel {
    pub fn new(name: &str, return_type: &str) -> Self {
        MethodModel {
            name: name.to_string(),
            return_type: return_type.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamModel {
    pub name: String,
    #[serde(rename = "type", default = "any_type")]
    pub type_name: String,
    #[serde(default)]
    pub default_value: Option<String>,
}

impl ParamModel {
    pub fn new(name: &str, type_name: &str) -> Self {
        ParamModel {
            name: name.to_string(),
            type_name: type_name.to_string(),
            default_value: None,
        }
    }

    pub fn optional(name: &str, type_name: &str, default_value: &str) -> Self {
        ParamModel {
            default_value: Some(default_value.to_string()),
            ..ParamModel::new(name, type_name)
        }
    }
}

fn any_type() -> String {
    ANY_TYPE.to_string()
}

fn void_type() -> String {
    "void".to_string()
}

// ═══════════════════════════════════════════════════════════════════════════════
// ANNOTATIONS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationModel {
    pub name: String,
    #[serde(default)]
    pub properties: Vec<AnnotationPropertyModel>,
}

/// `key` is `None` for the default (positional) property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationPropertyModel {
    #[serde(default)]
    pub key: Option<String>,
    pub value: String,
}

impl AnnotationModel {
    pub fn new(name: &str) -> Self {
        AnnotationModel {
            name: name.to_string(),
            properties: Vec::new(),
        }
    }

    pub fn with_property(mut self, key: Option<&str>, value: &str) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: Option<&str>) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.key.as_deref() == key)
            .map(|p| p.value.as_str())
    }

    pub fn set(&mut self, key: Option<&str>, value: &str) {
        match self.properties.iter_mut().find(|p| p.key.as_deref() == key) {
            Some(existing) => existing.value = value.to_string(),
            None => self.properties.push(AnnotationPropertyModel {
                key: key.map(str::to_string),
                value: value.to_string(),
            }),
        }
    }
}
