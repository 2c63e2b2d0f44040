//! # Markup-to-Model Synthesis
//!
//! One depth-first pass over the markup tree produces the class model of the
//! component.
//!
//! ## Invariants
//!
//! 1. **Statement Order**: the constructor initializes the binding list first
//!    and executes all bindings last, in registration order.
//! 2. **Two Strategies**: a class whose constructor takes a config map is built
//!    by assembling that map (config mode); everything else is built by
//!    assigning onto the constructed object (direct mode). The direct pass runs
//!    after a config pass only when bindings or events need the real object,
//!    and then skips every value the config map already carries.
//! 3. **Unique Names**: auxiliary variables come from one counter per
//!    invocation and are never reused.
//! 4. **One Getter Per Binding Target**: `$bind_<target>_<property>` is created
//!    once and reused.
//! 5. **Fail Fast**: the first unresolved name aborts the invocation; no partial
//!    model escapes.

use indexmap::IndexSet;
use std::rc::Rc;

use crate::document::{parse_markup, MarkupElement};
use crate::emit::{CodeEmitter, Expr, Statement};
use crate::error::SynthesisError;
use crate::model::{
    AnnotationModel, ClassModel, CompilationUnitModel, ConstructorModel, FieldModel, Member,
    MethodModel, ParamModel, PropertyModel, Visibility, ALLOW_CONSTRUCTOR_PARAMETERS_ANNOTATION,
    ANY_TYPE, CONSTRUCTOR_PARAMETER_ANNOTATION, DEFAULT_PROPERTY_ANNOTATION,
    RESOURCE_BUNDLE_ANNOTATION,
};
use crate::namespace::{NamespaceRegistry, NamespaceResolver, MXML_PRIMITIVES};
use crate::options::SynthesisOptions;
use crate::schema::{class_chain, ChainError, ClassResolver};
use crate::values::{
    binding_expression, format_literal, is_binding_expression, parse_resource_reference,
    resource_access_code,
};

pub const MXML_DECLARATIONS: &str = "Declarations";
pub const MXML_SCRIPT: &str = "Script";
pub const MXML_METADATA: &str = "Metadata";

const RESERVED_BLOCKS: &[&str] = &[MXML_DECLARATIONS, MXML_SCRIPT, MXML_METADATA];

fn is_primitive(class_name: &str) -> bool {
    MXML_PRIMITIVES.contains(&class_name)
}

fn is_collection_type(type_name: &str) -> bool {
    type_name == "Array" || type_name.starts_with("Vector.<")
}

// ═══════════════════════════════════════════════════════════════════════════════
// GENERATION SCOPE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Config,
    Direct,
}

/// Where the values of one element go.
#[derive(Debug, Clone, Copy)]
struct Scope<'s> {
    config: Option<&'s str>,
    target: &'s str,
    mode: Mode,
}

impl<'s> Scope<'s> {
    fn config(config: &'s str, target: &'s str) -> Self {
        Scope {
            config: Some(config),
            target,
            mode: Mode::Config,
        }
    }

    fn direct(config: Option<&'s str>, target: &'s str) -> Self {
        Scope {
            config,
            target,
            mode: Mode::Direct,
        }
    }

    /// The variable plain values are written to.
    fn variable(&self) -> &'s str {
        match (self.mode, self.config) {
            (Mode::Config, Some(config)) => config,
            _ => self.target,
        }
    }

    /// False in a direct pass that follows a config pass: the config map
    /// already holds every plain value.
    fn writes_values(&self) -> bool {
        self.mode == Mode::Config || self.config.is_none()
    }
}

/// The resolved class of an element and its supertypes, most-derived first.
struct ElementShape {
    class_name: String,
    chain: Vec<Rc<ClassModel>>,
}

impl ElementShape {
    fn is_dynamic(&self) -> bool {
        self.chain.first().map(|class| class.dynamic).unwrap_or(false)
    }
}

enum Lookup {
    Member(Member),
    Event(AnnotationModel),
}

/// Identifies the attribute or property element a member is looked up for.
struct MemberSite<'e> {
    namespace: &'e str,
    name: &'e str,
    element: &'e MarkupElement,
}

// ═══════════════════════════════════════════════════════════════════════════════
// SYNTHESIZER
// ═══════════════════════════════════════════════════════════════════════════════

/// Synthesizes one compilation unit. Consumed by [`Synthesizer::synthesize`],
/// so its state never outlives or leaks across invocations.
pub struct Synthesizer<'a, R: ClassResolver + ?Sized> {
    classes: &'a R,
    namespaces: NamespaceResolver<'a, R>,
    options: &'a SynthesisOptions,
    unit: CompilationUnitModel,
    constructor_params: Vec<ParamModel>,
    emitter: CodeEmitter,
}

impl<'a, R: ClassResolver + ?Sized> Synthesizer<'a, R> {
    pub fn new(
        qualified_name: &str,
        classes: &'a R,
        namespaces: &'a NamespaceRegistry,
        options: &'a SynthesisOptions,
    ) -> Self {
        Synthesizer {
            classes,
            namespaces: NamespaceResolver::new(namespaces, classes),
            options,
            unit: CompilationUnitModel::new(qualified_name),
            constructor_params: Vec::new(),
            emitter: CodeEmitter::new(),
        }
    }

    pub fn synthesize(mut self, root: &MarkupElement) -> Result<CompilationUnitModel, SynthesisError> {
        let span = tracing::debug_span!("synthesize", unit = %self.unit.qualified_name());
        let _enter = span.enter();

        self.synthesize_root(root)?;

        let Synthesizer {
            mut unit,
            constructor_params,
            emitter,
            ..
        } = self;
        unit.class.constructor = Some(ConstructorModel {
            params: constructor_params,
            body: emitter.finish(),
        });
        Ok(unit)
    }

    fn synthesize_root(&mut self, root: &MarkupElement) -> Result<(), SynthesisError> {
        let superclass = self.resolve_element_class(root)?;
        if superclass == self.unit.qualified_name() {
            return Err(SynthesisError::CyclicInheritance {
                qualified_name: superclass,
                namespace: root.namespace.clone(),
                local_name: root.local_name.clone(),
                line: root.line,
            });
        }
        tracing::debug!(superclass = %superclass, "resolved root class");

        self.unit.class.superclass = Some(superclass.clone());
        self.unit.add_import(&superclass);

        let bindings_field = self.options.bindings_field.clone();
        self.unit.class.add_member(Member::Field(FieldModel {
            namespace: Visibility::Private,
            ..FieldModel::new(&bindings_field, "Array")
        }));
        self.emitter.emit(Statement::InitBindings {
            field: bindings_field.clone(),
        });

        self.process_reserved_children(root)?;

        let shape = self.element_shape(root)?;
        let mut config = None;
        let mut needs_direct = true;
        if self.takes_config(&shape) {
            let param = self.emitter.aux_var();
            self.constructor_params
                .push(ParamModel::optional(&param, &self.options.config_type, "null"));
            let config_var = self.declare_config();
            tracing::debug!(config = %config_var, "root uses config object");

            needs_direct = self.process_attributes_and_children(
                root,
                &shape,
                Scope::config(&config_var, "this"),
            )?;

            let key = self.emitter.aux_var();
            self.emitter.emit(Statement::CopyConfigParams {
                key,
                param,
                config: config_var.clone(),
            });
            self.emitter.emit(Statement::SuperCall {
                args: vec![Expr::Var(config_var.clone())],
            });
            config = Some(config_var);
        }

        if needs_direct {
            self.process_attributes_and_children(
                root,
                &shape,
                Scope::direct(config.as_deref(), "this"),
            )?;
        }

        self.emitter.emit(Statement::ExecuteBindings {
            field: bindings_field,
        });
        Ok(())
    }

    fn process_reserved_children(&mut self, root: &MarkupElement) -> Result<(), SynthesisError> {
        for element in &root.children {
            if !self.options.is_reserved_namespace(&element.namespace) {
                continue;
            }
            match element.local_name.as_str() {
                MXML_DECLARATIONS => {
                    for declaration in &element.children {
                        self.build_value(declaration, false)?;
                    }
                }
                MXML_SCRIPT => self.unit.class.add_body_code(&element.text),
                MXML_METADATA => self.unit.class.add_annotation_code(&element.text),
                _ => {
                    return Err(SynthesisError::UnknownReservedElement {
                        namespace: element.namespace.clone(),
                        local_name: element.local_name.clone(),
                        line: element.line,
                    })
                }
            }
        }
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Resolution
    // ───────────────────────────────────────────────────────────────────────────

    fn resolve_element_class(&self, element: &MarkupElement) -> Result<String, SynthesisError> {
        self.namespaces
            .resolve(&element.namespace, &element.local_name)
            .ok_or_else(|| SynthesisError::UnresolvedClass {
                namespace: element.namespace.clone(),
                local_name: element.local_name.clone(),
                line: element.line,
            })
    }

    fn element_shape(&self, element: &MarkupElement) -> Result<ElementShape, SynthesisError> {
        let class_name = self.resolve_element_class(element)?;
        let chain = class_chain(self.classes, &class_name).map_err(|err| match err {
            ChainError::Missing(qualified_name) => SynthesisError::UnresolvableEmbeddedReference {
                qualified_name,
                namespace: element.namespace.clone(),
                local_name: element.local_name.clone(),
                line: element.line,
            },
            ChainError::Cycle(qualified_name) => SynthesisError::CyclicInheritance {
                qualified_name,
                namespace: element.namespace.clone(),
                local_name: element.local_name.clone(),
                line: element.line,
            },
        })?;
        Ok(ElementShape { class_name, chain })
    }

    /// True iff the class's own constructor takes the open map type first.
    fn takes_config(&self, shape: &ElementShape) -> bool {
        shape
            .chain
            .first()
            .and_then(|class| class.constructor.as_ref())
            .and_then(|constructor| constructor.params.first())
            .map(|param| param.type_name == self.options.config_type)
            .unwrap_or(false)
    }

    /// Config-constructor detection by name; unknown classes simply do not
    /// support it.
    pub fn supports_config_parameter(&self, class_name: &str) -> bool {
        self.classes
            .resolve_class(class_name)
            .and_then(|class| class.constructor.clone())
            .and_then(|constructor| constructor.params.first().cloned())
            .map(|param| param.type_name == self.options.config_type)
            .unwrap_or(false)
    }

    /// Walks most-derived to base; at each level a writable property or field
    /// wins over an event of the same name. Read-only members are invisible.
    fn lookup(&self, shape: &ElementShape, name: &str) -> Option<Lookup> {
        for class in &shape.chain {
            if let Some(member) = class.get_member(name).filter(|m| m.is_writable()) {
                return Some(Lookup::Member(member.clone()));
            }
            if let Some(event) = class.get_event(name) {
                return Some(Lookup::Event(event.clone()));
            }
        }
        None
    }

    fn lookup_member(&self, shape: &ElementShape, name: &str) -> Option<Member> {
        shape
            .chain
            .iter()
            .find_map(|class| class.get_member(name).filter(|m| m.is_writable()))
            .cloned()
    }

    fn default_property(&self, shape: &ElementShape) -> Option<Member> {
        for class in &shape.chain {
            if let Some(member) = class
                .properties_with_annotation(DEFAULT_PROPERTY_ANNOTATION)
                .next()
            {
                return Some(member.clone());
            }
            let named = class
                .get_annotation(DEFAULT_PROPERTY_ANNOTATION)
                .and_then(|annotation| annotation.get(None));
            if let Some(name) = named {
                return self.lookup_member(shape, name);
            }
        }
        None
    }

    fn resolves_to_class(&self, element: &MarkupElement) -> bool {
        self.namespaces
            .resolve(&element.namespace, &element.local_name)
            .is_some()
    }

    fn dynamic_member(
        &self,
        shape: &ElementShape,
        site: &MemberSite<'_>,
        force_dynamic: bool,
    ) -> Result<Member, SynthesisError> {
        if force_dynamic || shape.is_dynamic() {
            return Ok(Member::Field(FieldModel::new(site.name, ANY_TYPE)));
        }
        Err(SynthesisError::UndefinedMember {
            class_name: shape.class_name.clone(),
            namespace: site.namespace.to_string(),
            name: site.name.to_string(),
            element: site.element.display_name(),
            line: site.element.line,
        })
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Attributes and child elements
    // ───────────────────────────────────────────────────────────────────────────

    /// Returns whether a direct pass is needed after this (config) pass.
    fn process_attributes_and_children(
        &mut self,
        element: &MarkupElement,
        shape: &ElementShape,
        scope: Scope<'_>,
    ) -> Result<bool, SynthesisError> {
        let from_attributes = self.process_attributes(element, shape, scope)?;
        let from_children = self.process_children(element, shape, scope)?;
        Ok(from_attributes || from_children)
    }

    fn is_property_attribute(&self, namespace: &str, local_name: &str) -> bool {
        (namespace.is_empty() && local_name != self.options.id_attribute)
            || namespace == self.options.force_dynamic_namespace
    }

    fn process_attributes(
        &mut self,
        element: &MarkupElement,
        shape: &ElementShape,
        scope: Scope<'_>,
    ) -> Result<bool, SynthesisError> {
        let mut needs_direct = false;
        for attribute in &element.attributes {
            if !self.is_property_attribute(&attribute.namespace, &attribute.local_name) {
                continue;
            }
            let force_dynamic = attribute.namespace == self.options.force_dynamic_namespace;
            let member = match self.lookup(shape, &attribute.local_name) {
                Some(Lookup::Event(event)) => {
                    needs_direct |= self.wire_event(scope, &attribute.value, &event);
                    continue;
                }
                Some(Lookup::Member(member)) => member,
                None => {
                    let site = MemberSite {
                        namespace: &attribute.namespace,
                        name: &attribute.local_name,
                        element,
                    };
                    self.dynamic_member(shape, &site, force_dynamic)?
                }
            };
            needs_direct |= self.assign_raw_value(&member, &attribute.value, scope);
        }
        Ok(needs_direct)
    }

    fn process_children(
        &mut self,
        element: &MarkupElement,
        shape: &ElementShape,
        scope: Scope<'_>,
    ) -> Result<bool, SynthesisError> {
        let default_property = self.default_property(shape);
        let mut default_values: Vec<&MarkupElement> = Vec::new();
        let mut needs_direct = false;

        for child in &element.children {
            if self.options.is_reserved_namespace(&child.namespace) {
                if default_property.is_some() && self.resolves_to_class(child) {
                    default_values.push(child);
                } else if !RESERVED_BLOCKS.contains(&child.local_name.as_str()) {
                    tracing::warn!(
                        element = %child.display_name(),
                        line = child.line,
                        "ignoring nested reserved element"
                    );
                }
                continue;
            }

            let mut member = None;
            if child.namespace == element.namespace {
                match self.lookup(shape, &child.local_name) {
                    Some(Lookup::Event(event)) => {
                        needs_direct |= self.wire_event(scope, &child.text, &event);
                        continue;
                    }
                    Some(Lookup::Member(found)) => member = Some(found),
                    None => {}
                }
            }

            let member = match member {
                Some(member) => member,
                None if default_property.is_some() && self.resolves_to_class(child) => {
                    default_values.push(child);
                    continue;
                }
                None => {
                    let site = MemberSite {
                        namespace: &child.namespace,
                        name: &child.local_name,
                        element: child,
                    };
                    self.dynamic_member(shape, &site, false)?
                }
            };

            if child.children.is_empty() {
                needs_direct |= self.assign_raw_value(&member, &child.text, scope);
            } else if scope.writes_values() {
                let values: Vec<&MarkupElement> = child.children.iter().collect();
                self.assign_elements(&values, &member, scope)?;
            }
        }

        if let Some(default_property) = default_property {
            if !default_values.is_empty() && scope.writes_values() {
                tracing::debug!(
                    property = default_property.name(),
                    count = default_values.len(),
                    "assigning default property"
                );
                self.assign_elements(&default_values, &default_property, scope)?;
            }
        }

        Ok(needs_direct)
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Value assignment
    // ───────────────────────────────────────────────────────────────────────────

    /// Assigns an attribute or text value. Returns true when a binding was
    /// created.
    fn assign_raw_value(&mut self, member: &Member, raw: &str, scope: Scope<'_>) -> bool {
        if is_binding_expression(raw) && member.is_writable() {
            match scope.mode {
                Mode::Config => {
                    // Config maps are read once, so the binding collapses to
                    // its current value.
                    let getter = self.binding_getter(scope.target, member, raw);
                    self.emit_assignment(scope, member, Expr::Code(format!("{}()", getter)));
                }
                Mode::Direct => self.live_binding(scope.target, member, raw),
            }
            return true;
        }
        if scope.writes_values() {
            let value = self.literal_value(member.type_name(), raw);
            self.emit_assignment(scope, member, value);
        }
        false
    }

    fn emit_assignment(&mut self, scope: Scope<'_>, member: &Member, value: Expr) {
        let property = match scope.mode {
            Mode::Config => config_option_name(member).to_string(),
            Mode::Direct => member.name().to_string(),
        };
        self.emitter.emit(Statement::Assign {
            target: scope.variable().to_string(),
            property,
            value,
        });
    }

    /// A value that is not wired as a live binding. `{expr}` is still code,
    /// evaluated once.
    fn literal_value(&mut self, type_name: &str, raw: &str) -> Expr {
        if let Some(reference) = parse_resource_reference(raw) {
            let resource_manager = self.options.resource_manager.clone();
            self.unit.add_import(&resource_manager);
            self.add_resource_bundle(&reference.bundle);
            return Expr::Code(resource_access_code(&resource_manager, &reference));
        }
        match binding_expression(raw) {
            Some(expression) => Expr::Code(expression.to_string()),
            None => format_literal(raw, Some(type_name)),
        }
    }

    fn add_resource_bundle(&mut self, bundle: &str) {
        let annotations = &mut self.unit.class.annotations;
        let exists = annotations
            .iter()
            .any(|a| a.name == RESOURCE_BUNDLE_ANNOTATION && a.get(None) == Some(bundle));
        if !exists {
            annotations.push(AnnotationModel::new(RESOURCE_BUNDLE_ANNOTATION).with_property(None, bundle));
        }
    }

    fn assign_elements(
        &mut self,
        elements: &[&MarkupElement],
        member: &Member,
        scope: Scope<'_>,
    ) -> Result<(), SynthesisError> {
        let force_array = is_collection_type(member.type_name());
        let allow_constructor_parameters = member
            .setter_annotation(ALLOW_CONSTRUCTOR_PARAMETERS_ANNOTATION)
            .is_some();
        let value = self.array_value(elements, force_array, allow_constructor_parameters)?;
        self.emit_assignment(scope, member, value);
        Ok(())
    }

    /// A single value stays bare unless a collection is required.
    fn array_value(
        &mut self,
        elements: &[&MarkupElement],
        force_array: bool,
        allow_constructor_parameters: bool,
    ) -> Result<Expr, SynthesisError> {
        let mut items = Vec::with_capacity(elements.len());
        for element in elements {
            items.push(self.build_value(element, allow_constructor_parameters)?);
        }
        if items.len() > 1 || force_array {
            Ok(Expr::Array(items))
        } else {
            Ok(items.pop().unwrap_or_else(Expr::null))
        }
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Nested objects
    // ───────────────────────────────────────────────────────────────────────────

    fn has_assignments(&self, element: &MarkupElement) -> bool {
        !element.children.is_empty()
            || element
                .attributes
                .iter()
                .any(|a| self.is_property_attribute(&a.namespace, &a.local_name))
    }

    fn primitive_value(
        &mut self,
        class_name: &str,
        element: &MarkupElement,
        allow_constructor_parameters: bool,
    ) -> Result<Expr, SynthesisError> {
        match class_name {
            "Object" => Ok(Expr::EmptyObject),
            "Array" => {
                let items: Vec<&MarkupElement> = element.children.iter().collect();
                self.array_value(&items, true, allow_constructor_parameters)
            }
            _ => Ok(self.literal_value(class_name, &element.text)),
        }
    }

    /// Builds the expression for a nested object element, emitting whatever
    /// statements its construction needs.
    pub(crate) fn build_value(
        &mut self,
        element: &MarkupElement,
        allow_constructor_parameters: bool,
    ) -> Result<Expr, SynthesisError> {
        let class_name = self.resolve_element_class(element)?;
        self.unit.add_import(&class_name);

        let id = element
            .attribute(&self.options.id_attribute)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        if let Some(id) = &id {
            self.unit
                .class
                .add_member(Member::Property(PropertyModel::read_write(id, &class_name)));
        }

        if is_primitive(&class_name) {
            let value = self.primitive_value(&class_name, element, allow_constructor_parameters)?;
            return Ok(match id {
                Some(id) => {
                    self.emitter.emit(Statement::AssignVar {
                        var: id.clone(),
                        value,
                    });
                    Expr::Var(id)
                }
                None => value,
            });
        }

        let shape = self.element_shape(element)?;
        let mut target = id.clone();
        let mut config = None;
        let mut needs_direct = false;
        if self.takes_config(&shape) {
            let config_var = self.declare_config();
            let target_var = match &target {
                Some(existing) => existing.clone(),
                None => self.emitter.aux_var(),
            };
            // Bindings inside the config refer to the object under its final name.
            needs_direct = self.process_attributes_and_children(
                element,
                &shape,
                Scope::config(&config_var, &target_var),
            )?;
            target = Some(target_var);
            config = Some(config_var);
        }

        let value = Expr::New {
            class: class_name.clone(),
            args: config.iter().map(|c| Expr::Var(c.clone())).collect(),
        };

        let target = if let Some(id) = &id {
            self.emitter.emit(Statement::AssignVar {
                var: id.clone(),
                value,
            });
            id.clone()
        } else if config.is_none() || needs_direct {
            if config.is_none() && !self.has_assignments(element) {
                return Ok(value);
            }
            let var = match target {
                Some(var) => var,
                None => self.emitter.aux_var(),
            };
            self.emitter.emit(Statement::DeclareVar {
                var: var.clone(),
                type_name: class_name.clone(),
                value,
            });
            var
        } else if let (true, Some(config_var)) = (allow_constructor_parameters, &config) {
            self.emit_constructor_parameter_values(&shape, config_var);
            return Ok(Expr::Var(config_var.clone()));
        } else {
            return Ok(value);
        };

        if config.is_none() || needs_direct {
            self.process_attributes_and_children(
                element,
                &shape,
                Scope::direct(config.as_deref(), &target),
            )?;
        }
        Ok(Expr::Var(target))
    }

    fn declare_config(&mut self) -> String {
        let var = self.emitter.aux_var();
        self.emitter.emit(Statement::DeclareConfig {
            var: var.clone(),
            type_name: self.options.config_type.clone(),
        });
        var
    }

    /// Fixed `[ConstructorParameter(value=...)]` values of the whole chain go
    /// into a pass-through config map.
    fn emit_constructor_parameter_values(&mut self, shape: &ElementShape, config_var: &str) {
        let mut seen = IndexSet::new();
        for class in &shape.chain {
            for member in class.properties_with_annotation(CONSTRUCTOR_PARAMETER_ANNOTATION) {
                let fixed = member
                    .getter_annotation(CONSTRUCTOR_PARAMETER_ANNOTATION)
                    .and_then(|annotation| annotation.get(Some("value")));
                let Some(fixed) = fixed else { continue };
                if !seen.insert(member.name().to_string()) {
                    continue;
                }
                self.emitter.emit(Statement::Assign {
                    target: config_var.to_string(),
                    property: config_option_name(member).to_string(),
                    value: format_literal(fixed, Some(member.type_name())),
                });
            }
        }
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Events and bindings
    // ───────────────────────────────────────────────────────────────────────────

    /// Registers a listener on the scope's target. Listeners cannot be put in a
    /// config map, so in config mode this only requests the direct pass.
    fn wire_event(&mut self, scope: Scope<'_>, body: &str, event: &AnnotationModel) -> bool {
        if scope.mode == Mode::Config {
            return true;
        }

        let event_type = event
            .get(Some("type"))
            .unwrap_or(self.options.config_type.as_str())
            .to_string();
        let declared = event.get(Some("name")).unwrap_or_default();
        let event_name = match declared.strip_prefix("on") {
            Some(rest) if !rest.is_empty() => rest,
            _ => declared,
        }
        .to_string();
        let handler = format!("$on_{}_{}", scope.target, event_name);

        self.unit.add_import(&event_type);
        self.unit.class.add_member(Member::Method(MethodModel {
            params: vec![ParamModel::new("event", &event_type)],
            namespace: Visibility::Private,
            body: body.to_string(),
            ..MethodModel::new(&handler, "void")
        }));

        let hook = self.options.listener_hook.clone();
        self.unit.add_import(&hook);
        self.emitter.emit(Statement::AddEventListener {
            hook,
            target: scope.target.to_string(),
            event: event_name,
            handler,
            event_type,
        });
        false
    }

    /// Returns the getter method name for a bound property, creating the
    /// method on first use.
    fn binding_getter(&mut self, target: &str, member: &Member, raw: &str) -> String {
        let name = format!("$bind_{}_{}", target, member.name());
        if self.unit.class.get_member(&name).is_none() {
            let expression = binding_expression(raw).unwrap_or(raw);
            self.unit.class.add_member(Member::Method(MethodModel {
                namespace: Visibility::Private,
                body: format!("return {};", expression),
                ..MethodModel::new(&name, member.type_name())
            }));
        }
        name
    }

    fn live_binding(&mut self, target: &str, member: &Member, raw: &str) {
        let getter = self.binding_getter(target, member, raw);
        let binding_class = self.options.binding_class.clone();
        self.unit.add_import(&binding_class);
        self.emitter.emit(Statement::PushBinding {
            field: self.options.bindings_field.clone(),
            binding_class,
            getter,
            target: target.to_string(),
            property: member.name().to_string(),
        });
    }
}

/// Config map key: the default value of `[ConstructorParameter]` on the
/// setter, else the property name.
fn config_option_name(member: &Member) -> &str {
    member
        .setter_annotation(CONSTRUCTOR_PARAMETER_ANNOTATION)
        .and_then(|annotation| annotation.get(None))
        .unwrap_or_else(|| member.name())
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY POINT
// ═══════════════════════════════════════════════════════════════════════════════

/// Parses `source` and synthesizes the class `qualified_name` from it.
pub fn synthesize_markup<R: ClassResolver + ?Sized>(
    source: &str,
    qualified_name: &str,
    classes: &R,
    namespaces: &NamespaceRegistry,
    options: &SynthesisOptions,
) -> Result<CompilationUnitModel, SynthesisError> {
    let document = parse_markup(source)?;
    Synthesizer::new(qualified_name, classes, namespaces, options).synthesize(&document.root)
}
