//! End-to-end synthesis scenarios: markup in, class model and constructor
//! statements out.

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use crate::emit::{Expr, Statement};
    use crate::model::*;
    use crate::namespace::NamespaceRegistry;
    use crate::options::SynthesisOptions;
    use crate::schema::{CachingResolver, ClassResolver, SchemaRegistry};
    use crate::synthesize::synthesize_markup;

    const INIT: &str = "$bindings = [];";
    const EXECUTE: &str = "for each (var $binding in $bindings) $binding.execute();";

    // ═══════════════════════════════════════════════════════════════════════════════
    // FIXTURE SCHEMA
    // ═══════════════════════════════════════════════════════════════════════════════

    fn config_constructor() -> Option<ConstructorModel> {
        Some(ConstructorModel {
            params: vec![ParamModel::new("config", "Object")],
            body: vec![],
        })
    }

    fn property(name: &str, type_name: &str) -> Member {
        Member::Property(PropertyModel::read_write(name, type_name))
    }

    fn annotated_setter(name: &str, type_name: &str, annotations: Vec<AnnotationModel>) -> Member {
        let mut property = PropertyModel::read_write(name, type_name);
        if let Some(setter) = property.setter.as_mut() {
            setter.annotations = annotations;
        }
        Member::Property(property)
    }

    fn annotated_getter(name: &str, type_name: &str, annotation: AnnotationModel) -> Member {
        let mut property = PropertyModel::read_write(name, type_name);
        if let Some(getter) = property.getter.as_mut() {
            getter.annotations = vec![annotation];
        }
        Member::Property(property)
    }

    fn event(name: &str, event_type: Option<&str>) -> AnnotationModel {
        let annotation = AnnotationModel::new(EVENT_ANNOTATION).with_property(Some("name"), name);
        match event_type {
            Some(event_type) => annotation.with_property(Some("type"), event_type),
            None => annotation,
        }
    }

    fn class(superclass: Option<&str>, members: Vec<Member>) -> ClassModel {
        let mut class = ClassModel {
            superclass: superclass.map(str::to_string),
            ..Default::default()
        };
        for member in members {
            class.add_member(member);
        }
        class
    }

    fn schema() -> SchemaRegistry {
        let default_property = || AnnotationModel::new(DEFAULT_PROPERTY_ANNOTATION);

        let label = class(
            None,
            vec![
                property("label", "String"),
                Member::Field(FieldModel::new("width", "Number")),
            ],
        );

        let mut component = class(
            None,
            vec![
                property("title", "String"),
                annotated_setter(
                    "caption",
                    "String",
                    vec![AnnotationModel::new(CONSTRUCTOR_PARAMETER_ANNOTATION)
                        .with_property(None, "captionText")],
                ),
                Member::Field(FieldModel::new("visible", "Boolean")),
            ],
        );
        component.constructor = config_constructor();
        component.annotations = vec![
            event("click", Some("ext.events.ClickEvent")),
            event("onClose", None),
        ];

        let mut container = class(
            Some("ext.Component"),
            vec![annotated_setter("items", "Array", vec![default_property()])],
        );
        container.constructor = config_constructor();

        let mut panel = class(Some("ext.Container"), vec![]);
        panel.constructor = config_constructor();

        let mut button = class(
            None,
            vec![
                property("text", "String"),
                annotated_getter(
                    "scale",
                    "String",
                    AnnotationModel::new(CONSTRUCTOR_PARAMETER_ANNOTATION)
                        .with_property(Some("value"), "medium"),
                ),
            ],
        );
        button.constructor = config_constructor();

        let mut base = class(None, vec![Member::Field(FieldModel::new("select", "String"))]);
        base.annotations = vec![event("toggle", None)];
        let mut derived = class(Some("ext.Base"), vec![property("toggle", "Boolean")]);
        derived.annotations = vec![event("select", None)];

        SchemaRegistry::new()
            .with_class("ext.Label", label)
            .with_class("ext.Component", component)
            .with_class("ext.Container", container)
            .with_class("ext.Panel", panel)
            .with_class(
                "ext.Box",
                class(None, vec![annotated_setter("content", "*", vec![default_property()])]),
            )
            .with_class(
                "ext.List",
                class(None, vec![annotated_setter("entries", "Array", vec![default_property()])]),
            )
            .with_class(
                "ext.Bag",
                ClassModel {
                    dynamic: true,
                    ..Default::default()
                },
            )
            .with_class(
                "ext.Toolbar",
                class(
                    None,
                    vec![annotated_setter(
                        "buttons",
                        "Array",
                        vec![
                            default_property(),
                            AnnotationModel::new(ALLOW_CONSTRUCTOR_PARAMETERS_ANNOTATION),
                        ],
                    )],
                ),
            )
            .with_class("ext.Button", button)
            .with_class(
                "ext.Meter",
                ClassModel {
                    dynamic: true,
                    ..class(
                        None,
                        vec![Member::Property(PropertyModel {
                            setter: None,
                            ..PropertyModel::read_write("reading", "Number")
                        })],
                    )
                },
            )
            .with_class("ext.Base", base)
            .with_class("ext.Derived", derived)
    }

    fn synthesize_with<R: ClassResolver>(source: &str, classes: &R) -> CompilationUnitModel {
        let namespaces = NamespaceRegistry::with_defaults();
        let options = SynthesisOptions::default();
        synthesize_markup(source, "com.acme.Main", classes, &namespaces, &options).unwrap()
    }

    fn synthesize(source: &str) -> CompilationUnitModel {
        synthesize_with(source, &schema())
    }

    fn statements(unit: &CompilationUnitModel) -> &[Statement] {
        unit.class
            .constructor
            .as_ref()
            .map(|constructor| constructor.body.as_slice())
            .unwrap_or(&[])
    }

    fn body(unit: &CompilationUnitModel) -> Vec<String> {
        statements(unit).iter().map(|s| s.to_string()).collect()
    }

    fn binding_getters(unit: &CompilationUnitModel) -> Vec<&MethodModel> {
        unit.class
            .members
            .values()
            .filter_map(|member| match member {
                Member::Method(method) if method.name.starts_with("$bind_") => Some(method),
                _ => None,
            })
            .collect()
    }

    fn count_pushes(unit: &CompilationUnitModel) -> usize {
        statements(unit)
            .iter()
            .filter(|s| matches!(s, Statement::PushBinding { .. }))
            .count()
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // ROOT OBJECT
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_plain_attribute_on_direct_superclass() {
        let unit = synthesize(r#"<ext:Label xmlns:ext="ext.*" label="Hi"/>"#);

        assert_eq!(unit.package, "com.acme");
        assert_eq!(unit.class.name, "Main");
        assert_eq!(unit.class.superclass.as_deref(), Some("ext.Label"));
        assert!(unit.imports.contains("ext.Label"));
        assert_eq!(body(&unit), vec![INIT, "label = \"Hi\";", EXECUTE]);

        let constructor = unit.class.constructor.as_ref().unwrap();
        assert!(constructor.params.is_empty());
        assert!(!statements(&unit)
            .iter()
            .any(|s| matches!(s, Statement::DeclareConfig { .. })));

        match unit.class.get_member("$bindings") {
            Some(Member::Field(field)) => {
                assert_eq!(field.type_name, "Array");
                assert_eq!(field.namespace, Visibility::Private);
            }
            other => panic!("expected private bindings field, got {:?}", other),
        }
    }

    #[test]
    fn test_config_superclass_copies_params_then_calls_super() {
        let unit = synthesize(r#"<ext:Component xmlns:ext="ext.*" visible="true"/>"#);

        assert_eq!(
            body(&unit),
            vec![
                INIT,
                "var $$2:Object = {};",
                "$$2.visible = true;",
                "if ($$1) for (var $$3:String in $$1) $$2[$$3] = $$1[$$3];",
                "super($$2);",
                EXECUTE,
            ]
        );
        let constructor = unit.class.constructor.as_ref().unwrap();
        assert_eq!(
            constructor.params,
            vec![ParamModel::optional("$$1", "Object", "null")]
        );
    }

    #[test]
    fn test_config_option_name_from_constructor_parameter() {
        let unit = synthesize(r#"<ext:Component xmlns:ext="ext.*" caption="Hi"/>"#);
        assert!(body(&unit).contains(&"$$2.captionText = \"Hi\";".to_string()));
    }

    #[test]
    fn test_render_body_matches_statement_text() {
        let unit = synthesize(r#"<ext:Label xmlns:ext="ext.*" width="120"/>"#);
        let constructor = unit.class.constructor.as_ref().unwrap();
        assert_eq!(
            constructor.render_body(),
            format!("{}\nwidth = 120;\n{}", INIT, EXECUTE)
        );
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // BINDINGS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_direct_binding_registers_live_binding() {
        let unit = synthesize(r#"<ext:Label xmlns:ext="ext.*" label="{model.name}"/>"#);

        assert_eq!(
            body(&unit),
            vec![
                INIT,
                "$bindings.push(new joo.binding.Binding($bind_this_label, function($value){ label = $value; }));",
                EXECUTE,
            ]
        );
        let getter = unit.class.get_method("$bind_this_label").unwrap();
        assert_eq!(getter.return_type, "String");
        assert_eq!(getter.body, "return model.name;");
        assert_eq!(getter.namespace, Visibility::Private);
        assert!(unit.imports.contains("joo.binding.Binding"));
    }

    #[test]
    fn test_config_binding_is_evaluated_once_into_config() {
        let unit = synthesize(r#"<ext:Component xmlns:ext="ext.*" title="{model.title}"/>"#);
        let statements = statements(&unit);

        let declare = statements
            .iter()
            .position(|s| matches!(s, Statement::DeclareConfig { .. }))
            .unwrap();
        let super_call = statements
            .iter()
            .position(|s| matches!(s, Statement::SuperCall { .. }))
            .unwrap();
        let config_phase = &statements[declare..super_call];

        let config_writes: Vec<&Statement> = config_phase
            .iter()
            .filter(|s| matches!(s, Statement::Assign { target, .. } if target == "$$2"))
            .collect();
        assert_eq!(
            config_writes,
            vec![&Statement::Assign {
                target: "$$2".to_string(),
                property: "title".to_string(),
                value: Expr::Code("$bind_this_title()".to_string()),
            }]
        );
        assert!(!config_phase
            .iter()
            .any(|s| matches!(s, Statement::PushBinding { .. })));

        assert_eq!(binding_getters(&unit).len(), 1);
        assert_eq!(count_pushes(&unit), 1);
    }

    #[test]
    fn test_binding_getter_is_created_once_per_target_property() {
        let unit = synthesize(
            r#"<ext:Label xmlns:ext="ext.*" xmlns:u="mxml:untyped" label="{first}" u:label="{second}"/>"#,
        );

        let getters = binding_getters(&unit);
        assert_eq!(getters.len(), 1);
        assert_eq!(getters[0].body, "return first;");
        assert_eq!(count_pushes(&unit), 2);
    }

    #[test]
    fn test_binding_in_property_element_text() {
        let unit = synthesize(indoc! {r#"
            <ext:Label xmlns:ext="ext.*">
              <ext:label>{model.name}</ext:label>
            </ext:Label>
        "#});
        assert_eq!(count_pushes(&unit), 1);
        assert!(unit.class.get_method("$bind_this_label").is_some());
    }

    #[test]
    fn test_nested_binding_targets_object_variable() {
        let unit = synthesize(indoc! {r#"
            <ext:Box xmlns:ext="ext.*">
              <ext:Label id="caption" label="{model.name}"/>
            </ext:Box>
        "#});

        assert_eq!(
            body(&unit),
            vec![
                INIT,
                "caption = new ext.Label();",
                "$bindings.push(new joo.binding.Binding($bind_caption_label, function($value){ caption.label = $value; }));",
                "content = caption;",
                EXECUTE,
            ]
        );
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // CHILD ELEMENTS AND NESTED OBJECTS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_property_element_text_value() {
        let unit = synthesize(indoc! {r#"
            <ext:Label xmlns:ext="ext.*">
              <ext:label>Hi</ext:label>
            </ext:Label>
        "#});
        assert_eq!(body(&unit), vec![INIT, "label = \"Hi\";", EXECUTE]);
    }

    #[test]
    fn test_id_becomes_read_write_property() {
        let unit = synthesize(indoc! {r#"
            <ext:Box xmlns:ext="ext.*">
              <ext:Label id="greeting" label="Hello"/>
            </ext:Box>
        "#});

        match unit.class.get_member("greeting") {
            Some(Member::Property(property)) => {
                assert_eq!(property.type_name, "ext.Label");
                assert!(property.getter.is_some());
                assert!(property.setter.is_some());
            }
            other => panic!("expected property, got {:?}", other),
        }
        assert_eq!(
            body(&unit),
            vec![
                INIT,
                "greeting = new ext.Label();",
                "greeting.label = \"Hello\";",
                "content = greeting;",
                EXECUTE,
            ]
        );
    }

    #[test]
    fn test_default_property_collects_multiple_children_into_array() {
        let unit = synthesize(indoc! {r#"
            <ext:Box xmlns:ext="ext.*">
              <ext:Label label="a"/>
              <ext:Label label="b"/>
            </ext:Box>
        "#});

        assert_eq!(
            body(&unit),
            vec![
                INIT,
                "var $$1:ext.Label = new ext.Label();",
                "$$1.label = \"a\";",
                "var $$2:ext.Label = new ext.Label();",
                "$$2.label = \"b\";",
                "content = [$$1, $$2];",
                EXECUTE,
            ]
        );
    }

    #[test]
    fn test_default_property_single_child_stays_bare() {
        let unit = synthesize(indoc! {r#"
            <ext:Box xmlns:ext="ext.*">
              <ext:Label label="a"/>
            </ext:Box>
        "#});
        assert!(body(&unit).contains(&"content = $$1;".to_string()));
    }

    #[test]
    fn test_default_property_of_array_type_always_wraps() {
        let unit = synthesize(indoc! {r#"
            <ext:List xmlns:ext="ext.*">
              <ext:Label label="a"/>
            </ext:List>
        "#});
        assert!(body(&unit).contains(&"entries = [$$1];".to_string()));
    }

    #[test]
    fn test_empty_nested_object_is_constructed_inline() {
        let unit = synthesize(indoc! {r#"
            <ext:Box xmlns:ext="ext.*">
              <ext:Label/>
            </ext:Box>
        "#});
        assert_eq!(
            body(&unit),
            vec![INIT, "content = new ext.Label();", EXECUTE]
        );
    }

    #[test]
    fn test_aux_vars_increase_across_nested_config_objects() {
        let unit = synthesize(indoc! {r#"
            <ext:Panel xmlns:ext="ext.*" title="Outer">
              <ext:Panel title="Inner">
                <ext:Label label="Deep"/>
              </ext:Panel>
            </ext:Panel>
        "#});

        assert_eq!(
            body(&unit),
            vec![
                INIT,
                "var $$2:Object = {};",
                "$$2.title = \"Outer\";",
                "var $$3:Object = {};",
                "$$3.title = \"Inner\";",
                "var $$5:ext.Label = new ext.Label();",
                "$$5.label = \"Deep\";",
                "$$3.items = [$$5];",
                "$$2.items = [new ext.Panel($$3)];",
                "if ($$1) for (var $$6:String in $$1) $$2[$$6] = $$1[$$6];",
                "super($$2);",
                EXECUTE,
            ]
        );

        let declared: Vec<u32> = statements(&unit)
            .iter()
            .filter_map(|s| match s {
                Statement::DeclareConfig { var, .. } | Statement::DeclareVar { var, .. } => {
                    var.trim_start_matches("$$").parse().ok()
                }
                _ => None,
            })
            .collect();
        assert!(declared.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_constructor_parameter_pass_through() {
        let unit = synthesize(indoc! {r#"
            <ext:Toolbar xmlns:ext="ext.*">
              <ext:Button text="OK"/>
            </ext:Toolbar>
        "#});

        assert_eq!(
            body(&unit),
            vec![
                INIT,
                "var $$1:Object = {};",
                "$$1.text = \"OK\";",
                "$$1.scale = \"medium\";",
                "buttons = [$$1];",
                EXECUTE,
            ]
        );
        assert!(!body(&unit).iter().any(|line| line.contains("new ext.Button")));
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // EVENTS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_event_on_config_superclass_forces_direct_pass() {
        let unit = synthesize(
            r#"<ext:Component xmlns:ext="ext.*" click="handle(event)" visible="false"/>"#,
        );

        assert_eq!(
            body(&unit),
            vec![
                INIT,
                "var $$2:Object = {};",
                "$$2.visible = false;",
                "if ($$1) for (var $$3:String in $$1) $$2[$$3] = $$1[$$3];",
                "super($$2);",
                "joo.addEventListener(this, \"click\", $on_this_click, ext.events.ClickEvent);",
                EXECUTE,
            ]
        );

        let handler = unit.class.get_method("$on_this_click").unwrap();
        assert_eq!(handler.return_type, "void");
        assert_eq!(handler.body, "handle(event)");
        assert_eq!(
            handler.params,
            vec![ParamModel::new("event", "ext.events.ClickEvent")]
        );
        assert!(unit.imports.contains("ext.events.ClickEvent"));
        assert!(unit.imports.contains("joo.addEventListener"));
    }

    #[test]
    fn test_event_name_prefix_and_default_type() {
        let unit = synthesize(r#"<ext:Component xmlns:ext="ext.*" onClose="done()"/>"#);
        assert!(body(&unit).contains(
            &"joo.addEventListener(this, \"Close\", $on_this_Close, Object);".to_string()
        ));
        assert!(!unit.imports.contains("Object"));
    }

    #[test]
    fn test_member_lookup_is_per_level_most_derived_first() {
        // Derived declares event `select` over an inherited field `select`, and
        // a property `toggle` over an inherited event `toggle`.
        let unit = synthesize(r#"<ext:Derived xmlns:ext="ext.*" select="pick()" toggle="true"/>"#);

        assert_eq!(
            body(&unit),
            vec![
                INIT,
                "joo.addEventListener(this, \"select\", $on_this_select, Object);",
                "toggle = true;",
                EXECUTE,
            ]
        );
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // DYNAMIC MEMBERS, RESOURCES, RESERVED BLOCKS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_dynamic_class_accepts_unknown_attributes() {
        let unit = synthesize(r#"<ext:Bag xmlns:ext="ext.*" colour="red" size="3"/>"#);
        assert_eq!(
            body(&unit),
            vec![INIT, "colour = \"red\";", "size = 3;", EXECUTE]
        );
        assert!(unit.class.get_member("colour").is_none());
    }

    #[test]
    fn test_force_dynamic_namespace_on_sealed_class() {
        let unit = synthesize(r#"<ext:Label xmlns:ext="ext.*" xmlns:u="mxml:untyped" u:colour="red"/>"#);
        assert_eq!(body(&unit), vec![INIT, "colour = \"red\";", EXECUTE]);
    }

    #[test]
    fn test_read_only_member_on_dynamic_class_becomes_dynamic_binding() {
        let unit = synthesize(r#"<ext:Meter xmlns:ext="ext.*" reading="{model.w}"/>"#);
        assert_eq!(count_pushes(&unit), 1);
        assert_eq!(
            unit.class.get_method("$bind_this_reading").map(|m| m.return_type.as_str()),
            Some(ANY_TYPE)
        );
    }

    #[test]
    fn test_braced_primitive_value_is_evaluated_as_code() {
        let unit = synthesize(indoc! {r#"
            <ext:Label xmlns:ext="ext.*" xmlns:fx="http://ns.adobe.com/mxml/2009">
              <fx:Declarations>
                <fx:Number id="limit">{base * 2}</fx:Number>
              </fx:Declarations>
            </ext:Label>
        "#});
        assert_eq!(body(&unit), vec![INIT, "limit = base * 2;", EXECUTE]);
        assert_eq!(count_pushes(&unit), 0);
    }

    #[test]
    fn test_resource_references_record_bundle_once() {
        let unit = synthesize(
            r#"<ext:Bag xmlns:ext="ext.*" title="@Resource(bundle='ui', key='title')" hint="@Resource(bundle='ui', key='hint')"/>"#,
        );

        assert_eq!(
            body(&unit),
            vec![
                INIT,
                "title = mx.resources.ResourceManager.getInstance().getString(\"ui\", \"title\");",
                "hint = mx.resources.ResourceManager.getInstance().getString(\"ui\", \"hint\");",
                EXECUTE,
            ]
        );
        let bundles: Vec<&AnnotationModel> = unit
            .class
            .annotations
            .iter()
            .filter(|a| a.name == RESOURCE_BUNDLE_ANNOTATION)
            .collect();
        assert_eq!(bundles.len(), 1);
        assert_eq!(bundles[0].get(None), Some("ui"));
        assert!(unit.imports.contains("mx.resources.ResourceManager"));
    }

    #[test]
    fn test_reserved_blocks_feed_class_body_and_declarations() {
        let unit = synthesize(indoc! {r#"
            <ext:Label xmlns:ext="ext.*" xmlns:fx="http://ns.adobe.com/mxml/2009">
              <fx:Script><![CDATA[ private function f():void {} ]]></fx:Script>
              <fx:Metadata>[Event(name="done")]</fx:Metadata>
              <fx:Declarations>
                <ext:Label id="helper" label="x"/>
                <fx:String id="greeting">Hello</fx:String>
              </fx:Declarations>
            </ext:Label>
        "#});

        assert_eq!(unit.class.body_code.len(), 1);
        assert!(unit.class.body_code[0].contains("private function f():void {}"));
        assert_eq!(unit.class.annotation_code, vec!["[Event(name=\"done\")]"]);
        assert_eq!(
            body(&unit),
            vec![
                INIT,
                "helper = new ext.Label();",
                "helper.label = \"x\";",
                "greeting = \"Hello\";",
                EXECUTE,
            ]
        );
        assert_eq!(
            unit.class.get_member("greeting").map(|m| m.type_name()),
            Some("String")
        );
        assert!(!unit.imports.contains("String"));
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // SURFACES
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_caching_resolver_gives_same_model() {
        let source = indoc! {r#"
            <ext:Panel xmlns:ext="ext.*" title="{model.title}">
              <ext:Label label="a"/>
            </ext:Panel>
        "#};
        let cached = CachingResolver::new(schema());
        assert_eq!(synthesize_with(source, &cached), synthesize(source));
        assert!(cached.cached_len() > 0);
    }

    #[test]
    fn test_output_model_serializes_to_json() {
        let unit = synthesize(r#"<ext:Label xmlns:ext="ext.*" label="Hi"/>"#);
        let json = serde_json::to_value(&unit).unwrap();

        assert_eq!(json["package"], "com.acme");
        assert_eq!(json["class"]["superclass"], "ext.Label");
        assert_eq!(json["class"]["constructor"]["body"][0]["kind"], "initBindings");
        assert_eq!(json["class"]["members"]["$bindings"]["kind"], "field");
    }

    #[test]
    fn test_unit_name_from_source_path() {
        let namespaces = NamespaceRegistry::with_defaults();
        let options = SynthesisOptions::default();
        let qualified_name = qualified_name_from_relative_path("com/acme/views/Main.mxml");
        let unit = synthesize_markup(
            r#"<ext:Label xmlns:ext="ext.*"/>"#,
            &qualified_name,
            &schema(),
            &namespaces,
            &options,
        )
        .unwrap();
        assert_eq!(unit.package, "com.acme.views");
        assert_eq!(unit.qualified_name(), "com.acme.views.Main");
    }
}
