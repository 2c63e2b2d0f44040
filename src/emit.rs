//! Code Emitter
//!
//! Constructor bodies are built as an ordered sequence of [`Statement`] values
//! and only turned into text at the output boundary. The rendered text is a
//! runtime contract: the binding list is initialized first, listeners are
//! registered through a four-argument hook, and bindings are executed last.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix of every auxiliary variable name.
pub const AUX_VAR_PREFIX: &str = "$$";

// ═══════════════════════════════════════════════════════════════════════════════
// EXPRESSIONS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Expr {
    /// A literal rendered in JSON syntax (strings quoted and escaped).
    Literal(serde_json::Value),
    /// Verbatim code, e.g. a binding getter call or a numeric primitive.
    Code(String),
    New { class: String, args: Vec<Expr> },
    Array(Vec<Expr>),
    Var(String),
    EmptyObject,
}

impl Expr {
    pub fn string(value: &str) -> Self {
        Expr::Literal(serde_json::Value::String(value.to_string()))
    }

    pub fn null() -> Self {
        Expr::Literal(serde_json::Value::Null)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(value) => write!(f, "{}", value),
            Expr::Code(code) => f.write_str(code),
            Expr::New { class, args } => write!(f, "new {}({})", class, join(args)),
            Expr::Array(items) => write!(f, "[{}]", join(items)),
            Expr::Var(name) => f.write_str(name),
            Expr::EmptyObject => f.write_str("{}"),
        }
    }
}

fn join(exprs: &[Expr]) -> String {
    exprs
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATEMENTS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Statement {
    InitBindings {
        field: String,
    },
    DeclareConfig {
        var: String,
        type_name: String,
    },
    Assign {
        target: String,
        property: String,
        value: Expr,
    },
    CopyConfigParams {
        key: String,
        param: String,
        config: String,
    },
    SuperCall {
        args: Vec<Expr>,
    },
    DeclareVar {
        var: String,
        type_name: String,
        value: Expr,
    },
    AssignVar {
        var: String,
        value: Expr,
    },
    AddEventListener {
        hook: String,
        target: String,
        event: String,
        handler: String,
        event_type: String,
    },
    PushBinding {
        field: String,
        binding_class: String,
        getter: String,
        target: String,
        property: String,
    },
    ExecuteBindings {
        field: String,
    },
}

/// `this` members are addressed bare so the text also works inside the setter
/// closures of live bindings.
fn assignment(target: &str, property: &str, value: &dyn fmt::Display) -> String {
    if target == "this" {
        format!("{} = {};", property, value)
    } else {
        format!("{}.{} = {};", target, property, value)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::InitBindings { field } => write!(f, "{} = [];", field),
            Statement::DeclareConfig { var, type_name } => {
                write!(f, "var {}:{} = {{}};", var, type_name)
            }
            Statement::Assign {
                target,
                property,
                value,
            } => f.write_str(&assignment(target, property, value)),
            Statement::CopyConfigParams { key, param, config } => write!(
                f,
                "if ({param}) for (var {key}:String in {param}) {config}[{key}] = {param}[{key}];",
                key = key,
                param = param,
                config = config
            ),
            Statement::SuperCall { args } => write!(f, "super({});", join(args)),
            Statement::DeclareVar {
                var,
                type_name,
                value,
            } => write!(f, "var {}:{} = {};", var, type_name, value),
            Statement::AssignVar { var, value } => write!(f, "{} = {};", var, value),
            Statement::AddEventListener {
                hook,
                target,
                event,
                handler,
                event_type,
            } => write!(
                f,
                "{}({}, {}, {}, {});",
                hook,
                target,
                serde_json::Value::String(event.clone()),
                handler,
                event_type
            ),
            Statement::PushBinding {
                field,
                binding_class,
                getter,
                target,
                property,
            } => write!(
                f,
                "{}.push(new {}({}, function($value){{ {} }}));",
                field,
                binding_class,
                getter,
                assignment(target, property, &"$value")
            ),
            Statement::ExecuteBindings { field } => write!(
                f,
                "for each (var $binding in {}) $binding.execute();",
                field
            ),
        }
    }
}

pub fn render_statements(statements: &[Statement]) -> String {
    statements
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

// ═══════════════════════════════════════════════════════════════════════════════
// EMITTER
// ═══════════════════════════════════════════════════════════════════════════════

/// Append-only statement buffer plus the auxiliary-name counter, owned by
/// exactly one synthesis invocation.
#[derive(Debug, Default)]
pub struct CodeEmitter {
    statements: Vec<Statement>,
    aux_var_index: u32,
}

impl CodeEmitter {
    pub fn new() -> Self {
        CodeEmitter::default()
    }

    /// Allocates the next auxiliary variable name (`$$1`, `$$2`, ...).
    pub fn aux_var(&mut self) -> String {
        self.aux_var_index += 1;
        format!("{}{}", AUX_VAR_PREFIX, self.aux_var_index)
    }

    pub fn emit(&mut self, statement: Statement) {
        tracing::trace!(statement = %statement, "emit");
        self.statements.push(statement);
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn finish(self) -> Vec<Statement> {
        self.statements
    }
}
