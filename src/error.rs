//! Synthesis errors.
//!
//! Every failure aborts the whole invocation: there is no accumulation and no
//! partial model. Each variant names the offending element by namespace URI and
//! local name so tooling can point at it.

#[cfg(feature = "napi")]
use napi_derive::napi;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_UNRESOLVED_CLASS: &str = "MX-ERR-CLASS-001";
pub const ERR_CYCLIC_INHERITANCE: &str = "MX-ERR-CLASS-002";
pub const ERR_UNKNOWN_RESERVED_ELEMENT: &str = "MX-ERR-MARKUP-001";
pub const ERR_UNDEFINED_MEMBER: &str = "MX-ERR-MEMBER-001";
pub const ERR_UNRESOLVABLE_REFERENCE: &str = "MX-ERR-CLASS-003";
pub const ERR_MALFORMED_MARKUP: &str = "MX-ERR-MARKUP-002";

fn get_guarantee(code: &str) -> &'static str {
    match code {
        ERR_UNRESOLVED_CLASS => "Every markup element maps to exactly one class.",
        ERR_CYCLIC_INHERITANCE => "A component never extends itself.",
        ERR_UNKNOWN_RESERVED_ELEMENT => {
            "Only Declarations, Script and Metadata live in the markup namespace."
        }
        ERR_UNDEFINED_MEMBER => {
            "Attributes and property elements resolve against the declared class shape."
        }
        ERR_UNRESOLVABLE_REFERENCE => "Every referenced class has a backing declaration.",
        ERR_MALFORMED_MARKUP => "Input documents are well-formed and have a root element.",
        _ => "Unknown invariant.",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    #[error("could not resolve class from element {namespace}:{local_name} (line {line})")]
    UnresolvedClass {
        namespace: String,
        local_name: String,
        line: u32,
    },

    #[error(
        "cyclic inheritance: {qualified_name} extends itself \
         (element {namespace}:{local_name}, line {line})"
    )]
    CyclicInheritance {
        qualified_name: String,
        namespace: String,
        local_name: String,
        line: u32,
    },

    #[error("unknown reserved element {namespace}:{local_name} (line {line})")]
    UnknownReservedElement {
        namespace: String,
        local_name: String,
        line: u32,
    },

    #[error(
        "property {namespace}:{name} not found in class {class_name} \
         (element {element}, line {line})"
    )]
    UndefinedMember {
        class_name: String,
        namespace: String,
        name: String,
        element: String,
        line: u32,
    },

    #[error(
        "undefined type {qualified_name} referenced from element \
         {namespace}:{local_name} (line {line})"
    )]
    UnresolvableEmbeddedReference {
        qualified_name: String,
        namespace: String,
        local_name: String,
        line: u32,
    },

    #[error("malformed markup: {message}")]
    MalformedMarkup { message: String },
}

impl SynthesisError {
    pub fn code(&self) -> &'static str {
        match self {
            SynthesisError::UnresolvedClass { .. } => ERR_UNRESOLVED_CLASS,
            SynthesisError::CyclicInheritance { .. } => ERR_CYCLIC_INHERITANCE,
            SynthesisError::UnknownReservedElement { .. } => ERR_UNKNOWN_RESERVED_ELEMENT,
            SynthesisError::UndefinedMember { .. } => ERR_UNDEFINED_MEMBER,
            SynthesisError::UnresolvableEmbeddedReference { .. } => ERR_UNRESOLVABLE_REFERENCE,
            SynthesisError::MalformedMarkup { .. } => ERR_MALFORMED_MARKUP,
        }
    }

    pub fn guarantee(&self) -> &'static str {
        get_guarantee(self.code())
    }

    pub fn line(&self) -> u32 {
        match self {
            SynthesisError::UnresolvedClass { line, .. }
            | SynthesisError::CyclicInheritance { line, .. }
            | SynthesisError::UnknownReservedElement { line, .. }
            | SynthesisError::UndefinedMember { line, .. }
            | SynthesisError::UnresolvableEmbeddedReference { line, .. } => *line,
            SynthesisError::MalformedMarkup { .. } => 0,
        }
    }

    /// Flattens the error into the serialisable record handed across the
    /// native boundary.
    pub fn into_compiler_error(self, file: &str) -> CompilerError {
        CompilerError {
            code: self.code().to_string(),
            message: self.to_string(),
            guarantee: self.guarantee().to_string(),
            file: file.to_string(),
            line: self.line(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILER ERROR RECORD
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "napi", napi(object))]
#[serde(rename_all = "camelCase")]
pub struct CompilerError {
    pub code: String,
    pub message: String,
    pub guarantee: String,
    pub file: String,
    pub line: u32,
}
