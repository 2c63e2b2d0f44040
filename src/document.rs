//! # Markup Tree
//!
//! Component markup is parsed with `xml5ever` into an `RcDom` and converted
//! into an owned [`MarkupElement`] tree that the synthesizer walks.
//!
//! ## Invariants
//!
//! 1. **Namespaces**: every element and attribute carries its resolved
//!    namespace URI; `xmlns` declarations are not attributes.
//! 2. **Text Content**: an element has text iff its only child node is text.
//! 3. **Lines**: each element knows the 1-based line of its start tag.
//! 4. **Well-Formed Only**: any parse error, or more than one root element,
//!    rejects the document. Repaired trees are never synthesized.

use lazy_static::lazy_static;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use regex::Regex;
use serde::{Deserialize, Serialize};
use xml5ever::driver::{parse_document, XmlParseOpts};
use xml5ever::tendril::TendrilSink;

use crate::error::SynthesisError;

const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

lazy_static! {
    /// Start tags, skipping everything that can contain a `<` without
    /// opening an element.
    static ref START_TAG_RE: Regex = Regex::new(
        r"(?s)<!--.*?-->|<!\[CDATA\[.*?\]\]>|<\?.*?\?>|<![^>]*>|<([A-Za-z_][^\s/>]*)"
    )
    .unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════════
// TREE TYPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkupAttribute {
    /// Empty for unprefixed attributes.
    pub namespace: String,
    pub local_name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkupElement {
    pub namespace: String,
    pub local_name: String,
    pub prefix: Option<String>,
    pub attributes: Vec<MarkupAttribute>,
    pub children: Vec<MarkupElement>,
    pub text: String,
    pub line: u32,
}

impl MarkupElement {
    pub fn new(namespace: &str, local_name: &str) -> Self {
        MarkupElement {
            namespace: namespace.to_string(),
            local_name: local_name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, local_name: &str, value: &str) -> Self {
        self.attributes.push(MarkupAttribute {
            namespace: String::new(),
            local_name: local_name.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn with_namespaced_attribute(mut self, namespace: &str, local_name: &str, value: &str) -> Self {
        self.attributes.push(MarkupAttribute {
            namespace: namespace.to_string(),
            local_name: local_name.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn with_child(mut self, child: MarkupElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    /// Value of an unprefixed attribute.
    pub fn attribute(&self, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.is_empty() && a.local_name == local_name)
            .map(|a| a.value.as_str())
    }

    /// `namespace:localName`, as used in diagnostics.
    pub fn display_name(&self) -> String {
        format!("{}:{}", self.namespace, self.local_name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkupDocument {
    pub root: MarkupElement,
}

// ═══════════════════════════════════════════════════════════════════════════════
// PARSING
// ═══════════════════════════════════════════════════════════════════════════════

/// Lines of all start tags, in document order.
fn start_tag_lines(source: &str) -> Vec<u32> {
    let mut lines = Vec::new();
    let mut line = 1u32;
    let mut last = 0usize;
    for caps in START_TAG_RE.captures_iter(source) {
        let Some(whole) = caps.get(0) else { continue };
        line += source[last..whole.start()].matches('\n').count() as u32;
        last = whole.start();
        if caps.get(1).is_some() {
            lines.push(line);
        }
    }
    lines
}

fn is_namespace_declaration(prefix: Option<&str>, namespace: &str, local_name: &str) -> bool {
    namespace == XMLNS_NAMESPACE
        || prefix == Some("xmlns")
        || (prefix.is_none() && local_name == "xmlns")
}

fn convert_element(handle: &Handle, lines: &[u32], next_line: &mut usize) -> Option<MarkupElement> {
    let NodeData::Element { name, attrs, .. } = &handle.data else {
        return None;
    };

    let line = lines.get(*next_line).copied().unwrap_or(0);
    *next_line += 1;

    let attributes = attrs
        .borrow()
        .iter()
        .filter(|attr| {
            !is_namespace_declaration(
                attr.name.prefix.as_ref().map(|p| &**p),
                &attr.name.ns,
                &attr.name.local,
            )
        })
        .map(|attr| MarkupAttribute {
            namespace: attr.name.ns.to_string(),
            local_name: attr.name.local.to_string(),
            value: attr.value.to_string(),
        })
        .collect();

    let child_nodes = handle.children.borrow();
    let text = match child_nodes.as_slice() {
        [only] => match &only.data {
            NodeData::Text { contents } => contents.borrow().to_string(),
            _ => String::new(),
        },
        _ => String::new(),
    };

    let children = child_nodes
        .iter()
        .filter_map(|child| convert_element(child, lines, next_line))
        .collect();

    Some(MarkupElement {
        namespace: name.ns.to_string(),
        local_name: name.local.to_string(),
        prefix: name.prefix.as_ref().map(|p| p.to_string()),
        attributes,
        children,
        text,
        line,
    })
}

/// Parses a namespace-aware markup document.
pub fn parse_markup(source: &str) -> Result<MarkupDocument, SynthesisError> {
    let dom: RcDom = parse_document(RcDom::default(), XmlParseOpts::default()).one(source);

    if let Some(message) = dom.errors.first() {
        tracing::debug!(count = dom.errors.len(), "markup rejected");
        return Err(SynthesisError::MalformedMarkup {
            message: message.to_string(),
        });
    }

    let lines = start_tag_lines(source);
    let mut next_line = 0usize;
    let mut roots: Vec<MarkupElement> = dom
        .document
        .children
        .borrow()
        .iter()
        .filter_map(|child| convert_element(child, &lines, &mut next_line))
        .collect();
    if roots.len() > 1 {
        return Err(SynthesisError::MalformedMarkup {
            message: format!("document has {} root elements", roots.len()),
        });
    }
    let root = roots.pop().ok_or_else(|| SynthesisError::MalformedMarkup {
        message: "document has no root element".to_string(),
    })?;

    tracing::debug!(root = %root.display_name(), "parsed markup");
    Ok(MarkupDocument { root })
}
