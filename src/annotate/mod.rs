#![forbid(unsafe_code)]

//! Natural-language rendering of executed plans.
//!
//! The [`Renderer`] keeps a dispatch table from `Node Type` to a template
//! function. Each template describes one QEP node; the insights merged for
//! that node's condition key are appended after the template sentence.

mod kind;
mod markup;
mod templates;

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::insight::{InsightMap, BLANK_CONDITION_KEY};
use crate::plan::PlanNode;

pub use kind::NodeKind;
pub use markup::{bold, bold_list, italics};
pub use templates::{fallback, Template};

/// Rendered annotations, one per QEP node in post-order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AnnotationDocument {
    lines: Vec<String>,
}

impl AnnotationDocument {
    /// Number of annotated nodes.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the document holds no annotation.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Annotations in execution order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Iterates over the annotations.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for AnnotationDocument {
    fn from(lines: Vec<String>) -> Self {
        Self { lines }
    }
}

/// Dispatches plan nodes to their annotation templates.
#[derive(Clone, Debug)]
pub struct Renderer {
    templates: HashMap<String, Template>,
}

impl Default for Renderer {
    fn default() -> Self {
        let templates = NodeKind::ALL
            .iter()
            .map(|kind| (kind.as_str().to_string(), kind.template()))
            .collect();
        Self { templates }
    }
}

impl Renderer {
    /// Renderer with the built-in templates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the template used for `kind`.
    pub fn register(&mut self, kind: impl Into<String>, template: Template) -> &mut Self {
        self.templates.insert(kind.into(), template);
        self
    }

    /// Whether `kind` has a template.
    pub fn knows(&self, kind: &str) -> bool {
        self.templates.contains_key(kind)
    }

    /// Renders one node with every insight stored under its condition key.
    pub fn render_node(&self, node: &PlanNode, insights: &InsightMap) -> Result<String> {
        let key = node.condition_key();
        self.render_with(node, key.map(|key| insights.get(key)).unwrap_or(&[]))
    }

    /// Renders the whole plan in post-order.
    ///
    /// Each condition key is consumed by the first node that carries it, so
    /// later nodes with the same key are rendered without insights.
    pub fn render_plan(&self, root: &PlanNode, insights: &InsightMap) -> Result<AnnotationDocument> {
        let mut consumed: HashSet<&str> = HashSet::new();
        let mut lines = Vec::with_capacity(root.node_count());
        for node in root.post_order() {
            let attached: &[String] = match node.condition_key() {
                Some(key) if consumed.insert(key) => insights.get(key),
                _ => &[],
            };
            lines.push(self.render_with(node, attached)?);
        }
        Ok(AnnotationDocument { lines })
    }

    fn render_with(&self, node: &PlanNode, insights: &[String]) -> Result<String> {
        let Some(template) = self.templates.get(node.kind.as_str()) else {
            debug!(kind = %node.kind, "annotate.fallback");
            return Ok(fallback(node));
        };
        let mut text = template(node)?;
        if node.condition_key() != Some(BLANK_CONDITION_KEY) {
            for insight in insights {
                text.push(' ');
                text.push_str(insight);
                text.push('.');
            }
        }
        Ok(text)
    }
}
