//! Conversion of raw `EXPLAIN (FORMAT JSON)` plan documents into [`PlanNode`] trees.
//!
//! The walk is iterative so that the visit and depth ceilings, not the call
//! stack, bound malformed input. Nodes are numbered in post-order: every
//! child subtree is completed (and indexed) before its parent.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::node::{strip_text_casts, value_text, Condition, ConditionField, PlanNode};
use crate::error::{PlanError, Result};

/// Key holding the ordered child documents.
const PLANS_KEY: &str = "Plans";

/// Ceilings applied while walking a plan document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NormalizerOptions {
    /// Maximum number of node documents visited.
    pub max_visits: usize,
    /// Maximum nesting depth (the root is depth 0).
    pub max_depth: usize,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            max_visits: 100_000,
            max_depth: 1_000,
        }
    }
}

/// Builds [`PlanNode`] trees from plan documents.
#[derive(Clone, Debug, Default)]
pub struct Normalizer {
    options: NormalizerOptions,
}

impl Normalizer {
    /// Creates a normalizer with the given ceilings.
    pub fn new(options: NormalizerOptions) -> Self {
        Self { options }
    }

    /// Returns the configured ceilings.
    pub fn options(&self) -> &NormalizerOptions {
        &self.options
    }

    /// Normalizes the document of a single plan (the value under `"Plan"`).
    pub fn normalize(&self, document: &Value) -> Result<PlanNode> {
        let mut visits = 1usize;
        let mut max_seen_depth = 0usize;
        let mut next_index = 0usize;
        let mut stack = vec![Frame::enter(document, 0)?];

        while let Some(top) = stack.last_mut() {
            if let Some(child) = top.next_child() {
                let depth = top.depth + 1;
                visits += 1;
                if visits > self.options.max_visits {
                    warn!(limit = self.options.max_visits, "plan.normalize.too_many_nodes");
                    return Err(PlanError::TooManyNodes {
                        limit: self.options.max_visits,
                    });
                }
                if depth > self.options.max_depth {
                    warn!(limit = self.options.max_depth, "plan.normalize.depth_exceeded");
                    return Err(PlanError::DepthExceeded {
                        limit: self.options.max_depth,
                    });
                }
                max_seen_depth = max_seen_depth.max(depth);
                stack.push(Frame::enter(child, depth)?);
                continue;
            }

            let Some(done) = stack.pop() else { break };
            let node = done.finish(next_index);
            next_index += 1;
            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => {
                    debug!(
                        nodes = next_index,
                        depth = max_seen_depth,
                        kind = %node.kind,
                        "plan.normalize.completed"
                    );
                    return Ok(node);
                }
            }
        }

        Err(PlanError::MalformedPlan("plan traversal ended without a root".into()))
    }
}

/// Partially built node waiting for its children.
struct Frame<'a> {
    kind: String,
    cost: f64,
    condition: Option<Condition>,
    attributes: Map<String, Value>,
    plans: &'a [Value],
    cursor: usize,
    children: Vec<PlanNode>,
    depth: usize,
}

impl<'a> Frame<'a> {
    fn enter(document: &'a Value, depth: usize) -> Result<Self> {
        let object = document.as_object().ok_or_else(|| {
            PlanError::MalformedPlan(format!("plan node at depth {depth} is not an object"))
        })?;

        let kind = object
            .get("Node Type")
            .and_then(Value::as_str)
            .filter(|kind| !kind.trim().is_empty())
            .ok_or_else(|| PlanError::missing_field("<unknown>", "Node Type"))?
            .to_string();

        let cost = object
            .get("Total Cost")
            .and_then(Value::as_f64)
            .ok_or_else(|| PlanError::missing_field(&kind, "Total Cost"))?;
        if !cost.is_finite() || cost < 0.0 {
            return Err(PlanError::MalformedPlan(format!(
                "'{kind}' node has invalid Total Cost {cost}"
            )));
        }

        let plans: &'a [Value] = match object.get(PLANS_KEY) {
            None | Some(Value::Null) => &[],
            Some(Value::Array(items)) => items.as_slice(),
            Some(_) => {
                return Err(PlanError::MalformedPlan(format!(
                    "'{kind}' node has a non-array Plans field"
                )))
            }
        };

        let attributes: Map<String, Value> = object
            .iter()
            .filter(|(key, _)| key.as_str() != PLANS_KEY)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self {
            condition: extract_condition(object),
            kind,
            cost,
            attributes,
            plans,
            cursor: 0,
            children: Vec::with_capacity(plans.len()),
            depth,
        })
    }

    fn next_child(&mut self) -> Option<&'a Value> {
        let child = self.plans.get(self.cursor)?;
        self.cursor += 1;
        Some(child)
    }

    fn finish(self, index: usize) -> PlanNode {
        PlanNode::from_parts(
            self.kind,
            self.cost,
            index,
            self.condition,
            self.children,
            self.attributes,
        )
    }
}

/// Picks the first present condition field in priority order.
pub(crate) fn extract_condition(object: &Map<String, Value>) -> Option<Condition> {
    ConditionField::PRIORITY.iter().find_map(|field| {
        let values = match object.get(field.as_str())? {
            Value::Null => return None,
            Value::String(s) => vec![strip_text_casts(s)],
            Value::Array(items) => items.iter().map(value_text).collect(),
            other => vec![value_text(other)],
        };
        Some(Condition {
            field: *field,
            values,
        })
    })
}
