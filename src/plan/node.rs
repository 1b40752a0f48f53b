//! Normalized plan-tree node.

use serde_json::{Map, Value};

use crate::error::{PlanError, Result};

/// Plan fields that can serve as a node's condition, in priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConditionField {
    /// `Filter`
    Filter,
    /// `Sort Key`
    SortKey,
    /// `Group Key`
    GroupKey,
    /// `Hash Cond`
    HashCond,
    /// `Index Cond`
    IndexCond,
}

impl ConditionField {
    /// Fields in the order the normalizer tries them; the first present one wins.
    pub const PRIORITY: [ConditionField; 5] = [
        ConditionField::Filter,
        ConditionField::SortKey,
        ConditionField::GroupKey,
        ConditionField::HashCond,
        ConditionField::IndexCond,
    ];

    /// Key used for this field in `EXPLAIN (FORMAT JSON)` output.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionField::Filter => "Filter",
            ConditionField::SortKey => "Sort Key",
            ConditionField::GroupKey => "Group Key",
            ConditionField::HashCond => "Hash Cond",
            ConditionField::IndexCond => "Index Cond",
        }
    }
}

/// The single condition kept for a node.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    /// Field the condition was taken from.
    pub field: ConditionField,
    /// Cleaned values; one for predicate strings, one per key for key lists.
    pub values: Vec<String>,
}

impl Condition {
    /// First value, used as the insight key.
    pub fn key(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

/// Removes `::text` cast decoration from a predicate or key.
pub fn strip_text_casts(value: &str) -> String {
    value.replace("::text", "")
}

/// One operator of a normalized plan tree.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanNode {
    /// Planner operation name, e.g. `Seq Scan`.
    pub kind: String,
    /// Estimated total cost of the subtree rooted here.
    pub cost: f64,
    /// Post-order rank within this node's own tree.
    pub index: usize,
    /// Highest-priority condition present on the source node.
    pub condition: Option<Condition>,
    /// Child operators in document order.
    pub children: Vec<PlanNode>,
    attributes: Map<String, Value>,
}

impl PlanNode {
    pub(crate) fn from_parts(
        kind: String,
        cost: f64,
        index: usize,
        condition: Option<Condition>,
        children: Vec<PlanNode>,
        attributes: Map<String, Value>,
    ) -> Self {
        Self {
            kind,
            cost,
            index,
            condition,
            children,
            attributes,
        }
    }

    /// Condition key, if the node carries a non-empty condition.
    pub fn condition_key(&self) -> Option<&str> {
        self.condition.as_ref().and_then(Condition::key)
    }

    /// Condition values sorted for order-insensitive comparison.
    pub fn sorted_condition_values(&self) -> Vec<&str> {
        let mut values: Vec<&str> = self
            .condition
            .iter()
            .flat_map(|c| c.values.iter().map(String::as_str))
            .collect();
        values.sort_unstable();
        values
    }

    /// Raw source field other than `Plans`.
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name).filter(|v| !v.is_null())
    }

    /// Raw source field as a string.
    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attr(name).and_then(Value::as_str)
    }

    /// String field with `::text` casts removed.
    pub fn attr_cleaned(&self, name: &str) -> Option<String> {
        self.attr_str(name).map(strip_text_casts)
    }

    /// String or list-of-strings field, cleaned of `::text` casts.
    pub fn attr_list(&self, name: &str) -> Option<Vec<String>> {
        match self.attr(name)? {
            Value::Array(items) => Some(items.iter().map(value_text).collect()),
            other => Some(vec![value_text(other)]),
        }
    }

    /// Like [`PlanNode::attr_str`] but fails when absent.
    pub fn require_str(&self, field: &'static str) -> Result<&str> {
        self.attr_str(field)
            .ok_or_else(|| PlanError::missing_field(&self.kind, field))
    }

    /// Like [`PlanNode::attr_list`] but fails when absent.
    pub fn require_list(&self, field: &'static str) -> Result<Vec<String>> {
        self.attr_list(field)
            .ok_or_else(|| PlanError::missing_field(&self.kind, field))
    }

    /// Nodes of the tree in post-order, which is also `index` order.
    pub fn post_order(&self) -> Vec<&PlanNode> {
        let mut out = Vec::new();
        let mut stack: Vec<(&PlanNode, usize)> = vec![(self, 0)];
        while let Some((node, next)) = stack.pop() {
            match node.children.get(next) {
                Some(child) => {
                    stack.push((node, next + 1));
                    stack.push((child, 0));
                }
                None => out.push(node),
            }
        }
        out
    }

    /// Number of nodes in the tree rooted here.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => strip_text_casts(s),
        other => strip_text_casts(&other.to_string()),
    }
}
