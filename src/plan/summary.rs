//! Headline figures reported for a single plan.

use serde::Serialize;

use super::node::PlanNode;

const INDEX_SCAN_KINDS: [&str; 3] = ["Index Scan", "Index Only Scan", "Bitmap Index Scan"];

/// Headline figures for a plan.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlanSummary {
    /// Estimated total cost of the root node.
    pub total_cost: f64,
    /// Estimated rows produced by the root node, if reported.
    pub plan_rows: Option<f64>,
    /// Number of operators in the plan.
    pub node_count: usize,
    /// Number of sequential scans.
    pub seq_scans: usize,
    /// Number of index-driven scans.
    pub index_scans: usize,
}

impl PlanSummary {
    /// Computes the summary of the tree rooted at `root`.
    pub fn from_plan(root: &PlanNode) -> Self {
        let nodes = root.post_order();
        Self {
            total_cost: root.cost,
            plan_rows: root.attr("Plan Rows").and_then(|v| v.as_f64()),
            node_count: nodes.len(),
            seq_scans: nodes.iter().filter(|n| n.kind == "Seq Scan").count(),
            index_scans: nodes
                .iter()
                .filter(|n| INDEX_SCAN_KINDS.contains(&n.kind.as_str()))
                .count(),
        }
    }
}
