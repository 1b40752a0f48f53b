//! Pairing of QEP nodes with AQP nodes.
//!
//! Two strategies are offered because neither is correct for every shape:
//!
//! - [`AlignStrategy::Structural`] walks both trees together and pairs child
//!   `i` with child `i` at every level, descending only where both sides
//!   have that child. Subtrees without a counterpart are skipped.
//! - [`AlignStrategy::Index`] pairs nodes with equal post-order index. It is
//!   exact for identically shaped trees and pairs unrelated operators once
//!   the shapes diverge.
//!
//! Either way every QEP node is paired with at most one AQP node per pass.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::heuristic::compare_nodes;
use crate::plan::PlanNode;

/// How QEP and AQP nodes are matched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignStrategy {
    /// Zip children position by position.
    #[default]
    Structural,
    /// Match nodes by post-order index.
    Index,
}

impl AlignStrategy {
    /// Name used in configuration files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlignStrategy::Structural => "structural",
            AlignStrategy::Index => "index",
        }
    }
}

impl fmt::Display for AlignStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlignStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "structural" | "zip" => Ok(AlignStrategy::Structural),
            "index" => Ok(AlignStrategy::Index),
            other => Err(format!(
                "unknown alignment strategy '{other}' (expected 'structural' or 'index')"
            )),
        }
    }
}

/// A QEP node and the AQP node it was matched with.
#[derive(Clone, Copy, Debug)]
pub struct AlignedPair<'a> {
    /// Node from the executed plan.
    pub qep: &'a PlanNode,
    /// Node from the alternative plan.
    pub aqp: &'a PlanNode,
}

/// Insights from a single AQP: condition key to sentence.
///
/// A later pair with the same key replaces an earlier one.
pub type PassInsights = BTreeMap<String, String>;

/// Matches the nodes of two trees.
pub fn align<'a>(
    qep: &'a PlanNode,
    aqp: &'a PlanNode,
    strategy: AlignStrategy,
) -> Vec<AlignedPair<'a>> {
    match strategy {
        AlignStrategy::Structural => zip_pairs(qep, aqp),
        AlignStrategy::Index => index_pairs(qep, aqp),
    }
}

fn zip_pairs<'a>(qep: &'a PlanNode, aqp: &'a PlanNode) -> Vec<AlignedPair<'a>> {
    let mut pairs = Vec::new();
    let mut stack = vec![(qep, aqp)];
    while let Some((q, a)) = stack.pop() {
        pairs.push(AlignedPair { qep: q, aqp: a });
        // reversed so the first child pair is visited first
        for (qc, ac) in q.children.iter().zip(a.children.iter()).rev() {
            stack.push((qc, ac));
        }
    }
    pairs
}

fn index_pairs<'a>(qep: &'a PlanNode, aqp: &'a PlanNode) -> Vec<AlignedPair<'a>> {
    let aqp_nodes = aqp.post_order();
    qep.post_order()
        .into_iter()
        .filter_map(|q| {
            aqp_nodes
                .get(q.index)
                .copied()
                .map(|a| AlignedPair { qep: q, aqp: a })
        })
        .collect()
}

/// Aligns one AQP against the QEP and runs the comparison heuristic on every pair.
pub fn compare_plans(qep: &PlanNode, aqp: &PlanNode, strategy: AlignStrategy) -> PassInsights {
    let pairs = align(qep, aqp, strategy);
    let mut insights = PassInsights::new();
    for pair in &pairs {
        trace!(
            qep_index = pair.qep.index,
            qep_kind = %pair.qep.kind,
            aqp_index = pair.aqp.index,
            aqp_kind = %pair.aqp.kind,
            "insight.align.pair"
        );
        if let Some(insight) = compare_nodes(pair.qep, pair.aqp) {
            insights.insert(insight.condition_key, insight.text);
        }
    }
    debug!(
        strategy = %strategy,
        pairs = pairs.len(),
        insights = insights.len(),
        "insight.align.completed"
    );
    insights
}
