//! Cost comparison between one QEP node and its aligned AQP node.

use serde::Serialize;
use tracing::debug;

use crate::plan::PlanNode;

/// Key used for insights whose QEP node carries no condition.
pub const BLANK_CONDITION_KEY: &str = "";

/// A sentence explaining that the alternative plan is costlier at a condition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Insight {
    /// Condition value of the QEP node the insight belongs to.
    pub condition_key: String,
    /// Rendered sentence.
    pub text: String,
}

/// Operation family of a node kind: its second whitespace-separated token.
///
/// `Loop` is folded into `Join` so nested loops compare against hash and
/// merge joins.
pub fn operation_family(kind: &str) -> Option<&str> {
    match kind.split_whitespace().nth(1)? {
        "Loop" => Some("Join"),
        family => Some(family),
    }
}

/// Whether two node kinds belong to the same operation family.
pub fn same_family(qep_kind: &str, aqp_kind: &str) -> bool {
    match (operation_family(qep_kind), operation_family(aqp_kind)) {
        (Some(qep), Some(aqp)) => qep == aqp,
        _ => false,
    }
}

fn round_cost(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Formats a cost difference with at most two decimals.
pub fn format_cost(value: f64) -> String {
    let text = format!("{:.2}", round_cost(value));
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Compares an aligned pair, returning an insight when the AQP node is a
/// costlier alternative of the same family with a different condition.
pub fn compare_nodes(qep: &PlanNode, aqp: &PlanNode) -> Option<Insight> {
    if !same_family(&qep.kind, &aqp.kind) {
        return None;
    }
    let diff = aqp.cost - qep.cost;
    // differences that print as zero are not reported
    if round_cost(diff) <= 0.0 {
        return None;
    }
    if qep.sorted_condition_values() == aqp.sorted_condition_values() {
        return None;
    }

    let shown = aqp.condition_key().or_else(|| qep.condition_key())?;
    let insight = Insight {
        condition_key: qep
            .condition_key()
            .unwrap_or(BLANK_CONDITION_KEY)
            .to_string(),
        text: format!(
            "AQP chooses to do {} on {} that increases cost by {}",
            aqp.kind,
            shown,
            format_cost(diff)
        ),
    };
    debug!(
        qep_index = qep.index,
        aqp_index = aqp.index,
        key = %insight.condition_key,
        "insight.heuristic.emitted"
    );
    Some(insight)
}
