#![forbid(unsafe_code)]

//! Comparison of the executed plan (QEP) with alternative plans (AQPs).
//!
//! Each AQP is aligned against the QEP, every aligned pair goes through the
//! comparison heuristic, and the per-AQP results are merged into one
//! [`InsightMap`] keyed by the QEP node's condition value.

mod align;
mod heuristic;
mod merge;

pub use align::{align, compare_plans, AlignStrategy, AlignedPair, PassInsights};
pub use heuristic::{
    compare_nodes, format_cost, operation_family, same_family, Insight, BLANK_CONDITION_KEY,
};
pub use merge::InsightMap;
