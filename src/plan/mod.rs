#![forbid(unsafe_code)]

//! Plan documents and their normalized tree form.
//!
//! A raw `EXPLAIN (FORMAT JSON)` document is unwrapped with
//! [`extract_plan`] and turned into a [`PlanNode`] tree by the [`Normalizer`].

mod document;
mod node;
mod normalize;
mod summary;

pub use document::{explain_statement, extract_plan, parse_explain_output, EXPLAIN_PREFIX};
pub use node::{strip_text_casts, Condition, ConditionField, PlanNode};
pub use normalize::{Normalizer, NormalizerOptions};
pub use summary::PlanSummary;
