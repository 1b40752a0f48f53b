//! Plain-language explanations of PostgreSQL query plans.
//!
//! The executed plan (QEP) of a query is compared with alternative plans
//! (AQPs) obtained under perturbed planner cost settings. Wherever an
//! alternative makes a costlier choice for the same kind of operation, an
//! insight is recorded, and every QEP node is described in a sentence that
//! carries the insights found for it.
//!
//! ```
//! use planlens::explain::PlanAnalyzer;
//! use serde_json::json;
//!
//! let qep = json!({"Node Type": "Seq Scan", "Total Cost": 100,
//!                  "Relation Name": "t", "Filter": "a > 1"});
//! let aqp = json!({"Node Type": "Index Scan", "Total Cost": 150,
//!                  "Index Cond": "b > 2"});
//! let report = PlanAnalyzer::default().analyze(&qep, &[aqp]).unwrap();
//! assert_eq!(report.annotations.len(), 1);
//! ```

#![warn(missing_docs)]

pub mod annotate;
pub mod error;
pub mod explain;
pub mod insight;
pub mod plan;

pub use annotate::{AnnotationDocument, NodeKind, Renderer};
pub use error::{PlanError, Result};
pub use explain::{
    CostKnobs, ExplainReport, ExplainSource, Explainer, ExplainerOptions, PlanAnalyzer,
};
pub use insight::{AlignStrategy, InsightMap};
pub use plan::{Normalizer, NormalizerOptions, PlanNode, PlanSummary};
