#![forbid(unsafe_code)]

//! End-to-end explanation of a query plan.
//!
//! [`PlanAnalyzer`] runs the pure pipeline over plan documents that were
//! already fetched: normalize, align each alternative against the executed
//! plan, merge the insights and render the annotations. [`Explainer`] adds
//! the fetching, asking an [`ExplainSource`] for the baseline plan and one
//! plan per alternative cost setting.

mod source;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::annotate::{AnnotationDocument, Renderer};
use crate::error::Result;
use crate::insight::{compare_plans, AlignStrategy, InsightMap};
use crate::plan::{extract_plan, Normalizer, NormalizerOptions, PlanNode, PlanSummary};

pub use source::{
    CostKnobs, ExplainSource, PlanBackend, StaticSource, TransactionScope, TransactionalSource,
};

/// Settings for an [`Explainer`].
#[derive(Clone, Debug, PartialEq)]
pub struct ExplainerOptions {
    /// Knobs the executed plan is obtained with.
    pub baseline: CostKnobs,
    /// Knobs for each alternative plan, processed in order.
    pub alternatives: Vec<CostKnobs>,
    /// How alternative plans are aligned with the executed one.
    pub strategy: AlignStrategy,
    /// Normalization ceilings.
    pub normalizer: NormalizerOptions,
}

impl Default for ExplainerOptions {
    fn default() -> Self {
        Self {
            baseline: CostKnobs::BASELINE,
            alternatives: CostKnobs::default_alternatives(),
            strategy: AlignStrategy::default(),
            normalizer: NormalizerOptions::default(),
        }
    }
}

/// Outcome of explaining one query.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExplainReport {
    /// One sentence per executed-plan node, in execution order.
    pub annotations: AnnotationDocument,
    /// Merged insights by condition key.
    pub insights: InsightMap,
    /// Headline figures of the executed plan.
    pub summary: PlanSummary,
    /// Number of alternative plans compared.
    pub alternatives: usize,
    /// Alignment used for the comparison.
    pub strategy: AlignStrategy,
}

/// Normalize, align, merge and render over plan documents.
#[derive(Clone, Debug, Default)]
pub struct PlanAnalyzer {
    normalizer: Normalizer,
    strategy: AlignStrategy,
    renderer: Renderer,
}

impl PlanAnalyzer {
    /// Creates an analyzer with the built-in templates.
    pub fn new(normalizer: NormalizerOptions, strategy: AlignStrategy) -> Self {
        Self {
            normalizer: Normalizer::new(normalizer),
            strategy,
            renderer: Renderer::new(),
        }
    }

    /// Replaces the renderer, e.g. one with extra templates registered.
    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Alignment strategy in use.
    pub fn strategy(&self) -> AlignStrategy {
        self.strategy
    }

    /// Normalizes an `EXPLAIN` output or bare plan document.
    pub fn normalize(&self, document: &Value) -> Result<PlanNode> {
        self.normalizer.normalize(extract_plan(document)?)
    }

    /// Merges the insights of every alternative against `qep`.
    pub fn insights(&self, qep: &PlanNode, aqps: &[PlanNode]) -> InsightMap {
        InsightMap::merge(aqps.iter().map(|aqp| compare_plans(qep, aqp, self.strategy)))
    }

    /// Runs the full pipeline over already fetched documents.
    pub fn analyze(&self, qep: &Value, aqps: &[Value]) -> Result<ExplainReport> {
        let qep = self.normalize(qep)?;
        let aqps = aqps
            .iter()
            .map(|doc| self.normalize(doc))
            .collect::<Result<Vec<_>>>()?;
        let insights = self.insights(&qep, &aqps);
        let annotations = self.renderer.render_plan(&qep, &insights)?;
        info!(
            alternatives = aqps.len(),
            insights = insights.insight_count(),
            nodes = annotations.len(),
            strategy = %self.strategy,
            "explain.completed"
        );
        Ok(ExplainReport {
            summary: PlanSummary::from_plan(&qep),
            annotations,
            insights,
            alternatives: aqps.len(),
            strategy: self.strategy,
        })
    }
}

/// Fetches the executed and alternative plans of a query and explains them.
pub struct Explainer<S: ExplainSource> {
    source: S,
    baseline: CostKnobs,
    alternatives: Vec<CostKnobs>,
    analyzer: PlanAnalyzer,
}

impl<S: ExplainSource> Explainer<S> {
    /// Creates an explainer over `source`.
    pub fn new(source: S, options: ExplainerOptions) -> Self {
        Self {
            source,
            baseline: options.baseline,
            alternatives: options.alternatives,
            analyzer: PlanAnalyzer::new(options.normalizer, options.strategy),
        }
    }

    /// Analyzer used for the pure part of the pipeline.
    pub fn analyzer(&self) -> &PlanAnalyzer {
        &self.analyzer
    }

    /// Returns the wrapped source.
    pub fn into_source(self) -> S {
        self.source
    }

    /// Explains `query`: baseline plan first, then each alternative in order.
    pub fn explain(&mut self, query: &str) -> Result<ExplainReport> {
        let qep = self.fetch(query, self.baseline)?;
        let mut aqps = Vec::with_capacity(self.alternatives.len());
        for knobs in self.alternatives.clone() {
            aqps.push(self.fetch(query, knobs)?);
        }
        self.analyzer.analyze(&qep, &aqps)
    }

    fn fetch(&mut self, query: &str, knobs: CostKnobs) -> Result<Value> {
        self.source.run(query, knobs).inspect_err(|err| {
            warn!(
                error = %err,
                seq_page_cost = knobs.seq_page_cost,
                random_page_cost = knobs.random_page_cost,
                "explain.source.failed"
            );
        })
    }
}
