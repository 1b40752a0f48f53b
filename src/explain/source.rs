//! Collaborators that turn a query and a pair of cost knobs into a plan
//! document.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{PlanError, Result};
use crate::plan::explain_statement;

/// Planner cost parameters applied before running `EXPLAIN`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostKnobs {
    /// `seq_page_cost` setting.
    pub seq_page_cost: f64,
    /// `random_page_cost` setting.
    pub random_page_cost: f64,
}

impl CostKnobs {
    /// PostgreSQL's stock settings.
    pub const BASELINE: CostKnobs = CostKnobs::new(1.0, 4.0);

    /// Creates a knob pair.
    pub const fn new(seq_page_cost: f64, random_page_cost: f64) -> Self {
        Self {
            seq_page_cost,
            random_page_cost,
        }
    }

    /// Perturbations used to coax the planner into alternative plans.
    pub fn default_alternatives() -> Vec<CostKnobs> {
        vec![CostKnobs::new(3.0, 6.0), CostKnobs::new(4.0, 0.0)]
    }

    /// Whether both costs are finite and non-negative.
    pub fn is_valid(&self) -> bool {
        [self.seq_page_cost, self.random_page_cost]
            .iter()
            .all(|cost| cost.is_finite() && *cost >= 0.0)
    }
}

impl Default for CostKnobs {
    fn default() -> Self {
        Self::BASELINE
    }
}

/// Produces a plan document for a query under the given cost knobs.
///
/// Failures are reported as [`PlanError::QueryExecution`].
pub trait ExplainSource {
    /// Runs `EXPLAIN` for `query` and returns the raw JSON output.
    fn run(&mut self, query: &str, knobs: CostKnobs) -> Result<Value>;
}

/// Connection-level operations a transactional source needs.
pub trait PlanBackend {
    /// Opens a transaction.
    fn begin(&mut self) -> Result<()>;
    /// Applies the cost settings inside the open transaction.
    fn apply_knobs(&mut self, knobs: CostKnobs) -> Result<()>;
    /// Executes an `EXPLAIN` statement and returns its JSON output.
    fn fetch_plan(&mut self, statement: &str) -> Result<Value>;
    /// Commits the open transaction.
    fn commit(&mut self) -> Result<()>;
    /// Rolls back the open transaction.
    fn rollback(&mut self) -> Result<()>;
}

/// An open transaction on a [`PlanBackend`].
///
/// Dropping the scope without [`TransactionScope::commit`] rolls back.
pub struct TransactionScope<'a, B: PlanBackend> {
    backend: &'a mut B,
    finished: bool,
}

impl<'a, B: PlanBackend> TransactionScope<'a, B> {
    /// Begins a transaction on `backend`.
    pub fn begin(backend: &'a mut B) -> Result<Self> {
        backend.begin()?;
        Ok(Self {
            backend,
            finished: false,
        })
    }

    /// Backend the scope runs on.
    pub fn backend(&mut self) -> &mut B {
        &mut *self.backend
    }

    /// Commits the transaction.
    pub fn commit(mut self) -> Result<()> {
        self.backend.commit()?;
        self.finished = true;
        Ok(())
    }
}

impl<B: PlanBackend> Drop for TransactionScope<'_, B> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        warn!("explain.transaction.rollback");
        if let Err(err) = self.backend.rollback() {
            warn!(error = %err, "explain.transaction.rollback_failed");
        }
    }
}

/// [`ExplainSource`] running each call in its own transaction.
pub struct TransactionalSource<B: PlanBackend> {
    backend: B,
}

impl<B: PlanBackend> TransactionalSource<B> {
    /// Wraps a backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the wrapped backend.
    pub fn into_inner(self) -> B {
        self.backend
    }
}

impl<B: PlanBackend> ExplainSource for TransactionalSource<B> {
    fn run(&mut self, query: &str, knobs: CostKnobs) -> Result<Value> {
        let statement = explain_statement(query);
        let mut scope = TransactionScope::begin(&mut self.backend)?;
        scope.backend().apply_knobs(knobs)?;
        let plan = scope.backend().fetch_plan(&statement)?;
        scope.commit()?;
        debug!(
            seq_page_cost = knobs.seq_page_cost,
            random_page_cost = knobs.random_page_cost,
            "explain.source.fetched"
        );
        Ok(plan)
    }
}

/// Source answering from pre-recorded plans, keyed by cost knobs.
#[derive(Clone, Debug, Default)]
pub struct StaticSource {
    plans: Vec<(CostKnobs, Value)>,
}

impl StaticSource {
    /// Empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the plan returned for `knobs`.
    pub fn with_plan(mut self, knobs: CostKnobs, plan: Value) -> Self {
        self.plans.push((knobs, plan));
        self
    }
}

impl ExplainSource for StaticSource {
    fn run(&mut self, _query: &str, knobs: CostKnobs) -> Result<Value> {
        self.plans
            .iter()
            .find(|(recorded, _)| *recorded == knobs)
            .map(|(_, plan)| plan.clone())
            .ok_or_else(|| {
                PlanError::QueryExecution(format!(
                    "no plan recorded for seq_page_cost={} random_page_cost={}",
                    knobs.seq_page_cost, knobs.random_page_cost
                ))
            })
    }
}
