//! Unwrapping of raw `EXPLAIN (FORMAT JSON)` output.

use serde_json::Value;

use crate::error::{PlanError, Result};

/// Prefix used to request a JSON plan, including the planner settings in effect.
pub const EXPLAIN_PREFIX: &str = "EXPLAIN (FORMAT JSON, SETTINGS ON) ";

/// Builds the statement sent to the database for `query`.
pub fn explain_statement(query: &str) -> String {
    format!("{EXPLAIN_PREFIX}{}", query.trim())
}

/// Parses raw EXPLAIN text into a JSON document.
pub fn parse_explain_output(text: &str) -> Result<Value> {
    Ok(serde_json::from_str(text)?)
}

/// Locates the plan document inside an EXPLAIN result.
///
/// Accepts the full result (`[{"Plan": {...}}]`), a single result row
/// (`{"Plan": {...}}`), or a bare plan node.
pub fn extract_plan(document: &Value) -> Result<&Value> {
    match document {
        Value::Array(rows) => {
            let first = rows
                .first()
                .ok_or_else(|| PlanError::MalformedPlan("EXPLAIN output is empty".into()))?;
            first
                .get("Plan")
                .ok_or_else(|| PlanError::MalformedPlan("EXPLAIN row has no Plan key".into()))
        }
        Value::Object(object) => match object.get("Plan") {
            Some(plan) => Ok(plan),
            None if object.contains_key("Node Type") => Ok(document),
            None => Err(PlanError::MalformedPlan(
                "document is neither an EXPLAIN row nor a plan node".into(),
            )),
        },
        _ => Err(PlanError::MalformedPlan(
            "EXPLAIN output must be a JSON array or object".into(),
        )),
    }
}
