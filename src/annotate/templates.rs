//! One natural-language template per plan operator.
//!
//! Every template names the operator in italics and bolds literal values
//! taken from the node. Optional fields add clauses; fields a template
//! cannot do without fail with [`PlanError::MissingField`].

use serde_json::Value;

use super::markup::{bold, bold_list, italics};
use crate::error::{PlanError, Result};
use crate::plan::PlanNode;

/// Renders the sentence for one node.
pub type Template = fn(&PlanNode) -> Result<String>;

/// Sentence for operators without a template.
pub fn fallback(node: &PlanNode) -> String {
    format!("The {} operation is performed.", italics(&node.kind))
}

fn op(node: &PlanNode) -> String {
    italics(&node.kind)
}

fn number_text(value: &Value) -> String {
    if let Some(n) = value.as_u64() {
        return n.to_string();
    }
    match value.as_f64() {
        Some(f) => f.to_string(),
        None => value.to_string(),
    }
}

fn require_number(node: &PlanNode, field: &'static str) -> Result<String> {
    node.attr(field)
        .map(number_text)
        .ok_or_else(|| PlanError::missing_field(&node.kind, field))
}

pub(crate) fn aggregate(node: &PlanNode) -> Result<String> {
    let strategy = node.require_str("Strategy")?;
    match strategy {
        "Sorted" => {
            let mut text = format!(
                "The {} operation sorts the tuples based on their keys",
                op(node)
            );
            if let Some(keys) = node.attr_list("Group Key") {
                text.push_str(&format!(
                    ", where the tuples are {} by the following keys: {}",
                    bold("aggregated"),
                    bold_list(&keys)
                ));
            }
            text.push('.');
            if let Some(filter) = node.attr_cleaned("Filter") {
                text.push_str(&format!(
                    " The tuples are then filtered by {}.",
                    bold(filter)
                ));
            }
            Ok(text)
        }
        "Hashed" => {
            let keys = node.require_list("Group Key")?;
            Ok(format!(
                "The {} operation {} all rows based on these key(s): {}, which are then {} into a bucket given by the hashed key.",
                op(node),
                bold("hashes"),
                bold_list(&keys),
                bold("aggregated")
            ))
        }
        "Plain" => Ok(format!(
            "The result is {} with the {} operation.",
            bold("aggregated"),
            op(node)
        )),
        other => Err(PlanError::InvalidStrategy {
            strategy: other.to_string(),
        }),
    }
}

pub(crate) fn append(node: &PlanNode) -> Result<String> {
    Ok(format!(
        "The {} operation combines the results of the child sub-operations.",
        op(node)
    ))
}

pub(crate) fn bitmap_heap_scan(node: &PlanNode) -> Result<String> {
    let mut text = format!(
        "The {} operation reads the table pages flagged by the bitmap",
        op(node)
    );
    if let Some(relation) = node.attr_str("Relation Name") {
        text.push_str(&format!(" from relation {}", bold(relation)));
    }
    if let Some(recheck) = node.attr_cleaned("Recheck Cond") {
        text.push_str(&format!(" and rechecks the condition {}", bold(recheck)));
    }
    text.push('.');
    if let Some(filter) = node.attr_cleaned("Filter") {
        text.push_str(&format!(" The result is further filtered by {}.", bold(filter)));
    }
    Ok(text)
}

pub(crate) fn bitmap_index_scan(node: &PlanNode) -> Result<String> {
    let index = node.require_str("Index Name")?;
    let mut text = format!(
        "The {} operation scans the index {} to build a bitmap of matching row locations",
        op(node),
        bold(index)
    );
    if let Some(cond) = node.attr_cleaned("Index Cond") {
        text.push_str(&format!(" for the condition {}", bold(cond)));
    }
    text.push('.');
    Ok(text)
}

pub(crate) fn cte_scan(node: &PlanNode) -> Result<String> {
    let cte = node.require_str("CTE Name")?;
    let mut text = format!(
        "The {} operation is performed on the table {}, whose results are stored in memory for use later.",
        op(node),
        bold(cte)
    );
    match (node.attr_cleaned("Index Cond"), node.attr_cleaned("Filter")) {
        (Some(cond), Some(filter)) => text.push_str(&format!(
            " The condition(s) are {} and then further filtered by {}.",
            bold(cond),
            bold(filter)
        )),
        (Some(cond), None) => {
            text.push_str(&format!(" The condition(s) are {}.", bold(cond)))
        }
        (None, Some(filter)) => {
            text.push_str(&format!(" The result is filtered by {}.", bold(filter)))
        }
        (None, None) => {}
    }
    Ok(text)
}

pub(crate) fn function_scan(node: &PlanNode) -> Result<String> {
    let function = node.require_str("Function Name")?;
    Ok(format!(
        "The function {} is executed and the set of records are returned.",
        italics(function)
    ))
}

pub(crate) fn gather(node: &PlanNode) -> Result<String> {
    let mut text = format!(
        "The {} operation collects the output of child operations executed by parallel workers",
        op(node)
    );
    if let Some(workers) = node.attr("Workers Planned") {
        text.push_str(&format!(" ({} planned)", bold(number_text(workers))));
    }
    text.push('.');
    Ok(text)
}

pub(crate) fn gather_merge(node: &PlanNode) -> Result<String> {
    Ok(format!(
        "The {} operation combines the output table from sub-operations by executing the operation in parallel.",
        op(node)
    ))
}

pub(crate) fn group(node: &PlanNode) -> Result<String> {
    let keys = node.require_list("Group Key")?;
    Ok(format!(
        "The {} operation groups the results from the previous operation together with the following keys: {}.",
        op(node),
        bold_list(&keys)
    ))
}

pub(crate) fn hash(node: &PlanNode) -> Result<String> {
    Ok(format!(
        "The {} function hashes the query rows into memory, for use by its parent operation.",
        op(node)
    ))
}

pub(crate) fn hash_join(node: &PlanNode) -> Result<String> {
    let join_type = node.require_str("Join Type")?;
    let mut text = format!(
        "The {} operation joins the results from the previous operations using a hash {} {}",
        op(node),
        bold(join_type),
        bold("Join")
    );
    if let Some(cond) = node.attr_cleaned("Hash Cond") {
        text.push_str(&format!(" on the condition: {}", bold(cond)));
    }
    text.push('.');
    Ok(text)
}

pub(crate) fn index_only_scan(node: &PlanNode) -> Result<String> {
    let index = node.require_str("Index Name")?;
    let mut text = format!(
        "The {} function is conducted using an index table {}",
        op(node),
        bold(index)
    );
    if let Some(cond) = node.attr_cleaned("Index Cond") {
        text.push_str(&format!(" with condition(s) {}", bold(cond)));
    }
    text.push_str(". The records obtained from the index table are returned as the result.");
    if let Some(filter) = node.attr_cleaned("Filter") {
        text.push_str(&format!(" The result is further filtered by {}.", bold(filter)));
    }
    Ok(text)
}

pub(crate) fn index_scan(node: &PlanNode) -> Result<String> {
    let mut text = format!("The {} operation scans the index for rows", op(node));
    if let Some(cond) = node.attr_cleaned("Index Cond") {
        text.push_str(&format!(
            " which match the following conditions: {}",
            bold(cond)
        ));
    }
    text.push_str(", and then reads the records from the table that match the conditions.");
    if let Some(filter) = node.attr_cleaned("Filter") {
        text.push_str(&format!(" The result is further filtered by {}.", bold(filter)));
    }
    Ok(text)
}

pub(crate) fn limit(node: &PlanNode) -> Result<String> {
    let rows = require_number(node, "Plan Rows")?;
    Ok(format!(
        "The {} operation takes {} records and disregards the remaining records.",
        op(node),
        bold(rows)
    ))
}

pub(crate) fn materialize(node: &PlanNode) -> Result<String> {
    Ok(format!(
        "The {} operation stores the results of child operations in memory for faster access by parent operations.",
        op(node)
    ))
}

pub(crate) fn merge_join(node: &PlanNode) -> Result<String> {
    let mut text = format!(
        "The {} operation joins the results that have been sorted on join keys from sub-operations",
        op(node)
    );
    if let Some(cond) = node.attr_cleaned("Merge Cond") {
        text.push_str(&format!(" with condition {}", bold(cond)));
    }
    if node.attr_str("Join Type") == Some("Semi") {
        text.push_str(" but only the records from the left relation are returned as the result");
    }
    text.push('.');
    Ok(text)
}

pub(crate) fn nested_loop(node: &PlanNode) -> Result<String> {
    Ok(format!(
        "The {} operation implements a join or lookup where the first child node is run once, then for every row it produces, its partner is looked up in the second node.",
        op(node)
    ))
}

pub(crate) fn seq_scan(node: &PlanNode) -> Result<String> {
    let mut text = format!("The {} operation performs a scan", op(node));
    let relation = node.attr_str("Relation Name");
    if let Some(relation) = relation {
        text.push_str(&format!(" on relation {}", bold(relation)));
    }
    if let Some(alias) = node.attr_str("Alias") {
        if relation != Some(alias) {
            text.push_str(&format!(" with an alias of {}", bold(alias)));
        }
    }
    if let Some(filter) = node.attr_cleaned("Filter") {
        text.push_str(&format!(
            " and then filtered with the condition {}",
            bold(filter)
        ));
    }
    text.push('.');
    Ok(text)
}

pub(crate) fn set_op(node: &PlanNode) -> Result<String> {
    let command = node.require_str("Command")?;
    let found = if command.starts_with("Except") {
        "differences"
    } else {
        "similarities"
    };
    Ok(format!(
        "The {} operation finds the {} in records between the two previously scanned tables ({}).",
        op(node),
        found,
        bold(command)
    ))
}

pub(crate) fn sort(node: &PlanNode) -> Result<String> {
    let keys = node.require_list("Sort Key")?;
    let phrases: Vec<String> = keys.iter().map(|key| sort_phrase(key)).collect();
    Ok(format!(
        "The {} operation sorts the rows {}.",
        op(node),
        phrases.join(", then ")
    ))
}

fn sort_phrase(key: &str) -> String {
    if let Some(column) = key.strip_suffix(" DESC") {
        format!("{} in descending order", bold(column.trim()))
    } else if let Some(column) = key.strip_suffix(" ASC") {
        format!("{} in ascending order", bold(column.trim()))
    } else {
        format!("based on {}", bold(key))
    }
}

pub(crate) fn subquery_scan(node: &PlanNode) -> Result<String> {
    Ok(format!(
        "The {} operation reads on the results from a subquery.",
        op(node)
    ))
}

pub(crate) fn unique(node: &PlanNode) -> Result<String> {
    Ok(format!(
        "The {} operation removes duplicates from a sorted result set.",
        op(node)
    ))
}

pub(crate) fn values_scan(node: &PlanNode) -> Result<String> {
    Ok(format!(
        "The {} operation reads the given constant values from the query.",
        op(node)
    ))
}
