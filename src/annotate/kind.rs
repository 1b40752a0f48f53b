//! Node kinds with a built-in annotation template.

use std::fmt;
use std::str::FromStr;

use super::templates::{self, Template};

/// Plan operators with a dedicated annotation template.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Aggregate,
    Append,
    BitmapHeapScan,
    BitmapIndexScan,
    CteScan,
    FunctionScan,
    Gather,
    GatherMerge,
    Group,
    Hash,
    HashJoin,
    IndexOnlyScan,
    IndexScan,
    Limit,
    Materialize,
    MergeJoin,
    NestedLoop,
    SeqScan,
    SetOp,
    Sort,
    SubqueryScan,
    Unique,
    ValuesScan,
}

impl NodeKind {
    /// Every kind with a built-in template.
    pub const ALL: [NodeKind; 23] = [
        NodeKind::Aggregate,
        NodeKind::Append,
        NodeKind::BitmapHeapScan,
        NodeKind::BitmapIndexScan,
        NodeKind::CteScan,
        NodeKind::FunctionScan,
        NodeKind::Gather,
        NodeKind::GatherMerge,
        NodeKind::Group,
        NodeKind::Hash,
        NodeKind::HashJoin,
        NodeKind::IndexOnlyScan,
        NodeKind::IndexScan,
        NodeKind::Limit,
        NodeKind::Materialize,
        NodeKind::MergeJoin,
        NodeKind::NestedLoop,
        NodeKind::SeqScan,
        NodeKind::SetOp,
        NodeKind::Sort,
        NodeKind::SubqueryScan,
        NodeKind::Unique,
        NodeKind::ValuesScan,
    ];

    /// `Node Type` string PostgreSQL uses for this operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Aggregate => "Aggregate",
            NodeKind::Append => "Append",
            NodeKind::BitmapHeapScan => "Bitmap Heap Scan",
            NodeKind::BitmapIndexScan => "Bitmap Index Scan",
            NodeKind::CteScan => "CTE Scan",
            NodeKind::FunctionScan => "Function Scan",
            NodeKind::Gather => "Gather",
            NodeKind::GatherMerge => "Gather Merge",
            NodeKind::Group => "Group",
            NodeKind::Hash => "Hash",
            NodeKind::HashJoin => "Hash Join",
            NodeKind::IndexOnlyScan => "Index Only Scan",
            NodeKind::IndexScan => "Index Scan",
            NodeKind::Limit => "Limit",
            NodeKind::Materialize => "Materialize",
            NodeKind::MergeJoin => "Merge Join",
            NodeKind::NestedLoop => "Nested Loop",
            NodeKind::SeqScan => "Seq Scan",
            NodeKind::SetOp => "SetOp",
            NodeKind::Sort => "Sort",
            NodeKind::SubqueryScan => "Subquery Scan",
            NodeKind::Unique => "Unique",
            NodeKind::ValuesScan => "Values Scan",
        }
    }

    /// Built-in template for this operator.
    pub fn template(&self) -> Template {
        match self {
            NodeKind::Aggregate => templates::aggregate,
            NodeKind::Append => templates::append,
            NodeKind::BitmapHeapScan => templates::bitmap_heap_scan,
            NodeKind::BitmapIndexScan => templates::bitmap_index_scan,
            NodeKind::CteScan => templates::cte_scan,
            NodeKind::FunctionScan => templates::function_scan,
            NodeKind::Gather => templates::gather,
            NodeKind::GatherMerge => templates::gather_merge,
            NodeKind::Group => templates::group,
            NodeKind::Hash => templates::hash,
            NodeKind::HashJoin => templates::hash_join,
            NodeKind::IndexOnlyScan => templates::index_only_scan,
            NodeKind::IndexScan => templates::index_scan,
            NodeKind::Limit => templates::limit,
            NodeKind::Materialize => templates::materialize,
            NodeKind::MergeJoin => templates::merge_join,
            NodeKind::NestedLoop => templates::nested_loop,
            NodeKind::SeqScan => templates::seq_scan,
            NodeKind::SetOp => templates::set_op,
            NodeKind::Sort => templates::sort,
            NodeKind::SubqueryScan => templates::subquery_scan,
            NodeKind::Unique => templates::unique,
            NodeKind::ValuesScan => templates::values_scan,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| format!("no template for node kind '{value}'"))
    }
}
