#![allow(missing_docs)]

use planlens::{
    insight::{align, compare_plans, AlignStrategy},
    plan::{Normalizer, PlanNode},
};
use serde_json::{json, Value};

fn tree(doc: Value) -> PlanNode {
    Normalizer::default().normalize(&doc).expect("normalize")
}

fn paired_kinds(qep: &PlanNode, aqp: &PlanNode, strategy: AlignStrategy) -> Vec<(String, String)> {
    align(qep, aqp, strategy)
        .into_iter()
        .map(|pair| (pair.qep.kind.clone(), pair.aqp.kind.clone()))
        .collect()
}

fn owned(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(q, a)| (q.to_string(), a.to_string()))
        .collect()
}

fn hash_join_qep() -> PlanNode {
    tree(json!({
        "Node Type": "Hash Join", "Total Cost": 100, "Join Type": "Inner", "Hash Cond": "(a.id = b.id)",
        "Plans": [
            {"Node Type": "Seq Scan", "Total Cost": 30, "Relation Name": "a", "Filter": "(a.x > 1)"},
            {"Node Type": "Hash", "Total Cost": 20,
             "Plans": [{"Node Type": "Seq Scan", "Total Cost": 20, "Relation Name": "b"}]}
        ]
    }))
}

fn narrow_nested_loop_aqp() -> PlanNode {
    tree(json!({
        "Node Type": "Nested Loop", "Total Cost": 150, "Join Type": "Inner",
        "Plans": [
            {"Node Type": "Index Scan", "Total Cost": 45, "Index Cond": "(a.x > 5)"}
        ]
    }))
}

#[test]
fn structural_alignment_follows_matching_positions() {
    let qep = hash_join_qep();
    let aqp = narrow_nested_loop_aqp();

    assert_eq!(
        paired_kinds(&qep, &aqp, AlignStrategy::Structural),
        owned(&[("Hash Join", "Nested Loop"), ("Seq Scan", "Index Scan")])
    );

    let insights = compare_plans(&qep, &aqp, AlignStrategy::Structural);
    assert_eq!(insights.len(), 2);
    assert_eq!(
        insights["(a.id = b.id)"],
        "AQP chooses to do Nested Loop on (a.id = b.id) that increases cost by 50"
    );
    assert_eq!(
        insights["(a.x > 1)"],
        "AQP chooses to do Index Scan on (a.x > 5) that increases cost by 15"
    );
}

#[test]
fn index_alignment_pairs_by_post_order_and_drops_surplus() {
    let qep = hash_join_qep();
    let aqp = narrow_nested_loop_aqp();

    assert_eq!(
        paired_kinds(&qep, &aqp, AlignStrategy::Index),
        owned(&[("Seq Scan", "Index Scan"), ("Seq Scan", "Nested Loop")])
    );

    let insights = compare_plans(&qep, &aqp, AlignStrategy::Index);
    assert_eq!(insights.len(), 1);
    assert!(insights.contains_key("(a.x > 1)"));
    assert!(!insights.contains_key("(a.id = b.id)"));
}

#[test]
fn reordered_siblings_pair_unrelated_scans_under_both_strategies() {
    let qep = tree(json!({
        "Node Type": "Append", "Total Cost": 15,
        "Plans": [
            {"Node Type": "Seq Scan", "Total Cost": 10, "Relation Name": "x", "Filter": "(p = 1)"},
            {"Node Type": "Index Scan", "Total Cost": 5, "Index Cond": "(q = 2)"}
        ]
    }));
    let aqp = tree(json!({
        "Node Type": "Append", "Total Cost": 18,
        "Plans": [
            {"Node Type": "Index Scan", "Total Cost": 8, "Index Cond": "(q = 2)"},
            {"Node Type": "Seq Scan", "Total Cost": 10, "Relation Name": "x", "Filter": "(p = 1)"}
        ]
    }));

    for strategy in [AlignStrategy::Structural, AlignStrategy::Index] {
        let insights = compare_plans(&qep, &aqp, strategy);
        assert_eq!(insights.len(), 1, "strategy {strategy}");
        assert_eq!(
            insights["(q = 2)"],
            "AQP chooses to do Seq Scan on (p = 1) that increases cost by 5"
        );
    }
}

#[test]
fn deeper_alternative_with_parallel_scan_is_a_different_family() {
    let qep = tree(json!({"Node Type": "Seq Scan", "Total Cost": 10, "Relation Name": "t", "Filter": "(f > 0)"}));
    let aqp = tree(json!({
        "Node Type": "Gather", "Total Cost": 30, "Workers Planned": 2,
        "Plans": [{"Node Type": "Parallel Seq Scan", "Total Cost": 25, "Filter": "(f > 1)"}]
    }));

    assert_eq!(
        paired_kinds(&qep, &aqp, AlignStrategy::Structural),
        owned(&[("Seq Scan", "Gather")])
    );
    assert_eq!(
        paired_kinds(&qep, &aqp, AlignStrategy::Index),
        owned(&[("Seq Scan", "Parallel Seq Scan")])
    );
    for strategy in [AlignStrategy::Structural, AlignStrategy::Index] {
        assert!(compare_plans(&qep, &aqp, strategy).is_empty());
    }
}

#[test]
fn every_qep_node_is_paired_at_most_once() {
    let qep = hash_join_qep();
    let aqp = tree(json!({
        "Node Type": "Merge Join", "Total Cost": 300,
        "Plans": [
            {"Node Type": "Sort", "Total Cost": 60, "Sort Key": ["a.id"],
             "Plans": [{"Node Type": "Seq Scan", "Total Cost": 30, "Relation Name": "a"}]},
            {"Node Type": "Sort", "Total Cost": 60, "Sort Key": ["b.id"],
             "Plans": [{"Node Type": "Seq Scan", "Total Cost": 20, "Relation Name": "b"}]}
        ]
    }));

    for strategy in [AlignStrategy::Structural, AlignStrategy::Index] {
        let pairs = align(&qep, &aqp, strategy);
        let mut seen: Vec<usize> = pairs.iter().map(|pair| pair.qep.index).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), pairs.len(), "strategy {strategy}");
        assert!(pairs.len() <= qep.node_count().min(aqp.node_count()));
    }
}
