#![allow(missing_docs)]

use planlens::{
    explain::{Explainer, ExplainerOptions, StaticSource},
    insight::AlignStrategy,
    CostKnobs, PlanError,
};
use serde_json::{json, Value};

const QUERY: &str = "SELECT * FROM t WHERE a > 1";

fn wrap(plan: Value) -> Value {
    json!([{ "Plan": plan, "Settings": {} }])
}

fn explainer_with(qep: Value, aqps: Vec<Value>) -> Explainer<StaticSource> {
    let mut source = StaticSource::new().with_plan(CostKnobs::BASELINE, wrap(qep));
    let mut alternatives = Vec::new();
    for (position, aqp) in aqps.into_iter().enumerate() {
        let knobs = CostKnobs::new(2.0 + position as f64, 6.0);
        alternatives.push(knobs);
        source = source.with_plan(knobs, wrap(aqp));
    }
    Explainer::new(
        source,
        ExplainerOptions {
            alternatives,
            ..ExplainerOptions::default()
        },
    )
}

#[test]
fn identical_condition_text_yields_no_insight() {
    let mut explainer = explainer_with(
        json!({"Node Type": "Seq Scan", "Total Cost": 100, "Relation Name": "t", "Filter": "a > 1"}),
        vec![json!({"Node Type": "Index Scan", "Total Cost": 150, "Index Cond": "a > 1"})],
    );
    let report = explainer.explain(QUERY).expect("explain");

    assert!(report.insights.is_empty());
    assert_eq!(
        report.annotations.lines(),
        ["The <em>Seq Scan</em> operation performs a scan on relation <b>t</b> and then filtered with the condition <b>a > 1</b>."]
    );
}

#[test]
fn costlier_alternative_produces_rendered_insight() {
    let mut explainer = explainer_with(
        json!({"Node Type": "Seq Scan", "Total Cost": 100, "Relation Name": "t", "Filter": "a > 1"}),
        vec![json!({"Node Type": "Index Scan", "Total Cost": 150, "Index Cond": "b > 2"})],
    );
    let report = explainer.explain(QUERY).expect("explain");

    let expected = "AQP chooses to do Index Scan on b > 2 that increases cost by 50";
    assert_eq!(report.insights.get("a > 1"), [expected]);
    assert_eq!(
        report.annotations.lines()[0],
        format!(
            "The <em>Seq Scan</em> operation performs a scan on relation <b>t</b> and then filtered with the condition <b>a > 1</b>. {expected}."
        )
    );
}

#[test]
fn insights_from_several_alternatives_accumulate_in_order() {
    let qep = json!({
        "Node Type": "Hash Join", "Total Cost": 200, "Join Type": "Inner",
        "Hash Cond": "(o.custkey = c.custkey)",
        "Plans": [
            {"Node Type": "Seq Scan", "Total Cost": 80, "Relation Name": "orders", "Alias": "o"},
            {"Node Type": "Hash", "Total Cost": 40,
             "Plans": [{"Node Type": "Seq Scan", "Total Cost": 40, "Relation Name": "customer", "Alias": "c"}]}
        ]
    });
    let merge = json!({
        "Node Type": "Merge Join", "Total Cost": 260.5, "Join Type": "Inner",
        "Merge Cond": "(o.custkey = c.custkey)",
        "Plans": [
            {"Node Type": "Index Scan", "Total Cost": 120, "Index Cond": "(o.custkey > 0)"},
            {"Node Type": "Sort", "Total Cost": 60, "Sort Key": ["c.custkey"]}
        ]
    });
    let nested = json!({
        "Node Type": "Nested Loop", "Total Cost": 900, "Join Type": "Inner",
        "Plans": [
            {"Node Type": "Seq Scan", "Total Cost": 80, "Relation Name": "orders", "Alias": "o"},
            {"Node Type": "Index Scan", "Total Cost": 3, "Index Cond": "(c.custkey = o.custkey)"}
        ]
    });
    let mut explainer = explainer_with(qep, vec![merge, nested]);
    let report = explainer.explain(QUERY).expect("explain");

    assert_eq!(report.alternatives, 2);
    assert_eq!(
        report.insights.get("(o.custkey = c.custkey)"),
        [
            "AQP chooses to do Merge Join on (o.custkey = c.custkey) that increases cost by 60.5",
            "AQP chooses to do Nested Loop on (o.custkey = c.custkey) that increases cost by 700",
        ]
    );
    assert_eq!(report.annotations.len(), 4);
    let root = report.annotations.lines().last().expect("root annotation");
    assert!(root.starts_with("The <em>Hash Join</em> operation joins"));
    assert!(root.ends_with("that increases cost by 700."));
}

#[test]
fn json_report_exposes_annotations_and_insights() {
    let mut explainer = explainer_with(
        json!({"Node Type": "Seq Scan", "Total Cost": 100, "Relation Name": "t", "Filter": "a > 1"}),
        vec![json!({"Node Type": "Index Scan", "Total Cost": 150, "Index Cond": "b > 2"})],
    );
    let report = explainer.explain(QUERY).expect("explain");
    let json = serde_json::to_value(&report).expect("serialize");

    assert_eq!(json["annotations"].as_array().map(Vec::len), Some(1));
    assert_eq!(
        json["insights"]["a > 1"][0],
        "AQP chooses to do Index Scan on b > 2 that increases cost by 50"
    );
    assert_eq!(json["summary"]["node_count"], 1);
    assert_eq!(json["strategy"], "structural");
}

#[test]
fn unknown_aggregate_strategy_fails_the_whole_request() {
    let mut explainer = explainer_with(
        json!({"Node Type": "Aggregate", "Total Cost": 10, "Strategy": "Mixed",
               "Plans": [{"Node Type": "Seq Scan", "Total Cost": 5, "Relation Name": "t"}]}),
        vec![],
    );
    let err = explainer.explain(QUERY).unwrap_err();
    assert!(matches!(err, PlanError::InvalidStrategy { ref strategy } if strategy == "Mixed"));
    assert_eq!(err.code(), "InvalidStrategy");
}

#[test]
fn malformed_alternative_aborts_before_rendering() {
    let mut explainer = explainer_with(
        json!({"Node Type": "Seq Scan", "Total Cost": 100, "Relation Name": "t"}),
        vec![json!({"Total Cost": 150})],
    );
    let err = explainer.explain(QUERY).unwrap_err();
    assert!(err.is_malformed());
}

#[test]
fn index_strategy_is_honoured_end_to_end() {
    let qep = json!({"Node Type": "Seq Scan", "Total Cost": 10, "Relation Name": "t", "Filter": "x = 1"});
    let aqp = json!({"Node Type": "Sort", "Total Cost": 20, "Sort Key": ["x"],
        "Plans": [{"Node Type": "Index Scan", "Total Cost": 12.25, "Index Cond": "(x = 1)"}]});
    let knobs = CostKnobs::new(3.0, 6.0);
    let report_for = |strategy| {
        let source = StaticSource::new()
            .with_plan(CostKnobs::BASELINE, wrap(qep.clone()))
            .with_plan(knobs, wrap(aqp.clone()));
        let mut explainer = Explainer::new(
            source,
            ExplainerOptions {
                alternatives: vec![knobs],
                strategy,
                ..ExplainerOptions::default()
            },
        );
        explainer.explain(QUERY).expect("explain")
    };

    // Structurally the scan faces the Sort root, which has no family.
    let structural = report_for(AlignStrategy::Structural);
    assert!(structural.insights.is_empty());

    // By post-order index the scan faces the Index Scan leaf.
    let indexed = report_for(AlignStrategy::Index);
    assert_eq!(indexed.strategy, AlignStrategy::Index);
    assert_eq!(
        indexed.insights.get("x = 1"),
        ["AQP chooses to do Index Scan on (x = 1) that increases cost by 2.25"]
    );
}
