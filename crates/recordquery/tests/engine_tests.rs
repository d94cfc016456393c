//! In-memory engine tests over a small sales pipeline
//!
//! Models opportunities across stages and regions and runs filtered,
//! grouped and sorted queries through the public dispatch facade.

use recordquery::{
    Condition, Database, Error, ExecutionMode, MemoryQueryService, QueryBuilder, Record, SortOrder,
};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Opportunity {
    id: u64,
    name: String,
    stage: String,
    region: Option<String>,
    amount: u64,
    probability: u8,
}

fn opportunity(id: u64, name: &str, stage: &str, region: Option<&str>, amount: u64) -> Opportunity {
    Opportunity {
        id,
        name: name.to_string(),
        stage: stage.to_string(),
        region: region.map(str::to_string),
        amount,
        probability: if stage == "Closed Won" { 100 } else { 40 },
    }
}

fn to_record<T: Serialize>(value: &T) -> Record {
    match serde_json::to_value(value).unwrap() {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn setup() -> Database {
    let pipeline = [
        opportunity(1, "Acme Renewal", "Closed Won", Some("EMEA"), 12_000),
        opportunity(2, "Globex Expansion", "Prospecting", Some("AMER"), 48_000),
        opportunity(3, "Initech Pilot", "Closed Won", Some("AMER"), 3_500),
        opportunity(4, "Umbrella Upsell", "Negotiation", None, 22_000),
        opportunity(5, "Hooli Platform", "Closed Won", Some("APAC"), 91_000),
        opportunity(6, "Acme Services", "Negotiation", Some("EMEA"), 7_000),
    ];
    let service = MemoryQueryService::new()
        .with_collection("Opportunity", pipeline.iter().map(to_record).collect())
        .unwrap();
    Database::new(service)
}

fn names(rows: &[Record]) -> Vec<&str> {
    rows.iter().filter_map(|row| row["Name"].as_str()).collect()
}

#[test]
fn test_filter_and_project() {
    let db = setup();
    let mut query = QueryBuilder::new("Opportunity");
    query
        .set_fields(["Name", "Amount"])
        .add_where_condition("Stage", "=", "Closed Won")
        .add_where_condition("Amount", ">=", 10_000)
        .create_order_by(["Amount"], SortOrder::Asc);

    let rows = db.query(&query, ExecutionMode::Fresh).unwrap();

    assert_eq!(names(&rows), ["Acme Renewal", "Hooli Platform"]);
    assert_eq!(rows[0].len(), 2);
    assert_eq!(rows[0]["Amount"], 12_000);
}

#[test]
fn test_custom_logic_with_not() {
    let db = setup();
    let mut query = QueryBuilder::new("Opportunity");
    query
        .add_field("Name")
        .add_where_condition("Name", "LIKE", "acme%")
        .add_where_condition("Region", "IN", json!(["AMER", "APAC"]))
        .add_where_condition("Stage", "=", "Closed Won")
        .set_custom_logic("(1 OR 2) AND NOT 3")
        .create_order_by(["Id"], SortOrder::Asc);

    let rows = db.query(&query, true).unwrap();

    assert_eq!(names(&rows), ["Globex Expansion", "Acme Services"]);
}

#[test]
fn test_null_region_sorts_first() {
    let db = setup();
    let mut query = QueryBuilder::new("Opportunity");
    query
        .set_fields(["Name", "Region"])
        .create_order_by(["Region", "Name"], SortOrder::Asc)
        .set_limit(3);

    let rows = db.query(&query, false).unwrap();

    assert_eq!(
        names(&rows),
        ["Umbrella Upsell", "Globex Expansion", "Initech Pilot"]
    );
    assert_eq!(rows[0]["Region"], Value::Null);
}

#[test]
fn test_pipeline_by_stage() {
    let db = setup();
    let mut query = QueryBuilder::new("Opportunity");
    query
        .set_fields(["Stage", "COUNT(Id) deals", "SUM(Amount) total"])
        .add_group_by_field("Stage")
        .add_group_by_condition("SUM(Amount)", ">", 30_000)
        .create_order_by(["total"], SortOrder::Desc);

    let rows = db.query(&query, true).unwrap();

    assert_eq!(
        Value::from(rows.into_iter().map(Value::Object).collect::<Vec<_>>()),
        json!([
            { "Stage": "Closed Won", "deals": 3, "total": 106_500 },
            { "Stage": "Prospecting", "deals": 1, "total": 48_000 }
        ])
    );
}

#[test]
fn test_having_custom_logic() {
    let db = setup();
    let mut query = QueryBuilder::new("Opportunity");
    query.set_fields(["Stage", "COUNT(Id) deals"]).create_group_by(
        ["Stage"],
        vec![
            Condition::new("COUNT(Id)", ">=", 2),
            Condition::new("Stage", "=", "Prospecting"),
        ],
        Some("1 AND NOT 2".to_string()),
    );
    query.create_order_by(["Stage"], SortOrder::Asc);

    let rows = db.query(&query, false).unwrap();
    let stages: Vec<&str> = rows.iter().filter_map(|row| row["Stage"].as_str()).collect();

    assert_eq!(stages, ["Closed Won", "Negotiation"]);
}

#[test]
fn test_overall_aggregates() {
    let db = setup();
    let mut query = QueryBuilder::new("Opportunity");
    query
        .set_fields(["COUNT() n", "MAX(Amount) biggest", "AVG(Probability) p"])
        .add_where_condition("Region", "=", "EMEA");

    let rows = db.query(&query, false).unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["n"], 2);
    assert_eq!(rows[0]["biggest"], 12_000);
    assert_eq!(rows[0]["p"], 70);
}

#[test]
fn test_records_pushed_after_invalidate_are_visible() {
    let service = std::sync::Arc::new(MemoryQueryService::new());
    service.insert_collection("Lead", Vec::new()).unwrap();
    let db = Database::new(std::sync::Arc::clone(&service));
    let query = QueryBuilder::new("Lead");

    assert!(db.query(&query, true).unwrap().is_empty());

    service
        .push_record("Lead", to_record(&json!({ "Name": "Dunder Mifflin" })))
        .unwrap();
    assert!(db.query(&query, true).unwrap().is_empty());

    db.invalidate("Lead").unwrap();
    assert_eq!(db.query(&query, true).unwrap().len(), 1);
}

#[test]
fn test_engine_errors() {
    let db = setup();

    let err = db.query(&QueryBuilder::new("Invoice"), false).unwrap_err();
    assert!(matches!(err, Error::NotFound(name) if name == "Invoice"));

    let mut query = QueryBuilder::new("Opportunity");
    query.add_where_condition("Amount", "BETWEEN", json!([1, 2]));
    let err = db.query(&query, false).unwrap_err();
    assert!(matches!(err, Error::UnsupportedOperator(_)));

    let mut query = QueryBuilder::new("Opportunity");
    query.set_fields(["Name", "COUNT(Id)"]).add_group_by_field("Stage");
    let err = db.query(&query, false).unwrap_err();
    assert!(matches!(err, Error::Execution(_)));
}
