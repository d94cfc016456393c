use recordquery::logging::LogConfig;
use recordquery::{Database, ExecutionMode, MemoryQueryService, QueryBuilder, Record, SortOrder};
use serde_json::json;

fn print_rows(rows: &[Record]) {
    for row in rows {
        println!("  {}", serde_json::Value::Object(row.clone()));
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Debug level shows dispatch, cache hits and engine stages
    let _guard = LogConfig::debug().init();

    println!("=== RecordQuery Pipeline Demo ===\n");

    let opportunities: Vec<Record> = serde_json::from_value(json!([
        { "Id": 1, "Name": "Acme Renewal", "Stage": "Closed Won", "Region": "EMEA", "Amount": 12000 },
        { "Id": 2, "Name": "Globex Expansion", "Stage": "Prospecting", "Region": "AMER", "Amount": 48000 },
        { "Id": 3, "Name": "Initech Pilot", "Stage": "Closed Won", "Region": "AMER", "Amount": 3500 },
        { "Id": 4, "Name": "Umbrella Upsell", "Stage": "Negotiation", "Region": null, "Amount": 22000 },
        { "Id": 5, "Name": "Hooli Platform", "Stage": "Closed Won", "Region": "APAC", "Amount": 91000 }
    ]))?;
    let service = MemoryQueryService::new().with_collection("Opportunity", opportunities)?;
    let db = Database::new(service);

    println!("1. Large or won deals, biggest first...");
    let mut query = QueryBuilder::new("Opportunity");
    query
        .set_fields(["Name", "Stage", "Amount"])
        .add_where_condition("Stage", "=", "Closed Won")
        .add_where_condition("Amount", ">", 20000)
        .set_custom_logic("1 OR 2")
        .create_order_by(["Amount"], SortOrder::Desc)
        .set_limit(3);
    println!("  descriptor: {}", query.build().to_json()?);
    print_rows(&db.query(&query, ExecutionMode::Cacheable)?);

    println!("\n2. Same query again (served from cache)...");
    print_rows(&db.query(&query, ExecutionMode::Cacheable)?);
    println!("  cache: {:?}", db.cache_stats()?);

    println!("\n3. Pipeline by stage...");
    let mut by_stage = QueryBuilder::new("Opportunity");
    by_stage
        .set_fields(["Stage", "COUNT(Id) deals", "SUM(Amount) total"])
        .add_group_by_field("Stage")
        .add_group_by_condition("SUM(Amount)", ">=", 20000)
        .create_order_by(["total"], SortOrder::Desc);
    print_rows(&db.query(&by_stage, ExecutionMode::Fresh)?);

    println!("\n4. Rejected descriptor...");
    let mut broken = QueryBuilder::new("Opportunity");
    broken
        .add_where_condition("Stage", "=", "Closed Won")
        .set_custom_logic("1 AND 3");
    if let Err(e) = db.query(&broken, false) {
        println!("  {}", e);
    }

    println!("\n=== Demo Complete ===");

    Ok(())
}
