#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use recordquery::{Database, MemoryQueryService, QueryBuilder, QueryService, SortOrder};
use serde_json::json;

#[derive(Arbitrary, Debug)]
enum BuilderOp {
    AddField(String),
    AddWhere { field: String, operator: u8, value: i64 },
    CustomLogic(String),
    GroupField(String),
    Having { field: String, value: i64 },
    OrderField { field: String, descending: bool },
    Limit(i64),
}

const OPERATORS: [&str; 8] = ["=", "!=", "<", "<=", ">", ">=", "LIKE", "IN"];

fuzz_target!(|ops: Vec<BuilderOp>| {
    let rows = (0..8)
        .filter_map(|i| json!({ "Id": i, "Name": format!("n{}", i), "Amount": i * 10 }).as_object().cloned())
        .collect();
    let Ok(service) = MemoryQueryService::new().with_collection("Account", rows) else {
        return;
    };
    let mut builder = QueryBuilder::new("Account");

    for op in ops.iter().take(50) {
        match op {
            BuilderOp::AddField(field) => {
                builder.add_field(field.as_str());
            }
            BuilderOp::AddWhere { field, operator, value } => {
                let operator = OPERATORS[*operator as usize % OPERATORS.len()];
                builder.add_where_condition(field.as_str(), operator, *value);
            }
            BuilderOp::CustomLogic(logic) => {
                builder.set_custom_logic(logic.as_str());
            }
            BuilderOp::GroupField(field) => {
                builder.add_group_by_field(field.as_str());
            }
            BuilderOp::Having { field, value } => {
                builder.add_group_by_condition(field.as_str(), ">", *value);
            }
            BuilderOp::OrderField { field, descending } => {
                let order = if *descending { SortOrder::Desc } else { SortOrder::Asc };
                builder.add_order_by_field(field.as_str()).set_order_by_order(order);
            }
            BuilderOp::Limit(limit) => {
                builder.set_limit(*limit);
            }
        }
    }

    // An engine result must agree with validation: invalid descriptors never run
    let descriptor = builder.build();
    let valid = descriptor.validate().is_ok();
    let result = service.execute(&descriptor);
    if !valid {
        assert!(result.is_err());
    }

    let db = Database::new(service);
    let _ = db.query(&builder, true);
});
