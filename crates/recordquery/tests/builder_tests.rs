use recordquery::{Condition, QueryBuilder, QueryDescriptor, SortOrder};
use serde_json::{json, Value};

fn wire(builder: &QueryBuilder) -> Value {
    serde_json::to_value(builder.build()).unwrap()
}

#[test]
fn test_collection_only_builds_select_all() {
    let builder = QueryBuilder::new("Account");

    assert_eq!(wire(&builder), json!({ "collectionName": "Account" }));
    assert!(builder.validate().is_ok());
}

#[test]
fn test_add_field_twice_yields_one_entry() {
    let mut builder = QueryBuilder::new("Account");
    builder.add_field("Name").add_field("Name");

    assert_eq!(wire(&builder)["fields"], json!(["Name"]));
}

#[test]
fn test_set_fields_is_taken_verbatim() {
    let mut builder = QueryBuilder::new("Account");
    builder.set_fields(["A", "B"]);
    assert_eq!(wire(&builder)["fields"], json!(["A", "B"]));

    builder.set_fields(["A", "B", "B"]);
    assert_eq!(wire(&builder)["fields"], json!(["A", "B", "B"]));
}

#[test]
fn test_where_conditions_keep_insertion_order() {
    let mut builder = QueryBuilder::new("Account");
    builder
        .add_where_condition("Name", "=", "Acme")
        .add_where_condition("Status", "=", "Open")
        .set_custom_logic("1 OR 2");

    let value = wire(&builder);
    assert_eq!(
        value["whereConditions"],
        json!([
            { "field": "Name", "operator": "=", "value": "Acme" },
            { "field": "Status", "operator": "=", "value": "Open" }
        ])
    );
    assert_eq!(value["customLogic"], "1 OR 2");
    assert!(builder.validate().is_ok());
}

#[test]
fn test_second_create_group_by_is_ignored() {
    let mut builder = QueryBuilder::new("Account");
    builder
        .create_group_by(["Type"], vec![], None)
        .create_group_by(["Other"], vec![], None);

    assert_eq!(
        wire(&builder)["groupBy"],
        json!({ "fields": ["Type"], "havingConditions": [] })
    );
}

#[test]
fn test_add_order_by_field_deduplicates() {
    let mut builder = QueryBuilder::new("Account");
    builder
        .create_order_by(["Name"], SortOrder::Asc)
        .add_order_by_field("Name");

    assert_eq!(
        wire(&builder)["orderBy"],
        json!({ "fields": ["Name"], "order": "ASC" })
    );
}

#[test]
fn test_snapshots_are_not_aliased() {
    let mut builder = QueryBuilder::new("Contact");
    builder
        .add_field("Email")
        .add_where_condition("Email", "!=", Value::Null)
        .add_group_by_field("AccountId");

    let mut first = builder.build();
    let second = builder.build();
    assert_eq!(first, second);

    first.collection_name = "Lead".to_string();
    first.group_by.as_mut().unwrap().fields = None;
    first.where_conditions.as_mut().unwrap().clear();

    assert_eq!(second.collection_name, "Contact");
    assert_eq!(second.conditions().len(), 1);
    assert_eq!(builder.build(), second);
}

#[test]
fn test_builder_keeps_working_after_build() {
    let mut builder = QueryBuilder::new("Opportunity");
    builder.add_field("Id");
    let before = builder.build();

    builder.add_field("Amount").set_limit(5);
    let after = builder.build();

    assert_eq!(before.fields.as_deref().map(|f| f.len()), Some(1));
    assert_eq!(after.fields.as_deref().map(|f| f.len()), Some(2));
    assert_eq!(before.query_limit, None);
    assert_eq!(after.query_limit, Some(5));
}

#[test]
fn test_full_descriptor_wire_shape() {
    let mut builder = QueryBuilder::new("Opportunity");
    builder
        .set_fields(["StageName", "SUM(Amount)"])
        .add_where_condition("CloseDate", ">=", "2024-01-01")
        .add_where_condition("IsWon", "=", true)
        .add_where_condition("Amount", ">", 1000)
        .set_custom_logic("1 AND (2 OR 3)")
        .add_group_by_field("StageName")
        .add_group_by_condition("SUM(Amount)", ">", 5000)
        .set_group_by_logic("1")
        .create_order_by(["StageName"], SortOrder::Desc)
        .set_limit(20);

    assert_eq!(
        wire(&builder),
        json!({
            "collectionName": "Opportunity",
            "fields": ["StageName", "SUM(Amount)"],
            "whereConditions": [
                { "field": "CloseDate", "operator": ">=", "value": "2024-01-01" },
                { "field": "IsWon", "operator": "=", "value": true },
                { "field": "Amount", "operator": ">", "value": 1000 }
            ],
            "customLogic": "1 AND (2 OR 3)",
            "groupBy": {
                "fields": ["StageName"],
                "havingConditions": [{ "field": "SUM(Amount)", "operator": ">", "value": 5000 }],
                "customLogic": "1"
            },
            "orderBy": { "fields": ["StageName"], "order": "DESC" },
            "queryLimit": 20
        })
    );
}

#[test]
fn test_descriptor_json_decodes_back() {
    let mut builder = QueryBuilder::new("Case");
    builder
        .add_field("Subject")
        .add_where_condition("Priority", "IN", json!(["High", "Critical"]))
        .set_order_by_order(SortOrder::Asc);

    let descriptor = builder.build();
    let decoded = QueryDescriptor::from_json(&descriptor.to_json().unwrap()).unwrap();

    assert_eq!(decoded, descriptor);
}

#[test]
fn test_legacy_payload_is_accepted() {
    let payload = r#"{
        "objectApiName": "Account",
        "fields": ["Id"],
        "groupBy": { "fields": ["Type"], "havingCoditions": [], "customLogic": null },
        "queryLimit": 3
    }"#;
    let descriptor = QueryDescriptor::from_json(payload).unwrap();

    assert_eq!(descriptor.collection_name, "Account");
    assert_eq!(descriptor.group_by.unwrap().having_conditions, Some(vec![]));
    assert_eq!(descriptor.query_limit, Some(3));
}

#[test]
fn test_create_matches_incremental_building() {
    let created = QueryBuilder::create(
        "Account",
        Some(vec!["Id".to_string()]),
        Some(vec![Condition::new("Type", "=", "Customer")]),
        None,
        None,
        None,
        Some(1),
    );

    let mut incremental = QueryBuilder::new("Account");
    incremental
        .add_field("Id")
        .add_where_condition("Type", "=", "Customer")
        .set_limit(1);

    assert_eq!(created.build(), incremental.build());
}
