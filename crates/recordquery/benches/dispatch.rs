//! Dispatch benchmarks: cached vs fresh execution on the in-memory engine

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use recordquery::{Database, ExecutionMode, MemoryQueryService, QueryBuilder, Record, SortOrder};
use serde_json::json;

const STAGES: [&str; 4] = ["Prospecting", "Negotiation", "Closed Won", "Closed Lost"];

fn records(count: usize) -> Vec<Record> {
    (0..count)
        .filter_map(|i| {
            json!({
                "Id": i,
                "Name": format!("Deal {}", i),
                "Stage": STAGES[i % STAGES.len()],
                "Amount": (i * 37) % 10_000,
            })
            .as_object()
            .cloned()
        })
        .collect()
}

fn filtered_query() -> QueryBuilder {
    let mut query = QueryBuilder::new("Opportunity");
    query
        .set_fields(["Name", "Amount"])
        .add_where_condition("Stage", "=", "Closed Won")
        .add_where_condition("Amount", ">", 5000)
        .create_order_by(["Amount"], SortOrder::Desc)
        .set_limit(20);
    query
}

fn grouped_query() -> QueryBuilder {
    let mut query = QueryBuilder::new("Opportunity");
    query
        .set_fields(["Stage", "COUNT(Id)", "SUM(Amount)"])
        .add_group_by_field("Stage")
        .add_group_by_condition("COUNT(Id)", ">", 10);
    query
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");

    for &size in &[100usize, 1_000, 10_000] {
        let service = MemoryQueryService::new()
            .with_collection("Opportunity", records(size))
            .unwrap();
        let db = Database::new(service);
        let filtered = filtered_query();
        let grouped = grouped_query();

        group.bench_with_input(BenchmarkId::new("fresh_filter", size), &size, |b, _| {
            b.iter(|| db.query(black_box(&filtered), ExecutionMode::Fresh).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("fresh_group", size), &size, |b, _| {
            b.iter(|| db.query(black_box(&grouped), ExecutionMode::Fresh).unwrap())
        });

        db.query(&filtered, ExecutionMode::Cacheable).unwrap();
        group.bench_with_input(BenchmarkId::new("cached_filter", size), &size, |b, _| {
            b.iter(|| db.query(black_box(&filtered), ExecutionMode::Cacheable).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_dispatch);
criterion_main!(benches);
