use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use korm::{from_str, parse, to_string, Korm};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone)]
struct User {
    id: u32,
    name: String,
    email: String,
    active: bool,
}

#[derive(Serialize, Deserialize, Clone)]
struct Product {
    sku: String,
    name: String,
    price: f64,
    quantity: u32,
}

#[derive(Serialize, Deserialize, Clone)]
struct NestedData {
    id: u32,
    metadata: Metadata,
    tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone)]
struct Metadata {
    created: String,
    updated: String,
    version: u32,
}

fn user() -> User {
    User {
        id: 123,
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        active: true,
    }
}

fn products(size: u32) -> Vec<Product> {
    (0..size)
        .map(|i| Product {
            sku: format!("SKU{}", i),
            name: format!("Product {}", i),
            price: 9.99 + f64::from(i),
            quantity: i,
        })
        .collect()
}

fn nested() -> NestedData {
    NestedData {
        id: 42,
        metadata: Metadata {
            created: "2023-01-01T00:00:00Z".to_string(),
            updated: "2023-12-31T23:59:59Z".to_string(),
            version: 3,
        },
        tags: vec![
            "important".to_string(),
            "verified".to_string(),
            "production".to_string(),
        ],
    }
}

fn benchmark_serialize_simple(c: &mut Criterion) {
    let user = user();

    c.bench_function("serialize_simple_struct", |b| {
        b.iter(|| to_string(black_box(&user)))
    });
}

fn benchmark_deserialize_simple(c: &mut Criterion) {
    let korm = "active: true\nemail: \"alice@example.com\"\nid: 123\nname: \"Alice\"";

    c.bench_function("deserialize_simple_struct", |b| {
        b.iter(|| from_str::<User>(black_box(korm)))
    });
}

fn benchmark_serialize_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize_array");

    for size in [10, 50, 100, 500].iter() {
        let products = products(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| to_string(black_box(&products)))
        });
    }
    group.finish();
}

fn benchmark_deserialize_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("deserialize_array");

    for size in [10, 50, 100, 500].iter() {
        let korm = to_string(&products(*size)).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), &korm, |b, korm| {
            b.iter(|| from_str::<Vec<Product>>(black_box(korm)))
        });
    }
    group.finish();
}

fn benchmark_nested(c: &mut Criterion) {
    let data = nested();
    let korm = to_string(&data).unwrap();

    c.bench_function("serialize_nested_struct", |b| {
        b.iter(|| to_string(black_box(&data)))
    });

    c.bench_function("deserialize_nested_struct", |b| {
        b.iter(|| from_str::<NestedData>(black_box(&korm)))
    });
}

fn benchmark_parse_only(c: &mut Criterion) {
    let korm = to_string(&products(100)).unwrap();

    c.bench_function("parse_document", |b| b.iter(|| parse(black_box(&korm))));

    let document = parse(&korm).unwrap();
    c.bench_function("extract_document", |b| {
        b.iter(|| black_box(&document).extract::<Vec<Product>>())
    });
}

fn benchmark_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");

    let plain = Korm::new();
    let mut positional = Korm::new();
    positional.as_list::<Product>(&[]);

    let products = products(100);
    let plain_text = plain.push(&products).unwrap();
    let positional_text = positional.push(&products).unwrap();

    group.bench_function("push_named", |b| {
        b.iter(|| plain.push(black_box(&products)))
    });

    group.bench_function("push_positional", |b| {
        b.iter(|| positional.push(black_box(&products)))
    });

    group.bench_function("pull_named", |b| {
        b.iter(|| plain.pull::<Vec<Product>>(black_box(&plain_text)))
    });

    group.bench_function("pull_positional", |b| {
        b.iter(|| positional.pull::<Vec<Product>>(black_box(&positional_text)))
    });

    group.finish();
}

fn benchmark_primitive_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("primitive_array");

    let numbers: Vec<i32> = (0..100).collect();
    let bools: Vec<bool> = (0..100).map(|i| i % 2 == 0).collect();
    let floats: Vec<f64> = (0..100).map(|i| i as f64 * 1.5).collect();

    group.bench_function("serialize_integers", |b| {
        b.iter(|| to_string(black_box(&numbers)))
    });

    group.bench_function("serialize_booleans", |b| {
        b.iter(|| to_string(black_box(&bools)))
    });

    group.bench_function("serialize_floats", |b| {
        b.iter(|| to_string(black_box(&floats)))
    });

    let numbers_korm = to_string(&numbers).unwrap();
    let bools_korm = to_string(&bools).unwrap();
    let floats_korm = to_string(&floats).unwrap();

    group.bench_function("deserialize_integers", |b| {
        b.iter(|| from_str::<Vec<i32>>(black_box(&numbers_korm)))
    });

    group.bench_function("deserialize_booleans", |b| {
        b.iter(|| from_str::<Vec<bool>>(black_box(&bools_korm)))
    });

    group.bench_function("deserialize_floats", |b| {
        b.iter(|| from_str::<Vec<f64>>(black_box(&floats_korm)))
    });

    group.finish();
}

fn benchmark_comparison_with_json(c: &mut Criterion) {
    let user = user();

    let mut group = c.benchmark_group("comparison");

    group.bench_function("korm_serialize", |b| {
        b.iter(|| korm::to_string(black_box(&user)))
    });

    group.bench_function("json_serialize", |b| {
        b.iter(|| serde_json::to_string(black_box(&user)))
    });

    let korm_str = korm::to_string(&user).unwrap();
    let json_str = serde_json::to_string(&user).unwrap();

    group.bench_function("korm_deserialize", |b| {
        b.iter(|| korm::from_str::<User>(black_box(&korm_str)))
    });

    group.bench_function("json_deserialize", |b| {
        b.iter(|| serde_json::from_str::<User>(black_box(&json_str)))
    });

    group.finish();
}

fn benchmark_roundtrip(c: &mut Criterion) {
    let user = user();

    c.bench_function("roundtrip_simple", |b| {
        b.iter(|| {
            let serialized = to_string(black_box(&user)).unwrap();
            let _deserialized: User = from_str(black_box(&serialized)).unwrap();
        })
    });
}

criterion_group!(
    benches,
    benchmark_serialize_simple,
    benchmark_deserialize_simple,
    benchmark_serialize_array,
    benchmark_deserialize_array,
    benchmark_nested,
    benchmark_parse_only,
    benchmark_engine,
    benchmark_primitive_array,
    benchmark_comparison_with_json,
    benchmark_roundtrip
);
criterion_main!(benches);
