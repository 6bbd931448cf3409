// Performance benchmarks for the lookalike pipeline
use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lookalike::{
    Customer, Dataset, LookalikeConfig, LookalikePipeline, Normalizer, Product, SimilarityMatrix, Transaction, Vector,
};
use rand::prelude::*;

const REGIONS: [&str; 4] = ["Asia", "Europe", "North America", "South America"];
const CATEGORIES: [&str; 4] = ["Books", "Clothing", "Electronics", "Home Decor"];

fn generate_dataset(customers: usize, rng: &mut StdRng) -> Dataset {
    let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();

    let products: Vec<Product> = (0..100)
        .map(|p| Product::new(format!("P{:03}", p), CATEGORIES[rng.random_range(0..CATEGORIES.len())]))
        .collect();

    let customers: Vec<Customer> = (0..customers)
        .map(|i| {
            Customer::new(
                format!("C{:04}", i + 1),
                REGIONS[rng.random_range(0..REGIONS.len())],
                start + chrono::Duration::days(rng.random_range(0..900)),
            )
        })
        .collect();

    let mut transactions = Vec::new();
    for customer in &customers {
        for _ in 0..rng.random_range(0..10) {
            let quantity = rng.random_range(1..5) as f64;
            transactions.push(Transaction::new(
                format!("T{:06}", transactions.len()),
                customer.id.clone(),
                products[rng.random_range(0..products.len())].id.as_str(),
                quantity,
                quantity * rng.random_range(10.0..500.0),
                start,
            ));
        }
    }

    Dataset::new(customers, transactions, products)
}

fn generate_rows(n: usize, dim: usize, rng: &mut StdRng) -> Vec<Vector> {
    (0..n)
        .map(|_| Vector::new((0..dim).map(|_| rng.random_range(-1.0..1.0)).collect()))
        .collect()
}

fn benchmark_similarity_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("similarity_matrix");
    let mut rng = StdRng::seed_from_u64(42);

    for size in [100, 500, 2000].iter() {
        let rows = generate_rows(*size, 14, &mut rng);
        group.bench_with_input(BenchmarkId::new("cosine", size), &rows, |b, rows| {
            b.iter(|| SimilarityMatrix::compute(black_box(rows)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_normalize(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let rows = generate_rows(2000, 14, &mut rng);
    let names: Vec<String> = (0..14).map(|i| format!("col{}", i)).collect();

    c.bench_function("normalize_2000x14", |b| {
        b.iter(|| Normalizer::fit_transform(black_box(&names), black_box(&rows)).unwrap());
    });
}

fn benchmark_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let mut rng = StdRng::seed_from_u64(1);

    for size in [200, 1000].iter() {
        let dataset = generate_dataset(*size, &mut rng);
        let targets: Vec<String> = dataset.customers.iter().take(20).map(|c| c.id.to_string()).collect();
        let pipeline = LookalikePipeline::new(LookalikeConfig::default().with_targets(targets)).unwrap();

        group.bench_with_input(BenchmarkId::new("end_to_end", size), &dataset, |b, dataset| {
            b.iter(|| pipeline.run(black_box(dataset)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_similarity_matrix, benchmark_normalize, benchmark_pipeline);
criterion_main!(benches);
