// Integration tests for lookalike
use chrono::NaiveDate;
use lookalike::{
    CsvLoader, Customer, Dataset, Error, LookalikeConfig, LookalikePipeline, MissingProductPolicy, Product,
    ResultWriter, Transaction, generate_lookalikes,
};
use std::fs;
use std::path::Path;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 200 customers over four regions with deterministic, varied purchase profiles.
/// C0001 and C0174 are given near-identical histories.
fn synthetic_dataset() -> Dataset {
    let regions = ["Asia", "Europe", "North America", "South America"];
    let categories = ["Books", "Clothing", "Electronics", "Home Decor"];

    let products: Vec<Product> = (0..20)
        .map(|p| Product::new(format!("P{:03}", p + 1), categories[p % categories.len()]))
        .collect();

    let mut customers = Vec::new();
    let mut transactions = Vec::new();
    let mut txn_id = 0;

    for i in 1..=200u32 {
        let id = format!("C{:04}", i);
        let region = if i == 174 { "South America" } else { regions[(i as usize * 7) % regions.len()] };
        let signup = ymd(2022, 1, 1) + chrono::Duration::days(((i * 37) % 900) as i64);
        customers.push(Customer::new(id.as_str(), region, signup));

        // C0004 never buys anything
        if i == 4 {
            continue;
        }
        let (count, shift) = if i == 1 || i == 174 { (5, 3) } else { (1 + (i % 6), i as usize) };
        for t in 0..count {
            txn_id += 1;
            let product = &products[(shift + t as usize * 4) % products.len()];
            let quantity = 1.0 + ((i + t) % 4) as f64;
            let value = quantity * (25.0 + ((i * 13 + t * 7) % 300) as f64);
            let (quantity, value) = if i == 1 || i == 174 { (2.0, 480.0) } else { (quantity, value) };
            transactions.push(Transaction::new(
                format!("T{:05}", txn_id),
                id.as_str(),
                product.id.as_str(),
                quantity,
                value,
                ymd(2024, 6, 1),
            ));
        }
    }

    // C0001 is in South America too (1 * 7 % 4 == 3)
    Dataset::new(customers, transactions, products)
}

#[test]
fn test_lookalikes_for_target() {
    let dataset = synthetic_dataset();
    let report = generate_lookalikes(&dataset, &["C0001"], 3).unwrap();

    let peers = report.results.get("C0001").unwrap();
    assert_eq!(peers.len(), 3);
    assert_eq!(peers[0].customer_id.as_str(), "C0174");
    assert!(peers[0].score > 0.95, "score {}", peers[0].score);
    assert!(peers.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn test_unknown_target_reported_alongside_results() {
    let dataset = synthetic_dataset();
    let report = generate_lookalikes(&dataset, &["C0001", "C9999", "C0002"], 3).unwrap();

    assert!(report.results.contains("C0001"));
    assert!(report.results.contains("C0002"));
    assert!(!report.results.contains("C9999"));
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].target, "C9999");
    assert!(report.failures[0].reason.contains("Unknown customer"));
}

#[test]
fn test_self_exclusion_and_ranking_for_all_customers() {
    let dataset = synthetic_dataset();
    let targets: Vec<String> = dataset.customers.iter().map(|c| c.id.to_string()).collect();
    let config = LookalikeConfig::default().with_targets(targets.clone()).with_top_k(5);
    let output = LookalikePipeline::new(config).unwrap().run(&dataset).unwrap();

    assert_eq!(output.report.results.len(), targets.len());
    for (target, peers) in output.report.results.iter() {
        assert_eq!(peers.len(), 5);
        assert!(peers.iter().all(|p| &p.customer_id != target));
        for pair in peers.windows(2) {
            assert!(pair[0].score >= pair[1].score, "bad order for {}: {:?}", target, peers);
        }
        assert!(peers.iter().all(|p| (-1.0..=1.0).contains(&p.score)));
    }
}

#[test]
fn test_customer_without_transactions_is_included() {
    let dataset = synthetic_dataset();
    let report = generate_lookalikes(&dataset, &["C0004"], 3).unwrap();
    assert_eq!(report.results.get("C0004").unwrap().len(), 3);
}

#[test]
fn test_pipeline_is_deterministic() {
    let dataset = synthetic_dataset();
    let targets = ["C0001", "C0050", "C0123", "C0200"];
    let pipeline = LookalikePipeline::new(LookalikeConfig::default()).unwrap();

    let first = serde_json::to_string(&pipeline.run_for(&dataset, &targets).unwrap().report.results).unwrap();
    let second = serde_json::to_string(&pipeline.run_for(&dataset, &targets).unwrap().report.results).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_missing_product_policies() {
    let mut dataset = synthetic_dataset();
    dataset
        .transactions
        .push(Transaction::new("T99999", "C0002", "P999", 1.0, 10.0, ymd(2024, 7, 1)));

    let reject = LookalikePipeline::new(LookalikeConfig::default()).unwrap();
    assert!(matches!(
        reject.run_for(&dataset, &["C0001"]),
        Err(Error::MissingReference { .. })
    ));

    let config = LookalikeConfig {
        missing_product_policy: MissingProductPolicy::Drop,
        ..Default::default()
    };
    let output = LookalikePipeline::new(config).unwrap().run_for(&dataset, &["C0001"]).unwrap();
    assert_eq!(output.build_report.dropped_transactions, 1);
    assert!(output.report.results.contains("C0001"));
}

#[test]
fn test_reference_date_changes_features_not_shape() {
    let dataset = synthetic_dataset();
    let early = LookalikeConfig {
        reference_date: ymd(2025, 1, 1),
        ..Default::default()
    };
    let late = LookalikeConfig {
        reference_date: ymd(2030, 1, 1),
        ..Default::default()
    };
    let a = LookalikePipeline::new(early).unwrap().run_for(&dataset, &["C0001"]).unwrap();
    let b = LookalikePipeline::new(late).unwrap().run_for(&dataset, &["C0001"]).unwrap();

    // Shifting every signup age by a constant leaves standardized values unchanged
    assert_eq!(a.schema, b.schema);
    let days_a = &a.columns[0];
    let days_b = &b.columns[0];
    assert!((days_b.mean - days_a.mean - 1826.0).abs() < 1e-9);
    assert!((days_a.std_dev - days_b.std_dev).abs() < 1e-9);
}

fn write_csv(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn test_csv_to_json_round_trip() {
    let data = tempfile::tempdir().unwrap();
    write_csv(
        data.path(),
        "Customers.csv",
        "CustomerID,CustomerName,Region,SignupDate\n\
         C0001,Ada,Asia,2023-01-10\n\
         C0002,Bo,Asia,2023-02-10\n\
         C0003,Cy,Europe,2022-05-01\n\
         C0004,Di,Europe,2022-06-01\n",
    );
    write_csv(
        data.path(),
        "Products.csv",
        "ProductID,ProductName,Category,Price\n\
         P001,\"Novel, Hardcover\",Books,20.00\n\
         P002,Laptop,Electronics,900.00\n",
    );
    write_csv(
        data.path(),
        "Transactions.csv",
        "TransactionID,CustomerID,ProductID,TransactionDate,Quantity,TotalValue,Price\n\
         T1,C0001,P002,2024-03-01 10:00:00,1,900.00,900.00\n\
         T2,C0002,P002,2024-03-02 11:30:00,1,900.00,900.00\n\
         T3,C0003,P001,2024-04-01 09:15:00,2,40.00,20.00\n\
         T4,C0004,P001,2024-04-03 16:45:00,3,60.00,20.00\n",
    );

    let dataset = CsvLoader::new(data.path()).load().unwrap();
    let config = LookalikeConfig::default().with_targets(["C0001", "C0003"]).with_top_k(2);
    let output = LookalikePipeline::new(config).unwrap().run(&dataset).unwrap();

    let out = tempfile::tempdir().unwrap();
    let path = out.path().join("Lookalike.json");
    ResultWriter::new(&path).write_result(&output.report.results).unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let map = json.as_object().unwrap();
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["C0001", "C0003"]);
    assert_eq!(json["C0001"][0][0], "C0002");
    assert_eq!(json["C0003"][0][0], "C0004");
    assert_eq!(json["C0001"].as_array().unwrap().len(), 2);
}
