use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use lookalike::{
    write_schema, CsvLoader, LookalikeConfig, LookalikePipeline, MissingProductPolicy, ResultWriter,
};
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Rank the most similar customers for each target customer
#[derive(Parser, Debug)]
#[command(name = "lookalike")]
#[command(about = "Customer lookalikes from demographics and transactions", long_about = None)]
struct Args {
    /// Directory holding Customers.csv, Transactions.csv and Products.csv
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,

    /// JSON config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Date platform age is measured against (YYYY-MM-DD)
    #[arg(long)]
    reference_date: Option<NaiveDate>,

    /// Number of lookalikes per target
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

    /// Decimal places for similarity scores
    #[arg(long)]
    precision: Option<u32>,

    /// Target customer ids, comma separated
    #[arg(short, long, value_delimiter = ',')]
    targets: Vec<String>,

    /// Use the first N customers of the dataset as targets
    #[arg(long, conflicts_with = "targets")]
    first: Option<usize>,

    /// Transactions with unknown products: reject | drop
    #[arg(long)]
    missing_products: Option<MissingProductPolicy>,

    /// Write the full report with per-feature explanations
    #[arg(long)]
    explain: bool,

    /// Output file
    #[arg(short, long, default_value = lookalike_storage::DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// Also write the feature schema (column vocabulary) here
    #[arg(long)]
    schema_output: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn into_config(self) -> anyhow::Result<(LookalikeConfig, Output)> {
        let mut config = match &self.config {
            Some(path) => LookalikeConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => LookalikeConfig::default(),
        };

        if let Some(date) = self.reference_date {
            config.reference_date = date;
        }
        if let Some(k) = self.top_k {
            config.top_k = k;
        }
        if let Some(p) = self.precision {
            config.score_precision = p;
        }
        if !self.targets.is_empty() {
            config.target_customer_ids = self.targets;
        }
        if let Some(policy) = self.missing_products {
            config.missing_product_policy = policy;
        }
        if self.explain {
            config.explain = true;
        }
        config.validate()?;

        let output = Output {
            data_dir: self.data_dir,
            path: self.output,
            schema_path: self.schema_output,
            first: self.first,
        };
        Ok((config, output))
    }
}

struct Output {
    data_dir: PathBuf,
    path: PathBuf,
    schema_path: Option<PathBuf>,
    first: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting lookalike v{}", env!("CARGO_PKG_VERSION"));

    let (mut config, output) = args.into_config()?;
    info!("Data directory: {:?}", output.data_dir);
    info!("Reference date: {}", config.reference_date);

    let dataset = CsvLoader::new(&output.data_dir).load()?;

    if let Some(n) = output.first {
        config.target_customer_ids = dataset
            .customers
            .iter()
            .take(n)
            .map(|c| c.id.to_string())
            .collect();
    } else if config.target_customer_ids.is_empty() {
        info!("No targets given, computing lookalikes for every customer");
        config.target_customer_ids = dataset.customers.iter().map(|c| c.id.to_string()).collect();
    }

    let explain = config.explain;
    let pipeline = LookalikePipeline::new(config)?;
    let result = pipeline.run(&dataset)?;

    let writer = ResultWriter::new(&output.path);
    if explain {
        writer.write_report(&result.report)?;
    } else {
        writer.write_result(&result.report.results)?;
    }
    if let Some(path) = &output.schema_path {
        write_schema(path, &result.schema)?;
        info!("Feature schema written to {:?}", path);
    }

    for failure in &result.report.failures {
        warn!("Target {} failed: {}", failure.target, failure.reason);
    }
    info!(
        "Done: {} succeeded, {} failed",
        result.report.results.len(),
        result.report.failures.len()
    );

    Ok(())
}
