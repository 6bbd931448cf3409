//! End-to-end lookalike pipeline
//!
//! features -> standardization -> similarity matrix -> top-K selection.
//! A pure function of the dataset and the config: no clock, no randomness.

use crate::explain::{explain_pair, LookalikeReport, DEFAULT_EXPLAIN_FEATURES};
use crate::features::{BuildReport, FeatureBuilder};
use crate::matrix::SimilarityMatrix;
use crate::normalize::{ColumnStats, Normalizer};
use crate::schema::FeatureSchema;
use crate::select::LookalikeSelector;
use lookalike_core::{CustomerId, Dataset, LookalikeConfig, Result};
use tracing::{debug, info};

/// Everything one run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Column vocabulary the vectors were built against
    pub schema: FeatureSchema,
    /// Row ordering shared by the feature table and the similarity matrix
    pub customer_ids: Vec<CustomerId>,
    pub build_report: BuildReport,
    pub columns: Vec<ColumnStats>,
    pub report: LookalikeReport,
}

#[derive(Debug, Clone)]
pub struct LookalikePipeline {
    config: LookalikeConfig,
}

impl LookalikePipeline {
    pub fn new(config: LookalikeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LookalikeConfig {
        &self.config
    }

    /// Run over `dataset` for the configured targets
    pub fn run(&self, dataset: &Dataset) -> Result<PipelineOutput> {
        self.run_for(dataset, &self.config.target_customer_ids)
    }

    /// Run over `dataset` for an explicit target list
    pub fn run_for<S: AsRef<str>>(&self, dataset: &Dataset, targets: &[S]) -> Result<PipelineOutput> {
        let table = FeatureBuilder::from_config(&self.config).build(dataset)?;
        let schema = table.schema().clone();
        let names = schema.column_names();
        info!(
            customers = table.len(),
            transactions = dataset.transactions.len(),
            dim = schema.dim(),
            "Built feature vectors"
        );

        let (normalizer, scaled) = Normalizer::fit_transform(&names, &table.vectors())?;
        debug!(
            degenerate = normalizer.degenerate_columns().len(),
            "Standardized feature columns"
        );

        let matrix = SimilarityMatrix::compute(&scaled)?;
        debug!(n = matrix.len(), "Computed similarity matrix");

        let customer_ids = table.customer_ids();
        let mut report = LookalikeSelector::from_config(&self.config).select(&matrix, &customer_ids, targets)?;

        if self.config.explain {
            for (target, peers) in report.results.iter() {
                let Some(ti) = table.index_of(target.as_str()) else {
                    continue;
                };
                let explanations = peers
                    .iter()
                    .filter_map(|peer| {
                        let pj = table.index_of(peer.customer_id.as_str())?;
                        Some(explain_pair(
                            peer.customer_id.clone(),
                            &names,
                            &scaled[ti],
                            &scaled[pj],
                            self.config.score_precision,
                            DEFAULT_EXPLAIN_FEATURES,
                        ))
                    })
                    .collect();
                report.explanations.insert(target.clone(), explanations);
            }
        }

        info!(
            succeeded = report.results.len(),
            failed = report.failures.len(),
            top_k = self.config.top_k,
            "Selected lookalikes"
        );

        Ok(PipelineOutput {
            schema,
            customer_ids,
            build_report: table.report(),
            columns: normalizer.columns().to_vec(),
            report,
        })
    }
}

/// Top-`top_k` lookalikes for `targets` with default settings otherwise
pub fn generate_lookalikes<S: AsRef<str>>(
    dataset: &Dataset,
    targets: &[S],
    top_k: usize,
) -> Result<LookalikeReport> {
    let pipeline = LookalikePipeline::new(LookalikeConfig::default().with_top_k(top_k))?;
    Ok(pipeline.run_for(dataset, targets)?.report)
}
