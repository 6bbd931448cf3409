//! Result writer
//!
//! Persists lookalike results and the feature schema as pretty JSON.
//! Files are replaced atomically: a failed write leaves the old file (or
//! nothing) in place, never a truncated one.

use anyhow::{Context, Result};
use atomicwrites::{AllowOverwrite, AtomicFile};
use lookalike_similarity::{FeatureSchema, LookalikeReport, LookalikeResult};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_OUTPUT_FILE: &str = "Lookalike.json";

#[derive(Debug, Clone)]
pub struct ResultWriter {
    path: PathBuf,
}

impl ResultWriter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `{"C0001": [["C0174", 0.9786], ...]}`
    pub fn write_result(&self, result: &LookalikeResult) -> Result<()> {
        write_json(&self.path, result)?;
        info!(targets = result.len(), "Wrote lookalikes to {}", self.path.display());
        Ok(())
    }

    /// Write the full report: results, failures and any explanations
    pub fn write_report(&self, report: &LookalikeReport) -> Result<()> {
        write_json(&self.path, report)?;
        info!(
            targets = report.results.len(),
            failures = report.failures.len(),
            "Wrote report to {}",
            self.path.display()
        );
        Ok(())
    }
}

/// Write the column vocabulary a run used
pub fn write_schema<P: AsRef<Path>>(path: P, schema: &FeatureSchema) -> Result<()> {
    write_json(path.as_ref(), schema)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }

    let file = AtomicFile::new(path, AllowOverwrite);
    file.write(|f| serde_json::to_writer_pretty(f, value))
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
