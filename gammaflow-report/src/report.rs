//! Report Data Structures

use chrono::{DateTime, Utc};
use gammaflow_core::{RoundReport, SweepConfig};
use serde::{Deserialize, Serialize};

/// Complete sweep report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    /// Run metadata
    pub meta: ReportMeta,
    /// Per-round results, in order
    pub rounds: Vec<RoundReport>,
}

/// How the sweep was run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    /// Crate version that produced the report
    pub version: String,
    /// When the report was generated
    pub timestamp: DateTime<Utc>,
    /// Execution strategy name
    pub executor: String,
    /// Worker threads (1 for sequential)
    pub workers: usize,
    /// Sweep configuration
    pub sweep: SweepConfig,
}

impl SweepReport {
    /// Assemble a report stamped with the current time
    pub fn new(
        sweep: SweepConfig,
        executor: impl Into<String>,
        workers: usize,
        rounds: Vec<RoundReport>,
    ) -> Self {
        Self {
            meta: ReportMeta {
                version: env!("CARGO_PKG_VERSION").to_string(),
                timestamp: Utc::now(),
                executor: executor.into(),
                workers,
                sweep,
            },
            rounds,
        }
    }
}
