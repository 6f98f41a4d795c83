//! Comparison of mitigation outcomes against a reference value.

use std::error::Error as StdError;
use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use mitex_hal::JobId;
use serde::{Deserialize, Serialize};

use crate::error::RunResult;
use crate::mitigation::ConfigOutcome;

/// One successful configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    /// Configuration name.
    pub config: String,
    /// Resilience level.
    pub resilience_level: u8,
    /// Requested precision.
    pub precision: f64,
    /// Estimated expectation value.
    pub estimate: f64,
    /// Standard error of the estimate.
    pub std_error: f64,
    /// `|estimate - reference|`.
    pub abs_error: f64,
    /// `abs_error / std_error`, absent when the standard error is zero.
    pub sigmas: Option<f64>,
    /// Whether the reference lies in `estimate +/- std_error`.
    pub within_one_sigma: bool,
    /// Backend job identifier.
    pub job_id: JobId,
}

/// A configuration without a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingConfig {
    /// Configuration name.
    pub config: String,
    /// Stage that failed.
    pub stage: String,
    /// Error chain, outermost first.
    pub reason: String,
}

/// Results of one run set against the exact value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Backend the jobs ran on.
    pub backend: String,
    /// Exact expectation value supplied by the caller.
    pub reference: f64,
    /// Creation time.
    pub generated_at: DateTime<Utc>,
    /// Successful configurations, in configuration order.
    pub rows: Vec<ComparisonRow>,
    /// Failed configurations, in configuration order.
    pub missing: Vec<MissingConfig>,
}

impl ComparisonReport {
    /// Build the report from runner outcomes.
    pub fn new(backend: impl Into<String>, reference: f64, outcomes: &[ConfigOutcome]) -> Self {
        let mut rows = Vec::new();
        let mut missing = Vec::new();

        for outcome in outcomes {
            match &outcome.outcome {
                Ok(result) => {
                    let abs_error = (result.estimate - reference).abs();
                    let sigmas = (result.std_error > 0.0).then(|| abs_error / result.std_error);
                    rows.push(ComparisonRow {
                        config: outcome.config.name.clone(),
                        resilience_level: outcome.config.resilience_level.as_u8(),
                        precision: outcome.config.precision,
                        estimate: result.estimate,
                        std_error: result.std_error,
                        abs_error,
                        sigmas,
                        within_one_sigma: abs_error <= result.std_error,
                        job_id: result.job_id.clone(),
                    });
                }
                Err(e) => missing.push(MissingConfig {
                    config: outcome.config.name.clone(),
                    stage: e.stage().to_string(),
                    reason: error_chain(e),
                }),
            }
        }

        Self {
            backend: backend.into(),
            reference,
            generated_at: Utc::now(),
            rows,
            missing,
        }
    }

    /// Whether every configuration produced a result.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Names of configurations without a result.
    pub fn missing_configs(&self) -> Vec<&str> {
        self.missing.iter().map(|m| m.config.as_str()).collect()
    }

    /// Row with the smallest absolute error.
    pub fn closest(&self) -> Option<&ComparisonRow> {
        self.rows
            .iter()
            .min_by(|a, b| a.abs_error.total_cmp(&b.abs_error))
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> RunResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write [`to_json`](Self::to_json) to `path`.
    pub fn write_json(&self, path: impl AsRef<Path>) -> RunResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Backend:   {}", self.backend)?;
        writeln!(f, "Reference: {:.6}", self.reference)?;
        writeln!(
            f,
            "{:<14} {:>5} {:>11} {:>10} {:>10} {:>8} {:>6}",
            "config", "level", "estimate", "std", "|error|", "sigmas", "in 1σ"
        )?;
        for row in &self.rows {
            let sigmas = row.sigmas.map_or_else(|| "-".to_string(), |s| format!("{s:.2}"));
            writeln!(
                f,
                "{:<14} {:>5} {:>11.6} {:>10.6} {:>10.6} {:>8} {:>6}",
                row.config,
                row.resilience_level,
                row.estimate,
                row.std_error,
                row.abs_error,
                sigmas,
                if row.within_one_sigma { "yes" } else { "no" }
            )?;
        }
        for m in &self.missing {
            writeln!(f, "{:<14} missing ({}): {}", m.config, m.stage, m.reason)?;
        }
        Ok(())
    }
}

fn error_chain(error: &dyn StdError) -> String {
    let mut parts = vec![error.to_string()];
    let mut source = error.source();
    while let Some(e) = source {
        parts.push(e.to_string());
        source = e.source();
    }
    parts.join(": ")
}
