use super::leakage::{LeakageVerifier, LeakageViolation};
use crate::data::EventLog;
use crate::engines::splitters::types::{FoldSet, FoldStats, SplitPolicy};
use serde::{Deserialize, Serialize};

/// Fold summaries plus the outcome of the leakage check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitReport {
    pub policy: SplitPolicy,
    pub timestamp: String,
    pub fold_stats: Vec<FoldStats>,
    pub violations: Vec<LeakageViolation>,
    pub passed: bool,
    pub summary: String,
}

impl SplitReport {
    pub fn build(folds: &FoldSet, log: &EventLog) -> Self {
        let fold_stats = folds.stats(log);
        let violations = LeakageVerifier::verify(folds, log).err().unwrap_or_default();
        let passed = violations.is_empty();

        let test_rows: usize = fold_stats.iter().map(|s| s.test_rows).sum();
        let summary = if passed {
            format!(
                "{} folds, {} test rows, no leakage detected",
                fold_stats.len(),
                test_rows
            )
        } else {
            format!(
                "{} folds, {} test rows, {} leakage violations",
                fold_stats.len(),
                test_rows,
                violations.len()
            )
        };

        Self {
            policy: folds.policy,
            timestamp: chrono::Utc::now().to_rfc3339(),
            fold_stats,
            violations,
            passed,
            summary,
        }
    }
}
