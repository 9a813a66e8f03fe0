use super::traits::ConfigSection;
use crate::engines::splitters::types::{
    FutureWithheld, InclusionPolicy, SplitPolicy, TestSelection,
};
use crate::error::FoldError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub policy: SplitPolicy,
    /// Fold count; also the withhold depth `k` for the withhold policy
    pub n_splits: usize,
    /// Subtype values eligible for withholding (1 = organic listen)
    pub eligible_subtypes: Vec<i64>,
    pub future_withheld: FutureWithheld,
    pub inclusion: InclusionPolicy,
    pub test_selection: TestSelection,
    pub parallel: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            policy: SplitPolicy::Proportional,
            n_splits: 3,
            eligible_subtypes: vec![1],
            future_withheld: FutureWithheld::Retain,
            inclusion: InclusionPolicy::AllFolds,
            test_selection: TestSelection::FollowingRow,
            parallel: true,
        }
    }
}

impl ConfigSection for SplitConfig {
    fn section_name() -> &'static str {
        "split"
    }

    fn validate(&self) -> Result<(), FoldError> {
        if self.n_splits == 0 {
            return Err(FoldError::Configuration(
                "n_splits must be at least 1".to_string(),
            ));
        }
        if self.policy == SplitPolicy::WithholdLastK && self.eligible_subtypes.is_empty() {
            return Err(FoldError::Configuration(
                "Withhold policy needs at least one eligible subtype".to_string(),
            ));
        }
        Ok(())
    }
}
