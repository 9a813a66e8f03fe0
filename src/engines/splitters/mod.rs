pub mod aggregator;
pub mod base;
pub mod chunker;
pub mod proportional;
pub mod types;
pub mod withhold;

pub use aggregator::{EntitySplit, FoldContribution, PartitionAggregator};
pub use base::FoldSplitter;
pub use chunker::chunk;
pub use proportional::{train_test_split, ProportionalSplitter};
pub use types::{
    FoldSet, FoldStats, FutureWithheld, InclusionPolicy, Partition, SplitPolicy, TestSelection,
};
pub use withhold::{split_withhold, withhold_last, EligibilityPredicate, WithholdLastKSplitter};
