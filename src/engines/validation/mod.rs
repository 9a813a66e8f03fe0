pub mod leakage;
pub mod report;

pub use leakage::{LeakageVerifier, LeakageViolation, ViolationKind};
pub use report::SplitReport;
