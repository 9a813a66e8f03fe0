pub mod traits;
pub mod columns;
pub mod split;
pub mod manager;

pub use manager::{ConfigManager, AppConfig};
pub use columns::ColumnsConfig;
pub use split::SplitConfig;
pub use traits::ConfigSection;
