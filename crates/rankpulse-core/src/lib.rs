pub mod brand;
pub mod config;
pub mod dashboard;
pub mod distribution;
pub mod error;
pub mod history;
pub mod intent;
pub mod keyword;
pub mod summary;
pub mod window;

pub use brand::{derive_brand_variations, BrandVariations};
pub use dashboard::{build_dashboard, build_keyword_rows, DashboardMetrics, KeywordRow};
pub use distribution::{bucket, Bucket};
pub use history::HistorySource;
pub use intent::{classify, IntentCategory};
pub use summary::{summarize, summarize_at, KeywordSummary};
pub use window::DateWindow;
