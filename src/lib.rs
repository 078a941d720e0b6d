//! Project profitability and labor-efficiency metrics.
//!
//! Raw project-financial and timesheet rows go in; an [`AnalysisResult`]
//! with per-project metrics, efficiency statistics, department rollups and
//! type/status comparisons comes out. Loading CSV files and writing CSV, JSON
//! and text reports are thin layers around that core.

pub mod aggregate;
pub mod analysis;
pub mod categories;
pub mod config;
pub mod departments;
pub mod error;
pub mod insights;
pub mod loader;
pub mod normalize;
pub mod output;
pub mod reports;
pub mod stats;
pub mod text_report;
pub mod types;
pub mod util;

pub use analysis::{analyze, AnalysisResult};
pub use config::AnalysisConfig;
pub use error::{AnalysisError, Result};
