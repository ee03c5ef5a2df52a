//! Card Projection - Monthly projection engine for a secured credit-card product
//!
//! This library provides:
//! - Cohort modeling of issued, activated and churned cards month by month
//! - Financial overlay (activation fees, interchange, acquisition and operating costs)
//! - Scenario runs with summary statistics (total profit, ROI, breakeven month)
//! - Single-parameter sensitivity sweeps
//! - Portfolio KPIs and growth metrics for reporting layers

pub mod error;
pub mod parameters;
pub mod projection;
pub mod scenario;
pub mod sensitivity;
pub mod metrics;

// Re-export commonly used types
pub use error::{ParameterError, Result};
pub use parameters::{Parameter, ScenarioParameters};
pub use projection::{MonthlyRecord, AnnualSummary, ProjectionEngine, ProjectionConfig};
pub use scenario::{ScenarioRunner, ScenarioResult, ScenarioSet, ScenarioSummary, BASE_SCENARIO};
pub use sensitivity::{SensitivityAnalyzer, SensitivityRow, SensitivityTable, SweepRange};
pub use metrics::PortfolioKpis;
