//! Projection engine: cohort recurrence and financial overlay

mod state;
mod engine;
mod overlay;
mod cashflows;
mod npv;

pub use state::CohortState;
pub use engine::{ProjectionEngine, ProjectionConfig, monthly_churn_rate, DEFAULT_START_YEAR, DEFAULT_START_MONTH};
pub use overlay::FinancialOverlay;
pub use cashflows::{CohortRow, MonthlyRecord, AnnualSummary, annual_rollup};
pub use npv::{calculate_npv, monthly_rate_from_annual};
