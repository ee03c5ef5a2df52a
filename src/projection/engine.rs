//! Core projection engine for monthly cohort and financial projections

use chrono::NaiveDate;

use crate::parameters::ScenarioParameters;
use super::state::CohortState;
use super::cashflows::{CohortRow, MonthlyRecord};
use super::overlay::FinancialOverlay;

/// Default first simulated month
pub const DEFAULT_START_YEAR: i32 = 2025;
pub const DEFAULT_START_MONTH: u32 = 1;

/// Configuration for a projection run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionConfig {
    /// Any date within the first simulated month
    pub start: NaiveDate,
}

impl ProjectionConfig {
    pub fn starting_at(start: NaiveDate) -> Self {
        Self { start }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(DEFAULT_START_YEAR, DEFAULT_START_MONTH, 1)
                .unwrap_or(NaiveDate::MIN),
        }
    }
}

/// Monthly churn rate equivalent to an annual attrition rate.
///
/// Compounds: twelve months at the returned rate reproduce the annual rate.
pub fn monthly_churn_rate(annual_churn_rate: f64) -> f64 {
    1.0 - (1.0 - annual_churn_rate).powf(1.0 / 12.0)
}

/// Main projection engine
pub struct ProjectionEngine {
    parameters: ScenarioParameters,
    config: ProjectionConfig,
}

impl ProjectionEngine {
    /// Create a new projection engine with given parameters and config
    pub fn new(parameters: ScenarioParameters, config: ProjectionConfig) -> Self {
        Self { parameters, config }
    }

    pub fn parameters(&self) -> &ScenarioParameters {
        &self.parameters
    }

    /// Run the full projection: cohort recurrence, then the financial overlay
    pub fn project(&self) -> Vec<MonthlyRecord> {
        let cohorts = self.project_cohorts();
        FinancialOverlay::from_parameters(&self.parameters).apply(&cohorts)
    }

    /// Run the cohort recurrence only
    pub fn project_cohorts(&self) -> Vec<CohortRow> {
        let months = self.parameters.horizon_months();
        let mut rows = Vec::with_capacity(months as usize);
        let mut state = CohortState::starting_at(self.config.start);

        let new_cards = self.parameters.monthly_new_cards();
        let churn = monthly_churn_rate(self.parameters.annual_churn_rate);

        for _month in 0..months {
            let row = self.calculate_month(&mut state, new_cards, churn);
            state.advance_month(row.active_cards);
            rows.push(row);
        }

        rows
    }

    /// Card counts for a single month
    fn calculate_month(&self, state: &mut CohortState, new_cards: f64, monthly_churn: f64) -> CohortRow {
        let activated = new_cards * self.parameters.activation_rate;

        // Only the carried-forward book churns; this month's activations do not
        let active_cards = if state.is_first_month() {
            activated
        } else {
            state.prior_active_cards * (1.0 - monthly_churn) + activated
        };

        // First month averages against an implicit zero opening balance
        let avg_active_cards = if state.is_first_month() {
            active_cards / 2.0
        } else {
            (state.prior_active_cards + active_cards) / 2.0
        };

        state.ytd_new_cards = if state.starts_new_year() {
            new_cards
        } else {
            state.ytd_new_cards + new_cards
        };

        CohortRow {
            month_index: state.month_index,
            date: state.period_end(),
            year: state.year,
            month: state.month,
            new_cards,
            ytd_new_cards: state.ytd_new_cards,
            active_cards,
            avg_active_cards,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn engine(params: ScenarioParameters) -> ProjectionEngine {
        ProjectionEngine::new(params, ProjectionConfig::default())
    }

    #[test]
    fn test_projection_runs() {
        let result = engine(ScenarioParameters::base_case()).project();

        assert_eq!(result.len(), 36);
        assert_eq!((result[0].year, result[0].month), (2025, 1));
        assert_eq!(result[0].date, NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
        assert_eq!((result[35].year, result[35].month), (2027, 12));
    }

    #[test]
    fn test_monthly_churn_compounds_to_annual() {
        let monthly = monthly_churn_rate(0.15);
        assert_relative_eq!((1.0 - monthly).powi(12), 0.85, max_relative = 1e-12);
        assert!(monthly > 0.15 / 12.0);
        assert_eq!(monthly_churn_rate(0.0), 0.0);
        assert_eq!(monthly_churn_rate(1.0), 1.0);
    }

    #[test]
    fn test_first_month_convention() {
        let rows = engine(ScenarioParameters::base_case()).project_cohorts();

        assert_relative_eq!(rows[0].new_cards, 1000.0 / 12.0);
        assert_relative_eq!(rows[0].active_cards, 75.0);
        assert_relative_eq!(rows[0].avg_active_cards, 37.5);
        assert_relative_eq!(rows[0].ytd_new_cards, 1000.0 / 12.0);
    }

    #[test]
    fn test_recurrence() {
        let params = ScenarioParameters::base_case();
        let rows = engine(params).project_cohorts();
        let churn = monthly_churn_rate(params.annual_churn_rate);
        let activated = params.monthly_new_cards() * params.activation_rate;

        for i in 1..rows.len() {
            let expected = rows[i - 1].active_cards * (1.0 - churn) + activated;
            assert_eq!(rows[i].active_cards, expected, "month {}", i);
            assert_eq!(
                rows[i].avg_active_cards,
                (rows[i - 1].active_cards + rows[i].active_cards) / 2.0
            );
        }
    }

    #[test]
    fn test_ytd_resets_each_january() {
        let rows = engine(ScenarioParameters::base_case()).project_cohorts();
        let monthly = 1000.0 / 12.0;

        assert_relative_eq!(rows[11].ytd_new_cards, 1000.0, max_relative = 1e-12);
        assert_relative_eq!(rows[12].ytd_new_cards, monthly);
        assert_relative_eq!(rows[23].ytd_new_cards, 1000.0, max_relative = 1e-12);
        assert_relative_eq!(rows[24].ytd_new_cards, monthly);
    }

    #[test]
    fn test_mid_year_start_resets_next_january() {
        let config = ProjectionConfig::starting_at(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
        let rows = ProjectionEngine::new(ScenarioParameters::base_case().with_horizon_years(1), config)
            .project_cohorts();
        let monthly = 1000.0 / 12.0;

        assert_eq!(rows.len(), 12);
        assert_relative_eq!(rows[5].ytd_new_cards, 6.0 * monthly, max_relative = 1e-12);
        assert_eq!((rows[6].year, rows[6].month), (2026, 1));
        assert_relative_eq!(rows[6].ytd_new_cards, monthly);
    }

    #[test]
    fn test_zero_horizon_is_empty() {
        let rows = engine(ScenarioParameters::base_case().with_horizon_years(0)).project();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_out_of_range_churn_propagates() {
        // Churn above 100% gives a NaN monthly rate; nothing is clamped
        let rows = engine(ScenarioParameters::base_case().with_annual_churn_rate(1.5)).project_cohorts();
        assert_eq!(rows.len(), 36);
        assert_relative_eq!(rows[0].active_cards, 75.0);
        assert!(rows[1].active_cards.is_nan());
    }
}
