//! Financial overlay: revenue, cost and profit on top of the cohort series

use super::cashflows::{CohortRow, MonthlyRecord};
use crate::parameters::ScenarioParameters;

/// Fee and cost terms applied to each simulated month
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinancialOverlay {
    pub upfront_fee: f64,
    pub interchange_rate: f64,
    pub average_monthly_spend: f64,
    pub acquisition_cost_per_new_card: f64,
    pub monthly_operational_cost: f64,
}

impl FinancialOverlay {
    /// Take the fee/cost subset of the scenario parameters
    pub fn from_parameters(params: &ScenarioParameters) -> Self {
        Self {
            upfront_fee: params.upfront_fee,
            interchange_rate: params.interchange_rate,
            average_monthly_spend: params.average_monthly_spend,
            acquisition_cost_per_new_card: params.acquisition_cost_per_new_card,
            monthly_operational_cost: params.monthly_operational_cost(),
        }
    }

    /// Annotate a chronological cohort series with financials and running sums
    pub fn apply(&self, cohorts: &[CohortRow]) -> Vec<MonthlyRecord> {
        let mut records = Vec::with_capacity(cohorts.len());
        let mut cumulative_profit = 0.0;
        let (mut revenue_ytd, mut costs_ytd, mut profit_ytd) = (0.0, 0.0, 0.0);

        for (i, cohort) in cohorts.iter().enumerate() {
            let mut record = self.calculate_month(cohort);

            cumulative_profit += record.profit;
            record.cumulative_profit = cumulative_profit;

            // Year-to-date sums restart with each calendar year
            if i == 0 || cohort.month == 1 {
                revenue_ytd = 0.0;
                costs_ytd = 0.0;
                profit_ytd = 0.0;
            }
            revenue_ytd += record.total_revenue;
            costs_ytd += record.total_costs;
            profit_ytd += record.profit;
            record.revenue_ytd = revenue_ytd;
            record.costs_ytd = costs_ytd;
            record.profit_ytd = profit_ytd;

            records.push(record);
        }

        records
    }

    /// Per-month revenue and cost formulas
    fn calculate_month(&self, cohort: &CohortRow) -> MonthlyRecord {
        let mut row = MonthlyRecord::from_cohort(cohort);

        row.upfront_fee_revenue = cohort.new_cards * self.upfront_fee;
        // Spend is driven by the month's average book, costs by the closing book
        row.transaction_volume = cohort.avg_active_cards * self.average_monthly_spend;
        row.interchange_revenue = row.transaction_volume * self.interchange_rate;
        row.acquisition_costs = cohort.new_cards * self.acquisition_cost_per_new_card;
        row.operational_costs = cohort.active_cards * self.monthly_operational_cost;

        row.total_revenue = row.upfront_fee_revenue + row.interchange_revenue;
        row.total_costs = row.acquisition_costs + row.operational_costs;
        row.profit = row.total_revenue - row.total_costs;

        row
    }
}
