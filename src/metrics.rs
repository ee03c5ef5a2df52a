//! Portfolio KPIs and growth metrics derived from a projected series
//!
//! Ratios with a zero denominator fall back to 0 for KPIs and to `None`
//! (not applicable) for growth rates.

use serde::{Deserialize, Serialize};

use crate::projection::{AnnualSummary, MonthlyRecord};

/// Headline figures for the latest month of a projection
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PortfolioKpis {
    pub total_cards_distributed: f64,
    /// Active cards at the last month
    pub active_cards: f64,
    /// Current active cards over all cards ever distributed
    pub activation_ratio: f64,
    pub total_revenue: f64,
    pub current_monthly_revenue: f64,
    pub cumulative_profit: f64,
    /// Total revenue over mean active cards
    pub avg_revenue_per_card: f64,
    /// Total profit over total revenue
    pub profit_margin: f64,
}

impl PortfolioKpis {
    pub fn from_records(records: &[MonthlyRecord]) -> Self {
        let Some(last) = records.last() else {
            return Self::default();
        };

        let total_cards_distributed: f64 = records.iter().map(|r| r.new_cards).sum();
        let total_revenue: f64 = records.iter().map(|r| r.total_revenue).sum();
        let total_profit: f64 = records.iter().map(|r| r.profit).sum();
        let mean_active_cards =
            records.iter().map(|r| r.active_cards).sum::<f64>() / records.len() as f64;

        Self {
            total_cards_distributed,
            active_cards: last.active_cards,
            activation_ratio: ratio_or_zero(last.active_cards, total_cards_distributed),
            total_revenue,
            current_monthly_revenue: last.total_revenue,
            cumulative_profit: last.cumulative_profit,
            avg_revenue_per_card: ratio_or_zero(total_revenue, mean_active_cards),
            profit_margin: ratio_or_zero(total_profit, total_revenue),
        }
    }
}

fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator != 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Percentage change from `prior` to `current`, `None` when `prior` is 0
pub fn percentage_change(prior: f64, current: f64) -> Option<f64> {
    if prior != 0.0 {
        Some((current - prior) / prior * 100.0)
    } else {
        None
    }
}

/// Month-over-month growth of active cards, in percent
pub fn month_over_month_growth(records: &[MonthlyRecord]) -> Vec<Option<f64>> {
    let mut growth = Vec::with_capacity(records.len());
    let mut prior: Option<f64> = None;
    for record in records {
        growth.push(prior.and_then(|p| percentage_change(p, record.active_cards)));
        prior = Some(record.active_cards);
    }
    growth
}

/// Year-over-year growth of year-end active cards, in percent
pub fn year_over_year_growth(annual: &[AnnualSummary]) -> Vec<Option<f64>> {
    let mut growth = Vec::with_capacity(annual.len());
    let mut prior: Option<f64> = None;
    for year in annual {
        growth.push(prior.and_then(|p| percentage_change(p, year.year_end_active_cards)));
        prior = Some(year.year_end_active_cards);
    }
    growth
}

/// Revenue per active card for one month
pub fn revenue_per_active_card(record: &MonthlyRecord) -> Option<f64> {
    if record.active_cards != 0.0 {
        Some(record.total_revenue / record.active_cards)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ScenarioParameters;
    use crate::scenario::ScenarioRunner;
    use approx::assert_relative_eq;

    #[test]
    fn test_kpis_base_case() {
        let result = ScenarioRunner::new().run(&ScenarioParameters::base_case());
        let kpis = PortfolioKpis::from_records(&result.monthly);

        assert_relative_eq!(kpis.total_cards_distributed, 3000.0, max_relative = 1e-12);
        assert_eq!(kpis.active_cards, result.monthly[35].active_cards);
        assert_relative_eq!(kpis.activation_ratio, kpis.active_cards / 3000.0, max_relative = 1e-12);
        assert_relative_eq!(kpis.total_revenue, result.total_revenue, max_relative = 1e-12);
        assert_relative_eq!(kpis.cumulative_profit, result.total_profit, max_relative = 1e-12);
        assert_relative_eq!(
            kpis.profit_margin,
            result.total_profit / result.total_revenue,
            max_relative = 1e-12
        );
        assert!(kpis.avg_revenue_per_card > 0.0);
    }

    #[test]
    fn test_kpis_empty_and_inactive() {
        assert_eq!(PortfolioKpis::from_records(&[]), PortfolioKpis::default());

        let result = ScenarioRunner::new().run(
            &ScenarioParameters::base_case()
                .with_activation_rate(0.0)
                .with_upfront_fee(0.0),
        );
        let kpis = PortfolioKpis::from_records(&result.monthly);
        assert_eq!(kpis.active_cards, 0.0);
        assert_eq!(kpis.avg_revenue_per_card, 0.0);
        assert_eq!(kpis.profit_margin, 0.0);
    }

    #[test]
    fn test_month_over_month_growth() {
        let result = ScenarioRunner::new().run(&ScenarioParameters::base_case());
        let growth = month_over_month_growth(&result.monthly);

        assert_eq!(growth.len(), 36);
        assert_eq!(growth[0], None);
        let expected = (result.monthly[1].active_cards / 75.0 - 1.0) * 100.0;
        assert_relative_eq!(growth[1].unwrap(), expected, max_relative = 1e-9);
        // Book keeps growing but at a slowing pace
        assert!(growth[35].unwrap() > 0.0);
        assert!(growth[35].unwrap() < growth[1].unwrap());
    }

    #[test]
    fn test_growth_not_applicable_after_zero() {
        let result = ScenarioRunner::new().run(&ScenarioParameters::base_case().with_activation_rate(0.0));
        assert!(month_over_month_growth(&result.monthly).iter().all(Option::is_none));
        assert!(year_over_year_growth(&result.annual).iter().all(Option::is_none));
        assert_eq!(revenue_per_active_card(&result.monthly[0]), None);
    }

    #[test]
    fn test_year_over_year_growth() {
        let result = ScenarioRunner::new().run(&ScenarioParameters::base_case());
        let growth = year_over_year_growth(&result.annual);

        assert_eq!(growth.len(), 3);
        assert_eq!(growth[0], None);
        assert!(growth[1].unwrap() > growth[2].unwrap());
    }

    #[test]
    fn test_percentage_change() {
        assert_eq!(percentage_change(50.0, 75.0), Some(50.0));
        assert_eq!(percentage_change(0.0, 75.0), None);
    }
}
