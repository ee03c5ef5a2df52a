//! Monthly and annual output structures for projections

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Card counts for one simulated month, before any financials
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CohortRow {
    // Timing
    pub month_index: u32,
    pub date: NaiveDate,
    pub year: i32,
    pub month: u32,

    // Cards
    pub new_cards: f64,
    pub ytd_new_cards: f64,
    pub active_cards: f64,
    pub avg_active_cards: f64,
}

/// A single row of projection output for one month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    // Timing
    pub month_index: u32,
    pub date: NaiveDate,
    pub year: i32,
    pub month: u32,

    // Cards
    pub new_cards: f64,
    pub ytd_new_cards: f64,
    pub active_cards: f64,
    pub avg_active_cards: f64,

    // Revenue
    pub upfront_fee_revenue: f64,
    pub transaction_volume: f64,
    pub interchange_revenue: f64,
    pub total_revenue: f64,

    // Costs
    pub acquisition_costs: f64,
    pub operational_costs: f64,
    pub total_costs: f64,

    // Profit
    pub profit: f64,
    pub cumulative_profit: f64,

    // Calendar year-to-date
    pub revenue_ytd: f64,
    pub costs_ytd: f64,
    pub profit_ytd: f64,
}

impl MonthlyRecord {
    /// Create a record carrying the cohort counts with zeroed financials
    pub fn from_cohort(row: &CohortRow) -> Self {
        Self {
            month_index: row.month_index,
            date: row.date,
            year: row.year,
            month: row.month,
            new_cards: row.new_cards,
            ytd_new_cards: row.ytd_new_cards,
            active_cards: row.active_cards,
            avg_active_cards: row.avg_active_cards,
            upfront_fee_revenue: 0.0,
            transaction_volume: 0.0,
            interchange_revenue: 0.0,
            total_revenue: 0.0,
            acquisition_costs: 0.0,
            operational_costs: 0.0,
            total_costs: 0.0,
            profit: 0.0,
            cumulative_profit: 0.0,
            revenue_ytd: 0.0,
            costs_ytd: 0.0,
            profit_ytd: 0.0,
        }
    }
}

/// One calendar year of a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualSummary {
    pub year: i32,
    pub months: u32,
    pub new_cards: f64,
    /// Active cards at the last simulated month of the year
    pub year_end_active_cards: f64,
    pub mean_avg_active_cards: f64,
    pub upfront_fee_revenue: f64,
    pub interchange_revenue: f64,
    pub total_revenue: f64,
    pub total_costs: f64,
    pub profit: f64,
    /// Profit over costs, 0 when the year has no costs
    pub roi: f64,
    /// Revenue per average active card, 0 when there are none
    pub revenue_per_card: f64,
}

impl AnnualSummary {
    fn open(year: i32) -> Self {
        Self {
            year,
            months: 0,
            new_cards: 0.0,
            year_end_active_cards: 0.0,
            mean_avg_active_cards: 0.0,
            upfront_fee_revenue: 0.0,
            interchange_revenue: 0.0,
            total_revenue: 0.0,
            total_costs: 0.0,
            profit: 0.0,
            roi: 0.0,
            revenue_per_card: 0.0,
        }
    }

    fn add(&mut self, record: &MonthlyRecord) {
        self.months += 1;
        self.new_cards += record.new_cards;
        self.year_end_active_cards = record.active_cards;
        // Running sum until close()
        self.mean_avg_active_cards += record.avg_active_cards;
        self.upfront_fee_revenue += record.upfront_fee_revenue;
        self.interchange_revenue += record.interchange_revenue;
        self.total_revenue += record.total_revenue;
        self.total_costs += record.total_costs;
        self.profit += record.profit;
    }

    fn close(mut self) -> Self {
        if self.months > 0 {
            self.mean_avg_active_cards /= self.months as f64;
        }
        self.roi = if self.total_costs != 0.0 {
            self.profit / self.total_costs
        } else {
            0.0
        };
        self.revenue_per_card = if self.mean_avg_active_cards != 0.0 {
            self.total_revenue / self.mean_avg_active_cards
        } else {
            0.0
        };
        self
    }
}

/// Group monthly records by calendar year, in chronological order
pub fn annual_rollup(records: &[MonthlyRecord]) -> Vec<AnnualSummary> {
    let mut years: Vec<AnnualSummary> = Vec::new();
    let mut current: Option<AnnualSummary> = None;

    for record in records {
        match current.as_mut() {
            Some(summary) if summary.year == record.year => summary.add(record),
            _ => {
                if let Some(done) = current.take() {
                    years.push(done.close());
                }
                let mut summary = AnnualSummary::open(record.year);
                summary.add(record);
                current = Some(summary);
            }
        }
    }

    if let Some(done) = current {
        years.push(done.close());
    }

    years
}
