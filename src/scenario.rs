//! Scenario runner and named scenario collection
//!
//! A scenario run takes one parameter set through the cohort recurrence and
//! financial overlay, then derives the summary statistics used for
//! comparison: total profit, ROI and breakeven month.

use chrono::NaiveDate;
use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;
use crate::parameters::ScenarioParameters;
use crate::projection::{
    annual_rollup, calculate_npv, monthly_rate_from_annual, AnnualSummary, MonthlyRecord,
    ProjectionConfig, ProjectionEngine,
};

/// Name of the scenario kept across [`ScenarioSet::reset`]
pub const BASE_SCENARIO: &str = "Base Case";

/// Outcome of one scenario run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Parameters the scenario was run with
    pub parameters: ScenarioParameters,

    /// Monthly records in chronological order
    pub monthly: Vec<MonthlyRecord>,

    /// One row per calendar year
    pub annual: Vec<AnnualSummary>,

    pub total_revenue: f64,
    pub total_costs: f64,
    pub total_profit: f64,

    /// Month-end date of the first month with positive cumulative profit
    pub breakeven_month: Option<NaiveDate>,

    /// Total profit over total costs, 0 when there are no costs
    pub roi: f64,
}

impl ScenarioResult {
    /// Derive summary statistics from a projected series
    pub fn from_records(parameters: ScenarioParameters, monthly: Vec<MonthlyRecord>) -> Self {
        // fold from +0.0: an empty horizon must not total to -0.0
        let total_revenue = monthly.iter().fold(0.0, |acc, r| acc + r.total_revenue);
        let total_costs = monthly.iter().fold(0.0, |acc, r| acc + r.total_costs);
        let total_profit = monthly.iter().fold(0.0, |acc, r| acc + r.profit);

        let breakeven_month = find_breakeven_month(&monthly).map(|r| r.date);
        let roi = calculate_roi(total_profit, total_costs);
        let annual = annual_rollup(&monthly);

        Self {
            parameters,
            monthly,
            annual,
            total_revenue,
            total_costs,
            total_profit,
            breakeven_month,
            roi,
        }
    }

    /// Month offset of the breakeven month, if reached
    pub fn breakeven_index(&self) -> Option<u32> {
        find_breakeven_month(&self.monthly).map(|r| r.month_index)
    }

    /// Monthly profit series
    pub fn profits(&self) -> Vec<f64> {
        self.monthly.iter().map(|r| r.profit).collect()
    }

    /// NPV of monthly profits at an annual discount rate
    pub fn npv(&self, annual_rate: f64) -> f64 {
        calculate_npv(&self.profits(), monthly_rate_from_annual(annual_rate))
    }

    /// Comparison row for this scenario under the given name
    pub fn summary(&self, name: &str) -> ScenarioSummary {
        ScenarioSummary {
            name: name.to_string(),
            total_revenue: self.total_revenue,
            total_costs: self.total_costs,
            total_profit: self.total_profit,
            roi: self.roi,
            breakeven_month: self.breakeven_month,
        }
    }
}

/// First record whose cumulative profit is strictly positive
pub fn find_breakeven_month(records: &[MonthlyRecord]) -> Option<&MonthlyRecord> {
    records.iter().find(|r| r.cumulative_profit > 0.0)
}

/// Profit over costs, with 0 standing in when costs are 0
pub fn calculate_roi(total_profit: f64, total_costs: f64) -> f64 {
    if total_costs != 0.0 {
        total_profit / total_costs
    } else {
        0.0
    }
}

/// Side-by-side comparison row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub name: String,
    pub total_revenue: f64,
    pub total_costs: f64,
    pub total_profit: f64,
    pub roi: f64,
    pub breakeven_month: Option<NaiveDate>,
}

/// Runs scenarios against a fixed projection config
///
/// # Example
/// ```
/// use card_projection::{ScenarioParameters, ScenarioRunner};
///
/// let runner = ScenarioRunner::new();
/// let results: Vec<_> = [0.10, 0.15, 0.20]
///     .iter()
///     .map(|&churn| runner.run(&ScenarioParameters::base_case().with_annual_churn_rate(churn)))
///     .collect();
/// let closing = |i: usize| results[i].monthly.last().unwrap().active_cards;
/// assert!(closing(0) > closing(2));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ScenarioRunner {
    config: ProjectionConfig,
}

impl ScenarioRunner {
    /// Create runner starting projections in the default month
    pub fn new() -> Self {
        Self::default()
    }

    /// Create runner with a specific projection config
    pub fn with_config(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Run a single scenario. Out-of-range parameters are logged, not rejected.
    pub fn run(&self, parameters: &ScenarioParameters) -> ScenarioResult {
        if let Err(e) = parameters.validate() {
            warn!("Running scenario with out-of-range input: {}", e);
        }

        let engine = ProjectionEngine::new(*parameters, self.config);
        let result = ScenarioResult::from_records(*parameters, engine.project());

        debug!(
            "Scenario over {} months: total profit {:.2}, ROI {:.4}, breakeven {:?}",
            result.monthly.len(),
            result.total_profit,
            result.roi,
            result.breakeven_month
        );

        result
    }

    /// Run a single scenario after a strict range check
    pub fn run_checked(&self, parameters: &ScenarioParameters) -> Result<ScenarioResult> {
        parameters.validate()?;
        Ok(self.run(parameters))
    }

    /// Run multiple scenarios in parallel, preserving input order
    pub fn run_batch(&self, parameters: &[ScenarioParameters]) -> Vec<ScenarioResult> {
        parameters.par_iter().map(|p| self.run(p)).collect()
    }
}

/// Named scenario results held for comparison
///
/// Mutation requires `&mut self`, so concurrent callers must serialize
/// writes (e.g. behind a `Mutex`); adds and resets are last-writer-wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioSet {
    scenarios: BTreeMap<String, ScenarioResult>,
}

impl ScenarioSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collection holding only the default-parameter run under [`BASE_SCENARIO`]
    pub fn with_base_case(runner: &ScenarioRunner) -> Self {
        let mut set = Self::new();
        set.add(BASE_SCENARIO, runner.run(&ScenarioParameters::base_case()));
        set
    }

    /// Insert a scenario, replacing any existing one with the same name
    pub fn add(&mut self, name: impl Into<String>, result: ScenarioResult) -> Option<ScenarioResult> {
        self.scenarios.insert(name.into(), result)
    }

    pub fn get(&self, name: &str) -> Option<&ScenarioResult> {
        self.scenarios.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<ScenarioResult> {
        self.scenarios.remove(name)
    }

    /// Drop every scenario except the base one, if present
    pub fn reset(&mut self) {
        self.scenarios.retain(|name, _| name == BASE_SCENARIO);
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scenarios.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScenarioResult)> {
        self.scenarios.iter().map(|(name, result)| (name.as_str(), result))
    }

    /// Comparison rows in collection order
    pub fn summaries(&self) -> Vec<ScenarioSummary> {
        self.iter().map(|(name, result)| result.summary(name)).collect()
    }
}
