//! Single-parameter sensitivity sweeps
//!
//! Holds every parameter at its base value except one, runs a full scenario
//! for each value of that parameter, and tabulates total profit, ROI and
//! breakeven month per value.

use chrono::NaiveDate;
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::parameters::{Parameter, ScenarioParameters};
use crate::scenario::ScenarioRunner;

/// Tolerance for matching a swept value against a baseline value
pub const VALUE_TOLERANCE: f64 = 1e-9;

/// Largest number of points a [`SweepRange`] expands to
pub const MAX_SWEEP_POINTS: usize = 100_000;

/// Inclusive, evenly spaced range of parameter values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl SweepRange {
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Expand to `min, min + step, ...` up to and including `max`.
    /// Empty when the step is not positive, `max < min`, or the range would
    /// exceed [`MAX_SWEEP_POINTS`].
    pub fn values(&self) -> Vec<f64> {
        if !(self.step > 0.0) || !(self.max >= self.min) {
            return Vec::new();
        }
        let intervals = ((self.max - self.min) / self.step + 1e-9).floor();
        if !(intervals < MAX_SWEEP_POINTS as f64) {
            warn!(
                "Sweep {}..{} step {} exceeds {} points",
                self.min, self.max, self.step, MAX_SWEEP_POINTS
            );
            return Vec::new();
        }
        // Multiply rather than accumulate to keep rounding drift out of long sweeps
        let count = intervals as usize + 1;
        (0..count)
            .map(|i| self.min + i as f64 * self.step)
            .collect()
    }
}

impl Parameter {
    /// Standard sweep for the parameters commonly analysed
    pub fn preset_range(&self) -> Option<SweepRange> {
        match self {
            Parameter::YearlyNewCards => Some(SweepRange::new(500.0, 1500.0, 100.0)),
            Parameter::ActivationRate => Some(SweepRange::new(0.70, 1.00, 0.05)),
            Parameter::AnnualChurnRate => Some(SweepRange::new(0.05, 0.25, 0.05)),
            Parameter::UpfrontFee => Some(SweepRange::new(50.0, 150.0, 10.0)),
            Parameter::AverageMonthlySpend => Some(SweepRange::new(250.0, 650.0, 50.0)),
            _ => None,
        }
    }
}

/// Outcome of one sweep point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityRow {
    pub parameter_value: f64,
    pub total_profit: f64,
    pub roi: f64,
    pub breakeven_month: Option<NaiveDate>,
}

/// Sweep results in the order of the supplied values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityTable {
    pub parameter: Parameter,
    pub rows: Vec<SensitivityRow>,
}

impl SensitivityTable {
    /// Row whose parameter value matches `baseline`
    pub fn baseline_row(&self, baseline: f64) -> Option<&SensitivityRow> {
        self.rows
            .iter()
            .find(|r| (r.parameter_value - baseline).abs() <= VALUE_TOLERANCE)
    }

    /// Total profit at `baseline`, or 0 when that value was not swept
    pub fn baseline_profit(&self, baseline: f64) -> f64 {
        self.baseline_row(baseline).map(|r| r.total_profit).unwrap_or(0.0)
    }

    /// Fractional change of each row's profit from the baseline profit.
    /// All zeros when the baseline profit is 0 (including a missing baseline).
    pub fn profit_changes(&self, baseline: f64) -> Vec<f64> {
        let base = self.baseline_profit(baseline);
        self.rows
            .iter()
            .map(|r| {
                if base != 0.0 {
                    (r.total_profit - base) / base
                } else {
                    0.0
                }
            })
            .collect()
    }

    /// Row with the highest total profit; the first one wins ties
    pub fn optimal_row(&self) -> Option<&SensitivityRow> {
        self.rows.iter().fold(None, |best: Option<&SensitivityRow>, row| match best {
            Some(b) if b.total_profit >= row.total_profit => Some(b),
            _ => Some(row),
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Runs sweeps through a scenario runner
#[derive(Debug, Clone, Copy, Default)]
pub struct SensitivityAnalyzer {
    runner: ScenarioRunner,
}

impl SensitivityAnalyzer {
    pub fn new(runner: ScenarioRunner) -> Self {
        Self { runner }
    }

    /// Run one scenario per value, in parallel, keeping the input order
    pub fn analyze(
        &self,
        base: &ScenarioParameters,
        parameter: Parameter,
        values: &[f64],
    ) -> SensitivityTable {
        info!("Sensitivity sweep over {} ({} values)", parameter, values.len());

        let rows: Vec<SensitivityRow> = values
            .par_iter()
            .map(|&value| {
                let params = base.with(parameter, value);
                // Record the value actually run, e.g. a rounded horizon
                let applied = parameter.get(&params);
                let result = self.runner.run(&params);
                debug!("{} = {}: total profit {:.2}", parameter, applied, result.total_profit);
                SensitivityRow {
                    parameter_value: applied,
                    total_profit: result.total_profit,
                    roi: result.roi,
                    breakeven_month: result.breakeven_month,
                }
            })
            .collect();

        info!("Sensitivity sweep over {} complete", parameter);

        SensitivityTable { parameter, rows }
    }

    /// Sweep a parameter across a range
    pub fn analyze_range(
        &self,
        base: &ScenarioParameters,
        parameter: Parameter,
        range: SweepRange,
    ) -> SensitivityTable {
        self.analyze(base, parameter, &range.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sweep_range_inclusive() {
        let values = SweepRange::new(500.0, 1500.0, 100.0).values();
        assert_eq!(values.len(), 11);
        assert_eq!(values[0], 500.0);
        assert_eq!(values[10], 1500.0);

        let values = SweepRange::new(0.70, 1.00, 0.05).values();
        assert_eq!(values.len(), 7);
        assert_relative_eq!(values[6], 1.0, epsilon = 1e-12);

        assert!(SweepRange::new(1.0, 0.0, 0.1).values().is_empty());
        assert!(SweepRange::new(0.0, 1.0, 0.0).values().is_empty());
        assert_eq!(SweepRange::new(3.0, 3.0, 1.0).values(), vec![3.0]);
    }

    #[test]
    fn test_sweep_range_too_many_points_is_empty() {
        assert!(SweepRange::new(0.0, 1e300, 1.0).values().is_empty());
        assert!(SweepRange::new(0.0, 1.0, 1e-12).values().is_empty());
        assert!(SweepRange::new(0.0, f64::INFINITY, 1.0).values().is_empty());

        let values = SweepRange::new(0.0, (MAX_SWEEP_POINTS - 1) as f64, 1.0).values();
        assert_eq!(values.len(), MAX_SWEEP_POINTS);
    }

    #[test]
    fn test_horizon_sweep_records_whole_years_run() {
        let analyzer = SensitivityAnalyzer::default();
        let base = ScenarioParameters::base_case();
        let table = analyzer.analyze(&base, Parameter::HorizonYears, &[0.4, 1.5, 2.0]);

        let values: Vec<f64> = table.rows.iter().map(|r| r.parameter_value).collect();
        assert_eq!(values, vec![0.0, 2.0, 2.0]);
        assert_eq!(table.rows[0].total_profit, 0.0);

        let two_years = ScenarioRunner::new().run(&base.with_horizon_years(2));
        assert_eq!(table.rows[1].total_profit, two_years.total_profit);
        assert_eq!(table.rows[1], table.rows[2]);
    }

    #[test]
    fn test_presets() {
        assert_eq!(Parameter::AnnualChurnRate.preset_range().unwrap().values().len(), 5);
        assert_eq!(Parameter::UpfrontFee.preset_range().unwrap().values().len(), 11);
        assert_eq!(Parameter::AverageMonthlySpend.preset_range().unwrap().values().len(), 9);
        assert!(Parameter::InterchangeRate.preset_range().is_none());
    }

    #[test]
    fn test_analyze_preserves_order_and_matches_runs() {
        let analyzer = SensitivityAnalyzer::default();
        let base = ScenarioParameters::base_case();
        let values = [120.0, 60.0, 90.0];

        let table = analyzer.analyze(&base, Parameter::UpfrontFee, &values);
        assert_eq!(table.len(), 3);

        let runner = ScenarioRunner::new();
        for (row, &value) in table.rows.iter().zip(&values) {
            assert_eq!(row.parameter_value, value);
            let direct = runner.run(&base.with_upfront_fee(value));
            assert_eq!(row.total_profit, direct.total_profit);
            assert_eq!(row.roi, direct.roi);
            assert_eq!(row.breakeven_month, direct.breakeven_month);
        }
    }

    #[test]
    fn test_profit_changes_against_baseline() {
        let analyzer = SensitivityAnalyzer::default();
        let table = analyzer.analyze_range(
            &ScenarioParameters::base_case(),
            Parameter::UpfrontFee,
            SweepRange::new(50.0, 150.0, 10.0),
        );

        let changes = table.profit_changes(90.0);
        let idx = table.rows.iter().position(|r| r.parameter_value == 90.0).unwrap();
        assert_eq!(changes[idx], 0.0);
        assert_eq!(table.baseline_profit(90.0), table.rows[idx].total_profit);

        // Higher fees always add profit
        let optimal = table.optimal_row().unwrap();
        assert_eq!(optimal.parameter_value, 150.0);
    }

    #[test]
    fn test_missing_baseline_degenerates_to_zero() {
        let analyzer = SensitivityAnalyzer::default();
        let table = analyzer.analyze(
            &ScenarioParameters::base_case(),
            Parameter::UpfrontFee,
            &[50.0, 70.0],
        );

        assert!(table.baseline_row(90.0).is_none());
        assert_eq!(table.baseline_profit(90.0), 0.0);
        assert_eq!(table.profit_changes(90.0), vec![0.0, 0.0]);
    }

    #[test]
    fn test_empty_sweep() {
        let table = SensitivityAnalyzer::default().analyze(
            &ScenarioParameters::base_case(),
            Parameter::ActivationRate,
            &[],
        );
        assert!(table.is_empty());
        assert!(table.optimal_row().is_none());
    }
}
