//! Card Projection CLI
//!
//! Command-line interface for running scenario projections, sensitivity
//! sweeps and scenario comparisons

use anyhow::{bail, Context, Result};
use card_projection::{
    metrics::{month_over_month_growth, PortfolioKpis},
    parameters::{load_parameters, Parameter, ScenarioParameters},
    projection::ProjectionConfig,
    ScenarioResult, ScenarioRunner, ScenarioSet, SensitivityAnalyzer, SweepRange,
};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about = "Secured card distribution and profitability projections", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single scenario
    Run {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Reject out-of-range parameters instead of projecting them
        #[arg(long)]
        strict: bool,

        /// Write the monthly series to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Print the full result as JSON instead of tables
        #[arg(long)]
        json: bool,

        /// Months to show in the console table
        #[arg(long, default_value = "12")]
        rows: usize,
    },
    /// Sweep one parameter and tabulate profit, ROI and breakeven
    Sweep {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Parameter to vary (e.g. yearly_new_cards, churn_rate, upfront_fee)
        #[arg(short, long)]
        param: String,

        /// Range start (defaults to the parameter's preset)
        #[arg(long)]
        min: Option<f64>,

        /// Range end (defaults to the parameter's preset)
        #[arg(long)]
        max: Option<f64>,

        /// Range step (defaults to the parameter's preset)
        #[arg(long)]
        step: Option<f64>,

        /// Value to measure profit changes against (defaults to the base value)
        #[arg(long)]
        baseline: Option<f64>,

        /// Print the table as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compare the base case against scenarios loaded from parameter files
    Compare {
        /// Parameter files (CSV or JSON); each becomes a scenario named after the file
        files: Vec<PathBuf>,

        /// Any date in the first simulated month (YYYY-MM-DD)
        #[arg(long, default_value = "2025-01-01")]
        start: String,

        /// Annual discount rate for the NPV column
        #[arg(long, default_value = "0.05")]
        discount_rate: f64,
    },
}

#[derive(Args)]
struct ScenarioArgs {
    /// Parameter file (CSV or JSON); unspecified values use the base case
    #[arg(long)]
    params: Option<PathBuf>,

    /// Any date in the first simulated month (YYYY-MM-DD)
    #[arg(long, default_value = "2025-01-01")]
    start: String,

    #[arg(long)]
    years: Option<u32>,
    #[arg(long)]
    yearly_new_cards: Option<f64>,
    #[arg(long)]
    activation_rate: Option<f64>,
    #[arg(long)]
    churn_rate: Option<f64>,
    #[arg(long)]
    upfront_fee: Option<f64>,
    #[arg(long)]
    interchange_rate: Option<f64>,
    #[arg(long)]
    avg_monthly_spend: Option<f64>,
    #[arg(long)]
    acquisition_cost: Option<f64>,
    #[arg(long)]
    operational_cost: Option<f64>,
}

impl ScenarioArgs {
    fn parameters(&self) -> Result<ScenarioParameters> {
        let mut params = match &self.params {
            Some(path) => load_parameters(path)
                .with_context(|| format!("Failed to load parameters from {}", path.display()))?,
            None => ScenarioParameters::base_case(),
        };

        if let Some(years) = self.years {
            params.horizon_years = years;
        }
        let overrides = [
            (Parameter::YearlyNewCards, self.yearly_new_cards),
            (Parameter::ActivationRate, self.activation_rate),
            (Parameter::AnnualChurnRate, self.churn_rate),
            (Parameter::UpfrontFee, self.upfront_fee),
            (Parameter::InterchangeRate, self.interchange_rate),
            (Parameter::AverageMonthlySpend, self.avg_monthly_spend),
            (Parameter::AcquisitionCost, self.acquisition_cost),
            (Parameter::AnnualOperationalCost, self.operational_cost),
        ];
        for (parameter, value) in overrides {
            if let Some(value) = value {
                parameter.set(&mut params, value);
            }
        }

        Ok(params)
    }

    fn runner(&self) -> Result<ScenarioRunner> {
        Ok(ScenarioRunner::with_config(ProjectionConfig::starting_at(parse_start(&self.start)?)))
    }
}

fn parse_start(start: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(start, "%Y-%m-%d")
        .with_context(|| format!("Invalid start date '{}', expected YYYY-MM-DD", start))
}

fn format_month(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { scenario, strict, csv, json, rows } => {
            let params = scenario.parameters()?;
            let runner = scenario.runner()?;
            let result = if strict {
                runner.run_checked(&params)?
            } else {
                runner.run(&params)
            };

            if let Some(path) = &csv {
                write_monthly_csv(path, &result)?;
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_scenario(&result, rows);
                if let Some(path) = &csv {
                    println!("\nFull results written to: {}", path.display());
                }
            }
        }
        Commands::Sweep { scenario, param, min, max, step, baseline, json } => {
            let parameter: Parameter = param.parse()?;
            let params = scenario.parameters()?;
            let runner = scenario.runner()?;

            let preset = parameter.preset_range();
            let range = match (min, max, step, preset) {
                (Some(min), Some(max), Some(step), _) => SweepRange::new(min, max, step),
                (min, max, step, Some(p)) => SweepRange::new(
                    min.unwrap_or(p.min),
                    max.unwrap_or(p.max),
                    step.unwrap_or(p.step),
                ),
                _ => bail!("No preset range for {}; pass --min, --max and --step", parameter),
            };

            let table = SensitivityAnalyzer::new(runner).analyze_range(&params, parameter, range);
            let baseline = baseline.unwrap_or_else(|| parameter.get(&params));

            if json {
                println!("{}", serde_json::to_string_pretty(&table)?);
                return Ok(());
            }

            println!("Sensitivity of total profit to {} (baseline {})", parameter, baseline);
            println!("{:>14} {:>16} {:>12} {:>10} {:>10}", "Value", "TotalProfit", "Change", "ROI", "Breakeven");
            println!("{}", "-".repeat(66));
            for (row, change) in table.rows.iter().zip(table.profit_changes(baseline)) {
                println!("{:>14.4} {:>16.2} {:>11.2}% {:>9.2}% {:>10}",
                    row.parameter_value,
                    row.total_profit,
                    change * 100.0,
                    row.roi * 100.0,
                    format_month(row.breakeven_month),
                );
            }

            if table.baseline_row(baseline).is_none() {
                println!("\nBaseline {} was not part of the sweep; changes are reported as zero", baseline);
            }
            if let Some(best) = table.optimal_row() {
                println!("\nHighest total profit at {} = {:.4}: {:.2}",
                    parameter, best.parameter_value, best.total_profit);
            }
        }
        Commands::Compare { files, start, discount_rate } => {
            let runner = ScenarioRunner::with_config(ProjectionConfig::starting_at(parse_start(&start)?));
            let mut scenarios = ScenarioSet::with_base_case(&runner);

            for path in &files {
                let params = load_parameters(path)
                    .with_context(|| format!("Failed to load parameters from {}", path.display()))?;
                scenarios.add(scenario_name(path), runner.run(&params));
            }

            println!("{:<24} {:>16} {:>16} {:>16} {:>9} {:>10} {:>16}",
                "Scenario", "Revenue", "Costs", "Profit", "ROI", "Breakeven", "NPV");
            println!("{}", "-".repeat(113));
            for (name, result) in scenarios.iter() {
                println!("{:<24} {:>16.2} {:>16.2} {:>16.2} {:>8.2}% {:>10} {:>16.2}",
                    name,
                    result.total_revenue,
                    result.total_costs,
                    result.total_profit,
                    result.roi * 100.0,
                    format_month(result.breakeven_month),
                    result.npv(discount_rate),
                );
            }
        }
    }

    Ok(())
}

fn scenario_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_scenario(result: &ScenarioResult, rows: usize) {
    let p = &result.parameters;
    println!("Card Projection v{}", env!("CARGO_PKG_VERSION"));
    println!("======================\n");
    println!("Parameters:");
    println!("  Horizon: {} years", p.horizon_years);
    println!("  Yearly New Cards: {:.0}", p.yearly_new_cards);
    println!("  Activation Rate: {:.2}%", p.activation_rate * 100.0);
    println!("  Annual Churn Rate: {:.2}%", p.annual_churn_rate * 100.0);
    println!("  Upfront Fee: {:.2}", p.upfront_fee);
    println!("  Interchange Rate: {:.3}%", p.interchange_rate * 100.0);
    println!("  Avg Monthly Spend: {:.2}", p.average_monthly_spend);
    println!("  Acquisition Cost: {:.2}", p.acquisition_cost_per_new_card);
    println!("  Annual Operational Cost: {:.2}", p.annual_operational_cost_per_active_card);
    println!();

    let growth = month_over_month_growth(&result.monthly);

    println!("Projection Results ({} months):", result.monthly.len());
    println!("{:>8} {:>10} {:>10} {:>10} {:>8} {:>12} {:>12} {:>12} {:>14}",
        "Month", "NewCards", "Active", "AvgActive", "MoM%", "Revenue", "Costs", "Profit", "CumProfit");
    println!("{}", "-".repeat(104));

    for (row, mom) in result.monthly.iter().zip(&growth).take(rows) {
        println!("{:>8} {:>10.2} {:>10.2} {:>10.2} {:>8} {:>12.2} {:>12.2} {:>12.2} {:>14.2}",
            row.date.format("%Y-%m").to_string(),
            row.new_cards,
            row.active_cards,
            row.avg_active_cards,
            mom.map(|g| format!("{:.1}", g)).unwrap_or_else(|| "-".to_string()),
            row.total_revenue,
            row.total_costs,
            row.profit,
            row.cumulative_profit,
        );
    }

    if result.monthly.len() > rows {
        println!("... ({} more months)", result.monthly.len() - rows);
    }

    println!("\nAnnual Summary:");
    println!("{:>6} {:>10} {:>10} {:>14} {:>14} {:>14} {:>9}",
        "Year", "NewCards", "YearEnd", "Revenue", "Costs", "Profit", "ROI");
    for year in &result.annual {
        println!("{:>6} {:>10.0} {:>10.0} {:>14.2} {:>14.2} {:>14.2} {:>8.2}%",
            year.year,
            year.new_cards,
            year.year_end_active_cards,
            year.total_revenue,
            year.total_costs,
            year.profit,
            year.roi * 100.0,
        );
    }

    let kpis = PortfolioKpis::from_records(&result.monthly);
    println!("\nSummary:");
    println!("  Total Cards Distributed: {:.0}", kpis.total_cards_distributed);
    println!("  Active Cards: {:.0}", kpis.active_cards);
    println!("  Total Revenue: {:.2}", result.total_revenue);
    println!("  Total Costs: {:.2}", result.total_costs);
    println!("  Total Profit: {:.2}", result.total_profit);
    println!("  Profit Margin: {:.2}%", kpis.profit_margin * 100.0);
    println!("  ROI: {:.2}%", result.roi * 100.0);
    println!("  Breakeven Month: {}", format_month(result.breakeven_month));
}

fn write_monthly_csv(path: &Path, result: &ScenarioResult) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Unable to create {}", path.display()))?;
    for record in &result.monthly {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
