//! Business parameters driving a projection run

pub mod loader;

pub use loader::{load_parameters, load_parameters_csv, load_parameters_json, load_parameters_from_reader};

use crate::error::{ParameterError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default projection horizon in years
pub const DEFAULT_HORIZON_YEARS: u32 = 3;
/// Default number of cards issued per year
pub const DEFAULT_YEARLY_NEW_CARDS: f64 = 1000.0;
/// Default share of issued cards that activate
pub const DEFAULT_ACTIVATION_RATE: f64 = 0.90;
/// Default annual attrition of the active book
pub const DEFAULT_ANNUAL_CHURN_RATE: f64 = 0.15;
/// Default one-off activation fee per card (EUR)
pub const DEFAULT_UPFRONT_FEE: f64 = 90.0;
/// Default interchange rate (0.10% of volume)
pub const DEFAULT_INTERCHANGE_RATE: f64 = 0.0010;
/// Default monthly spend per active card (EUR)
pub const DEFAULT_AVG_MONTHLY_SPEND: f64 = 450.0;
/// Default acquisition cost per issued card (EUR)
pub const DEFAULT_ACQUISITION_COST: f64 = 50.0;
/// Default annual operating cost per active card (EUR)
pub const DEFAULT_ANNUAL_OPERATIONAL_COST: f64 = 150.0;

/// Inputs to one scenario run
///
/// All fields are plain yearly-level business assumptions. Values outside
/// their natural range are accepted and simply flow through the arithmetic;
/// use [`ScenarioParameters::validate`] for a strict check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioParameters {
    /// Projection horizon in whole years
    #[serde(alias = "years")]
    pub horizon_years: u32,

    /// Cards issued per year, spread evenly across the twelve months
    pub yearly_new_cards: f64,

    /// Fraction of issued cards that become active in their issuance month
    pub activation_rate: f64,

    /// Annual attrition of active cards
    #[serde(alias = "churn_rate")]
    pub annual_churn_rate: f64,

    /// One-off fee collected per issued card
    pub upfront_fee: f64,

    /// Interchange earned as a fraction of transaction volume
    pub interchange_rate: f64,

    /// Average monthly spend per active card
    #[serde(alias = "avg_monthly_spend")]
    pub average_monthly_spend: f64,

    /// Acquisition cost per issued card
    #[serde(alias = "acquisition_cost")]
    pub acquisition_cost_per_new_card: f64,

    /// Annual operating cost per active card
    #[serde(alias = "operational_cost")]
    pub annual_operational_cost_per_active_card: f64,
}

impl Default for ScenarioParameters {
    fn default() -> Self {
        Self::base_case()
    }
}

impl ScenarioParameters {
    /// The base-case assumptions of the product plan
    pub fn base_case() -> Self {
        Self {
            horizon_years: DEFAULT_HORIZON_YEARS,
            yearly_new_cards: DEFAULT_YEARLY_NEW_CARDS,
            activation_rate: DEFAULT_ACTIVATION_RATE,
            annual_churn_rate: DEFAULT_ANNUAL_CHURN_RATE,
            upfront_fee: DEFAULT_UPFRONT_FEE,
            interchange_rate: DEFAULT_INTERCHANGE_RATE,
            average_monthly_spend: DEFAULT_AVG_MONTHLY_SPEND,
            acquisition_cost_per_new_card: DEFAULT_ACQUISITION_COST,
            annual_operational_cost_per_active_card: DEFAULT_ANNUAL_OPERATIONAL_COST,
        }
    }

    pub fn with_horizon_years(mut self, years: u32) -> Self {
        self.horizon_years = years;
        self
    }

    pub fn with_yearly_new_cards(mut self, cards: f64) -> Self {
        self.yearly_new_cards = cards;
        self
    }

    pub fn with_activation_rate(mut self, rate: f64) -> Self {
        self.activation_rate = rate;
        self
    }

    pub fn with_annual_churn_rate(mut self, rate: f64) -> Self {
        self.annual_churn_rate = rate;
        self
    }

    pub fn with_upfront_fee(mut self, fee: f64) -> Self {
        self.upfront_fee = fee;
        self
    }

    pub fn with_interchange_rate(mut self, rate: f64) -> Self {
        self.interchange_rate = rate;
        self
    }

    pub fn with_average_monthly_spend(mut self, spend: f64) -> Self {
        self.average_monthly_spend = spend;
        self
    }

    pub fn with_acquisition_cost(mut self, cost: f64) -> Self {
        self.acquisition_cost_per_new_card = cost;
        self
    }

    pub fn with_annual_operational_cost(mut self, cost: f64) -> Self {
        self.annual_operational_cost_per_active_card = cost;
        self
    }

    /// Return a copy with one parameter replaced
    pub fn with(mut self, parameter: Parameter, value: f64) -> Self {
        parameter.set(&mut self, value);
        self
    }

    /// Number of simulated months
    pub fn horizon_months(&self) -> u32 {
        self.horizon_years.saturating_mul(12)
    }

    /// Flat monthly issuance (no seasonality)
    pub fn monthly_new_cards(&self) -> f64 {
        self.yearly_new_cards / 12.0
    }

    /// Operating cost per active card per month
    pub fn monthly_operational_cost(&self) -> f64 {
        self.annual_operational_cost_per_active_card / 12.0
    }

    /// Strict range check. Projections never call this implicitly.
    pub fn validate(&self) -> Result<()> {
        if self.horizon_years < 1 {
            return Err(invalid(Parameter::HorizonYears, self.horizon_years as f64, "must be at least one year"));
        }
        if !(self.yearly_new_cards > 0.0) {
            return Err(invalid(Parameter::YearlyNewCards, self.yearly_new_cards, "must be positive"));
        }
        for (parameter, value) in [
            (Parameter::ActivationRate, self.activation_rate),
            (Parameter::AnnualChurnRate, self.annual_churn_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(parameter, value, "must lie within [0, 1]"));
            }
        }
        for (parameter, value) in [
            (Parameter::UpfrontFee, self.upfront_fee),
            (Parameter::InterchangeRate, self.interchange_rate),
            (Parameter::AverageMonthlySpend, self.average_monthly_spend),
            (Parameter::AcquisitionCost, self.acquisition_cost_per_new_card),
            (Parameter::AnnualOperationalCost, self.annual_operational_cost_per_active_card),
        ] {
            if !(value >= 0.0) {
                return Err(invalid(parameter, value, "must not be negative"));
            }
        }
        Ok(())
    }
}

fn invalid(parameter: Parameter, value: f64, reason: &'static str) -> ParameterError {
    ParameterError::InvalidParameter {
        name: parameter.name(),
        value,
        reason,
    }
}

/// One field of [`ScenarioParameters`], used to address it by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    HorizonYears,
    YearlyNewCards,
    ActivationRate,
    AnnualChurnRate,
    UpfrontFee,
    InterchangeRate,
    AverageMonthlySpend,
    AcquisitionCost,
    AnnualOperationalCost,
}

impl Parameter {
    pub const ALL: [Parameter; 9] = [
        Parameter::HorizonYears,
        Parameter::YearlyNewCards,
        Parameter::ActivationRate,
        Parameter::AnnualChurnRate,
        Parameter::UpfrontFee,
        Parameter::InterchangeRate,
        Parameter::AverageMonthlySpend,
        Parameter::AcquisitionCost,
        Parameter::AnnualOperationalCost,
    ];

    /// Canonical snake_case name
    pub fn name(&self) -> &'static str {
        match self {
            Parameter::HorizonYears => "horizon_years",
            Parameter::YearlyNewCards => "yearly_new_cards",
            Parameter::ActivationRate => "activation_rate",
            Parameter::AnnualChurnRate => "annual_churn_rate",
            Parameter::UpfrontFee => "upfront_fee",
            Parameter::InterchangeRate => "interchange_rate",
            Parameter::AverageMonthlySpend => "average_monthly_spend",
            Parameter::AcquisitionCost => "acquisition_cost_per_new_card",
            Parameter::AnnualOperationalCost => "annual_operational_cost_per_active_card",
        }
    }

    /// Read this parameter's value
    pub fn get(&self, params: &ScenarioParameters) -> f64 {
        match self {
            Parameter::HorizonYears => params.horizon_years as f64,
            Parameter::YearlyNewCards => params.yearly_new_cards,
            Parameter::ActivationRate => params.activation_rate,
            Parameter::AnnualChurnRate => params.annual_churn_rate,
            Parameter::UpfrontFee => params.upfront_fee,
            Parameter::InterchangeRate => params.interchange_rate,
            Parameter::AverageMonthlySpend => params.average_monthly_spend,
            Parameter::AcquisitionCost => params.acquisition_cost_per_new_card,
            Parameter::AnnualOperationalCost => params.annual_operational_cost_per_active_card,
        }
    }

    /// Overwrite this parameter's value.
    /// Horizon values are rounded to whole years; negatives saturate at zero.
    pub fn set(&self, params: &mut ScenarioParameters, value: f64) {
        match self {
            Parameter::HorizonYears => params.horizon_years = value.round() as u32,
            Parameter::YearlyNewCards => params.yearly_new_cards = value,
            Parameter::ActivationRate => params.activation_rate = value,
            Parameter::AnnualChurnRate => params.annual_churn_rate = value,
            Parameter::UpfrontFee => params.upfront_fee = value,
            Parameter::InterchangeRate => params.interchange_rate = value,
            Parameter::AverageMonthlySpend => params.average_monthly_spend = value,
            Parameter::AcquisitionCost => params.acquisition_cost_per_new_card = value,
            Parameter::AnnualOperationalCost => params.annual_operational_cost_per_active_card = value,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Parameter {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        let parameter = match key.as_str() {
            "horizon_years" | "years" | "horizon" => Parameter::HorizonYears,
            "yearly_new_cards" => Parameter::YearlyNewCards,
            "activation_rate" => Parameter::ActivationRate,
            "annual_churn_rate" | "churn_rate" => Parameter::AnnualChurnRate,
            "upfront_fee" => Parameter::UpfrontFee,
            "interchange_rate" => Parameter::InterchangeRate,
            "average_monthly_spend" | "avg_monthly_spend" => Parameter::AverageMonthlySpend,
            "acquisition_cost_per_new_card" | "acquisition_cost" => Parameter::AcquisitionCost,
            "annual_operational_cost_per_active_card" | "operational_cost" => {
                Parameter::AnnualOperationalCost
            }
            _ => return Err(ParameterError::UnknownParameter(s.to_string())),
        };
        Ok(parameter)
    }
}
