//! Parameter file loader
//!
//! Loads scenario parameters from data/parameters/. Two formats are read:
//! a two-column `parameter,value` CSV and a JSON object with the field names
//! of [`ScenarioParameters`]. Anything not given keeps its base-case value.

use super::{Parameter, ScenarioParameters};
use crate::error::{ParameterError, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Default path to the base-case parameter file
pub const DEFAULT_PARAMETERS_PATH: &str = "data/parameters/base_case.csv";

#[derive(Debug, serde::Deserialize)]
struct ParameterRow {
    parameter: String,
    value: f64,
}

/// Load parameters, choosing the format from the file extension
pub fn load_parameters(path: &Path) -> Result<ScenarioParameters> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        load_parameters_json(path)
    } else {
        load_parameters_csv(path)
    }
}

/// Load parameters from a `parameter,value` CSV file
pub fn load_parameters_csv(path: &Path) -> Result<ScenarioParameters> {
    let file = File::open(path)?;
    load_parameters_from_reader(file)
}

/// Load parameters from any reader producing `parameter,value` CSV
pub fn load_parameters_from_reader<R: Read>(reader: R) -> Result<ScenarioParameters> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut params = ScenarioParameters::base_case();

    for (idx, result) in reader.deserialize::<ParameterRow>().enumerate() {
        let row = result?;
        if !row.value.is_finite() {
            return Err(ParameterError::Malformed {
                row: idx + 1,
                message: format!("non-finite value for '{}'", row.parameter),
            });
        }
        let parameter: Parameter = row.parameter.parse()?;
        parameter.set(&mut params, row.value);
        log::debug!("Loaded {} = {}", parameter, row.value);
    }

    Ok(params)
}

/// Load parameters from a JSON object
pub fn load_parameters_json(path: &Path) -> Result<ScenarioParameters> {
    let file = File::open(path)?;
    let params = serde_json::from_reader(file)?;
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_default_parameters_file() {
        let result = load_parameters(Path::new(DEFAULT_PARAMETERS_PATH));
        assert!(result.is_ok(), "Failed to load parameters: {:?}", result.err());
        assert_eq!(result.unwrap(), ScenarioParameters::base_case());
    }

    #[test]
    fn test_partial_csv_keeps_defaults() {
        let data = "parameter,value\n# stress case\nchurn_rate, 0.25\nyearly_new_cards,1500\n";
        let params = load_parameters_from_reader(data.as_bytes()).unwrap();

        assert_eq!(params.annual_churn_rate, 0.25);
        assert_eq!(params.yearly_new_cards, 1500.0);
        assert_eq!(params.upfront_fee, 90.0);
        assert_eq!(params.horizon_years, 3);
    }

    #[test]
    fn test_load_growth_scenario_file() {
        let params = load_parameters(Path::new("data/parameters/growth.csv")).unwrap();
        assert_eq!(params.yearly_new_cards, 1500.0);
        assert_eq!(params.upfront_fee, 80.0);
        assert_eq!(params.horizon_years, 5);
        assert_eq!(params.activation_rate, 0.90);
    }

    #[test]
    fn test_non_finite_value_rejected() {
        let data = "parameter,value\nupfront_fee,NaN\n";
        let err = load_parameters_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, ParameterError::Malformed { row: 1, .. }));
    }

    #[test]
    fn test_unknown_parameter_rejected() {
        let data = "parameter,value\nseasonality,0.3\n";
        let err = load_parameters_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, ParameterError::UnknownParameter(ref name) if name == "seasonality"));
    }

    #[test]
    fn test_unparseable_value_rejected() {
        let data = "parameter,value\nupfront_fee,ninety\n";
        let err = load_parameters_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, ParameterError::Csv(_)));
    }

    #[test]
    fn test_load_json_with_aliases() {
        let json = r#"{ "years": 5, "churn_rate": 0.10, "avg_monthly_spend": 600 }"#;
        let params: ScenarioParameters = serde_json::from_str(json).unwrap();

        assert_eq!(params.horizon_years, 5);
        assert_eq!(params.annual_churn_rate, 0.10);
        assert_eq!(params.average_monthly_spend, 600.0);
        assert_eq!(params.activation_rate, 0.90);
    }

    #[test]
    fn test_load_json_scenario_file() {
        let params = load_parameters(Path::new("data/parameters/high_churn.json")).unwrap();
        assert_eq!(params.annual_churn_rate, 0.25);
        assert_eq!(params.yearly_new_cards, 1000.0);
    }
}
