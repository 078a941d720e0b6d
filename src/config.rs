// Analysis configuration.
//
// Everything the metrics stages need besides the rows themselves lives here:
// department salaries (turned into hourly rates), report sizes and the alert
// thresholds. The struct is loaded once and handed to each stage by reference.
use crate::error::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Paid hours per year used to turn an annual salary into an hourly rate.
    pub work_hours_per_year: f64,
    /// Department name -> annual salary.
    pub departments: BTreeMap<String, f64>,
    /// Hourly rate for departments that are not in `departments`.
    pub default_hourly_rate: f64,
    /// Length of the top profitable / loss-making project lists.
    pub top_n: usize,
    pub thresholds: Thresholds,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub low_efficiency: f64,
    pub high_failure_rate_pct: f64,
    pub min_average_margin_pct: f64,
    pub max_labor_cost_pct: f64,
    pub efficiency_std_alert: f64,
    pub overloaded_department_factor: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            work_hours_per_year: 2080.0,
            departments: BTreeMap::new(),
            default_hourly_rate: 0.0,
            top_n: 10,
            thresholds: Thresholds::default(),
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low_efficiency: 100.0,
            high_failure_rate_pct: 10.0,
            min_average_margin_pct: 15.0,
            max_labor_cost_pct: 40.0,
            efficiency_std_alert: 100.0,
            overloaded_department_factor: 1.5,
        }
    }
}

impl AnalysisConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Hourly rate for a department and whether it came from the salary table.
    pub fn hourly_rate(&self, department: &str) -> (f64, bool) {
        match self.departments.get(department) {
            Some(salary) if self.work_hours_per_year > 0.0 => {
                (salary / self.work_hours_per_year, true)
            }
            Some(_) => (0.0, true),
            None => (self.default_hourly_rate, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = AnalysisConfig::from_toml_str(
            r#"
            top_n = 5

            [departments]
            "设计部" = 208000.0

            [thresholds]
            low_efficiency = 50.0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.top_n, 5);
        assert_eq!(cfg.work_hours_per_year, 2080.0);
        assert_eq!(cfg.thresholds.low_efficiency, 50.0);
        assert_eq!(cfg.thresholds.high_failure_rate_pct, 10.0);
        assert_eq!(cfg.hourly_rate("设计部"), (100.0, true));
    }

    #[test]
    fn unknown_department_uses_default_rate() {
        let cfg = AnalysisConfig {
            default_hourly_rate: 42.0,
            ..AnalysisConfig::default()
        };
        assert_eq!(cfg.hourly_rate("Nowhere"), (42.0, false));
    }

    #[test]
    fn zero_work_hours_gives_zero_rate() {
        let mut cfg = AnalysisConfig {
            work_hours_per_year: 0.0,
            ..AnalysisConfig::default()
        };
        cfg.departments.insert("Ops".to_string(), 50_000.0);
        assert_eq!(cfg.hourly_rate("Ops"), (0.0, true));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(AnalysisConfig::from_toml_str("top_n = \"ten\"").is_err());
    }
}
