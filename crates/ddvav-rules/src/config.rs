//! DDVAV rule configuration

use crate::columns::*;
use fault_engine::{EngineError, Thresholds};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix for overrides, e.g.
/// `TRENDREVIEW_SIMULTANEOUS_HEATING_COOLING__FAILURE_PERCENT=0.05`
pub const ENV_PREFIX: &str = "TRENDREVIEW";

/// Thresholds for airflow measured through a closed damper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedDamperConfig {
    /// Airflow thresholds (tolerance in cfm)
    pub thresholds: Thresholds,

    /// Damper position below which the damper counts as closed (%)
    pub damper_tolerance: f64,
}

/// Room temperature deviation limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviationConfig {
    /// Integrated |control - room| allowed per clock hour (°F·h)
    pub max_degree_hours: f64,

    /// Columns carried in the fault payload
    pub report_columns: Vec<String>,

    /// First line of the fault message
    pub description: String,
}

/// DDVAV rule configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DdvavConfig {
    pub simultaneous_heating_cooling: Thresholds,
    pub heating_opposed_mode: Thresholds,
    pub cooling_opposed_mode: Thresholds,
    pub cooling_damper_stuck: Thresholds,
    pub heating_damper_stuck: Thresholds,
    pub cooling_airflow_on_closed_damper: ClosedDamperConfig,
    pub heating_airflow_on_closed_damper: ClosedDamperConfig,
    pub room_temperature_deviation: DeviationConfig,
}

fn thresholds(tolerance: f64, report_columns: &[&str], description: &str) -> Thresholds {
    Thresholds {
        tolerance,
        failure_percent: 0.02,
        failure_consecutive: 3,
        report_columns: report_columns.iter().map(|c| c.to_string()).collect(),
        description: description.to_string(),
    }
}

impl Default for DdvavConfig {
    fn default() -> Self {
        Self {
            simultaneous_heating_cooling: thresholds(
                10.0,
                &[DATE_TIME, HEATING_AIR_VOLUME, COOLING_AIR_VOLUME],
                "Simultaneous heating and cooling: airflow measured in both ducts",
            ),
            heating_opposed_mode: thresholds(
                10.0,
                &[DATE_TIME, HEATING_AIR_VOLUME, HEAT_COOL_MODE],
                "Heating airflow while the unit is in cooling mode",
            ),
            cooling_opposed_mode: thresholds(
                10.0,
                &[DATE_TIME, COOLING_AIR_VOLUME, HEAT_COOL_MODE],
                "Cooling airflow while the unit is in heating mode",
            ),
            cooling_damper_stuck: thresholds(
                5.0,
                &[DATE_TIME, COOLING_DAMPER_COMMAND, COOLING_DAMPER_POSITION],
                "Cooling damper stuck: damper command and position are >5% different",
            ),
            heating_damper_stuck: thresholds(
                5.0,
                &[DATE_TIME, HEATING_DAMPER_COMMAND, HEATING_DAMPER_POSITION],
                "Heating damper stuck: damper command and position are >5% different",
            ),
            cooling_airflow_on_closed_damper: ClosedDamperConfig {
                thresholds: thresholds(
                    10.0,
                    &[DATE_TIME, COOLING_AIR_VOLUME, COOLING_DAMPER_POSITION],
                    "Cooling airflow measured while damper is closed",
                ),
                damper_tolerance: 2.0,
            },
            heating_airflow_on_closed_damper: ClosedDamperConfig {
                thresholds: thresholds(
                    10.0,
                    &[DATE_TIME, HEATING_AIR_VOLUME, HEATING_DAMPER_POSITION],
                    "Heating airflow measured while damper is closed",
                ),
                damper_tolerance: 2.0,
            },
            room_temperature_deviation: DeviationConfig {
                max_degree_hours: 1.0,
                report_columns: vec![
                    DATE_TIME.to_string(),
                    CONTROL_TEMPERATURE.to_string(),
                    ROOM_TEMPERATURE.to_string(),
                ],
                description: "Excessive deviation in room temperature versus control setpoint"
                    .to_string(),
            },
        }
    }
}

impl DdvavConfig {
    /// Create strict config (fewer tolerated failures)
    pub fn strict() -> Self {
        Self::default().with_limits(0.01, 2)
    }

    /// Create lenient config (more tolerated failures)
    pub fn lenient() -> Self {
        Self::default().with_limits(0.05, 6)
    }

    fn with_limits(mut self, failure_percent: f64, failure_consecutive: usize) -> Self {
        for t in self.thresholds_mut() {
            t.failure_percent = failure_percent;
            t.failure_consecutive = failure_consecutive;
        }
        self
    }

    /// Threshold sets of the condition rules
    pub fn thresholds(&self) -> [&Thresholds; 7] {
        [
            &self.simultaneous_heating_cooling,
            &self.heating_opposed_mode,
            &self.cooling_opposed_mode,
            &self.cooling_damper_stuck,
            &self.heating_damper_stuck,
            &self.cooling_airflow_on_closed_damper.thresholds,
            &self.heating_airflow_on_closed_damper.thresholds,
        ]
    }

    fn thresholds_mut(&mut self) -> [&mut Thresholds; 7] {
        [
            &mut self.simultaneous_heating_cooling,
            &mut self.heating_opposed_mode,
            &mut self.cooling_opposed_mode,
            &mut self.cooling_damper_stuck,
            &mut self.heating_damper_stuck,
            &mut self.cooling_airflow_on_closed_damper.thresholds,
            &mut self.heating_airflow_on_closed_damper.thresholds,
        ]
    }

    /// Load defaults, then an optional file, then `TRENDREVIEW_*` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&DdvavConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Range-check every rule's thresholds
    pub fn validate(&self) -> Result<(), EngineError> {
        for t in self.thresholds() {
            t.validate()?;
        }
        for closed in [
            &self.cooling_airflow_on_closed_damper,
            &self.heating_airflow_on_closed_damper,
        ] {
            if !closed.damper_tolerance.is_finite() {
                return Err(EngineError::InvalidParameter {
                    name: "damper_tolerance",
                    reason: format!("{} is not finite", closed.damper_tolerance),
                });
            }
        }
        let deviation = &self.room_temperature_deviation;
        if !deviation.max_degree_hours.is_finite() || deviation.max_degree_hours <= 0.0 {
            return Err(EngineError::InvalidParameter {
                name: "max_degree_hours",
                reason: format!("{} must be positive", deviation.max_degree_hours),
            });
        }
        Ok(())
    }
}
