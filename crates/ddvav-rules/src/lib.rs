//! Dual-Duct VAV Fault Rules
//!
//! Trend review rules for dual-duct variable air volume terminal units:
//! - Simultaneous heating and cooling
//! - Airflow opposing the reported heat/cool mode
//! - Dampers not following their command
//! - Airflow through a closed damper
//! - Room temperature drifting from the control setpoint

pub mod columns;
pub mod config;
pub mod deviation;
pub mod rules;

#[cfg(test)]
mod test_support;

pub use config::{ClosedDamperConfig, DdvavConfig, DeviationConfig};
pub use deviation::{hourly_deviation, HourSegment, RoomTemperatureDeviation};

use fault_engine::RuleSet;
use tracing::info;

/// Register every DDVAV rule with `rules`, in reporting order
pub fn register(rules: &mut RuleSet, config: &DdvavConfig) {
    rules
        .register(rules::simultaneous_heating_cooling(
            config.simultaneous_heating_cooling.clone(),
        ))
        .register(rules::heating_opposed_mode(config.heating_opposed_mode.clone()))
        .register(rules::cooling_opposed_mode(config.cooling_opposed_mode.clone()))
        .register(rules::cooling_damper_stuck(config.cooling_damper_stuck.clone()))
        .register(rules::heating_damper_stuck(config.heating_damper_stuck.clone()))
        .register(rules::cooling_airflow_on_closed_damper(
            config.cooling_airflow_on_closed_damper.clone(),
        ))
        .register(rules::heating_airflow_on_closed_damper(
            config.heating_airflow_on_closed_damper.clone(),
        ))
        .register(RoomTemperatureDeviation::new(
            config.room_temperature_deviation.clone(),
        ));

    info!("Registered {} DDVAV rules", rules.len());
}
