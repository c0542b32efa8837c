//! Dual-duct VAV trend points

use trend_table::{ColumnKind, Schema};

pub const DATE_TIME: &str = "DateTime";
pub const DISCHARGE_TEMPERATURE: &str = "DischargeTemperature";
pub const COOLING_DAMPER_COMMAND: &str = "CoolingDamperCommand";
pub const COOLING_DAMPER_POSITION: &str = "CoolingDamperPosition";
pub const COOLING_AIR_VOLUME: &str = "CoolingAirVolume";
pub const COOLING_SETPOINT: &str = "CoolingSetpoint";
pub const CONTROL_TEMPERATURE: &str = "ControlTemperature";
pub const SCHEDULE_MODE: &str = "ScheduleMode";
pub const OCCUPANCY_MODE: &str = "OccupancyMode";
pub const HEAT_COOL_MODE: &str = "HeatCoolMode";
pub const HEATING_DAMPER_COMMAND: &str = "HeatingDamperCommand";
pub const HEATING_DAMPER_POSITION: &str = "HeatingDamperPosition";
pub const HEATING_AIR_VOLUME: &str = "HeatingAirVolume";
pub const ROOM_TEMPERATURE: &str = "RoomTemperature";
pub const AIRFLOW_SETPOINT: &str = "AirflowSetpoint";

/// `HeatCoolMode` value while the unit is cooling
pub const MODE_COOL: &str = "COOL";
/// `HeatCoolMode` value while the unit is heating
pub const MODE_HEAT: &str = "HEAT";

/// Schema of a dual-duct VAV trend export
pub fn schema() -> Schema {
    Schema::new(DATE_TIME)
        .column(DISCHARGE_TEMPERATURE, ColumnKind::Numeric)
        .column(COOLING_DAMPER_COMMAND, ColumnKind::Numeric)
        .column(COOLING_DAMPER_POSITION, ColumnKind::Numeric)
        .column(COOLING_AIR_VOLUME, ColumnKind::Numeric)
        .column(COOLING_SETPOINT, ColumnKind::Numeric)
        .column(CONTROL_TEMPERATURE, ColumnKind::Numeric)
        .column(SCHEDULE_MODE, ColumnKind::Numeric)
        .column(OCCUPANCY_MODE, ColumnKind::Boolean)
        .column(HEAT_COOL_MODE, ColumnKind::Categorical)
        .column(HEATING_DAMPER_COMMAND, ColumnKind::Numeric)
        .column(HEATING_DAMPER_POSITION, ColumnKind::Numeric)
        .column(HEATING_AIR_VOLUME, ColumnKind::Numeric)
        .column(ROOM_TEMPERATURE, ColumnKind::Numeric)
        .column(AIRFLOW_SETPOINT, ColumnKind::Numeric)
}
