//! Synthetic dual-duct trends for rule tests

use crate::columns::*;
use chrono::{NaiveDate, NaiveDateTime};
use trend_table::{ColumnData, SampleTable};

/// Timestamp on the test day
pub fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2021, 12, 18)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// Editable trend, one value per 5-minute sample from 08:00
#[derive(Debug, Clone)]
pub struct Trend {
    pub heating_air: Vec<f64>,
    pub cooling_air: Vec<f64>,
    pub heating_command: Vec<f64>,
    pub heating_position: Vec<f64>,
    pub cooling_command: Vec<f64>,
    pub cooling_position: Vec<f64>,
    pub mode: Vec<&'static str>,
    pub control: Vec<f64>,
    pub room: Vec<f64>,
}

impl Trend {
    /// A healthy unit: no airflow, dampers tracking, room at setpoint
    pub fn quiet(n: usize) -> Self {
        Self {
            heating_air: vec![0.0; n],
            cooling_air: vec![0.0; n],
            heating_command: vec![50.0; n],
            heating_position: vec![50.0; n],
            cooling_command: vec![50.0; n],
            cooling_position: vec![50.0; n],
            mode: vec![MODE_HEAT; n],
            control: vec![70.0; n],
            room: vec![70.0; n],
        }
    }
}

fn numeric(values: Vec<f64>) -> ColumnData {
    ColumnData::Numeric(values.into_iter().map(Some).collect())
}

/// Build a sample table from a trend
pub fn table(trend: Trend) -> SampleTable {
    let n = trend.room.len();
    let start = at(8, 0);
    let times = (0..n)
        .map(|i| start + chrono::Duration::minutes(5 * i as i64))
        .collect();

    SampleTable::new(DATE_TIME, times)
        .unwrap()
        .with_column(HEATING_AIR_VOLUME, numeric(trend.heating_air))
        .unwrap()
        .with_column(COOLING_AIR_VOLUME, numeric(trend.cooling_air))
        .unwrap()
        .with_column(HEATING_DAMPER_COMMAND, numeric(trend.heating_command))
        .unwrap()
        .with_column(HEATING_DAMPER_POSITION, numeric(trend.heating_position))
        .unwrap()
        .with_column(COOLING_DAMPER_COMMAND, numeric(trend.cooling_command))
        .unwrap()
        .with_column(COOLING_DAMPER_POSITION, numeric(trend.cooling_position))
        .unwrap()
        .with_column(
            HEAT_COOL_MODE,
            ColumnData::Categorical(trend.mode.into_iter().map(|m| Some(m.to_string())).collect()),
        )
        .unwrap()
        .with_column(CONTROL_TEMPERATURE, numeric(trend.control))
        .unwrap()
        .with_column(ROOM_TEMPERATURE, numeric(trend.room))
        .unwrap()
}
