//! Room temperature deviation
//!
//! Integrates |control temperature - room temperature| over each clock hour
//! using the actual sample times, so irregular trend intervals are weighted
//! correctly. An hour whose integral exceeds the limit is a fault.

use crate::columns::{CONTROL_TEMPERATURE, ROOM_TEMPERATURE};
use crate::config::DeviationConfig;
use chrono::{Duration, NaiveDateTime, Timelike};
use fault_engine::{EngineError, FaultRecord, Rule, Verdict};
use std::collections::HashMap;
use tracing::debug;
use trend_table::{finite, SampleTable, TableError};

pub const ROOM_TEMPERATURE_DEVIATION: &str = "room_temperature_deviation";

/// Integrated deviation over one clock hour
#[derive(Debug, Clone, PartialEq)]
pub struct HourSegment {
    /// First row of the segment
    pub start: usize,
    /// One past the last row
    pub end: usize,
    /// Integrated deviation (degree-hours)
    pub degree_hours: f64,
}

/// Split rows into clock-hour segments and integrate the deviation of each.
///
/// Each interval between consecutive samples is cut at hour boundaries and
/// the pieces are credited to the hour they fall in, interpolating the
/// deviation linearly. Pieces in an hour with no samples of its own are not
/// credited. Intervals with a missing or non-finite endpoint contribute
/// nothing.
pub fn hourly_deviation(
    timestamps: &[NaiveDateTime],
    control: &[Option<f64>],
    room: &[Option<f64>],
) -> Result<Vec<HourSegment>, TableError> {
    let inputs = [
        ("control temperature", control.len()),
        ("room temperature", room.len()),
    ];
    for (context, len) in inputs {
        if len != timestamps.len() {
            return Err(TableError::LengthMismatch {
                context: context.into(),
                expected: timestamps.len(),
                actual: len,
            });
        }
    }

    let mut segments = Vec::new();
    let mut index = HashMap::new();
    let mut start = 0;
    while start < timestamps.len() {
        let hour = hour_key(&timestamps[start]);
        let end = timestamps[start..]
            .iter()
            .position(|t| hour_key(t) != hour)
            .map(|offset| start + offset)
            .unwrap_or(timestamps.len());

        index.insert(hour, segments.len());
        segments.push(HourSegment {
            start,
            end,
            degree_hours: 0.0,
        });
        start = end;
    }

    let deviation: Vec<Option<f64>> = control
        .iter()
        .zip(room)
        .map(|(c, r)| Some((finite(c)? - finite(r)?).abs()))
        .collect();

    for i in 0..timestamps.len().saturating_sub(1) {
        let (Some(d0), Some(d1)) = (deviation[i], deviation[i + 1]) else {
            continue;
        };
        let (t0, t1) = (timestamps[i], timestamps[i + 1]);
        let span = (t1 - t0).num_milliseconds() as f64;
        if span <= 0.0 {
            continue;
        }
        let at = |t: NaiveDateTime| d0 + (d1 - d0) * (t - t0).num_milliseconds() as f64 / span;

        let mut a = t0;
        while a < t1 {
            let b = next_hour(a).min(t1);
            if let Some(&segment) = index.get(&hour_key(&a)) {
                let hours = (b - a).num_milliseconds() as f64 / 3_600_000.0;
                segments[segment].degree_hours += (at(a) + at(b)) / 2.0 * hours;
            }
            a = b;
        }
    }

    Ok(segments)
}

fn hour_key(t: &NaiveDateTime) -> (chrono::NaiveDate, u32) {
    (t.date(), t.hour())
}

/// Start of the clock hour after `t`
fn next_hour(t: NaiveDateTime) -> NaiveDateTime {
    let into_hour = Duration::seconds(i64::from(t.minute() * 60 + t.second()))
        + Duration::nanoseconds(i64::from(t.nanosecond()));
    t - into_hour + Duration::hours(1)
}

/// Fault when any clock hour accumulates too much deviation from setpoint
pub struct RoomTemperatureDeviation {
    config: DeviationConfig,
}

impl RoomTemperatureDeviation {
    pub fn new(config: DeviationConfig) -> Self {
        Self { config }
    }
}

impl Rule for RoomTemperatureDeviation {
    fn name(&self) -> &str {
        ROOM_TEMPERATURE_DEVIATION
    }

    fn evaluate(&self, table: &SampleTable) -> Result<Verdict, EngineError> {
        let limit = self.config.max_degree_hours;
        if !limit.is_finite() || limit <= 0.0 {
            return Err(EngineError::InvalidParameter {
                name: "max_degree_hours",
                reason: format!("{} must be positive", limit),
            });
        }

        let segments = hourly_deviation(
            table.timestamps(),
            table.numeric(CONTROL_TEMPERATURE)?,
            table.numeric(ROOM_TEMPERATURE)?,
        )?;
        let exceeded: Vec<&HourSegment> =
            segments.iter().filter(|s| s.degree_hours > limit).collect();
        debug!(
            "{}: {} of {} hour segments over {} degree-hours",
            ROOM_TEMPERATURE_DEVIATION,
            exceeded.len(),
            segments.len(),
            limit
        );

        let Some(first) = exceeded.first() else {
            return Ok(Verdict::Pass);
        };

        let message = format!(
            "{}\n{:.2} DegF*hour calculated deviation during hour starting {}; threshold={} ({} hours exceeded)",
            self.config.description,
            first.degree_hours,
            table.timestamps()[first.start].format("%Y-%m-%d %H:%M"),
            limit,
            exceeded.len()
        );
        let rows = (first.start..first.end).collect();
        FaultRecord::from_rows(
            ROOM_TEMPERATURE_DEVIATION,
            message,
            table,
            &self.config.report_columns,
            rows,
        )
        .map(Verdict::Fault)
    }
}
