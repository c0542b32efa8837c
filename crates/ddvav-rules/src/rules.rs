//! Airflow, mode, and damper rules
//!
//! Each rule derives a condition series from trend points and defers to the
//! combined threshold check.

use crate::columns::*;
use crate::config::ClosedDamperConfig;
use fault_engine::{ConditionRule, Thresholds};

pub const SIMULTANEOUS_HEATING_COOLING: &str = "simultaneous_heating_cooling";
pub const HEATING_OPPOSED_MODE: &str = "heating_opposed_mode";
pub const COOLING_OPPOSED_MODE: &str = "cooling_opposed_mode";
pub const COOLING_DAMPER_STUCK: &str = "cooling_damper_stuck";
pub const HEATING_DAMPER_STUCK: &str = "heating_damper_stuck";
pub const COOLING_AIRFLOW_ON_CLOSED_DAMPER: &str = "cooling_airflow_on_closed_damper";
pub const HEATING_AIRFLOW_ON_CLOSED_DAMPER: &str = "heating_airflow_on_closed_damper";

/// Airflow in both ducts at once
pub fn simultaneous_heating_cooling(thresholds: Thresholds) -> ConditionRule {
    let tolerance = thresholds.tolerance;
    ConditionRule::new(SIMULTANEOUS_HEATING_COOLING, thresholds, move |table| {
        table
            .above(HEATING_AIR_VOLUME, tolerance)?
            .and(&table.above(COOLING_AIR_VOLUME, tolerance)?)
    })
}

/// Heating airflow while the unit reports cooling mode
pub fn heating_opposed_mode(thresholds: Thresholds) -> ConditionRule {
    let tolerance = thresholds.tolerance;
    ConditionRule::new(HEATING_OPPOSED_MODE, thresholds, move |table| {
        table
            .above(HEATING_AIR_VOLUME, tolerance)?
            .and(&table.equals(HEAT_COOL_MODE, MODE_COOL)?)
    })
}

/// Cooling airflow while the unit reports heating mode
pub fn cooling_opposed_mode(thresholds: Thresholds) -> ConditionRule {
    let tolerance = thresholds.tolerance;
    ConditionRule::new(COOLING_OPPOSED_MODE, thresholds, move |table| {
        table
            .above(COOLING_AIR_VOLUME, tolerance)?
            .and(&table.equals(HEAT_COOL_MODE, MODE_HEAT)?)
    })
}

/// Cooling damper position not following its command
pub fn cooling_damper_stuck(thresholds: Thresholds) -> ConditionRule {
    let tolerance = thresholds.tolerance;
    ConditionRule::new(COOLING_DAMPER_STUCK, thresholds, move |table| {
        table.deviation_above(COOLING_DAMPER_COMMAND, COOLING_DAMPER_POSITION, tolerance)
    })
}

/// Heating damper position not following its command
pub fn heating_damper_stuck(thresholds: Thresholds) -> ConditionRule {
    let tolerance = thresholds.tolerance;
    ConditionRule::new(HEATING_DAMPER_STUCK, thresholds, move |table| {
        table.deviation_above(HEATING_DAMPER_COMMAND, HEATING_DAMPER_POSITION, tolerance)
    })
}

/// Cooling airflow measured while the cooling damper is closed
pub fn cooling_airflow_on_closed_damper(config: ClosedDamperConfig) -> ConditionRule {
    airflow_on_closed_damper(
        COOLING_AIRFLOW_ON_CLOSED_DAMPER,
        COOLING_AIR_VOLUME,
        COOLING_DAMPER_POSITION,
        config,
    )
}

/// Heating airflow measured while the heating damper is closed
pub fn heating_airflow_on_closed_damper(config: ClosedDamperConfig) -> ConditionRule {
    airflow_on_closed_damper(
        HEATING_AIRFLOW_ON_CLOSED_DAMPER,
        HEATING_AIR_VOLUME,
        HEATING_DAMPER_POSITION,
        config,
    )
}

fn airflow_on_closed_damper(
    name: &'static str,
    airflow: &'static str,
    position: &'static str,
    config: ClosedDamperConfig,
) -> ConditionRule {
    let tolerance = config.thresholds.tolerance;
    let damper_tolerance = config.damper_tolerance;
    ConditionRule::new(name, config.thresholds, move |table| {
        table
            .above(airflow, tolerance)?
            .and(&table.below(position, damper_tolerance)?)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DdvavConfig;
    use crate::test_support::{table, Trend};
    use fault_engine::{Rule, Verdict};
    use trend_table::Value;

    fn fault(rule: &ConditionRule, trend: Trend) -> Option<fault_engine::FaultRecord> {
        match rule.evaluate(&table(trend)).unwrap() {
            Verdict::Fault(f) => Some(f),
            Verdict::Pass => None,
        }
    }

    #[test]
    fn test_simultaneous_heating_cooling() {
        let rule = simultaneous_heating_cooling(DdvavConfig::default().simultaneous_heating_cooling);
        let mut trend = Trend::quiet(100);
        assert!(fault(&rule, trend.clone()).is_none());

        // Two overlaps in 100 samples are tolerated at 2%
        trend.heating_air[10] = 200.0;
        trend.cooling_air[10] = 300.0;
        trend.heating_air[40] = 200.0;
        trend.cooling_air[40] = 300.0;
        assert!(fault(&rule, trend.clone()).is_none());

        trend.heating_air[70] = 200.0;
        trend.cooling_air[70] = 300.0;
        let f = fault(&rule, trend).unwrap();
        assert_eq!(f.rows(), &[10, 40]);
        assert_eq!(
            f.dependent_axis_labels(),
            &[HEATING_AIR_VOLUME.to_string(), COOLING_AIR_VOLUME.to_string()]
        );
        assert_eq!(f.values(COOLING_AIR_VOLUME).unwrap()[0], Value::Number(300.0));
    }

    #[test]
    fn test_simultaneous_heating_cooling_consecutive() {
        let rule = simultaneous_heating_cooling(DdvavConfig::default().simultaneous_heating_cooling);
        let mut trend = Trend::quiet(1000);
        for i in 500..503 {
            trend.heating_air[i] = 50.0;
            trend.cooling_air[i] = 50.0;
        }
        let f = fault(&rule, trend).unwrap();
        assert_eq!(f.rows(), &[500]);
        assert!(f.message().contains("consecutive instances (3)"));
    }

    #[test]
    fn test_opposed_modes() {
        let config = DdvavConfig::default();
        let heating = heating_opposed_mode(config.heating_opposed_mode.clone());
        let cooling = cooling_opposed_mode(config.cooling_opposed_mode.clone());

        let mut trend = Trend::quiet(50);
        for i in 5..9 {
            trend.heating_air[i] = 80.0;
            trend.mode[i] = MODE_COOL;
        }
        assert!(fault(&heating, trend.clone()).is_some());
        assert!(fault(&cooling, trend.clone()).is_none());

        // Cooling in cooling mode is normal operation
        let mut trend = Trend::quiet(50);
        for i in 5..9 {
            trend.cooling_air[i] = 80.0;
            trend.mode[i] = MODE_COOL;
        }
        assert!(fault(&cooling, trend).is_none());
    }

    #[test]
    fn test_damper_stuck() {
        let rule = cooling_damper_stuck(DdvavConfig::default().cooling_damper_stuck);
        let mut trend = Trend::quiet(100);
        trend.cooling_command[20] = 50.0;
        trend.cooling_position[20] = 54.0;
        assert!(fault(&rule, trend.clone()).is_none());

        for i in 30..34 {
            trend.cooling_command[i] = 80.0;
            trend.cooling_position[i] = 10.0;
        }
        let f = fault(&rule, trend).unwrap();
        assert!(f.message().starts_with("Cooling damper stuck"));
        assert_eq!(
            f.values(COOLING_DAMPER_POSITION).unwrap(),
            &[Value::Number(10.0), Value::Number(10.0)]
        );
    }

    #[test]
    fn test_airflow_on_closed_damper() {
        let rule = heating_airflow_on_closed_damper(DdvavConfig::default().heating_airflow_on_closed_damper);
        let mut trend = Trend::quiet(100);
        for i in 60..63 {
            trend.heating_air[i] = 40.0;
            trend.heating_position[i] = 1.0;
        }
        let f = fault(&rule, trend.clone()).unwrap();
        assert_eq!(f.rule(), HEATING_AIRFLOW_ON_CLOSED_DAMPER);

        // Open damper: airflow is expected
        for i in 60..63 {
            trend.heating_position[i] = 30.0;
        }
        assert!(fault(&rule, trend).is_none());
    }
}
