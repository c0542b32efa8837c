//! Trend Review
//!
//! Loads a trend export, runs the rule set for the selected equipment type,
//! and reports faults to an issue log.

use anyhow::Context;
use clap::{ArgAction, Parser, ValueEnum};
use ddvav_rules::DdvavConfig;
use fault_engine::{PassSummary, RuleSet};
use fault_report::{JsonLinesReport, Tee, TextReport, TracingSink};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use trend_table::{CsvSource, SampleSource};

/// Equipment types with a rule set
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EquipmentType {
    /// Dual-duct variable air volume terminal unit
    Ddvav,
}

/// Trend review CLI
#[derive(Debug, Parser)]
#[command(name = "trendreview")]
#[command(about = "Detect HVAC faults in building automation trend data", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Trend export (CSV with a header row)
    #[arg(short, long)]
    pub filepath: PathBuf,

    /// Equipment type of the trended unit
    #[arg(short = 't', long = "type", value_enum, default_value_t = EquipmentType::Ddvav)]
    pub equipment: EquipmentType,

    /// Issue log to append to
    #[arg(short, long, default_value = "./report.txt")]
    pub report_path: PathBuf,

    /// Rule configuration file (TOML, YAML or JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Also write faults as JSON lines to this file
    #[arg(long)]
    pub faults_json: Option<PathBuf>,

    /// Write pass counters in Prometheus text format to this file
    #[arg(long)]
    pub metrics_path: Option<PathBuf>,

    /// Evaluate rules on the rayon thread pool
    #[arg(long)]
    pub parallel: bool,

    /// Enable JSON logging
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Initialize the tracing subscriber. `RUST_LOG` overrides the verbosity flag.
pub fn init_logging(verbose: u8, json: bool) -> anyhow::Result<()> {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
    };
    result.context("failed to set tracing subscriber")
}

/// Run one review pass as configured by `cli`
pub fn run(cli: &Cli) -> anyhow::Result<PassSummary> {
    let rules = match cli.equipment {
        EquipmentType::Ddvav => {
            let config = DdvavConfig::load(cli.config.as_deref())
                .context("failed to load rule configuration")?;
            config.validate().context("invalid rule configuration")?;

            let source = CsvSource::new(&cli.filepath, ddvav_rules::columns::schema());
            let table = source
                .load()
                .with_context(|| format!("failed to load {}", cli.filepath.display()))?;

            let mut rules = RuleSet::new(Arc::new(table));
            ddvav_rules::register(&mut rules, &config);
            rules
        }
    };
    info!(
        "Reviewing {} samples with {} rules",
        rules.table().len(),
        rules.len()
    );

    let mut text = TextReport::open(&cli.report_path)?;
    let mut log = TracingSink::new();
    let mut json = cli
        .faults_json
        .as_ref()
        .map(JsonLinesReport::open)
        .transpose()?;

    let mut sink = Tee::new().with(&mut text).with(&mut log);
    if let Some(json) = json.as_mut() {
        sink = sink.with(json);
    }

    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();
    let summary = metrics::with_local_recorder(&recorder, || {
        if cli.parallel {
            rules.run_parallel(&mut sink)
        } else {
            rules.run(&mut sink)
        }
    })?;

    if let Some(path) = &cli.metrics_path {
        std::fs::write(path, handle.render())
            .with_context(|| format!("failed to write metrics to {}", path.display()))?;
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const HEADER: &str = "DateTime,DischargeTemperature,CoolingDamperCommand,CoolingDamperPosition,\
CoolingAirVolume,CoolingSetpoint,ControlTemperature,ScheduleMode,OccupancyMode,HeatCoolMode,\
HeatingDamperCommand,HeatingDamperPosition,HeatingAirVolume,RoomTemperature,AirflowSetpoint";

    /// One hour of 5-minute samples in cooling mode; rows 4..8 heat and cool at once
    fn write_trend(path: &Path) {
        let mut csv = String::from(HEADER);
        csv.push('\n');
        for i in 0..12 {
            let (cool, heat) = if (4..8).contains(&i) { (220.0, 180.0) } else { (300.0, 0.0) };
            csv.push_str(&format!(
                "2021-12-18 08:{:02}:00,55,50,50,{},72,70,1,occupied,COOL,50,50,{},70,400\n",
                i * 5,
                cool,
                heat
            ));
        }
        std::fs::write(path, csv).unwrap();
    }

    fn cli(dir: &Path, extra: &[&str]) -> Cli {
        let trend = dir.join("trend.csv");
        let report = dir.join("report.txt");
        let mut args = vec![
            "trendreview".to_string(),
            "--filepath".to_string(),
            trend.display().to_string(),
            "--report-path".to_string(),
            report.display().to_string(),
        ];
        args.extend(extra.iter().map(|a| a.to_string()));
        Cli::parse_from(args)
    }

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::parse_from(["trendreview", "--filepath", "trend.csv", "-vv"]);
        assert_eq!(cli.equipment, EquipmentType::Ddvav);
        assert_eq!(cli.report_path, PathBuf::from("./report.txt"));
        assert_eq!(cli.verbose, 2);
        assert!(!cli.parallel);
    }

    #[test]
    fn test_review_writes_issue_log() {
        let dir = tempfile::tempdir().unwrap();
        write_trend(&dir.path().join("trend.csv"));

        let summary = run(&cli(dir.path(), &[])).unwrap();
        assert_eq!(summary.rules_evaluated, 8);
        assert_eq!(
            summary.faulted,
            vec!["simultaneous_heating_cooling", "heating_opposed_mode"]
        );

        let log = std::fs::read_to_string(dir.path().join("report.txt")).unwrap();
        assert!(log.starts_with("Issue #1\nSimultaneous heating and cooling"));
        assert!(log.contains("Issue #2\nHeating airflow while the unit is in cooling mode"));
        assert!(!log.contains("Issue #3"));
    }

    #[test]
    fn test_parallel_and_json_output() {
        let dir = tempfile::tempdir().unwrap();
        write_trend(&dir.path().join("trend.csv"));
        let faults = dir.path().join("faults.jsonl");

        let summary = run(&cli(
            dir.path(),
            &["--parallel", "--faults-json", faults.to_str().unwrap()],
        ))
        .unwrap();
        assert_eq!(summary.fault_count(), 2);

        let text = std::fs::read_to_string(&faults).unwrap();
        let first: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(first["rule"], "simultaneous_heating_cooling");
        assert_eq!(first["rows"][0], 4);
    }

    #[test]
    fn test_metrics_written_after_pass() {
        let dir = tempfile::tempdir().unwrap();
        write_trend(&dir.path().join("trend.csv"));
        let metrics = dir.path().join("metrics.prom");

        run(&cli(
            dir.path(),
            &["--parallel", "--metrics-path", metrics.to_str().unwrap()],
        ))
        .unwrap();

        let text = std::fs::read_to_string(&metrics).unwrap();
        assert!(text.contains("fault_engine_rules_evaluated_total 8"));
        assert!(text.contains("fault_engine_faults_total{rule=\"heating_opposed_mode\"} 1"));
        assert!(!text.contains("rule=\"cooling_opposed_mode\""));
    }

    #[test]
    fn test_missing_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("trend.csv"), "DateTime,RoomTemperature\n").unwrap();

        let err = run(&cli(dir.path(), &[])).unwrap_err();
        assert!(format!("{:#}", err).contains("trend.csv"));
    }

    #[test]
    fn test_config_file_relaxes_rules() {
        let dir = tempfile::tempdir().unwrap();
        write_trend(&dir.path().join("trend.csv"));
        let config = dir.path().join("rules.toml");
        std::fs::write(
            &config,
            "[simultaneous_heating_cooling]\nfailure_percent = 0.5\nfailure_consecutive = 10\n",
        )
        .unwrap();

        let summary = run(&cli(dir.path(), &["--config", config.to_str().unwrap()])).unwrap();
        assert_eq!(summary.faulted, vec!["heating_opposed_mode"]);
    }
}
