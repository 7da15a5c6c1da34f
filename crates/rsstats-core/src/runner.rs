use crate::baseline::{Scenario, filter_scenarios, load_manifest, reference_scenarios};
use crate::domain::{ExpectedToken, RunnerResult, StatsError};
use crate::generator::{ReportGenerator, fixture_path_for, report_path_for};
use crate::grammar::{ParseError, ReportGrammar};
use crate::verifier::{VerificationFailure, VerificationResult, verify};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct VerifyRunnerConfig {
    pub fixture_dir: PathBuf,
    pub generator: PathBuf,
    pub generator_runner: Option<String>,
    pub manifest_path: Option<PathBuf>,
    pub scenario_filter: Option<String>,
    pub report_path: PathBuf,
}

impl Default for VerifyRunnerConfig {
    fn default() -> Self {
        Self {
            fixture_dir: PathBuf::from("test/stats"),
            generator: PathBuf::from("scripts/rootsim_stats.py"),
            generator_runner: None,
            manifest_path: None,
            scenario_filter: None,
            report_path: PathBuf::from("artifacts/stats-verify/report.json"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    Passed,
    MissingFixture,
    GeneratorFailed,
    ParseError,
    LengthMismatch,
    FieldMismatch,
}

impl ScenarioStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::MissingFixture => "missing_fixture",
            Self::GeneratorFailed => "generator_failed",
            Self::ParseError => "parse_error",
            Self::LengthMismatch => "length_mismatch",
            Self::FieldMismatch => "field_mismatch",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyRunReport {
    pub generated_at_unix_seconds: u64,
    pub passed: bool,
    pub exit_code: i32,
    pub fixture_dir: String,
    pub generator: String,
    pub generator_runner: Option<String>,
    pub manifest_path: Option<String>,
    pub scenario_filter: Option<String>,
    pub scenario_count: usize,
    pub passed_scenario_count: usize,
    pub failed_scenario_count: usize,
    pub scenarios: Vec<ScenarioReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub scenario_id: String,
    pub fixture_path: String,
    pub report_path: String,
    pub status: ScenarioStatus,
    pub passed: bool,
    pub exit_code: i32,
    pub diagnostic: Option<String>,
    pub verification: Option<VerificationResult>,
}

/// Outcome of checking one report text against one baseline.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportCheck {
    Verified(VerificationResult),
    Unparsable(ParseError),
}

impl ReportCheck {
    pub fn status(&self) -> ScenarioStatus {
        match self {
            Self::Unparsable(_) => ScenarioStatus::ParseError,
            Self::Verified(result) => match result.failure {
                None => ScenarioStatus::Passed,
                Some(VerificationFailure::LengthMismatch { .. }) => ScenarioStatus::LengthMismatch,
                Some(VerificationFailure::FieldMismatch { .. }) => ScenarioStatus::FieldMismatch,
            },
        }
    }

    pub fn into_result(self) -> Result<VerificationResult, StatsError> {
        match self {
            Self::Unparsable(error) => Err(error.into()),
            Self::Verified(result) => match result.failure.clone() {
                None => Ok(result),
                Some(failure) => Err(failure.into()),
            },
        }
    }
}

/// Parses `text` and verifies it against `expected`, without touching disk.
pub fn check_report(grammar: &ReportGrammar, text: &str, expected: &[ExpectedToken]) -> ReportCheck {
    match grammar.parse(text) {
        Ok(captures) => ReportCheck::Verified(verify(&captures, expected)),
        Err(error) => ReportCheck::Unparsable(error),
    }
}

pub fn select_scenarios(config: &VerifyRunnerConfig) -> RunnerResult<Vec<Scenario>> {
    let scenarios = match &config.manifest_path {
        Some(path) => load_manifest(path)?.scenarios,
        None => reference_scenarios(),
    };
    let selected = filter_scenarios(scenarios, config.scenario_filter.as_deref())?;
    if selected.is_empty() {
        return Err(RunnerError::NoScenarios {
            filter: config.scenario_filter.clone(),
        }
        .into());
    }
    Ok(selected)
}

pub fn run_verification(config: &VerifyRunnerConfig) -> RunnerResult<VerifyRunReport> {
    let scenarios = select_scenarios(config)?;
    let grammar = ReportGrammar::compile();
    let mut generator = ReportGenerator::new(&config.generator);
    if let Some(runner) = &config.generator_runner {
        generator = generator.with_runner(runner.clone());
    }

    let scenario_reports: Vec<ScenarioReport> = scenarios
        .iter()
        .map(|scenario| run_scenario(&grammar, &generator, &config.fixture_dir, scenario))
        .collect();

    let scenario_count = scenario_reports.len();
    let passed_scenario_count = scenario_reports
        .iter()
        .filter(|scenario| scenario.passed)
        .count();
    let failed_scenario_count = scenario_count.saturating_sub(passed_scenario_count);
    let exit_code = scenario_reports
        .iter()
        .find(|scenario| !scenario.passed)
        .map_or(0, |scenario| scenario.exit_code);

    let report = VerifyRunReport {
        generated_at_unix_seconds: current_unix_timestamp_seconds(),
        passed: failed_scenario_count == 0,
        exit_code,
        fixture_dir: normalize_path(&config.fixture_dir),
        generator: normalize_path(&config.generator),
        generator_runner: generator.runner().map(str::to_string),
        manifest_path: config.manifest_path.as_deref().map(normalize_path),
        scenario_filter: config.scenario_filter.clone(),
        scenario_count,
        passed_scenario_count,
        failed_scenario_count,
        scenarios: scenario_reports,
    };

    write_report_file(&config.report_path, &report)?;
    info!(
        passed = report.passed,
        scenarios = report.scenario_count,
        failed = report.failed_scenario_count,
        "statistics verification finished"
    );
    Ok(report)
}

/// Runs one scenario in isolation: generate, parse, verify.
pub fn run_scenario(
    grammar: &ReportGrammar,
    generator: &ReportGenerator,
    fixture_dir: &Path,
    scenario: &Scenario,
) -> ScenarioReport {
    let fixture_path = fixture_path_for(fixture_dir, &scenario.id);
    let report_path = report_path_for(&fixture_path);
    info!(scenario = %scenario.id, "verifying statistics scenario");

    let mut report = ScenarioReport {
        scenario_id: scenario.id.clone(),
        fixture_path: normalize_path(&fixture_path),
        report_path: normalize_path(&report_path),
        status: ScenarioStatus::Passed,
        passed: true,
        exit_code: 0,
        diagnostic: None,
        verification: None,
    };

    let text = match generator.generate(&fixture_path) {
        Ok(text) => text,
        Err(error) => {
            let status = if error.is_missing_fixture() {
                ScenarioStatus::MissingFixture
            } else {
                ScenarioStatus::GeneratorFailed
            };
            return report.failed(status, error.into());
        }
    };

    let check = check_report(grammar, &text, &scenario.expected);
    let status = check.status();
    if let ReportCheck::Verified(result) = &check {
        report.verification = Some(result.clone());
    }
    match check.into_result() {
        Ok(_) => report,
        Err(error) => report.failed(status, error),
    }
}

impl ScenarioReport {
    fn failed(mut self, status: ScenarioStatus, error: StatsError) -> Self {
        warn!(
            scenario = %self.scenario_id,
            status = status.as_str(),
            "{}",
            error.diagnostic_line()
        );
        self.status = status;
        self.passed = false;
        self.exit_code = error.exit_code();
        self.diagnostic = Some(error.diagnostic_line());
        self
    }
}

pub fn render_human_summary(report: &VerifyRunReport) -> String {
    let mut lines = Vec::new();
    let status = if report.passed { "PASS" } else { "FAIL" };
    lines.push(format!("Verification status: {}", status));
    lines.push(format!(
        "Scenarios: {} total ({} passed, {} failed)",
        report.scenario_count, report.passed_scenario_count, report.failed_scenario_count
    ));

    for scenario in &report.scenarios {
        if scenario.passed {
            let fields = scenario
                .verification
                .as_ref()
                .map_or(0, |verification| verification.compared_fields);
            lines.push(format!(
                "Scenario {}: PASS ({} fields)",
                scenario.scenario_id, fields
            ));
            continue;
        }

        lines.push(format!(
            "Scenario {}: FAIL [{}]",
            scenario.scenario_id,
            scenario.status.as_str()
        ));
        if let Some(diagnostic) = &scenario.diagnostic {
            lines.push(format!("  first failure: {}", diagnostic));
        }
    }

    lines.join("\n")
}

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("no scenarios selected (filter={filter:?})")]
    NoScenarios { filter: Option<String> },
    #[error("failed to create report directory '{}': {source}", path.display())]
    ReportDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to serialize report '{}': {source}", path.display())]
    SerializeReport {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write report '{}': {source}", path.display())]
    WriteReport {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl From<RunnerError> for StatsError {
    fn from(error: RunnerError) -> Self {
        let message = error.to_string();
        match error {
            RunnerError::NoScenarios { .. } => {
                StatsError::input_validation("INPUT.SCENARIO_SELECTION", message)
            }
            RunnerError::ReportDirectory { .. } | RunnerError::WriteReport { .. } => {
                StatsError::io_system("IO.VERIFY_REPORT", message)
            }
            RunnerError::SerializeReport { .. } => StatsError::internal("SYS.VERIFY_REPORT", message),
        }
    }
}

fn write_report_file(report_path: &Path, report: &VerifyRunReport) -> Result<(), RunnerError> {
    if let Some(parent_dir) = report_path.parent()
        && !parent_dir.as_os_str().is_empty()
    {
        fs::create_dir_all(parent_dir).map_err(|source| RunnerError::ReportDirectory {
            path: parent_dir.to_path_buf(),
            source,
        })?;
    }

    let report_json =
        serde_json::to_string_pretty(report).map_err(|source| RunnerError::SerializeReport {
            path: report_path.to_path_buf(),
            source,
        })?;
    fs::write(report_path, report_json).map_err(|source| RunnerError::WriteReport {
        path: report_path.to_path_buf(),
        source,
    })
}

fn current_unix_timestamp_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_secs())
}

fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
