use super::CliError;
use anyhow::Context;
use rsstats_core::baseline::{Scenario, find_scenario, load_manifest, reference_scenarios};
use rsstats_core::domain::StatsError;
use rsstats_core::generator::read_report;
use rsstats_core::grammar::ReportGrammar;
use rsstats_core::runner::{VerifyRunnerConfig, check_report, render_human_summary, run_verification};
use std::path::PathBuf;
use tracing::info;

#[derive(clap::Args)]
pub(super) struct VerifyArgs {
    /// Directory holding `<scenario>.bin` statistics dumps
    #[arg(long, default_value = "test/stats")]
    fixture_dir: PathBuf,

    /// Report generator program
    #[arg(long, default_value = "scripts/rootsim_stats.py")]
    generator: PathBuf,

    /// Interpreter used to launch the generator, e.g. `python3`
    #[arg(long)]
    generator_runner: Option<String>,

    /// Scenario manifest path (defaults to the built-in reference scenarios)
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Glob pattern selecting scenario ids
    #[arg(long)]
    scenario: Option<String>,

    /// JSON report output path
    #[arg(long, default_value = "artifacts/stats-verify/report.json")]
    report: PathBuf,
}

impl VerifyArgs {
    fn into_config(self) -> VerifyRunnerConfig {
        VerifyRunnerConfig {
            fixture_dir: self.fixture_dir,
            generator: self.generator,
            generator_runner: self.generator_runner,
            manifest_path: self.manifest,
            scenario_filter: self.scenario,
            report_path: self.report,
        }
    }
}

#[derive(clap::Args)]
pub(super) struct ParseArgs {
    /// Rendered statistics report
    #[arg(value_name = "REPORT")]
    report: PathBuf,
}

#[derive(clap::Args)]
pub(super) struct CheckArgs {
    /// Rendered statistics report
    #[arg(value_name = "REPORT")]
    report: PathBuf,

    /// Scenario id whose baseline the report must satisfy
    #[arg(long)]
    scenario: String,

    /// Scenario manifest path (defaults to the built-in reference scenarios)
    #[arg(long)]
    manifest: Option<PathBuf>,
}

pub(super) fn run_verify_command(args: VerifyArgs) -> Result<i32, CliError> {
    let config = args.into_config();
    let report = run_verification(&config)?;
    println!("{}", render_human_summary(&report));
    println!("JSON report: {}", config.report_path.display());

    Ok(report.exit_code)
}

pub(super) fn run_parse_command(args: ParseArgs) -> Result<i32, CliError> {
    let text = read_report(&args.report).map_err(StatsError::from)?;
    let parsed = ReportGrammar::compile()
        .parse_report(&text)
        .map_err(StatsError::from)?;

    let rows = serde_json::to_string_pretty(&parsed.rows())
        .context("failed to serialize parsed report rows")?;
    println!("{}", rows);
    Ok(0)
}

pub(super) fn run_check_command(args: CheckArgs) -> Result<i32, CliError> {
    let scenarios = match &args.manifest {
        Some(path) => load_manifest(path).map_err(StatsError::from)?.scenarios,
        None => reference_scenarios(),
    };
    let scenario = lookup_scenario(&scenarios, &args.scenario)?;
    let text = read_report(&args.report).map_err(StatsError::from)?;

    let result = check_report(&ReportGrammar::compile(), &text, &scenario.expected).into_result()?;
    info!(scenario = %scenario.id, fields = result.compared_fields, "report matches baseline");
    println!(
        "Scenario {}: PASS ({} fields)",
        scenario.id, result.compared_fields
    );
    Ok(0)
}

fn lookup_scenario<'a>(scenarios: &'a [Scenario], id: &str) -> Result<&'a Scenario, CliError> {
    find_scenario(scenarios, id).ok_or_else(|| {
        let known = scenarios
            .iter()
            .map(|scenario| scenario.id.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        CliError::Compute(StatsError::input_validation(
            "INPUT.UNKNOWN_SCENARIO",
            format!("unknown scenario '{}'; known scenarios: {}", id, known),
        ))
    })
}
