mod commands;

use clap::Parser;
use rsstats_core::domain::StatsError;
use tracing_subscriber::EnvFilter;

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let stats_error = error.as_stats_error();
            eprintln!("{}", stats_error.diagnostic_line());
            eprintln!("{}", stats_error.fatal_exit_line());
            stats_error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("rsstats".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => {
            init_logging(cli.verbose);
            dispatch_parsed(cli.command)
        }
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // A subscriber may already be installed when `run` is called more than once.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "rsstats",
    version,
    about = "Simulation statistics report parser and baseline verifier"
)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Generate, parse and verify the statistics report of every scenario
    Verify(commands::VerifyArgs),
    /// Parse a rendered report and print its fields as JSON
    Parse(commands::ParseArgs),
    /// Verify a rendered report against one scenario baseline
    Check(commands::CheckArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Verify(args) => commands::run_verify_command(args),
        CliCommand::Parse(args) => commands::run_parse_command(args),
        CliCommand::Check(args) => commands::run_check_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(StatsError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StatsError> for CliError {
    fn from(error: StatsError) -> Self {
        Self::Compute(error)
    }
}

impl CliError {
    fn as_stats_error(&self) -> StatsError {
        match self {
            Self::Usage(message) => {
                StatsError::input_validation("INPUT.CLI_USAGE", message.trim_end().to_string())
            }
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => StatsError::internal("SYS.CLI", format!("{error:#}")),
        }
    }
}
