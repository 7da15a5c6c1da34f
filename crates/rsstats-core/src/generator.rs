use crate::domain::StatsError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

pub const FIXTURE_EXTENSION: &str = "bin";
pub const REPORT_EXTENSION: &str = "txt";

/// External program that renders `<base>.txt` from a `<base>.bin` dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportGenerator {
    program: PathBuf,
    runner: Option<String>,
}

impl ReportGenerator {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            runner: None,
        }
    }

    /// Launches the program through `runner` (e.g. `python3`); extra
    /// whitespace-separated words are passed as leading arguments.
    pub fn with_runner(mut self, runner: impl Into<String>) -> Self {
        let runner = runner.into();
        self.runner = (!runner.trim().is_empty()).then_some(runner);
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn runner(&self) -> Option<&str> {
        self.runner.as_deref()
    }

    /// Runs the generator on `fixture_path` and returns the rendered report.
    pub fn generate(&self, fixture_path: &Path) -> Result<String, GeneratorError> {
        if !fixture_path.is_file() {
            return Err(GeneratorError::MissingFixture {
                path: fixture_path.to_path_buf(),
            });
        }

        let report_path = report_path_for(fixture_path);
        match fs::remove_file(&report_path) {
            Ok(()) => debug!(path = %report_path.display(), "removed stale report"),
            Err(error) if error.kind() == ErrorKind::NotFound => {}
            Err(source) => {
                return Err(GeneratorError::RemoveStaleReport {
                    path: report_path,
                    source,
                });
            }
        }

        let mut command = self.command();
        command.arg(fixture_path);
        debug!(
            program = %self.program.display(),
            runner = self.runner.as_deref().unwrap_or("-"),
            fixture = %fixture_path.display(),
            "invoking report generator"
        );

        let output = command.output().map_err(|source| GeneratorError::Spawn {
            program: self.program.clone(),
            source,
        })?;
        if !output.status.success() {
            return Err(GeneratorError::Failed {
                program: self.program.clone(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        read_report(&report_path)
    }

    fn command(&self) -> Command {
        let mut words = self
            .runner
            .as_deref()
            .map(str::split_whitespace)
            .into_iter()
            .flatten();
        match words.next() {
            Some(runner) => {
                let mut command = Command::new(runner);
                command.args(words).arg(&self.program);
                command
            }
            None => Command::new(&self.program),
        }
    }
}

pub fn fixture_path_for(fixture_dir: &Path, scenario_id: &str) -> PathBuf {
    fixture_dir.join(format!("{}.{}", scenario_id, FIXTURE_EXTENSION))
}

pub fn report_path_for(fixture_path: &Path) -> PathBuf {
    fixture_path.with_extension(REPORT_EXTENSION)
}

/// Reads a rendered report; `\r\n` line endings are read as `\n`.
pub fn read_report(path: &Path) -> Result<String, GeneratorError> {
    let bytes = fs::read(path).map_err(|source| GeneratorError::ReadReport {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|source| GeneratorError::DecodeReport {
        path: path.to_path_buf(),
        source,
    })?;
    if text.contains("\r\n") {
        Ok(text.replace("\r\n", "\n"))
    } else {
        Ok(text)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("statistics fixture '{}' does not exist", path.display())]
    MissingFixture { path: PathBuf },
    #[error("failed to launch report generator '{}': {source}", program.display())]
    Spawn {
        program: PathBuf,
        source: std::io::Error,
    },
    #[error(
        "report generator '{}' exited with status {}: {stderr}",
        program.display(),
        status.map_or_else(|| "<signal>".to_string(), |code| code.to_string())
    )]
    Failed {
        program: PathBuf,
        status: Option<i32>,
        stderr: String,
    },
    #[error("failed to remove stale report '{}': {source}", path.display())]
    RemoveStaleReport {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read report '{}': {source}", path.display())]
    ReadReport {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("report '{}' is not valid UTF-8: {source}", path.display())]
    DecodeReport {
        path: PathBuf,
        source: std::string::FromUtf8Error,
    },
}

impl GeneratorError {
    pub const fn is_missing_fixture(&self) -> bool {
        matches!(self, Self::MissingFixture { .. })
    }
}

impl From<GeneratorError> for StatsError {
    fn from(error: GeneratorError) -> Self {
        let message = error.to_string();
        match error {
            GeneratorError::MissingFixture { .. } => {
                StatsError::io_system("IO.MISSING_FIXTURE", message)
            }
            GeneratorError::Spawn { .. } => StatsError::io_system("IO.GENERATOR_SPAWN", message),
            GeneratorError::RemoveStaleReport { .. } => {
                StatsError::io_system("IO.STALE_REPORT", message)
            }
            GeneratorError::ReadReport { .. } => StatsError::io_system("IO.REPORT_READ", message),
            GeneratorError::Failed { .. } => StatsError::internal("SYS.GENERATOR_FAILED", message),
            GeneratorError::DecodeReport { .. } => {
                StatsError::report_format("FORMAT.REPORT_ENCODING", message)
            }
        }
    }
}
