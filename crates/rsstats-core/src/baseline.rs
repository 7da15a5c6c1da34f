use crate::domain::{ExpectedToken, StatsError};
use crate::grammar::REFERENCE_FIELD_COUNT;
use globset::Glob;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One fixture base name and the baseline its report must satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Scenario {
    pub id: String,
    pub expected: Vec<ExpectedToken>,
}

impl Scenario {
    pub fn new(id: impl Into<String>, expected: Vec<ExpectedToken>) -> Self {
        Self {
            id: id.into(),
            expected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScenarioManifest {
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read scenario manifest '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse scenario manifest '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("scenario manifest '{}' declares scenario '{id}' more than once", path.display())]
    DuplicateScenario { path: PathBuf, id: String },
    #[error("invalid scenario filter '{pattern}': {source}")]
    InvalidFilter {
        pattern: String,
        source: globset::Error,
    },
}

impl From<ManifestError> for StatsError {
    fn from(error: ManifestError) -> Self {
        let message = error.to_string();
        match error {
            ManifestError::Read { .. } => StatsError::io_system("IO.SCENARIO_MANIFEST", message),
            ManifestError::Parse { .. }
            | ManifestError::DuplicateScenario { .. }
            | ManifestError::InvalidFilter { .. } => {
                StatsError::input_validation("INPUT.SCENARIO_MANIFEST", message)
            }
        }
    }
}

pub fn load_manifest(path: impl AsRef<Path>) -> Result<ScenarioManifest, ManifestError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let manifest: ScenarioManifest =
        serde_json::from_str(&content).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    for (position, scenario) in manifest.scenarios.iter().enumerate() {
        if manifest.scenarios[..position]
            .iter()
            .any(|earlier| earlier.id == scenario.id)
        {
            return Err(ManifestError::DuplicateScenario {
                path: path.to_path_buf(),
                id: scenario.id.clone(),
            });
        }
    }

    Ok(manifest)
}

/// Keeps the scenarios whose id matches `pattern`, preserving order.
pub fn filter_scenarios(
    scenarios: Vec<Scenario>,
    pattern: Option<&str>,
) -> Result<Vec<Scenario>, ManifestError> {
    let Some(pattern) = pattern else {
        return Ok(scenarios);
    };

    let matcher = Glob::new(pattern)
        .map_err(|source| ManifestError::InvalidFilter {
            pattern: pattern.to_string(),
            source,
        })?
        .compile_matcher();

    Ok(scenarios
        .into_iter()
        .filter(|scenario| matcher.is_match(&scenario.id))
        .collect())
}

pub fn find_scenario<'a>(scenarios: &'a [Scenario], id: &str) -> Option<&'a Scenario> {
    scenarios.iter().find(|scenario| scenario.id == id)
}

fn tokens(values: [Option<&str>; REFERENCE_FIELD_COUNT]) -> Vec<ExpectedToken> {
    values
        .into_iter()
        .map(|value| value.map(str::to_string).into())
        .collect()
}

const NZ: Option<&str> = None;

/// Baselines of the four statistics fixtures shipped with the simulator tests.
pub fn reference_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "empty_stats",
            tokens([
                NZ,
                Some("0"),
                Some("1"),
                Some("2"),
                Some("0"),
                Some("0"),
                Some("0"),
                Some("0"),
                Some("0"),
                Some("0"),
                Some("0"),
                Some("0.00"),
                Some("0.00"),
                Some("100.00"),
                Some("0"),
                Some("0"),
                Some("0"),
                Some("0"),
                Some("0.0"),
                Some("0"),
                Some("0.0"),
                Some("0"),
                NZ,
            ]),
        ),
        Scenario::new(
            "single_gvt_stats",
            tokens([
                NZ,
                Some("0"),
                Some("1"),
                Some("2"),
                Some("16"),
                Some("0"),
                Some("0"),
                Some("0"),
                Some("0"),
                Some("0"),
                Some("0"),
                Some("0.00"),
                Some("0.00"),
                Some("100.00"),
                Some("0"),
                Some("0"),
                Some("0"),
                Some("0"),
                Some("0.0"),
                Some("1"),
                Some("0.0"),
                NZ,
                NZ,
            ]),
        ),
        Scenario::new(
            "multi_gvt_stats",
            tokens([
                NZ,
                Some("0"),
                Some("1"),
                Some("2"),
                Some("16"),
                Some("0"),
                Some("0"),
                Some("0"),
                Some("0"),
                Some("0"),
                Some("0"),
                Some("0.00"),
                Some("0.00"),
                Some("100.00"),
                Some("0"),
                Some("0"),
                Some("0"),
                Some("0"),
                Some("48.56"),
                Some("4"),
                Some("12.14"),
                NZ,
                NZ,
            ]),
        ),
        Scenario::new(
            "measures_stats",
            tokens([
                NZ,
                Some("0"),
                Some("1"),
                Some("2"),
                Some("16"),
                Some("156"),
                Some("102"),
                Some("24"),
                Some("30"),
                Some("20"),
                Some("60"),
                Some("15.87"),
                Some("1.20"),
                Some("80.95"),
                Some("0"),
                Some("0"),
                Some("0"),
                Some("0"),
                Some("0.0"),
                Some("1"),
                Some("0.0"),
                NZ,
                NZ,
            ]),
        ),
    ]
}
