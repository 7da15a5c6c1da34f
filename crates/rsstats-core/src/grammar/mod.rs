//! Fixed-layout grammar of the simulation statistics report.
//!
//! A report is one line per field, in declared order:
//! `<label> : <value><suffix>\n`. The whole document is matched by a single
//! anchored pattern; per-line patterns are only consulted after a failed
//! match to point at the first offending line.

pub mod layout;
mod report;

pub use layout::{REFERENCE_FIELD_COUNT, reference_fields};
pub use report::{ParsedReport, ReportRow};

use crate::domain::{CaptureValue, FieldKind, FieldSpec, MagnitudePrefix, StatsError};
use regex::{Captures, Regex};

const COUNT_PATTERN: &str = r"[0-9]+";
const FLOAT_PATTERN: &str = r"[0-9]+(?:\.[0-9]+)?";
const SEPARATOR: &str = " : ";

#[derive(Debug, Clone)]
pub struct ReportGrammar {
    fields: Vec<FieldSpec>,
    groups: Vec<FieldGroups>,
    document: Regex,
    lines: Vec<Regex>,
}

#[derive(Debug, Clone)]
struct FieldGroups {
    value: String,
    prefix: String,
    binary: String,
}

impl FieldGroups {
    fn for_index(index: usize) -> Self {
        Self {
            value: format!("v{}", index),
            prefix: format!("p{}", index),
            binary: format!("b{}", index),
        }
    }
}

impl ReportGrammar {
    /// Grammar of the reference statistics report.
    pub fn compile() -> Self {
        Self::from_fields(reference_fields()).expect("reference layout should always compile")
    }

    pub fn from_fields(fields: Vec<FieldSpec>) -> Result<Self, GrammarError> {
        let mut document = String::from(r"\A");
        let mut lines = Vec::with_capacity(fields.len());
        let mut groups = Vec::with_capacity(fields.len());

        for (index, field) in fields.iter().enumerate() {
            if field.label.is_empty() || field.label.contains(['\n', '\r']) {
                return Err(GrammarError::InvalidLabel {
                    index,
                    label: field.label.clone(),
                });
            }

            let names = FieldGroups::for_index(index);
            let line = line_pattern(field, &names);
            let line_regex = Regex::new(&format!(r"\A{}\z", line)).map_err(|source| {
                GrammarError::InvalidPattern {
                    label: field.label.clone(),
                    source,
                }
            })?;

            document.push_str(&line);
            lines.push(line_regex);
            groups.push(names);
        }
        document.push_str(r"\z");

        let document = Regex::new(&document).map_err(|source| GrammarError::InvalidPattern {
            label: "<document>".to_string(),
            source,
        })?;

        Ok(Self {
            fields,
            groups,
            document,
            lines,
        })
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parses a complete report, returning one capture per field in order.
    pub fn parse(&self, text: &str) -> Result<Vec<CaptureValue>, ParseError> {
        let Some(captures) = self.document.captures(text) else {
            return Err(self.locate_failure(text));
        };

        self.fields
            .iter()
            .zip(&self.groups)
            .enumerate()
            .map(|(index, (field, names))| capture_value(&captures, index, field, names))
            .collect()
    }

    pub fn parse_report(&self, text: &str) -> Result<ParsedReport, ParseError> {
        self.parse(text).map(ParsedReport::new)
    }

    fn locate_failure(&self, text: &str) -> ParseError {
        let mut lines = text.split_inclusive('\n');
        for (index, (field, pattern)) in self.fields.iter().zip(&self.lines).enumerate() {
            let Some(line) = lines.next() else {
                return ParseError::MissingLine {
                    line: index + 1,
                    label: field.label.clone(),
                };
            };

            if !pattern.is_match(line) {
                return ParseError::MalformedLine {
                    line: index + 1,
                    label: field.label.clone(),
                    found: line.trim_end_matches('\n').to_string(),
                };
            }
        }

        // Every field line matched, so the document can only fail on what follows.
        let extra = lines
            .next()
            .expect("document pattern should be the concatenation of the line patterns");
        ParseError::TrailingContent {
            line: self.fields.len() + 1,
            found: extra.trim_end_matches('\n').to_string(),
        }
    }
}

fn line_pattern(field: &FieldSpec, names: &FieldGroups) -> String {
    let value = match field.kind {
        FieldKind::Count => format!("(?P<{}>{})", names.value, COUNT_PATTERN),
        FieldKind::Float => format!("(?P<{}>{})", names.value, FLOAT_PATTERN),
        FieldKind::Percentage => format!("(?P<{}>{})%", names.value, FLOAT_PATTERN),
        FieldKind::Magnitude(unit) => format!(
            "(?P<{}>{})(?:(?P<{}>[{}])(?P<{}>i)?)?{}",
            names.value,
            FLOAT_PATTERN,
            names.prefix,
            MagnitudePrefix::LETTERS,
            names.binary,
            regex::escape(&unit.as_char().to_string())
        ),
    };

    format!(
        "{}{}{}\n",
        regex::escape(&field.label),
        regex::escape(SEPARATOR),
        value
    )
}

fn capture_value(
    captures: &Captures<'_>,
    index: usize,
    field: &FieldSpec,
    names: &FieldGroups,
) -> Result<CaptureValue, ParseError> {
    let value = captures
        .name(&names.value)
        .ok_or_else(|| ParseError::MissingLine {
            line: index + 1,
            label: field.label.clone(),
        })?;
    let prefix = captures
        .name(&names.prefix)
        .and_then(|letter| letter.as_str().chars().next())
        .and_then(MagnitudePrefix::from_char);
    let binary = captures.name(&names.binary).is_some();

    Ok(CaptureValue::new(field.label.clone(), field.kind, value.as_str()).with_prefix(prefix, binary))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("report ends before line {line} ('{label}')")]
    MissingLine { line: usize, label: String },
    #[error("line {line} does not match '{label}': found '{found}'")]
    MalformedLine {
        line: usize,
        label: String,
        found: String,
    },
    #[error("unexpected content after the last field at line {line}: '{found}'")]
    TrailingContent { line: usize, found: String },
}

impl ParseError {
    /// One-based line number the failure was found on.
    pub fn line(&self) -> usize {
        match self {
            Self::MissingLine { line, .. }
            | Self::MalformedLine { line, .. }
            | Self::TrailingContent { line, .. } => *line,
        }
    }
}

impl From<ParseError> for StatsError {
    fn from(error: ParseError) -> Self {
        StatsError::report_format("FORMAT.REPORT_PARSE", error.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("field {index} has an invalid label '{label}'")]
    InvalidLabel { index: usize, label: String },
    #[error("failed to compile pattern for '{label}': {source}")]
    InvalidPattern {
        label: String,
        source: regex::Error,
    },
}

impl From<GrammarError> for StatsError {
    fn from(error: GrammarError) -> Self {
        StatsError::input_validation("INPUT.REPORT_GRAMMAR", error.to_string())
    }
}
