pub mod errors;

pub use errors::{RunnerResult, StatsError, StatsErrorCategory, StatsResult};

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MagnitudeUnit {
    Seconds,
    Bytes,
}

impl MagnitudeUnit {
    pub const fn as_char(self) -> char {
        match self {
            Self::Seconds => 's',
            Self::Bytes => 'B',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Count,
    Float,
    Percentage,
    Magnitude(MagnitudeUnit),
}

impl FieldKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Float => "float",
            Self::Percentage => "percentage",
            Self::Magnitude(_) => "magnitude",
        }
    }

    pub const fn unit(self) -> Option<MagnitudeUnit> {
        match self {
            Self::Magnitude(unit) => Some(unit),
            _ => None,
        }
    }

    /// Whether `text` is a well-formed numeral for this kind. Suffixes such as
    /// `%` or a magnitude prefix are not part of the numeral.
    pub fn accepts_numeral(self, text: &str) -> bool {
        match self {
            Self::Count => is_digit_run(text),
            Self::Float | Self::Percentage | Self::Magnitude(_) => is_plain_float(text),
        }
    }
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// SI prefix letters accepted in front of a magnitude unit, smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MagnitudePrefix {
    Nano,
    Micro,
    Milli,
    Kilo,
    Mega,
    Giga,
    Tera,
    Peta,
    Exa,
    Zetta,
}

impl MagnitudePrefix {
    pub const LETTERS: &'static str = "munKMGTPEZ";

    pub const fn from_char(letter: char) -> Option<Self> {
        match letter {
            'm' => Some(Self::Milli),
            'u' => Some(Self::Micro),
            'n' => Some(Self::Nano),
            'K' => Some(Self::Kilo),
            'M' => Some(Self::Mega),
            'G' => Some(Self::Giga),
            'T' => Some(Self::Tera),
            'P' => Some(Self::Peta),
            'E' => Some(Self::Exa),
            'Z' => Some(Self::Zetta),
            _ => None,
        }
    }

    pub const fn as_char(self) -> char {
        match self {
            Self::Milli => 'm',
            Self::Micro => 'u',
            Self::Nano => 'n',
            Self::Kilo => 'K',
            Self::Mega => 'M',
            Self::Giga => 'G',
            Self::Tera => 'T',
            Self::Peta => 'P',
            Self::Exa => 'E',
            Self::Zetta => 'Z',
        }
    }

    pub const fn exponent(self) -> i32 {
        match self {
            Self::Nano => -3,
            Self::Micro => -2,
            Self::Milli => -1,
            Self::Kilo => 1,
            Self::Mega => 2,
            Self::Giga => 3,
            Self::Tera => 4,
            Self::Peta => 5,
            Self::Exa => 6,
            Self::Zetta => 7,
        }
    }

    pub fn scale(self, binary: bool) -> f64 {
        let base: f64 = if binary { 1024.0 } else { 1000.0 };
        base.powi(self.exponent())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FieldSpec {
    pub label: String,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn new(label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            label: label.into(),
            kind,
        }
    }

    pub fn count(label: impl Into<String>) -> Self {
        Self::new(label, FieldKind::Count)
    }

    pub fn float(label: impl Into<String>) -> Self {
        Self::new(label, FieldKind::Float)
    }

    pub fn percentage(label: impl Into<String>) -> Self {
        Self::new(label, FieldKind::Percentage)
    }

    pub fn magnitude(label: impl Into<String>, unit: MagnitudeUnit) -> Self {
        Self::new(label, FieldKind::Magnitude(unit))
    }

    pub const fn unit(&self) -> Option<MagnitudeUnit> {
        self.kind.unit()
    }

    /// Label text without the trailing dot padding, e.g. `TOTAL KERNELS`.
    pub fn name(&self) -> &str {
        field_name(&self.label)
    }
}

pub fn field_name(label: &str) -> &str {
    label.trim_end_matches(['.', ' '])
}

/// Raw numeric text captured for one field of a parsed report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptureValue {
    pub label: String,
    pub kind: FieldKind,
    pub text: String,
    pub prefix: Option<MagnitudePrefix>,
    pub binary: bool,
}

impl CaptureValue {
    pub fn new(label: impl Into<String>, kind: FieldKind, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind,
            text: text.into(),
            prefix: None,
            binary: false,
        }
    }

    pub fn name(&self) -> &str {
        field_name(&self.label)
    }

    pub fn with_prefix(mut self, prefix: Option<MagnitudePrefix>, binary: bool) -> Self {
        self.prefix = prefix;
        self.binary = prefix.is_some() && binary;
        self
    }

    /// Numeric value of the captured mantissa, or `None` when the text is not
    /// a numeral of this field's kind.
    pub fn numeric_value(&self) -> Option<f64> {
        if !self.kind.accepts_numeral(&self.text) {
            return None;
        }
        self.text.parse::<f64>().ok()
    }

    /// Mantissa multiplied by the magnitude prefix scale, if any.
    pub fn scaled_value(&self) -> Option<f64> {
        let value = self.numeric_value()?;
        Some(match self.prefix {
            Some(prefix) => value * prefix.scale(self.binary),
            None => value,
        })
    }

    /// The value as it appeared in the report, suffixes included.
    pub fn rendered(&self) -> String {
        let mut rendered = self.text.clone();
        match self.kind {
            FieldKind::Percentage => rendered.push('%'),
            FieldKind::Magnitude(unit) => {
                if let Some(prefix) = self.prefix {
                    rendered.push(prefix.as_char());
                    if self.binary {
                        rendered.push('i');
                    }
                }
                rendered.push(unit.as_char());
            }
            FieldKind::Count | FieldKind::Float => {}
        }
        rendered
    }
}

/// One expected slot of a baseline.
///
/// Serialized as a JSON string for a literal and as `null` for the non-zero
/// wildcard, so no literal value can be mistaken for the wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum ExpectedToken {
    Literal(String),
    NonZero,
}

impl ExpectedToken {
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    pub const fn is_wildcard(&self) -> bool {
        matches!(self, Self::NonZero)
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(literal) => Some(literal),
            Self::NonZero => None,
        }
    }
}

impl From<Option<String>> for ExpectedToken {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(literal) => Self::Literal(literal),
            None => Self::NonZero,
        }
    }
}

impl From<ExpectedToken> for Option<String> {
    fn from(token: ExpectedToken) -> Self {
        match token {
            ExpectedToken::Literal(literal) => Some(literal),
            ExpectedToken::NonZero => None,
        }
    }
}

impl From<&str> for ExpectedToken {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_string())
    }
}

impl Display for ExpectedToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(literal) => write!(f, "'{}'", literal),
            Self::NonZero => f.write_str("<non-zero>"),
        }
    }
}

fn is_digit_run(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|byte| byte.is_ascii_digit())
}

fn is_plain_float(text: &str) -> bool {
    match text.split_once('.') {
        Some((integer, fraction)) => is_digit_run(integer) && is_digit_run(fraction),
        None => is_digit_run(text),
    }
}

#[cfg(test)]
mod tests {
    use super::{CaptureValue, ExpectedToken, FieldKind, FieldSpec, MagnitudePrefix, MagnitudeUnit};

    #[test]
    fn numeral_shapes_follow_field_kind() {
        assert!(FieldKind::Count.accepts_numeral("156"));
        assert!(!FieldKind::Count.accepts_numeral("1.5"));
        assert!(!FieldKind::Count.accepts_numeral(""));
        assert!(!FieldKind::Count.accepts_numeral("-1"));

        assert!(FieldKind::Float.accepts_numeral("48.56"));
        assert!(FieldKind::Float.accepts_numeral("0"));
        assert!(!FieldKind::Float.accepts_numeral("1."));
        assert!(!FieldKind::Float.accepts_numeral(".5"));
        assert!(!FieldKind::Percentage.accepts_numeral("1e3"));
        assert!(FieldKind::Magnitude(MagnitudeUnit::Bytes).accepts_numeral("12.14"));
    }

    #[test]
    fn prefix_letters_round_trip_in_declared_order() {
        let decoded: String = MagnitudePrefix::LETTERS
            .chars()
            .map(|letter| {
                MagnitudePrefix::from_char(letter)
                    .expect("declared letter should decode")
                    .as_char()
            })
            .collect();
        assert_eq!(decoded, MagnitudePrefix::LETTERS);
        assert_eq!(MagnitudePrefix::from_char('k'), None);
        assert_eq!(MagnitudePrefix::from_char('i'), None);
    }

    #[test]
    fn scaled_value_applies_si_and_binary_prefixes() {
        let kind = FieldKind::Magnitude(MagnitudeUnit::Bytes);
        let kibi = CaptureValue::new("PEAK", kind, "2").with_prefix(Some(MagnitudePrefix::Kilo), true);
        let kilo = CaptureValue::new("PEAK", kind, "2").with_prefix(Some(MagnitudePrefix::Kilo), false);
        let milli = CaptureValue::new("COST", FieldKind::Magnitude(MagnitudeUnit::Seconds), "5")
            .with_prefix(Some(MagnitudePrefix::Milli), false);

        assert_eq!(kibi.scaled_value(), Some(2048.0));
        assert_eq!(kilo.scaled_value(), Some(2000.0));
        let scaled = milli.scaled_value().expect("milli value should scale");
        assert!((scaled - 0.005).abs() < 1e-12);
        assert_eq!(kibi.rendered(), "2KiB");
        assert_eq!(milli.rendered(), "5ms");
    }

    #[test]
    fn binary_marker_requires_a_prefix() {
        let value = CaptureValue::new("PEAK", FieldKind::Magnitude(MagnitudeUnit::Bytes), "7")
            .with_prefix(None, true);
        assert!(!value.binary);
        assert_eq!(value.rendered(), "7B");
    }

    #[test]
    fn field_name_drops_dot_padding() {
        assert_eq!(FieldSpec::count("TOTAL LPS .................").name(), "TOTAL LPS");
        assert_eq!(
            FieldSpec::count("TOTAL COMMITTED EVENTS.....").name(),
            "TOTAL COMMITTED EVENTS"
        );
    }

    #[test]
    fn expected_tokens_use_null_for_the_wildcard() {
        let tokens: Vec<ExpectedToken> =
            serde_json::from_str(r#"[null, "0", "NZ"]"#).expect("tokens should parse");
        assert_eq!(
            tokens,
            vec![
                ExpectedToken::NonZero,
                ExpectedToken::literal("0"),
                ExpectedToken::literal("NZ"),
            ]
        );
        assert_eq!(
            serde_json::to_string(&tokens).expect("tokens should serialize"),
            r#"[null,"0","NZ"]"#
        );
    }
}
