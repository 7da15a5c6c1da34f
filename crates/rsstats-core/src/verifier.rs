use crate::domain::{CaptureValue, ExpectedToken, StatsError, field_name};
use serde::Serialize;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationResult {
    pub passed: bool,
    pub compared_fields: usize,
    pub failure: Option<VerificationFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerificationFailure {
    LengthMismatch {
        captured: usize,
        expected: usize,
    },
    FieldMismatch {
        index: usize,
        label: String,
        expected: ExpectedToken,
        actual: String,
        reason: MismatchReason,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchReason {
    LiteralDiffers,
    ZeroValue,
    NotNumeric,
}

impl VerificationResult {
    fn pass(compared_fields: usize) -> Self {
        Self {
            passed: true,
            compared_fields,
            failure: None,
        }
    }

    fn fail(compared_fields: usize, failure: VerificationFailure) -> Self {
        Self {
            passed: false,
            compared_fields,
            failure: Some(failure),
        }
    }

    pub fn failing_index(&self) -> Option<usize> {
        match &self.failure {
            Some(VerificationFailure::FieldMismatch { index, .. }) => Some(*index),
            _ => None,
        }
    }

    pub fn reason(&self) -> Option<String> {
        self.failure.as_ref().map(ToString::to_string)
    }

    pub fn into_result(self) -> Result<usize, VerificationFailure> {
        match self.failure {
            None => Ok(self.compared_fields),
            Some(failure) => Err(failure),
        }
    }
}

/// Compares captures against a baseline, field by field, left to right.
///
/// Stops at the first failing field. A length difference fails before any
/// field is compared.
pub fn verify(captures: &[CaptureValue], expected: &[ExpectedToken]) -> VerificationResult {
    if captures.len() != expected.len() {
        return VerificationResult::fail(
            0,
            VerificationFailure::LengthMismatch {
                captured: captures.len(),
                expected: expected.len(),
            },
        );
    }

    for (index, (capture, token)) in captures.iter().zip(expected).enumerate() {
        if let Err(reason) = check_field(capture, token) {
            return VerificationResult::fail(
                index + 1,
                VerificationFailure::FieldMismatch {
                    index,
                    label: capture.label.clone(),
                    expected: token.clone(),
                    actual: capture.text.clone(),
                    reason,
                },
            );
        }
    }

    VerificationResult::pass(captures.len())
}

pub fn check_field(capture: &CaptureValue, token: &ExpectedToken) -> Result<(), MismatchReason> {
    match token {
        ExpectedToken::Literal(literal) if capture.text == *literal => Ok(()),
        ExpectedToken::Literal(_) => Err(MismatchReason::LiteralDiffers),
        ExpectedToken::NonZero => match capture.numeric_value() {
            None => Err(MismatchReason::NotNumeric),
            Some(value) if value == 0.0 => Err(MismatchReason::ZeroValue),
            Some(_) => Ok(()),
        },
    }
}

impl Display for MismatchReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::LiteralDiffers => "literal differs",
            Self::ZeroValue => "value is zero",
            Self::NotNumeric => "value is not numeric",
        })
    }
}

impl Display for VerificationFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LengthMismatch { captured, expected } => write!(
                f,
                "field count mismatch (captured={}, expected={})",
                captured, expected
            ),
            Self::FieldMismatch {
                index,
                label,
                expected,
                actual,
                reason,
            } => write!(
                f,
                "field {} ('{}') expected {} but found '{}' ({})",
                index,
                field_name(label),
                expected,
                actual,
                reason
            ),
        }
    }
}

impl From<VerificationFailure> for StatsError {
    fn from(failure: VerificationFailure) -> Self {
        let placeholder = match failure {
            VerificationFailure::LengthMismatch { .. } => "VERIFY.LENGTH_MISMATCH",
            VerificationFailure::FieldMismatch { .. } => "VERIFY.FIELD_MISMATCH",
        };
        StatsError::verification(placeholder, failure.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{MismatchReason, VerificationFailure, check_field, verify};
    use crate::domain::{
        CaptureValue, ExpectedToken, FieldKind, MagnitudeUnit, StatsError, StatsErrorCategory,
    };

    fn capture(kind: FieldKind, text: &str) -> CaptureValue {
        CaptureValue::new("FIELD", kind, text)
    }

    #[test]
    fn wildcard_rejects_every_spelling_of_zero() {
        for text in ["0", "0.0", "0.00", "000"] {
            assert_eq!(
                check_field(&capture(FieldKind::Float, text), &ExpectedToken::NonZero),
                Err(MismatchReason::ZeroValue),
                "'{}' should fail the wildcard",
                text
            );
        }
    }

    #[test]
    fn wildcard_accepts_non_zero_numerals() {
        let seconds = FieldKind::Magnitude(MagnitudeUnit::Seconds);
        for (kind, text) in [
            (FieldKind::Count, "1"),
            (FieldKind::Float, "0.01"),
            (FieldKind::Percentage, "100.00"),
            (seconds, "12.14"),
        ] {
            assert_eq!(check_field(&capture(kind, text), &ExpectedToken::NonZero), Ok(()));
        }
    }

    #[test]
    fn wildcard_rejects_text_outside_the_kind_grammar() {
        for (kind, text) in [
            (FieldKind::Count, "1.5"),
            (FieldKind::Float, ""),
            (FieldKind::Float, "abc"),
            (FieldKind::Float, "1e3"),
            (FieldKind::Float, "-1"),
        ] {
            assert_eq!(
                check_field(&capture(kind, text), &ExpectedToken::NonZero),
                Err(MismatchReason::NotNumeric),
                "'{}' should not count as a numeral",
                text
            );
        }
    }

    #[test]
    fn literals_compare_raw_text() {
        let zero = capture(FieldKind::Float, "0");
        assert_eq!(check_field(&zero, &ExpectedToken::literal("0")), Ok(()));
        assert_eq!(
            check_field(&zero, &ExpectedToken::literal("0.0")),
            Err(MismatchReason::LiteralDiffers)
        );
        assert_eq!(
            check_field(&capture(FieldKind::Float, "0.0"), &ExpectedToken::literal("0")),
            Err(MismatchReason::LiteralDiffers)
        );
    }

    #[test]
    fn length_mismatch_is_reported_without_partial_comparison() {
        let captures = vec![capture(FieldKind::Count, "1"), capture(FieldKind::Count, "2")];
        let expected = vec![ExpectedToken::literal("9")];

        let result = verify(&captures, &expected);
        assert!(!result.passed);
        assert_eq!(result.compared_fields, 0);
        assert_eq!(
            result.failure,
            Some(VerificationFailure::LengthMismatch {
                captured: 2,
                expected: 1,
            })
        );
        assert_eq!(result.failing_index(), None);
    }

    #[test]
    fn first_failing_index_is_reported() {
        let captures = vec![
            capture(FieldKind::Count, "1"),
            capture(FieldKind::Count, "0"),
            capture(FieldKind::Count, "5"),
        ];
        let expected = vec![
            ExpectedToken::literal("1"),
            ExpectedToken::NonZero,
            ExpectedToken::literal("6"),
        ];

        let result = verify(&captures, &expected);
        assert!(!result.passed);
        assert_eq!(result.failing_index(), Some(1));
        assert_eq!(result.compared_fields, 2);
        assert_eq!(
            result.reason().as_deref(),
            Some("field 1 ('FIELD') expected <non-zero> but found '0' (value is zero)")
        );
    }

    #[test]
    fn matching_captures_pass() {
        let captures = vec![capture(FieldKind::Count, "3"), capture(FieldKind::Float, "0.5")];
        let expected = vec![ExpectedToken::literal("3"), ExpectedToken::NonZero];

        let result = verify(&captures, &expected);
        assert!(result.passed);
        assert_eq!(result.compared_fields, 2);
        assert_eq!(result.into_result(), Ok(2));
    }

    #[test]
    fn empty_sequences_pass_trivially() {
        assert!(verify(&[], &[]).passed);
    }

    #[test]
    fn failures_map_to_verification_category() {
        let error: StatsError = VerificationFailure::LengthMismatch {
            captured: 23,
            expected: 22,
        }
        .into();
        assert_eq!(error.category(), StatsErrorCategory::VerificationFailure);
        assert_eq!(error.placeholder(), "VERIFY.LENGTH_MISMATCH");
        assert_eq!(error.exit_code(), 1);
    }
}
