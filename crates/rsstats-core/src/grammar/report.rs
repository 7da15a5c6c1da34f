use crate::domain::{CaptureValue, FieldKind, field_name};
use serde::Serialize;

/// Captures of one report, addressable by field name.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReport {
    captures: Vec<CaptureValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub index: usize,
    pub field: String,
    pub kind: FieldKind,
    pub raw: String,
    pub rendered: String,
    pub value: Option<f64>,
}

impl ParsedReport {
    pub fn new(captures: Vec<CaptureValue>) -> Self {
        Self { captures }
    }

    pub fn captures(&self) -> &[CaptureValue] {
        &self.captures
    }

    pub fn into_captures(self) -> Vec<CaptureValue> {
        self.captures
    }

    pub fn len(&self) -> usize {
        self.captures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }

    /// Looks a field up by its label, with or without the dot padding.
    pub fn get(&self, name: &str) -> Option<&CaptureValue> {
        let wanted = field_name(name);
        self.captures.iter().find(|capture| capture.name() == wanted)
    }

    /// Renders the captures back into report text, one line per field.
    pub fn to_text(&self) -> String {
        self.captures
            .iter()
            .map(|capture| format!("{} : {}\n", capture.label, capture.rendered()))
            .collect()
    }

    pub fn rows(&self) -> Vec<ReportRow> {
        self.captures
            .iter()
            .enumerate()
            .map(|(index, capture)| ReportRow {
                index,
                field: capture.name().to_string(),
                kind: capture.kind,
                raw: capture.text.clone(),
                rendered: capture.rendered(),
                value: capture.scaled_value(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::ParsedReport;
    use crate::domain::{CaptureValue, FieldKind, MagnitudePrefix, MagnitudeUnit};

    fn sample() -> ParsedReport {
        ParsedReport::new(vec![
            CaptureValue::new("TOTAL LPS .................", FieldKind::Count, "16"),
            CaptureValue::new(
                "PEAK MEMORY USAGE..........",
                FieldKind::Magnitude(MagnitudeUnit::Bytes),
                "1.5",
            )
            .with_prefix(Some(MagnitudePrefix::Kilo), true),
        ])
    }

    #[test]
    fn lookup_ignores_dot_padding() {
        let report = sample();
        assert_eq!(report.get("TOTAL LPS").map(|capture| capture.text.as_str()), Some("16"));
        assert_eq!(
            report
                .get("PEAK MEMORY USAGE..........")
                .map(|capture| capture.text.as_str()),
            Some("1.5")
        );
        assert!(report.get("TOTAL KERNELS").is_none());
    }

    #[test]
    fn rows_carry_scaled_magnitudes() {
        let rows = sample().rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].field, "PEAK MEMORY USAGE");
        assert_eq!(rows[1].raw, "1.5");
        assert_eq!(rows[1].rendered, "1.5KiB");
        assert_eq!(rows[1].value, Some(1536.0));
        assert_eq!(rows[0].value, Some(16.0));
    }

    #[test]
    fn renders_back_to_report_lines() {
        assert_eq!(
            sample().to_text(),
            "TOTAL LPS ................. : 16\nPEAK MEMORY USAGE.......... : 1.5KiB\n"
        );
    }
}
