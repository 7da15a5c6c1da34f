use crate::domain::{FieldKind, FieldSpec, MagnitudeUnit};

pub const REFERENCE_FIELD_COUNT: usize = 23;

const SECONDS: FieldKind = FieldKind::Magnitude(MagnitudeUnit::Seconds);
const BYTES: FieldKind = FieldKind::Magnitude(MagnitudeUnit::Bytes);

/// Line labels of the statistics report, top to bottom, padding included.
pub(super) const REFERENCE_LAYOUT: [(&str, FieldKind); REFERENCE_FIELD_COUNT] = [
    ("TOTAL SIMULATION TIME .....", SECONDS),
    ("TOTAL PROCESSING TIME .....", SECONDS),
    ("TOTAL KERNELS .............", FieldKind::Count),
    ("TOTAL THREADS .............", FieldKind::Count),
    ("TOTAL LPS .................", FieldKind::Count),
    ("TOTAL EXECUTED EVENTS .....", FieldKind::Count),
    ("TOTAL COMMITTED EVENTS.....", FieldKind::Count),
    ("TOTAL REPROCESSED EVENTS...", FieldKind::Count),
    ("TOTAL SILENT EVENTS........", FieldKind::Count),
    ("TOTAL ROLLBACKS EXECUTED...", FieldKind::Count),
    ("TOTAL ANTIMESSAGES.........", FieldKind::Count),
    ("ROLLBACK FREQUENCY.........", FieldKind::Percentage),
    ("ROLLBACK LENGTH............", FieldKind::Float),
    ("EFFICIENCY.................", FieldKind::Percentage),
    ("AVERAGE EVENT COST.........", SECONDS),
    ("AVERAGE CHECKPOINT COST....", SECONDS),
    ("AVERAGE RECOVERY COST......", SECONDS),
    ("AVERAGE CHECKPOINT SIZE....", BYTES),
    ("LAST COMMITTED GVT ........", FieldKind::Float),
    ("NUMBER OF GVT REDUCTIONS...", FieldKind::Count),
    ("SIMULATION TIME SPEED......", FieldKind::Float),
    ("AVERAGE MEMORY USAGE.......", BYTES),
    ("PEAK MEMORY USAGE..........", BYTES),
];

pub fn reference_fields() -> Vec<FieldSpec> {
    REFERENCE_LAYOUT
        .iter()
        .map(|(label, kind)| FieldSpec::new(*label, *kind))
        .collect()
}
