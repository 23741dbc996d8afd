use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};

/// Timestamp layouts seen in GIOŚ sheet exports, day-first where ambiguous
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Parse a concentration cell, accepting either `.` or `,` as decimal separator.
///
/// Empty, non-numeric and non-finite cells yield `None`; this never fails.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized = trimmed.replace(',', ".");
    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Parse an optional cell, treating `None` the same as an empty cell
pub fn parse_decimal_cell(cell: Option<&str>) -> Option<f64> {
    cell.and_then(parse_decimal)
}

/// Parse a measurement timestamp; unparseable cells yield `None`
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
}

/// Calendar day a reading belongs to.
///
/// The agency stamps the last hourly reading of a day as 00:00 of the
/// following day, so hour 0 is attributed to the previous date.
pub fn owning_day(timestamp: NaiveDateTime) -> NaiveDate {
    if timestamp.hour() == 0 {
        timestamp.date() - Duration::days(1)
    } else {
        timestamp.date()
    }
}
