use chrono::{Datelike, Months, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

static MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{2}/[0-9]{2}$").expect("valid month regex"));

/// `\r\n`, a lone `\r` or `\n`, and the other Unicode line boundaries.
static LINE_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\r\n|[\n\r\x0B\x0C\x1C\x1D\x1E\x{85}\x{2028}\x{2029}]")
        .expect("valid line break regex")
});

/// Returns true for labels shaped like `NN/NN` (e.g. `11/25`).
pub fn is_month_label(label: &str) -> bool {
    MONTH_RE.is_match(label)
}

/// Splits report text into lines whatever the exporting system used as line ending.
///
/// Old exports end lines with a bare `\r`, which `str::lines` does not split on.
pub fn report_lines(text: &str) -> impl Iterator<Item = &str> {
    LINE_BREAK_RE.split(text)
}

/// Parses a `MM/YY` month label into the first day of that month.
/// Returns `None` when the label is not month-shaped or the month is out of range.
pub fn parse_month_label(label: &str) -> Option<NaiveDate> {
    if !is_month_label(label) {
        return None;
    }

    let month: u32 = label[0..2].parse().ok()?;
    let year: i32 = label[3..5].parse().ok()?;

    NaiveDate::from_ymd_opt(2000 + year, month, 1)
}

pub fn format_month_label(date: NaiveDate) -> String {
    format!("{:02}/{:02}", date.month(), date.year() % 100)
}

/// Extracts `k` from an offset label `M-k`.
pub fn offset_label_months(label: &str) -> Option<u32> {
    label.strip_prefix("M-")?.parse().ok()
}

pub fn months_before(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_sub_months(Months::new(months))
}
