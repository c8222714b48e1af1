use chrono::{Datelike, NaiveDate};

/// Date layouts seen in chat messages and bank exports, tried in order.
/// ISO first so `2024-06-27` never parses as month 20.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y", "%m-%d-%Y", "%m-%d-%y"];

/// Parses a date in any of the accepted layouts.
///
/// `%Y` accepts fewer than four digits, so a two-digit year like `6/27/24`
/// would match the four-digit layout as year 24. Such matches are skipped so
/// the two-digit layout can claim the input and pivot it into this century.
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .filter_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .find(|date| date.year() >= 1000)
}
