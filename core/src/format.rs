//! French display formatting for dates and prices.
//!
//! Dates are rendered in UTC so pages look the same whatever zone the
//! server runs in.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc};

const MONTHS_SHORT: [&str; 12] = [
    "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.", "nov.",
    "déc.",
];

const MONTHS_LONG: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

/// Parse the date shapes the backend emits: RFC 3339 timestamps, naive
/// timestamps (taken as UTC) and bare `YYYY-MM-DD` dates.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn is_valid_date(s: Option<&str>) -> bool {
    s.and_then(parse_date).is_some()
}

fn short_date(dt: &DateTime<Utc>) -> String {
    format!("{} {} {}", dt.day(), MONTHS_SHORT[dt.month0() as usize], dt.year())
}

/// Table date, e.g. `5 mars 2025`.
pub fn format_date(s: Option<&str>) -> String {
    match s {
        None => "Non définie".to_string(),
        Some(raw) if raw.trim().is_empty() => "Non définie".to_string(),
        Some(raw) => match parse_date(raw) {
            Some(dt) => short_date(&dt),
            None => "Date invalide".to_string(),
        },
    }
}

/// Detailed date with time, e.g. `5 mars 2025 à 14:30`.
pub fn format_date_time(s: Option<&str>) -> String {
    match s.filter(|raw| !raw.trim().is_empty()) {
        None => "Non définie".to_string(),
        Some(raw) => match parse_date(raw) {
            Some(dt) => format!("{} à {:02}:{:02}", short_date(&dt), dt.hour(), dt.minute()),
            None => "Date invalide".to_string(),
        },
    }
}

/// Value for an `<input type="date">`, or empty.
pub fn format_date_for_input(s: Option<&str>) -> String {
    s.and_then(parse_date)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Promotion banner date, e.g. `5 mars 2025`.
pub fn format_long_date(dt: &DateTime<Utc>) -> String {
    format!("{} {} {}", dt.day(), MONTHS_LONG[dt.month0() as usize], dt.year())
}

/// `fr-FR` currency format: `1 234,50 €` with narrow no-break space
/// grouping and a no-break space before the symbol.
pub fn format_price_eur(price: f64) -> String {
    let cents = (price * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();
    let units = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, ch) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('\u{202f}');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped},{:02}\u{a0}€", cents % 100)
}

/// Menu card price, e.g. `12.50 €`.
pub fn format_price_plain(price: f64) -> String {
    format!("{price:.2} €")
}
