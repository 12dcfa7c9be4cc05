//! Footer data from the business-info records.

use crate::types::BusinessInfo;

const HOURS_ON_REQUEST: &str = "Horaires disponibles sur demande";

/// The footer shows the first record.
pub fn primary(records: &[BusinessInfo]) -> Option<&BusinessInfo> {
    records.first()
}

/// Opening hours are stored either as free text or as a JSON object of
/// day -> hours, e.g. `{"lundi":"18h-22h"}` -> `Lundi: 18h-22h`.
pub fn format_opening_hours(hours: Option<&str>) -> String {
    let Some(raw) = hours.filter(|h| !h.trim().is_empty()) else {
        return HOURS_ON_REQUEST.to_string();
    };
    match serde_json::from_str::<serde_json::Value>(raw) {
        Err(_) => raw.to_string(),
        Ok(serde_json::Value::String(text)) => text,
        Ok(serde_json::Value::Object(days)) => days
            .iter()
            .map(|(day, time)| {
                let time = match time {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                format!("{}: {time}", capitalize(day))
            })
            .collect::<Vec<_>>()
            .join(", "),
        Ok(_) => HOURS_ON_REQUEST.to_string(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `tel:` link target: the number without spaces or dots.
pub fn phone_href(phone: &str) -> String {
    let digits: String = phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    format!("tel:{digits}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_object_keeps_day_order() {
        let hours = r#"{"mardi":"18h-22h","lundi":"fermé","dimanche":"18h-23h"}"#;
        assert_eq!(
            format_opening_hours(Some(hours)),
            "Mardi: 18h-22h, Lundi: fermé, Dimanche: 18h-23h"
        );
    }

    #[test]
    fn free_text_hours_are_verbatim() {
        assert_eq!(
            format_opening_hours(Some("Tous les soirs 18h-22h")),
            "Tous les soirs 18h-22h"
        );
        assert_eq!(format_opening_hours(Some("\"7j/7\"")), "7j/7");
    }

    #[test]
    fn missing_or_odd_hours_fall_back() {
        assert_eq!(format_opening_hours(None), HOURS_ON_REQUEST);
        assert_eq!(format_opening_hours(Some("")), HOURS_ON_REQUEST);
        assert_eq!(format_opening_hours(Some("42")), HOURS_ON_REQUEST);
    }

    #[test]
    fn phone_links_strip_formatting() {
        assert_eq!(phone_href("+33 5 56 00.00.00"), "tel:+33556000000");
    }

    #[test]
    fn capitalize_handles_accents() {
        assert_eq!(capitalize("été"), "Été");
        assert_eq!(capitalize(""), "");
    }
}
