//! Promotional events: activity, countdowns, the carousel and the header
//! ticker.

use chrono::{DateTime, Utc};

use crate::format::{format_long_date, parse_date};
use crate::types::{Announcement, Event};

/// Shown when the header announcements cannot be fetched.
pub const FALLBACK_ANNOUNCEMENTS: [&str; 4] = [
    "Offre spéciale : -20% sur toutes les commandes de plus de 30€ ce week-end",
    "Nouvelle pizza du mois : La Forestière avec sa crème de cèpes",
    "Fermeture exceptionnelle le 25 Décembre",
    "Livraison désormais disponible à Podensac",
];

pub const TICKER_SEPARATOR: &str = "   •   ";

const DEFAULT_DESCRIPTION: &str =
    "Une offre exceptionnelle vous attend ! Profitez de cette promotion exclusive.";

/// An event without an end date never expires. An unreadable end date
/// counts as expired.
pub fn is_active(event: &Event, now: DateTime<Utc>) -> bool {
    match event.end_date.as_deref() {
        None => true,
        Some(end) => parse_date(end).is_some_and(|end| end > now),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

/// Time left until `end`, or `None` once it has passed.
pub fn countdown(end: DateTime<Utc>, now: DateTime<Utc>) -> Option<Countdown> {
    let left = (end - now).num_seconds();
    if left <= 0 {
        return None;
    }
    Some(Countdown {
        days: left / 86_400,
        hours: (left % 86_400) / 3_600,
        minutes: (left % 3_600) / 60,
        seconds: left % 60,
    })
}

/// Index into a cyclic list of slides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carousel {
    len: usize,
    index: usize,
}

impl Carousel {
    pub fn new(len: usize) -> Self {
        Self { len, index: 0 }
    }

    /// Start at `index`, wrapped into range.
    pub fn at(len: usize, index: usize) -> Self {
        Self {
            len,
            index: if len == 0 { 0 } else { index % len },
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn next(&mut self) -> usize {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
        self.index
    }

    pub fn prev(&mut self) -> usize {
        if self.len > 0 {
            self.index = (self.index + self.len - 1) % self.len;
        }
        self.index
    }

    pub fn next_index(&self) -> usize {
        let mut copy = *self;
        copy.next()
    }

    pub fn prev_index(&self) -> usize {
        let mut copy = *self;
        copy.prev()
    }
}

/// Scrolling header text.
pub fn ticker_text(announcements: &[Announcement]) -> String {
    announcements
        .iter()
        .map(|a| a.description.as_str())
        .collect::<Vec<_>>()
        .join(TICKER_SEPARATOR)
}

pub fn fallback_announcements() -> Vec<Announcement> {
    FALLBACK_ANNOUNCEMENTS
        .iter()
        .map(|d| Announcement {
            description: d.to_string(),
        })
        .collect()
}

/// Display data of one promotion slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoSlide {
    pub id: String,
    pub title: String,
    pub label: String,
    pub description: String,
    pub image_url: String,
    pub starts: Option<String>,
    pub ends: Option<String>,
    pub status: String,
    pub active: bool,
    pub countdown: Option<Countdown>,
}

impl PromoSlide {
    pub fn from_event(event: &Event, now: DateTime<Utc>) -> Self {
        let end = event.end_date.as_deref().and_then(parse_date);
        let description = if event.description.trim().is_empty() {
            DEFAULT_DESCRIPTION.to_string()
        } else {
            event.description.clone()
        };
        Self {
            id: event.id.clone(),
            title: event.name.clone(),
            label: event
                .event_type
                .clone()
                .unwrap_or_else(|| "Promotion".to_string()),
            description,
            image_url: event
                .image_url
                .clone()
                .or_else(|| event.images.first().cloned())
                .unwrap_or_else(|| "/placeholder-event.jpg".to_string()),
            starts: event
                .start_date
                .as_deref()
                .and_then(parse_date)
                .map(|d| format_long_date(&d)),
            ends: end.map(|d| format_long_date(&d)),
            status: event.status.clone().unwrap_or_else(|| "Actif".to_string()),
            active: is_active(event, now),
            countdown: end.and_then(|end| countdown(end, now)),
        }
    }
}
