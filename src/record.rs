//! A module to validate raw feed records
//!
//! The backing collection is schema-less, so everything it serves is treated as
//! untrusted: records are coerced into the canonical [`Event`] shape here, at the
//! fetch boundary, and nowhere else.

use std::fmt::{Display, Formatter};

use chrono::{TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::event::{Category, Event, Perks};

/// Why a raw record could not be turned into an [`Event`]
#[derive(Clone, Debug, PartialEq)]
pub enum RejectReason {
    /// The payload is not an object carrying the expected field types
    NotARecord,
    /// The record has no usable id
    MissingId,
    /// The record has no title
    MissingTitle,
    /// The record has no date field
    MissingDate,
    /// The date is not a finite, non-negative number of epoch seconds
    InvalidDate,
}

impl Display for RejectReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            RejectReason::NotARecord => write!(f, "the payload is not an event record"),
            RejectReason::MissingId => write!(f, "the record has no usable id"),
            RejectReason::MissingTitle => write!(f, "the record has no title"),
            RejectReason::MissingDate => write!(f, "the record has no date"),
            RejectReason::InvalidDate => write!(f, "the record's date is not a valid timestamp"),
        }
    }
}

impl std::error::Error for RejectReason {}


/// The shape the events endpoint actually serves (a spread of schema-less documents)
#[derive(Deserialize)]
struct RawRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    date: Option<RawDate>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: Option<String>,
    /// Older feed variants file the category under "field"
    #[serde(default)]
    field: Option<String>,
    #[serde(default)]
    freefood: Option<String>,
    #[serde(default)]
    freeboba: Option<String>,
    #[serde(default)]
    rsvp: Option<String>,
}

/// Timestamps usually come wrapped in a `{_seconds: N}` object; some feed variants
/// inline the bare number
#[derive(Deserialize)]
#[serde(untagged)]
enum RawDate {
    Wrapped { _seconds: f64 },
    Bare(f64),
}

impl RawDate {
    fn seconds(&self) -> f64 {
        match self {
            RawDate::Wrapped { _seconds } => *_seconds,
            RawDate::Bare(seconds) => *seconds,
        }
    }
}


/// Turn one raw fetched record into the canonical [`Event`] shape.
///
/// This never panics: anything unusable yields a [`RejectReason`], and the caller is
/// expected to skip that single record and keep processing the rest of the batch.
pub fn normalize(raw: &Value) -> Result<Event, RejectReason> {
    let record: RawRecord = match serde_json::from_value(raw.clone()) {
        Ok(record) => record,
        Err(_) => return Err(RejectReason::NotARecord),
    };

    let id = match record.id.filter(|id| id.is_empty() == false) {
        Some(id) => id,
        None => return Err(RejectReason::MissingId),
    };
    let title = match record.title.filter(|title| title.is_empty() == false) {
        Some(title) => title,
        None => return Err(RejectReason::MissingTitle),
    };
    let seconds = match record.date {
        Some(date) => date.seconds(),
        None => return Err(RejectReason::MissingDate),
    };
    if seconds.is_finite() == false || seconds < 0.0 {
        return Err(RejectReason::InvalidDate);
    }
    let occurs_at = match Utc.timestamp_opt(seconds as i64, 0).single() {
        Some(occurs_at) => occurs_at,
        None => return Err(RejectReason::InvalidDate),
    };

    let category = Category::from_raw(record.category.or(record.field).as_deref());
    let mut perks = Perks::empty();
    if is_yes(&record.freefood) {
        perks.insert(Perks::FREE_FOOD);
    }
    if is_yes(&record.freeboba) {
        perks.insert(Perks::FREE_BOBA);
    }

    let mut event = Event::new(id, title, occurs_at)
        .with_category(category)
        .with_perks(perks);
    if let Some(location) = record.location {
        event = event.with_location(location);
    }
    if let Some(description) = record.description {
        event = event.with_description(description);
    }
    if let Some(rsvp) = record.rsvp {
        match parse_rsvp(&rsvp) {
            Some(url) => event = event.with_rsvp(url),
            None => log::debug!("Ignoring non-actionable rsvp link {:?} on event {}", rsvp, event.id()),
        }
    }

    Ok(event)
}

/// The upstream encodes booleans as "yes"/"no" strings
fn is_yes(value: &Option<String>) -> bool {
    match value {
        Some(value) => value.eq_ignore_ascii_case("yes"),
        None => false,
    }
}

/// An rsvp link is actionable only when it is an absolute http(s) URL
fn parse_rsvp(raw: &str) -> Option<Url> {
    let url = Url::parse(raw).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url),
        _ => None,
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_complete_record() {
        let raw = json!({
            "id": "8fz2",
            "title": "Intro to Beekeeping",
            "date": { "_seconds": 1_700_000_000, "_nanoseconds": 0 },
            "location": "Old Union",
            "description": "Bring a veil.",
            "category": "wellness",
            "freefood": "yes",
            "freeboba": "no",
            "rsvp": "https://forms.example.edu/bees",
        });

        let event = normalize(&raw).unwrap();
        assert_eq!(event.id().as_str(), "8fz2");
        assert_eq!(event.title(), "Intro to Beekeeping");
        assert_eq!(event.occurs_at().timestamp(), 1_700_000_000);
        assert_eq!(event.location(), "Old Union");
        assert_eq!(event.category(), Category::Wellness);
        assert!(event.has_free_food());
        assert_eq!(event.has_free_boba(), false);
        assert_eq!(event.rsvp().unwrap().as_str(), "https://forms.example.edu/bees");
    }

    #[test]
    fn test_bare_number_date() {
        let raw = json!({ "id": "x", "title": "T", "date": 1_700_000_000 });
        let event = normalize(&raw).unwrap();
        assert_eq!(event.occurs_at().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_field_is_accepted_for_category() {
        let raw = json!({ "id": "x", "title": "T", "date": 100, "field": "sports" });
        assert_eq!(normalize(&raw).unwrap().category(), Category::Sports);

        // "category" wins when both are present
        let raw = json!({ "id": "x", "title": "T", "date": 100, "field": "sports", "category": "arts" });
        assert_eq!(normalize(&raw).unwrap().category(), Category::Arts);
    }

    #[test]
    fn test_unknown_category_is_filed_as_uncategorized() {
        let raw = json!({ "id": "x", "title": "T", "date": 100, "category": "quidditch" });
        assert_eq!(normalize(&raw).unwrap().category(), Category::Uncategorized);
    }

    #[test]
    fn test_rejections() {
        assert_eq!(normalize(&json!(42)).unwrap_err(), RejectReason::NotARecord);
        assert_eq!(normalize(&json!({ "id": 42, "title": "T", "date": 100 })).unwrap_err(), RejectReason::NotARecord);
        assert_eq!(normalize(&json!({ "title": "T", "date": 100 })).unwrap_err(), RejectReason::MissingId);
        assert_eq!(normalize(&json!({ "id": "", "title": "T", "date": 100 })).unwrap_err(), RejectReason::MissingId);
        assert_eq!(normalize(&json!({ "id": "x", "date": 100 })).unwrap_err(), RejectReason::MissingTitle);
        assert_eq!(normalize(&json!({ "id": "x", "title": "T" })).unwrap_err(), RejectReason::MissingDate);
        assert_eq!(normalize(&json!({ "id": "x", "title": "T", "date": -5 })).unwrap_err(), RejectReason::InvalidDate);
    }

    #[test]
    fn test_non_actionable_rsvp_is_dropped() {
        let raw = json!({ "id": "x", "title": "T", "date": 100, "rsvp": "tinyurl.com/abc" });
        assert_eq!(normalize(&raw).unwrap().rsvp(), None);

        let raw = json!({ "id": "x", "title": "T", "date": 100, "rsvp": "ftp://host/file" });
        assert_eq!(normalize(&raw).unwrap().rsvp(), None);

        let raw = json!({ "id": "x", "title": "T", "date": 100, "rsvp": "http://example.com/go" });
        assert!(normalize(&raw).unwrap().rsvp().is_some());
    }

    #[test]
    fn test_yes_no_flags() {
        let raw = json!({ "id": "x", "title": "T", "date": 100, "freefood": "Yes", "freeboba": "nope" });
        let event = normalize(&raw).unwrap();
        assert!(event.has_free_food());
        assert_eq!(event.has_free_boba(), false);
    }
}
