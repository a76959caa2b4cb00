//! Pure predicates that narrow the cached set before grouping

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::event::{Category, Event};

/// The calendar day an event falls on, in the viewer's time zone
pub fn local_day(occurs_at: DateTime<Utc>, timezone: FixedOffset) -> NaiveDate {
    occurs_at.with_timezone(&timezone).date_naive()
}

/// Whether an event is on `as_of` or later, by calendar day.
///
/// `as_of` must be snapshotted once per derivation, so that every comparison of that
/// cycle agrees even if wall-clock midnight passes mid-cycle. The bound is inclusive:
/// an event at local midnight of `as_of` still counts as upcoming.
pub fn is_upcoming(event: &Event, as_of: NaiveDate, timezone: FixedOffset) -> bool {
    local_day(event.occurs_at(), timezone) >= as_of
}

/// A user-selected category filter
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CategorySelection {
    /// Show every event
    All,
    /// Show only events filed under one category
    Only(Category),
}

impl CategorySelection {
    /// Parse a selection coming from the presentation layer.
    ///
    /// Unknown labels select `All`: a stray value wired through from the UI must
    /// never end up hiding every event.
    pub fn parse(label: &str) -> Self {
        if label == "all" {
            return CategorySelection::All;
        }
        match Category::from_label(label) {
            Some(category) => CategorySelection::Only(category),
            None => {
                log::warn!("Unknown category selection {:?}, showing everything instead", label);
                CategorySelection::All
            },
        }
    }

    pub fn matches(&self, event: &Event) -> bool {
        match self {
            CategorySelection::All => true,
            CategorySelection::Only(category) => event.category() == *category,
        }
    }
}

impl Default for CategorySelection {
    fn default() -> Self {
        CategorySelection::All
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_midnight_is_included() {
        let as_of = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let midnight = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let just_before = Utc.with_ymd_and_hms(2026, 2, 28, 23, 59, 59).unwrap();

        let at_midnight = Event::new("a", "A", midnight);
        let yesterday = Event::new("b", "B", just_before);

        assert!(is_upcoming(&at_midnight, as_of, utc()));
        assert_eq!(is_upcoming(&yesterday, as_of, utc()), false);
    }

    #[test]
    fn test_day_is_cut_in_the_viewers_time_zone() {
        // 05:00 UTC on March 1st is still February 28th on the US west coast
        let occurs_at = Utc.with_ymd_and_hms(2026, 3, 1, 5, 0, 0).unwrap();
        let pacific = FixedOffset::west_opt(8 * 3600).unwrap();

        assert_eq!(local_day(occurs_at, utc()), NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(local_day(occurs_at, pacific), NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
    }

    #[test]
    fn test_selection_parsing_fails_open() {
        assert_eq!(CategorySelection::parse("all"), CategorySelection::All);
        assert_eq!(CategorySelection::parse("sports"), CategorySelection::Only(Category::Sports));
        assert_eq!(CategorySelection::parse("nonexistent-category"), CategorySelection::All);
        assert_eq!(CategorySelection::parse(""), CategorySelection::All);
    }

    #[test]
    fn test_selection_matching() {
        let event = Event::new("a", "A", Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap())
            .with_category(Category::Arts);

        assert!(CategorySelection::All.matches(&event));
        assert!(CategorySelection::Only(Category::Arts).matches(&event));
        assert_eq!(CategorySelection::Only(Category::Sports).matches(&event), false);
        // An unknown selection behaves exactly like All
        assert!(CategorySelection::parse("nonexistent-category").matches(&event));
    }
}
