//! Grouping the working set into renderable per-day buckets, and flattening those
//! buckets back into the sequence that drives next/previous navigation

use std::collections::BTreeMap;

use chrono::{FixedOffset, NaiveDate};

use crate::event::{Event, EventId};
use crate::filters::local_day;

/// One day's worth of events, ordered by occurrence time
#[derive(Clone, Debug, PartialEq)]
pub struct DayGroup {
    day: NaiveDate,
    events: Vec<Event>,
}

impl DayGroup {
    pub fn day(&self) -> NaiveDate {
        self.day
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

/// Group events into per-day buckets, cutting days in the viewer's time zone.
///
/// The output is deterministic for any permutation of the input (the upstream cache
/// has no iteration order to lean on): days ascend, and events within a day ascend by
/// occurrence time with ties broken by id. A day only appears when it has at least
/// one event.
pub fn group_by_day(events: Vec<Event>, timezone: FixedOffset) -> Vec<DayGroup> {
    let mut buckets: BTreeMap<NaiveDate, Vec<Event>> = BTreeMap::new();
    for event in events {
        let day = local_day(event.occurs_at(), timezone);
        buckets.entry(day).or_insert_with(Vec::new).push(event);
    }

    buckets.into_iter()
        .map(|(day, mut events)| {
            events.sort_by(|left, right| left.sort_key().cmp(&right.sort_key()));
            DayGroup { day, events }
        })
        .collect()
}

/// Concatenate groups into one flat, chronologically sorted sequence.
///
/// This is the sequence a detail overlay walks with its next/previous buttons; its
/// order is the same total order the groups are built on.
pub fn flatten(groups: &[DayGroup]) -> Vec<Event> {
    groups.iter()
        .flat_map(|group| group.events.iter().cloned())
        .collect()
}

/// Locate a previously clicked event in the flattened sequence, to initialize a
/// navigation cursor.
///
/// Returns `None` when the event has been evicted between the click and the lookup;
/// callers must treat that as "nothing to navigate", not as position zero.
pub fn position_of(flattened: &[Event], id: &EventId) -> Option<usize> {
    flattened.iter().position(|event| event.id() == id)
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn event(id: &str, seconds: i64) -> Event {
        Event::new(id, format!("Event {}", id), Utc.timestamp_opt(seconds, 0).unwrap())
    }

    const DAY: i64 = 86_400;

    #[test]
    fn test_grouping_is_deterministic_for_any_input_order() {
        let a = event("a", 2 * DAY + 600);
        let b = event("b", 2 * DAY + 60);
        let c = event("c", 5 * DAY);

        let reference = group_by_day(vec![a.clone(), b.clone(), c.clone()], utc());

        let permutations = vec![
            vec![a.clone(), c.clone(), b.clone()],
            vec![b.clone(), a.clone(), c.clone()],
            vec![b.clone(), c.clone(), a.clone()],
            vec![c.clone(), a.clone(), b.clone()],
            vec![c.clone(), b.clone(), a.clone()],
        ];
        for permutation in permutations {
            assert_eq!(group_by_day(permutation, utc()), reference);
        }

        assert_eq!(reference.len(), 2);
        assert_eq!(reference[0].events().len(), 2);
        assert_eq!(reference[0].events()[0].id().as_str(), "b");
        assert_eq!(reference[1].events().len(), 1);
    }

    #[test]
    fn test_ties_are_broken_by_id() {
        let groups = group_by_day(vec![event("b", 600), event("a", 600)], utc());

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].events()[0].id().as_str(), "a");
        assert_eq!(groups[0].events()[1].id().as_str(), "b");
    }

    #[test]
    fn test_days_ascend_and_are_never_empty() {
        let groups = group_by_day(vec![event("late", 9 * DAY), event("early", 3 * DAY)], utc());

        assert_eq!(groups.len(), 2);
        assert!(groups[0].day() < groups[1].day());
        for group in &groups {
            assert!(group.events().is_empty() == false);
        }
    }

    #[test]
    fn test_flatten_concatenates_in_day_order() {
        let groups = group_by_day(
            vec![event("a", 2 * DAY + 600), event("b", 2 * DAY + 60), event("c", 5 * DAY)],
            utc(),
        );
        let flat = flatten(&groups);

        let ids: Vec<&str> = flat.iter().map(|event| event.id().as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_position_of_evicted_event() {
        let flat = flatten(&group_by_day(vec![event("a", 600)], utc()));

        assert_eq!(position_of(&flat, &"a".into()), Some(0));
        assert_eq!(position_of(&flat, &EventId::random()), None);
    }
}
