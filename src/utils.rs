///! Some utility functions

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::event::Event;
use crate::grouping::DayGroup;

/// A debug utility that pretty-prints a grouped view
pub fn print_day_groups(groups: &[DayGroup]) {
    for group in groups {
        println!("DAY {}", group.day().format("%A, %B %e"));
        for event in group.events() {
            print_event(event);
        }
    }
}

pub fn print_event(event: &Event) {
    let food = if event.has_free_food() { "f" } else { " " };
    let boba = if event.has_free_boba() { "b" } else { " " };
    println!("    {}{} {} {}\t{}", food, boba, event.occurs_at().format("%H:%M"), event.title(), event.id());
}

/// Compare keys of two hashmaps for equality
pub fn keys_are_the_same<T, U, V>(left: &HashMap<T, U>, right: &HashMap<T, V>) -> bool
where
    T: Hash + Eq + Clone + std::fmt::Display,
{
    if left.len() != right.len() {
        log::debug!("Count of keys mismatch: {} and {}", left.len(), right.len());
        return false;
    }

    let keys_l: HashSet<T> = left.keys().cloned().collect();
    let keys_r: HashSet<T> = right.keys().cloned().collect();
    let result = keys_l == keys_r;
    if result == false {
        log::debug!("Keys of a map mismatch");
        for key in keys_l {
            log::debug!("   left: {}", key);
        }
        log::debug!("RIGHT:");
        for key in keys_r {
            log::debug!("  right: {}", key);
        }
    }
    result
}
