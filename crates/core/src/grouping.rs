//! Derived views that bucket a page of items for display.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};

use crate::types::{DocumentSection, DropIn};

/// Long calendar-day label, e.g. `Tuesday, January 2, 2024`.
pub const DAY_LABEL_FORMAT: &str = "%A, %B %-d, %Y";

/// Anything placed on the calendar by a start instant.
pub trait Scheduled {
    fn start(&self) -> DateTime<Utc>;
}

impl Scheduled for DropIn {
    fn start(&self) -> DateTime<Utc> {
        self.start
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayBucket<'a, T> {
    pub label: String,
    pub items: Vec<&'a T>,
}

pub fn day_label<Tz>(instant: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    instant.with_timezone(tz).format(DAY_LABEL_FORMAT).to_string()
}

/// Groups items by the UTC calendar day they start on.
pub fn group_by_day<T: Scheduled>(items: &[T]) -> Vec<DayBucket<'_, T>> {
    group_by_day_in(items, &Utc)
}

/// Groups items by calendar day in `tz`.
///
/// Buckets come out in first-seen order and items keep their input order.
/// Nothing is sorted: an unordered page yields unordered buckets.
pub fn group_by_day_in<'a, T, Tz>(items: &'a [T], tz: &Tz) -> Vec<DayBucket<'a, T>>
where
    T: Scheduled,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut buckets: Vec<DayBucket<'a, T>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items {
        let label = day_label(item.start(), tz);
        match index.get(&label) {
            Some(&slot) => buckets[slot].items.push(item),
            None => {
                index.insert(label.clone(), buckets.len());
                buckets.push(DayBucket {
                    label,
                    items: vec![item],
                });
            }
        }
    }

    buckets
}

/// Groups search hits by the document they belong to, ordered by document id.
pub fn group_sections_by_document(
    sections: &[DocumentSection],
) -> BTreeMap<i64, Vec<&DocumentSection>> {
    let mut groups: BTreeMap<i64, Vec<&DocumentSection>> = BTreeMap::new();
    for section in sections {
        groups.entry(section.document_id).or_default().push(section);
    }
    groups
}
