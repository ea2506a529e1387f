//! Tests for day and document grouping

#[cfg(test)]
mod tests {
    use super::super::grouping::*;
    use super::super::types::DocumentSection;
    use chrono::{DateTime, FixedOffset, TimeZone, Utc};

    #[derive(Debug, PartialEq)]
    struct Slot {
        id: u32,
        start: DateTime<Utc>,
    }

    impl Scheduled for Slot {
        fn start(&self) -> DateTime<Utc> {
            self.start
        }
    }

    fn slot(id: u32, day: u32, hour: u32) -> Slot {
        Slot {
            id,
            start: Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap(),
        }
    }

    fn ids<T>(bucket: &DayBucket<'_, T>, id: impl Fn(&T) -> u32) -> Vec<u32> {
        bucket.items.iter().map(|item| id(*item)).collect()
    }

    // ============================================================
    // Day grouping
    // ============================================================

    #[test]
    fn test_group_week_scenario() {
        let items = vec![slot(1, 2, 9), slot(2, 2, 14), slot(3, 5, 10)];
        let groups = group_by_day(&items);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "Tuesday, January 2, 2024");
        assert_eq!(ids(&groups[0], |s| s.id), vec![1, 2]);
        assert_eq!(groups[1].label, "Friday, January 5, 2024");
        assert_eq!(ids(&groups[1], |s| s.id), vec![3]);
    }

    #[test]
    fn test_group_empty_input() {
        let items: Vec<Slot> = Vec::new();
        assert!(group_by_day(&items).is_empty());
    }

    #[test]
    fn test_group_keeps_first_seen_bucket_order() {
        let items = vec![slot(1, 5, 9), slot(2, 2, 9), slot(3, 5, 8)];
        let groups = group_by_day(&items);

        let labels: Vec<_> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, ["Friday, January 5, 2024", "Tuesday, January 2, 2024"]);
        assert_eq!(ids(&groups[0], |s| s.id), vec![1, 3]);
    }

    #[test]
    fn test_group_is_stable_across_calls() {
        let items = vec![slot(4, 3, 9), slot(1, 2, 9), slot(2, 3, 7), slot(3, 2, 1)];
        assert_eq!(group_by_day(&items), group_by_day(&items));
    }

    #[test]
    fn test_group_covers_every_item_once() {
        let items: Vec<Slot> = (0..20).map(|i| slot(i, 1 + i % 6, i % 24)).collect();
        let groups = group_by_day(&items);

        let total: usize = groups.iter().map(|g| g.items.len()).sum();
        assert_eq!(total, items.len());

        let mut seen: Vec<u32> = groups.iter().flat_map(|g| ids(g, |s| s.id)).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_group_in_timezone_moves_late_events() {
        // 02:00 UTC on the 3rd is still the evening of the 2nd five hours west.
        let items = vec![slot(1, 2, 20), slot(2, 3, 2)];
        let eastern = FixedOffset::west_opt(5 * 3600).unwrap();

        assert_eq!(group_by_day(&items).len(), 2);
        let groups = group_by_day_in(&items, &eastern);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label, "Tuesday, January 2, 2024");
    }

    #[test]
    fn test_day_label_single_digit_day() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        assert_eq!(day_label(instant, &Utc), "Saturday, March 9, 2024");
    }

    // ============================================================
    // Document grouping
    // ============================================================

    fn section(id: i64, document_id: i64) -> DocumentSection {
        DocumentSection {
            id,
            title: format!("Section {id}"),
            content: String::new(),
            document_id,
        }
    }

    #[test]
    fn test_sections_grouped_by_document() {
        let sections = vec![section(1, 9), section(2, 4), section(3, 9)];
        let groups = group_sections_by_document(&sections);

        let keys: Vec<_> = groups.keys().copied().collect();
        assert_eq!(keys, vec![4, 9]);
        let nine: Vec<_> = groups[&9].iter().map(|s| s.id).collect();
        assert_eq!(nine, vec![1, 3]);
    }
}
