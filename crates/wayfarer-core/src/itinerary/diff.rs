//! Per-slot comparison of an existing day against a proposed one.
//!
//! Rows come out sorted by time; that order is the canonical display and
//! merge order for everything downstream.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::activity::{Activity, ActivityList};
use super::slot::slot_key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffStatus {
    Added,
    Removed,
    Modified,
    Unchanged,
}

impl DiffStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Modified => "modified",
            Self::Unchanged => "unchanged",
        }
    }
}

/// Comparison result for one time slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffRow {
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<Activity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposed: Option<Activity>,
    pub status: DiffStatus,
}

/// Whether two activities in the same slot count as unchanged.
///
/// Deliberately narrow: only title and description are compared, so a
/// change to cost, category or duration alone is reported as unchanged.
pub fn same_content(a: &Activity, b: &Activity) -> bool {
    a.title == b.title && a.description == b.description
}

/// Compare two activity lists slot by slot.
///
/// If one list holds several activities at the same time the last one
/// wins for that slot.
pub fn diff(original: &ActivityList, proposed: &ActivityList) -> Vec<DiffRow> {
    let mut slots: BTreeMap<&str, (Option<&Activity>, Option<&Activity>)> = BTreeMap::new();

    for activity in original {
        slots.entry(slot_key(activity)).or_default().0 = Some(activity);
    }
    for activity in proposed {
        slots.entry(slot_key(activity)).or_default().1 = Some(activity);
    }

    slots
        .into_iter()
        .filter_map(|(time, pair)| {
            let status = match pair {
                (Some(_), None) => DiffStatus::Removed,
                (None, Some(_)) => DiffStatus::Added,
                (Some(o), Some(p)) if same_content(o, p) => DiffStatus::Unchanged,
                (Some(_), Some(_)) => DiffStatus::Modified,
                (None, None) => return None,
            };
            Some(DiffRow {
                time: time.to_string(),
                original: pair.0.cloned(),
                proposed: pair.1.cloned(),
                status,
            })
        })
        .collect()
}

/// Row counts per status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiffSummary {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub unchanged: usize,
}

impl DiffSummary {
    pub fn of(rows: &[DiffRow]) -> Self {
        let mut summary = Self::default();
        for row in rows {
            match row.status {
                DiffStatus::Added => summary.added += 1,
                DiffStatus::Removed => summary.removed += 1,
                DiffStatus::Modified => summary.modified += 1,
                DiffStatus::Unchanged => summary.unchanged += 1,
            }
        }
        summary
    }

    pub fn has_changes(&self) -> bool {
        self.added + self.removed + self.modified > 0
    }

    pub fn message(&self) -> String {
        if !self.has_changes() {
            return "No proposed changes.".to_string();
        }
        format!(
            "{} added, {} removed, {} modified, {} unchanged",
            self.added, self.removed, self.modified, self.unchanged
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn act(time: &str, title: &str) -> Activity {
        Activity::new(time, title).with_description(format!("{title} description"))
    }

    #[test]
    fn added_slot_next_to_unchanged_one() {
        let original = ActivityList::new(vec![act("09:00", "Museum")]);
        let proposed = ActivityList::new(vec![act("09:00", "Museum"), act("14:00", "Beach")]);

        let rows = diff(&original, &proposed);
        assert_eq!(rows.len(), 2);
        assert_eq!((rows[0].time.as_str(), rows[0].status), ("09:00", DiffStatus::Unchanged));
        assert_eq!((rows[1].time.as_str(), rows[1].status), ("14:00", DiffStatus::Added));
        assert!(rows[1].original.is_none());
    }

    #[test]
    fn removed_and_modified_slots() {
        let original = ActivityList::new(vec![act("10:00", "Hiking"), act("18:00", "Dinner")]);
        let proposed = ActivityList::new(vec![act("10:00", "Aquarium")]);

        let rows = diff(&original, &proposed);
        assert_eq!(rows[0].status, DiffStatus::Modified);
        assert_eq!(rows[0].proposed.as_ref().unwrap().title, "Aquarium");
        assert_eq!(rows[1].status, DiffStatus::Removed);
        assert!(rows[1].proposed.is_none());
    }

    #[test]
    fn description_change_alone_is_modified() {
        let original = ActivityList::new(vec![act("12:00", "Lunch")]);
        let proposed =
            ActivityList::new(vec![Activity::new("12:00", "Lunch").with_description("Street food")]);
        assert_eq!(diff(&original, &proposed)[0].status, DiffStatus::Modified);
    }

    // Known-narrow equality: cost, category, duration and indoor flag are not
    // compared, so edits to them alone do not surface as modified.
    #[test]
    fn cost_or_category_change_alone_stays_unchanged() {
        let original = ActivityList::new(vec![act("12:00", "Lunch").with_cost(20.0).with_category("food")]);
        let proposed = ActivityList::new(vec![act("12:00", "Lunch")
            .with_cost(55.0)
            .with_category("fine-dining")
            .with_duration(120)
            .indoor(true)]);
        assert_eq!(diff(&original, &proposed)[0].status, DiffStatus::Unchanged);
    }

    #[test]
    fn last_activity_wins_on_duplicate_time() {
        let original = ActivityList::new(vec![act("09:00", "First"), act("09:00", "Second")]);
        let rows = diff(&original, &ActivityList::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].original.as_ref().unwrap().title, "Second");
    }

    #[test]
    fn rows_sorted_even_when_inputs_are_not() {
        let original = ActivityList::new(vec![act("15:00", "C"), act("08:30", "A")]);
        let proposed = ActivityList::new(vec![act("11:00", "B")]);
        let times: Vec<_> = diff(&original, &proposed).into_iter().map(|r| r.time).collect();
        assert_eq!(times, ["08:30", "11:00", "15:00"]);
    }

    #[test]
    fn summary_counts_statuses() {
        let original = ActivityList::new(vec![act("09:00", "A"), act("10:00", "B"), act("11:00", "C")]);
        let proposed = ActivityList::new(vec![act("09:00", "A"), act("10:00", "B2"), act("12:00", "D")]);
        let summary = DiffSummary::of(&diff(&original, &proposed));
        assert_eq!(
            summary,
            DiffSummary {
                added: 1,
                removed: 1,
                modified: 1,
                unchanged: 1
            }
        );
        assert!(summary.has_changes());
        assert_eq!(DiffSummary::default().message(), "No proposed changes.");
    }

    fn arb_list() -> impl Strategy<Value = ActivityList> {
        prop::collection::vec((0u8..24, prop::sample::select(vec![0u8, 15, 30, 45]), 0u8..3), 0..12)
            .prop_map(|slots| {
                slots
                    .into_iter()
                    .map(|(h, m, t)| act(&format!("{h:02}:{m:02}"), &format!("T{t}")))
                    .collect()
            })
    }

    proptest! {
        #[test]
        fn every_time_appears_in_exactly_one_sorted_row(original in arb_list(), proposed in arb_list()) {
            let rows = diff(&original, &proposed);

            let expected: BTreeSet<&str> = original.iter().chain(proposed.iter()).map(slot_key).collect();
            let times: Vec<&str> = rows.iter().map(|r| r.time.as_str()).collect();
            prop_assert_eq!(times.len(), expected.len());
            prop_assert!(times.windows(2).all(|w| w[0] < w[1]));
            prop_assert_eq!(times.into_iter().collect::<BTreeSet<_>>(), expected);
        }

        #[test]
        fn status_matches_presence(original in arb_list(), proposed in arb_list()) {
            for row in diff(&original, &proposed) {
                match row.status {
                    DiffStatus::Added => prop_assert!(row.original.is_none() && row.proposed.is_some()),
                    DiffStatus::Removed => prop_assert!(row.original.is_some() && row.proposed.is_none()),
                    DiffStatus::Modified | DiffStatus::Unchanged => {
                        prop_assert!(row.original.is_some() && row.proposed.is_some())
                    }
                }
            }
        }
    }
}
