//! Three-way, per-slot reconciliation of a diff.
//!
//! A session starts from the default decision for each row, lets the user
//! overwrite decisions slot by slot, and is consumed exactly once to
//! produce the final activity list.
//!
//! ## Usage
//! ```rust,ignore
//! use wayfarer_core::itinerary::{Decision, ReconciliationSession};
//!
//! let mut session = ReconciliationSession::new(&current, &proposed);
//! session.set_decision("10:00", Decision::KeepOriginal)?;
//! let final_plan = session.finalize();
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::activity::ActivityList;
use super::diff::{diff, DiffRow, DiffStatus};
use crate::error::ValidationError;

/// What survives in one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Decision {
    KeepOriginal,
    AcceptProposed,
    Drop,
}

impl Decision {
    /// Default choice for a freshly computed row.
    pub fn default_for(status: DiffStatus) -> Self {
        match status {
            DiffStatus::Added | DiffStatus::Modified => Decision::AcceptProposed,
            DiffStatus::Removed => Decision::Drop,
            DiffStatus::Unchanged => Decision::KeepOriginal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeepOriginal => "keep",
            Self::AcceptProposed => "accept",
            Self::Drop => "drop",
        }
    }
}

/// Time slot → decision.
pub type DecisionMap = BTreeMap<String, Decision>;

/// Seed decisions from row statuses.
pub fn initialize(rows: &[DiffRow]) -> DecisionMap {
    rows.iter()
        .map(|row| (row.time.clone(), Decision::default_for(row.status)))
        .collect()
}

/// Materialize the merged list.
///
/// A row without a decision is dropped rather than guessed. The result is
/// re-sorted by time, so it never holds two activities for one slot as
/// long as `rows` has one row per slot (which [`diff`] guarantees).
pub fn finalize(rows: &[DiffRow], decisions: &DecisionMap) -> ActivityList {
    let mut merged: ActivityList = rows
        .iter()
        .filter_map(|row| {
            match decisions.get(&row.time).copied().unwrap_or(Decision::Drop) {
                Decision::KeepOriginal => row.original.clone(),
                Decision::AcceptProposed => row.proposed.clone(),
                Decision::Drop => None,
            }
        })
        .collect();
    merged.sort_by_time();
    merged
}

/// Decisions for one interactive review, owned by that review alone.
#[derive(Debug, Clone)]
pub struct ReconciliationSession {
    rows: Vec<DiffRow>,
    decisions: DecisionMap,
}

impl ReconciliationSession {
    /// Diff `original` against `proposed` and seed default decisions.
    pub fn new(original: &ActivityList, proposed: &ActivityList) -> Self {
        Self::from_rows(diff(original, proposed))
    }

    pub fn from_rows(rows: Vec<DiffRow>) -> Self {
        let decisions = initialize(&rows);
        Self { rows, decisions }
    }

    pub fn rows(&self) -> &[DiffRow] {
        &self.rows
    }

    pub fn decisions(&self) -> &DecisionMap {
        &self.decisions
    }

    pub fn decision(&self, time: &str) -> Option<Decision> {
        self.decisions.get(time).copied()
    }

    /// Overwrite the decision for one slot.
    ///
    /// # Errors
    /// Returns [`ValidationError::UnknownSlot`] if no row has that time.
    pub fn set_decision(&mut self, time: &str, decision: Decision) -> Result<(), ValidationError> {
        if !self.rows.iter().any(|row| row.time == time) {
            return Err(ValidationError::UnknownSlot(time.to_string()));
        }
        self.decisions.insert(time.to_string(), decision);
        Ok(())
    }

    /// Accept every proposed activity; slots the proposal removed are dropped.
    pub fn accept_all_proposed(&mut self) {
        for row in &self.rows {
            let decision = if row.proposed.is_some() {
                Decision::AcceptProposed
            } else {
                Decision::Drop
            };
            self.decisions.insert(row.time.clone(), decision);
        }
    }

    /// Keep the current plan as is; slots the proposal added are dropped.
    pub fn keep_all_original(&mut self) {
        for row in &self.rows {
            let decision = if row.original.is_some() {
                Decision::KeepOriginal
            } else {
                Decision::Drop
            };
            self.decisions.insert(row.time.clone(), decision);
        }
    }

    pub fn reset_defaults(&mut self) {
        self.decisions = initialize(&self.rows);
    }

    /// Slots whose outcome differs from the current plan.
    pub fn pending_changes(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|row| {
                let chosen = match self.decision(&row.time).unwrap_or(Decision::Drop) {
                    Decision::KeepOriginal => row.original.as_ref(),
                    Decision::AcceptProposed => row.proposed.as_ref(),
                    Decision::Drop => None,
                };
                match (chosen, row.original.as_ref()) {
                    (Some(c), Some(o)) => c != o,
                    (None, None) => false,
                    _ => true,
                }
            })
            .map(|row| row.time.as_str())
            .collect()
    }

    /// Consume the session and produce the final list.
    pub fn finalize(self) -> ActivityList {
        finalize(&self.rows, &self.decisions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::itinerary::Activity;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn act(time: &str, title: &str) -> Activity {
        Activity::new(time, title).with_description(format!("about {title}"))
    }

    fn sample() -> (ActivityList, ActivityList) {
        let original = ActivityList::new(vec![
            act("09:00", "Museum"),
            act("10:00", "Hiking"),
            act("18:00", "Night market"),
        ]);
        let proposed = ActivityList::new(vec![
            act("09:00", "Museum"),
            act("10:00", "Aquarium"),
            act("14:00", "Tea house"),
        ]);
        (original, proposed)
    }

    #[test]
    fn defaults_follow_status() {
        let (original, proposed) = sample();
        let session = ReconciliationSession::new(&original, &proposed);
        assert_eq!(session.decision("09:00"), Some(Decision::KeepOriginal));
        assert_eq!(session.decision("10:00"), Some(Decision::AcceptProposed));
        assert_eq!(session.decision("14:00"), Some(Decision::AcceptProposed));
        assert_eq!(session.decision("18:00"), Some(Decision::Drop));
    }

    #[test]
    fn default_finalize_applies_the_proposal() {
        let (original, proposed) = sample();
        let merged = ReconciliationSession::new(&original, &proposed).finalize();
        assert_eq!(merged, proposed);
    }

    #[test]
    fn mixed_decisions() {
        let (original, proposed) = sample();
        let mut session = ReconciliationSession::new(&original, &proposed);
        session.set_decision("10:00", Decision::KeepOriginal).unwrap();
        session.set_decision("14:00", Decision::Drop).unwrap();
        session.set_decision("18:00", Decision::KeepOriginal).unwrap();

        let titles: Vec<_> = session.finalize().into_iter().map(|a| a.title).collect();
        assert_eq!(titles, ["Museum", "Hiking", "Night market"]);
    }

    #[test]
    fn unknown_slot_is_rejected() {
        let (original, proposed) = sample();
        let mut session = ReconciliationSession::new(&original, &proposed);
        assert_eq!(
            session.set_decision("07:00", Decision::Drop),
            Err(ValidationError::UnknownSlot("07:00".into()))
        );
    }

    #[test]
    fn choice_without_a_side_emits_nothing() {
        let (original, proposed) = sample();
        let mut session = ReconciliationSession::new(&original, &proposed);
        // 14:00 exists only in the proposal
        session.set_decision("14:00", Decision::KeepOriginal).unwrap();
        let merged = session.finalize();
        assert!(merged.at("14:00").is_none());
    }

    #[test]
    fn missing_decision_drops_the_slot() {
        let (original, proposed) = sample();
        let rows = diff(&original, &proposed);
        let mut decisions = initialize(&rows);
        decisions.remove("09:00");

        let merged = finalize(&rows, &decisions);
        assert!(merged.at("09:00").is_none());
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn bulk_operations() {
        let (original, proposed) = sample();
        let mut session = ReconciliationSession::new(&original, &proposed);

        session.keep_all_original();
        assert!(session.pending_changes().is_empty());
        assert_eq!(session.clone().finalize(), original);

        session.accept_all_proposed();
        assert_eq!(session.pending_changes(), ["10:00", "14:00", "18:00"]);
        assert_eq!(session.clone().finalize(), proposed);

        session.reset_defaults();
        assert_eq!(session.decision("18:00"), Some(Decision::Drop));
    }

    fn arb_sorted_list() -> impl Strategy<Value = ActivityList> {
        prop::collection::btree_map(0u16..(24 * 4), 0u8..3, 0..10).prop_map(|slots| {
            slots
                .into_iter()
                .map(|(q, t)| act(&format!("{:02}:{:02}", q / 4, (q % 4) * 15), &format!("T{t}")))
                .collect()
        })
    }

    fn arb_decision() -> impl Strategy<Value = Option<Decision>> {
        prop::option::of(prop::sample::select(vec![
            Decision::KeepOriginal,
            Decision::AcceptProposed,
            Decision::Drop,
        ]))
    }

    proptest! {
        #[test]
        fn keep_all_reproduces_original(original in arb_sorted_list(), proposed in arb_sorted_list()) {
            let rows = diff(&original, &proposed);
            let decisions: DecisionMap = rows.iter().map(|r| (r.time.clone(), Decision::KeepOriginal)).collect();
            prop_assert_eq!(finalize(&rows, &decisions), original);
        }

        #[test]
        fn accept_all_reproduces_proposed(original in arb_sorted_list(), proposed in arb_sorted_list()) {
            let rows = diff(&original, &proposed);
            let decisions: DecisionMap = rows.iter().map(|r| (r.time.clone(), Decision::AcceptProposed)).collect();
            prop_assert_eq!(finalize(&rows, &decisions), proposed);
        }

        #[test]
        fn never_duplicates_or_fabricates(
            original in arb_sorted_list(),
            proposed in arb_sorted_list(),
            choices in prop::collection::vec(arb_decision(), 20),
        ) {
            let rows = diff(&original, &proposed);
            let decisions: DecisionMap = rows
                .iter()
                .zip(choices.iter().cycle())
                .filter_map(|(r, c)| c.map(|d| (r.time.clone(), d)))
                .collect();

            let merged = finalize(&rows, &decisions);
            let mut seen = HashSet::new();
            for activity in &merged {
                prop_assert!(seen.insert(activity.time.clone()), "duplicate slot {}", activity.time);
                prop_assert!(original.iter().chain(proposed.iter()).any(|a| a == activity));
            }
        }
    }
}
