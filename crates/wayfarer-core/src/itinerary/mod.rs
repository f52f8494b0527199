//! Day-plan data model and the timeline diff/merge engine.
//!
//! - [`Activity`] / [`ActivityList`]: time-slotted activities of one day
//! - [`diff`]: per-slot comparison of two lists
//! - [`reconcile`]: user-driven three-way merge of a comparison

pub mod activity;
pub mod diff;
pub mod plan;
pub mod reconcile;
pub mod slot;

pub use activity::{Activity, ActivityList, Location};
pub use diff::{diff, DiffRow, DiffStatus, DiffSummary};
pub use plan::{DayPlan, NeighborSummaries, Trip, TripPreferences};
pub use reconcile::{Decision, DecisionMap, ReconciliationSession};
pub use slot::{is_valid_time_slot, slot_key};
