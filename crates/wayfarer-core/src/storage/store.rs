use chrono::NaiveDate;

use crate::audit::AuditEvent;
use crate::error::Result;
use crate::itinerary::{ActivityList, DayPlan, NeighborSummaries, Trip, TripPreferences};

/// Persistence seen by the regeneration pipeline.
///
/// Reads return `Ok(None)` for absent rows; deciding whether that is an
/// error is up to the caller. Activity lists are always replaced whole.
pub trait ItineraryStore: Send + Sync {
    fn read_trip(&self, trip_id: &str) -> Result<Option<Trip>>;

    fn read_day_plan(&self, day_plan_id: &str) -> Result<Option<DayPlan>>;

    /// Preferences of a trip.
    ///
    /// # Errors
    /// `CoreError::ContextNotFound` if the trip does not exist.
    fn read_trip_preferences(&self, trip_id: &str) -> Result<TripPreferences>;

    /// Digests of the nearest earlier and later days of the same trip.
    ///
    /// # Errors
    /// `CoreError::ContextNotFound` if the day plan does not exist.
    fn read_neighbor_summaries(&self, day_plan_id: &str) -> Result<NeighborSummaries>;

    /// Create one day plan per entry, indexed from 0, in one transaction.
    ///
    /// # Errors
    /// `CoreError::ContextNotFound` if the trip does not exist; a validation
    /// error if it already has day plans.
    fn create_day_plans(&self, trip_id: &str, days: Vec<(NaiveDate, ActivityList)>) -> Result<Vec<DayPlan>>;

    fn replace_day_plan(&self, day_plan_id: &str, activities: &ActivityList) -> Result<()>;

    fn append_audit_event(&self, event: &AuditEvent) -> Result<()>;

    /// Replace the activities and append `event` in one transaction.
    fn commit_regeneration(&self, day_plan_id: &str, activities: &ActivityList, event: &AuditEvent) -> Result<()>;
}
