//! First day-by-day itinerary of a trip.
//!
//! One generator call produces every day; nothing is stored unless the
//! whole answer parses and every day validates.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::orchestrator::RegenerationOrchestrator;
use super::parse::parse_itinerary;
use super::prompt::itinerary_prompt;
use crate::error::{Result, ValidationError};
use crate::itinerary::DayPlan;
use crate::storage::ItineraryStore;

/// Longest itinerary generated in one call.
pub const MAX_ITINERARY_DAYS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryRequest {
    pub trip_id: String,
    pub start_date: NaiveDate,
    pub days: u32,
    /// Forecast digest added to the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_note: Option<String>,
}

impl ItineraryRequest {
    pub fn new(trip_id: impl Into<String>, start_date: NaiveDate, days: u32) -> Self {
        Self {
            trip_id: trip_id.into(),
            start_date,
            days,
            weather_note: None,
        }
    }

    pub fn with_weather_note(mut self, note: impl Into<String>) -> Self {
        self.weather_note = Some(note.into());
        self
    }

    fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.days == 0 || self.days > MAX_ITINERARY_DAYS {
            return Err(ValidationError::InvalidValue {
                field: "days".to_string(),
                message: format!("must be between 1 and {MAX_ITINERARY_DAYS}"),
            });
        }
        if self.start_date.checked_add_days(Days::new(u64::from(self.days))).is_none() {
            return Err(ValidationError::InvalidValue {
                field: "start_date".to_string(),
                message: "itinerary ends outside the supported calendar".to_string(),
            });
        }
        Ok(())
    }
}

impl<S: ItineraryStore> RegenerationOrchestrator<S> {
    /// Generate and store one day plan per requested day, dated from the
    /// start date and indexed from 0.
    ///
    /// # Errors
    /// - [`ValidationError`] for a day count outside 1..=30 or a trip that
    ///   already has day plans
    /// - [`CoreError::ContextNotFound`](crate::CoreError::ContextNotFound)
    ///   if the trip does not exist
    /// - generator errors as for [`RegenerationOrchestrator::regenerate`]
    pub async fn generate_itinerary(&self, request: &ItineraryRequest) -> Result<Vec<DayPlan>> {
        request.validate()?;
        let trip = self.resolve_trip(&request.trip_id)?;
        info!(trip_id = %trip.id, days = request.days, start = %request.start_date, "generating itinerary");

        let prompt = itinerary_prompt(&trip, request.start_date, request.days, request.weather_note.as_deref())?;
        let raw = self.generate_text(&prompt).await?;
        let lists = parse_itinerary(&raw, request.days as usize).map_err(|e| {
            warn!(raw_len = raw.len(), reason = %e.reason, "itinerary response rejected");
            e
        })?;

        let days = (0u64..)
            .zip(lists)
            .map(|(offset, activities)| {
                let date = request.start_date.checked_add_days(Days::new(offset)).unwrap_or(request.start_date);
                (date, activities)
            })
            .collect();
        let plans = self.store().create_day_plans(&trip.id, days)?;
        info!(trip_id = %trip.id, days = plans.len(), "itinerary stored");
        Ok(plans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::generator::CannedGenerator;
    use crate::itinerary::TripPreferences;
    use crate::storage::Database;
    use std::sync::Arc;

    const TWO_DAYS: &str = r#"Here is your trip:
```json
{"days":[
  {"dayIndex":1,"activities":[
    {"time":"09:00","title":"Start from Hotel","description":"Breakfast","indoor":true},
    {"time":"10:00","title":"Fushimi Inari","description":"Torii gates"}
  ]},
  {"dayIndex":2,"activities":[
    {"time":"09:00","title":"Start from Hotel","description":"Breakfast","indoor":true},
    {"time":"11:00","title":"Nishiki Market","description":"Street food","estimatedCost":25}
  ]}
]}
```"#;

    fn trip() -> (Arc<Database>, String) {
        let db = Database::open_memory().unwrap();
        let trip = db.create_trip("Spring", "Kyoto", "Japan", TripPreferences::default()).unwrap();
        (Arc::new(db), trip.id)
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 10).unwrap()
    }

    #[tokio::test]
    async fn one_day_plan_per_generated_day() {
        let (db, trip_id) = trip();
        let generator = Arc::new(CannedGenerator::new(TWO_DAYS));
        let orchestrator = RegenerationOrchestrator::new(db.clone()).with_generator(generator.clone());

        let plans = orchestrator
            .generate_itinerary(&ItineraryRequest::new(&trip_id, start(), 2))
            .await
            .unwrap();

        assert_eq!(generator.calls(), 1);
        assert_eq!(plans.len(), 2);
        let stored = db.list_day_plans(&trip_id).unwrap();
        assert_eq!(stored[0].date, start());
        assert_eq!(stored[1].date, NaiveDate::from_ymd_opt(2026, 4, 11).unwrap());
        assert_eq!(stored[1].day_index, 1);
        assert_eq!(stored[1].activities.activities[1].title, "Nishiki Market");
        // The initial plan is not a regeneration.
        assert!(db.list_audit_events(None).unwrap().is_empty());
    }

    #[tokio::test]
    async fn wrong_day_count_stores_nothing() {
        let (db, trip_id) = trip();
        let orchestrator =
            RegenerationOrchestrator::new(db.clone()).with_generator(Arc::new(CannedGenerator::new(TWO_DAYS)));

        let err = orchestrator
            .generate_itinerary(&ItineraryRequest::new(&trip_id, start(), 3))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::GenerationParse(_)));
        assert!(db.list_day_plans(&trip_id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn requests_are_checked_before_generating() {
        let (db, trip_id) = trip();
        let generator = Arc::new(CannedGenerator::new(TWO_DAYS));
        let orchestrator = RegenerationOrchestrator::new(db).with_generator(generator.clone());

        let err = orchestrator
            .generate_itinerary(&ItineraryRequest::new(&trip_id, start(), 0))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::InvalidValue { .. })));

        let err = orchestrator
            .generate_itinerary(&ItineraryRequest::new(&trip_id, start(), MAX_ITINERARY_DAYS + 1))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let err = orchestrator
            .generate_itinerary(&ItineraryRequest::new("no-such-trip", start(), 2))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn second_itinerary_for_a_trip_is_refused() {
        let (db, trip_id) = trip();
        let orchestrator =
            RegenerationOrchestrator::new(db.clone()).with_generator(Arc::new(CannedGenerator::new(TWO_DAYS)));
        let request = ItineraryRequest::new(&trip_id, start(), 2);

        orchestrator.generate_itinerary(&request).await.unwrap();
        let err = orchestrator.generate_itinerary(&request).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(db.list_day_plans(&trip_id).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn without_generator_is_upstream_unavailable() {
        let (db, trip_id) = trip();
        let orchestrator = RegenerationOrchestrator::new(db);
        let err = orchestrator
            .generate_itinerary(&ItineraryRequest::new(&trip_id, start(), 1))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::UpstreamUnavailable { .. }));
    }
}
