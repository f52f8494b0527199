//! Entry points for weather reports, mood reports and chat requests.
//!
//! Weather and mood signals naming a known trip and day plan are always
//! audited; regeneration follows only when the trigger policy fires.
//! Unknown ids are rejected before anything is written. An unreachable generator does not undo
//! the audit record, it only means nothing was regenerated.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::context::{MoodPayload, RegenerationContext};
use super::orchestrator::RegenerationOrchestrator;
use super::trigger::{Trigger, TriggerPolicy};
use crate::audit::AuditEvent;
use crate::error::{ContextKind, CoreError, Result, ValidationError};
use crate::itinerary::ActivityList;
use crate::mood::{EmotionLabel, MoodClassifier, MoodSnapshot};
use crate::storage::ItineraryStore;
use crate::weather::WeatherSnapshot;

#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Weather {
        trip_id: String,
        day_plan_id: String,
        snapshot: WeatherSnapshot,
    },
    /// Trip context is optional; without it the report is only audited.
    Mood {
        trip_id: Option<String>,
        day_plan_id: Option<String>,
        snapshot: MoodSnapshot,
    },
    UserRequest {
        trip_id: String,
        day_plan_id: String,
        message: String,
        weather_note: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalOutcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<EmotionLabel>,
    /// The trigger policy fired.
    pub triggered: bool,
    pub regenerated: bool,
    pub persisted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_plan: Option<ActivityList>,
}

impl<S: ItineraryStore> RegenerationOrchestrator<S> {
    /// Audit a signal and regenerate when it warrants it.
    ///
    /// # Errors
    /// Store failures, [`CoreError::ContextNotFound`] (checked before the
    /// audit record is written), parse errors and
    /// timeouts propagate. [`CoreError::UpstreamUnavailable`] is absorbed
    /// for weather and mood signals.
    pub async fn handle_signal(&self, signal: Signal) -> Result<SignalOutcome> {
        let policy = TriggerPolicy::new();
        match signal {
            Signal::Weather {
                trip_id,
                day_plan_id,
                snapshot,
            } => {
                self.resolve_context(&trip_id, &day_plan_id)?;
                let event = AuditEvent::weather_signal(&trip_id, &day_plan_id, &snapshot);
                self.store().append_audit_event(&event)?;

                let trigger = Trigger::Weather(snapshot.clone());
                let mut outcome = SignalOutcome {
                    audit_id: Some(event.id),
                    triggered: policy.should_regenerate(&trigger),
                    ..SignalOutcome::default()
                };
                if outcome.triggered {
                    info!(risk = ?snapshot.risk_kind, "severe weather, regenerating");
                    let ctx = RegenerationContext::weather(trip_id, day_plan_id, snapshot);
                    self.apply(&ctx, &mut outcome).await?;
                }
                Ok(outcome)
            }

            Signal::Mood {
                trip_id,
                day_plan_id,
                snapshot,
            } => {
                match (trip_id.as_deref(), day_plan_id.as_deref()) {
                    (Some(trip_id), Some(day_plan_id)) => {
                        self.resolve_context(trip_id, day_plan_id)?;
                    }
                    (Some(trip_id), None) => {
                        self.resolve_trip(trip_id)?;
                    }
                    (None, Some(day_plan_id)) => {
                        if self.store().read_day_plan(day_plan_id)?.is_none() {
                            return Err(CoreError::ContextNotFound {
                                kind: ContextKind::DayPlan,
                                id: day_plan_id.to_string(),
                            });
                        }
                    }
                    (None, None) => {}
                }
                let snapshot = snapshot.sanitized();
                let emotion = MoodClassifier::new().classify(&snapshot);
                let event = AuditEvent::mood_signal(trip_id.as_deref(), day_plan_id.as_deref(), &snapshot, emotion);
                self.store().append_audit_event(&event)?;

                let mut outcome = SignalOutcome {
                    audit_id: Some(event.id),
                    emotion: Some(emotion),
                    triggered: policy.should_regenerate(&Trigger::Mood(emotion)),
                    ..SignalOutcome::default()
                };
                if let (true, Some(trip_id), Some(day_plan_id)) = (outcome.triggered, trip_id, day_plan_id) {
                    info!(%emotion, "negative mood, regenerating");
                    let ctx = RegenerationContext::mood(trip_id, day_plan_id, MoodPayload::inferred(emotion, snapshot));
                    self.apply(&ctx, &mut outcome).await?;
                }
                Ok(outcome)
            }

            Signal::UserRequest {
                trip_id,
                day_plan_id,
                message,
                weather_note,
            } => {
                let message = message.trim();
                if message.is_empty() {
                    return Err(ValidationError::Empty("message").into());
                }
                let decision = policy.evaluate(&Trigger::UserRequest(message.to_string()));

                let mut payload = MoodPayload::request(message);
                payload.weather_note = weather_note;
                let mut ctx = RegenerationContext::mood(trip_id, day_plan_id, payload);
                ctx.persist = decision.persist;

                let plan = self.regenerate(&ctx).await?;
                Ok(SignalOutcome {
                    triggered: decision.regenerate,
                    regenerated: true,
                    persisted: ctx.persist,
                    updated_plan: Some(plan),
                    ..SignalOutcome::default()
                })
            }
        }
    }

    async fn apply(&self, ctx: &RegenerationContext, outcome: &mut SignalOutcome) -> Result<()> {
        match self.regenerate(ctx).await {
            Ok(plan) => {
                outcome.regenerated = true;
                outcome.persisted = ctx.persist;
                outcome.updated_plan = Some(plan);
                Ok(())
            }
            Err(CoreError::UpstreamUnavailable { service, message }) => {
                warn!(%service, %message, "regeneration skipped, upstream unavailable");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::CannedGenerator;
    use crate::itinerary::{Activity, TripPreferences};
    use crate::storage::Database;
    use crate::weather::WeatherCondition;
    use chrono::NaiveDate;
    use std::sync::Arc;

    const CALMER: &str = r#"{"activities":[{"time":"10:00","title":"Tea ceremony","description":"Quiet"}]}"#;

    fn seeded() -> (Arc<Database>, String, String) {
        let db = Database::open_memory().unwrap();
        let trip = db.create_trip("Trip", "Kyoto", "Japan", TripPreferences::default()).unwrap();
        let plan = db
            .add_day_plan(
                &trip.id,
                0,
                NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
                ActivityList::new(vec![Activity::new("10:00", "Market crawl").with_description("Busy")]),
            )
            .unwrap();
        (Arc::new(db), trip.id, plan.id)
    }

    #[tokio::test]
    async fn mild_weather_is_audited_only() {
        let (db, trip_id, plan_id) = seeded();
        let generator = Arc::new(CannedGenerator::new(CALMER));
        let orchestrator = RegenerationOrchestrator::new(db.clone()).with_generator(generator.clone());

        let outcome = orchestrator
            .handle_signal(Signal::Weather {
                trip_id,
                day_plan_id: plan_id,
                snapshot: WeatherSnapshot::observe(WeatherCondition::Clear, "clear", 22.0, 5.0),
            })
            .await
            .unwrap();

        assert!(outcome.audit_id.is_some());
        assert!(!outcome.triggered && !outcome.regenerated);
        assert_eq!(generator.calls(), 0);
        assert_eq!(db.list_audit_events(None).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn negative_mood_without_generator_keeps_audit() {
        let (db, trip_id, plan_id) = seeded();
        let orchestrator = RegenerationOrchestrator::new(db.clone());

        let outcome = orchestrator
            .handle_signal(Signal::Mood {
                trip_id: Some(trip_id),
                day_plan_id: Some(plan_id.clone()),
                snapshot: MoodSnapshot::new(1.0, 300.0, 5),
            })
            .await
            .unwrap();

        assert_eq!(outcome.emotion, Some(EmotionLabel::Frustrated));
        assert!(outcome.triggered);
        assert!(!outcome.regenerated);
        assert_eq!(db.list_audit_events(None).unwrap().len(), 1);
        assert_eq!(db.get_day_plan(&plan_id).unwrap().unwrap().activities.activities[0].title, "Market crawl");
    }

    #[tokio::test]
    async fn negative_mood_with_context_persists() {
        let (db, trip_id, plan_id) = seeded();
        let orchestrator =
            RegenerationOrchestrator::new(db.clone()).with_generator(Arc::new(CannedGenerator::new(CALMER)));

        let outcome = orchestrator
            .handle_signal(Signal::Mood {
                trip_id: Some(trip_id),
                day_plan_id: Some(plan_id.clone()),
                snapshot: MoodSnapshot::new(0.5, 3000.0, 0),
            })
            .await
            .unwrap();

        assert_eq!(outcome.emotion, Some(EmotionLabel::Overwhelmed));
        assert!(outcome.regenerated && outcome.persisted);
        assert_eq!(db.get_day_plan(&plan_id).unwrap().unwrap().activities.activities[0].title, "Tea ceremony");
        // The signal record plus the regeneration record.
        assert_eq!(db.list_audit_events(None).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn mood_without_context_never_regenerates() {
        let (db, _trip_id, _plan_id) = seeded();
        let generator = Arc::new(CannedGenerator::new(CALMER));
        let orchestrator = RegenerationOrchestrator::new(db).with_generator(generator.clone());

        let outcome = orchestrator
            .handle_signal(Signal::Mood {
                trip_id: None,
                day_plan_id: None,
                snapshot: MoodSnapshot::default(),
            })
            .await
            .unwrap();
        assert_eq!(outcome.emotion, Some(EmotionLabel::Bored));
        assert!(outcome.triggered && !outcome.regenerated);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn user_request_is_a_dry_run_without_audit() {
        let (db, trip_id, plan_id) = seeded();
        let orchestrator =
            RegenerationOrchestrator::new(db.clone()).with_generator(Arc::new(CannedGenerator::new(CALMER)));

        let outcome = orchestrator
            .handle_signal(Signal::UserRequest {
                trip_id,
                day_plan_id: plan_id.clone(),
                message: "something calmer please".into(),
                weather_note: None,
            })
            .await
            .unwrap();

        assert!(outcome.regenerated && !outcome.persisted);
        assert_eq!(outcome.updated_plan.unwrap().activities[0].title, "Tea ceremony");
        assert_eq!(db.get_day_plan(&plan_id).unwrap().unwrap().activities.activities[0].title, "Market crawl");
        assert!(db.list_audit_events(None).unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_user_request_is_rejected() {
        let (db, trip_id, plan_id) = seeded();
        let orchestrator = RegenerationOrchestrator::new(db);
        let err = orchestrator
            .handle_signal(Signal::UserRequest {
                trip_id,
                day_plan_id: plan_id,
                message: "   ".into(),
                weather_note: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::Empty("message"))));
    }

    #[tokio::test]
    async fn user_request_without_generator_is_an_error() {
        let (db, trip_id, plan_id) = seeded();
        let orchestrator = RegenerationOrchestrator::new(db);
        let err = orchestrator
            .handle_signal(Signal::UserRequest {
                trip_id,
                day_plan_id: plan_id,
                message: "more food".into(),
                weather_note: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::UpstreamUnavailable { .. }));
    }

    #[tokio::test]
    async fn weather_for_unknown_context_writes_nothing() {
        let (db, trip_id, plan_id) = seeded();
        let generator = Arc::new(CannedGenerator::new(CALMER));
        let orchestrator = RegenerationOrchestrator::new(db.clone()).with_generator(generator.clone());

        let mild = WeatherSnapshot::observe(WeatherCondition::Clear, "clear", 22.0, 5.0);
        let err = orchestrator
            .handle_signal(Signal::Weather {
                trip_id: "no-such-trip".into(),
                day_plan_id: plan_id.clone(),
                snapshot: mild,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ContextNotFound { kind: ContextKind::Trip, .. }));

        let severe = WeatherSnapshot::observe(WeatherCondition::Rain, "rain", 16.0, 10.0);
        let err = orchestrator
            .handle_signal(Signal::Weather {
                trip_id,
                day_plan_id: "no-such-day".into(),
                snapshot: severe,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ContextNotFound { kind: ContextKind::DayPlan, .. }));

        assert!(db.list_audit_events(None).unwrap().is_empty());
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn mood_for_unknown_context_writes_nothing() {
        let (db, trip_id, _plan_id) = seeded();
        let orchestrator = RegenerationOrchestrator::new(db.clone());

        for (trip_id, day_plan_id) in [
            (Some("no-such-trip".to_string()), None),
            (Some(trip_id), Some("no-such-day".to_string())),
            (None, Some("no-such-day".to_string())),
        ] {
            let err = orchestrator
                .handle_signal(Signal::Mood {
                    trip_id,
                    day_plan_id,
                    snapshot: MoodSnapshot::new(1.0, 300.0, 5),
                })
                .await
                .unwrap_err();
            assert!(err.is_not_found());
        }
        assert!(db.list_audit_events(None).unwrap().is_empty());
    }
}
