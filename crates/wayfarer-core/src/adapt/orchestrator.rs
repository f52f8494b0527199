//! Single-shot regeneration of one day plan.
//!
//! ```text
//! resolve context ──> build prompt ──> generate (timeout) ──> parse ──> persist?
//! ```
//!
//! Nothing is written unless the whole pipeline succeeds; a persisting run
//! writes the new activities and its audit record in one transaction.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use super::context::{RegenerationContext, TriggerPayload};
use super::parse::parse_activity_list;
use super::prompt::build_prompt;
use crate::audit::AuditEvent;
use crate::error::{ContextKind, CoreError, Result};
use crate::generator::TextGenerator;
use crate::itinerary::{ActivityList, DayPlan, NeighborSummaries, Trip};
use crate::storage::ItineraryStore;

/// Generator timeout when none is configured.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

pub struct RegenerationOrchestrator<S> {
    store: Arc<S>,
    generator: Option<Arc<dyn TextGenerator>>,
    timeout: Duration,
    plan_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl<S: ItineraryStore> RegenerationOrchestrator<S> {
    /// An orchestrator without a generator; every regeneration fails with
    /// [`CoreError::UpstreamUnavailable`] until one is attached.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            generator: None,
            timeout: DEFAULT_GENERATION_TIMEOUT,
            plan_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    fn plan_lock(&self, day_plan_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.plan_locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(day_plan_id.to_string()).or_default().clone()
    }

    /// Drop the map entry once nobody else holds or waits on the lock.
    fn release_plan_lock(&self, day_plan_id: &str, lock: Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self.plan_locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        drop(lock);
        if locks.get(day_plan_id).is_some_and(|entry| Arc::strong_count(entry) == 1) {
            locks.remove(day_plan_id);
        }
    }

    #[cfg(test)]
    fn plan_lock_count(&self) -> usize {
        self.plan_locks.lock().map(|locks| locks.len()).unwrap_or_default()
    }

    /// Send a prompt to the generator under the configured timeout.
    pub(crate) async fn generate_text(&self, prompt: &str) -> Result<String> {
        let generator = self
            .generator
            .as_ref()
            .ok_or_else(|| CoreError::upstream("generator", "no text generator configured"))?;
        tokio::time::timeout(self.timeout, generator.generate(prompt))
            .await
            .map_err(|_| {
                warn!(generator = generator.name(), timeout_secs = self.timeout.as_secs(), "generation timed out");
                CoreError::Timeout {
                    timeout_secs: self.timeout.as_secs(),
                }
            })?
    }

    /// The trip, or [`CoreError::ContextNotFound`].
    pub fn resolve_trip(&self, trip_id: &str) -> Result<Trip> {
        self.store
            .read_trip(trip_id)?
            .ok_or_else(|| not_found(ContextKind::Trip, trip_id))
    }

    /// The trip and one of its day plans, or [`CoreError::ContextNotFound`]
    /// when either is missing or the day plan belongs to another trip.
    pub fn resolve_context(&self, trip_id: &str, day_plan_id: &str) -> Result<(Trip, DayPlan)> {
        let trip = self.resolve_trip(trip_id)?;
        let plan = self
            .store
            .read_day_plan(day_plan_id)?
            .filter(|plan| plan.trip_id == trip.id)
            .ok_or_else(|| not_found(ContextKind::DayPlan, day_plan_id))?;
        Ok((trip, plan))
    }

    /// Produce a new activity list for the context's day plan.
    ///
    /// Persisting runs for one day plan are serialized end to end; dry runs
    /// never wait.
    ///
    /// # Errors
    /// - [`CoreError::ContextNotFound`] if the trip or day plan is missing,
    ///   or the day plan belongs to another trip
    /// - [`CoreError::UpstreamUnavailable`] if no generator is configured or
    ///   it cannot be reached
    /// - [`CoreError::Timeout`] if the generator does not answer in time
    /// - [`CoreError::GenerationParse`] if the answer is not an activity list
    pub async fn regenerate(&self, ctx: &RegenerationContext) -> Result<ActivityList> {
        if !ctx.persist {
            return self.run(ctx).await;
        }
        let lock = self.plan_lock(&ctx.day_plan_id);
        let result = {
            let _guard = lock.lock().await;
            self.run(ctx).await
        };
        self.release_plan_lock(&ctx.day_plan_id, lock);
        result
    }

    async fn run(&self, ctx: &RegenerationContext) -> Result<ActivityList> {
        let started = Instant::now();
        info!(
            trip_id = %ctx.trip_id,
            day_plan_id = %ctx.day_plan_id,
            kind = %ctx.kind(),
            persist = ctx.persist,
            "regenerating day plan"
        );

        let (trip, plan) = self.resolve_context(&ctx.trip_id, &ctx.day_plan_id)?;
        let preferences = self.store.read_trip_preferences(&trip.id)?;
        let neighbors = match &ctx.payload {
            TriggerPayload::Mood(mood) => match &mood.neighbors {
                Some(neighbors) => neighbors.clone(),
                None => self.store.read_neighbor_summaries(&plan.id)?,
            },
            TriggerPayload::Weather(_) => NeighborSummaries::default(),
        };

        let prompt = build_prompt(&ctx.payload, &plan.activities, &preferences, &neighbors)?;

        let raw = self.generate_text(&prompt).await?;

        let candidate = parse_activity_list(&raw).map_err(|e| {
            warn!(raw_len = raw.len(), reason = %e.reason, "generator response rejected");
            e
        })?;

        if ctx.persist {
            let event = AuditEvent::regeneration(
                ctx.kind(),
                &trip.id,
                &plan.id,
                ctx.payload.audit_payload(),
                &candidate,
            );
            self.store.commit_regeneration(&plan.id, &candidate, &event)?;
        }

        info!(
            day_plan_id = %plan.id,
            activities = candidate.len(),
            persisted = ctx.persist,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "regeneration finished"
        );
        Ok(candidate)
    }
}

fn not_found(kind: ContextKind, id: &str) -> CoreError {
    CoreError::ContextNotFound {
        kind,
        id: id.to_string(),
    }
}
