//! # Wayfarer Core Library
//!
//! Core logic of the Wayfarer adaptive itinerary planner. Every operation is
//! available through the standalone `wayfarer` CLI, which is a thin layer
//! over this crate.
//!
//! ## Architecture
//!
//! - **Itinerary**: trips, day plans, activity lists, the timeline diff and
//!   the reconciliation session that merges a proposal into a plan
//! - **Signals**: mood classification from interaction telemetry and weather
//!   risk assessment, both feeding a trigger policy
//! - **Adapt**: prompt construction, generator response parsing, the
//!   regeneration orchestrator and first-itinerary generation
//! - **Geo**: cached country and city reference data
//! - **Storage**: SQLite persistence for plans and the audit log, TOML
//!   configuration
//!
//! ## Key Components
//!
//! - [`RegenerationOrchestrator`]: regenerates one day plan from a trigger
//! - [`diff`] / [`ReconciliationSession`]: slot-keyed compare and merge
//! - [`MoodClassifier`]: rule table from telemetry to an emotion label
//! - [`Database`]: [`ItineraryStore`] implementation
//! - [`Config`]: application configuration management

pub mod adapt;
pub mod audit;
pub mod cache;
pub mod credentials;
pub mod error;
pub mod generator;
pub mod geo;
pub mod itinerary;
pub mod mood;
pub mod storage;
pub mod weather;

pub use adapt::{
    ItineraryRequest, RegenerationContext, RegenerationOrchestrator, Signal, SignalOutcome, TriggerKind, TriggerPolicy,
};
pub use audit::{AuditEvent, AuditKind};
pub use cache::TtlCache;
pub use error::{ConfigError, ContextKind, CoreError, DatabaseError, GenerationParseError, ValidationError};
pub use generator::{CannedGenerator, HttpTextGenerator, TextGenerator};
pub use geo::{Country, FixtureGeo, GeoDirectory, GeoSource};
pub use itinerary::{
    diff, Activity, ActivityList, DayPlan, Decision, DecisionMap, DiffRow, DiffStatus, ReconciliationSession, Trip,
    TripPreferences,
};
pub use mood::{EmotionLabel, MoodClassifier, MoodSnapshot, MoodTracker};
pub use storage::{Config, Database, ItineraryStore};
pub use weather::{FixtureWeather, RiskKind, WeatherCondition, WeatherService, WeatherSnapshot};
