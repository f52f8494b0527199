//! Adaptive regeneration: trigger policy, prompts, parsing and the
//! orchestrator that ties them to storage and the text generator. The
//! orchestrator also produces a trip's first itinerary.

pub mod context;
pub mod initial;
pub mod orchestrator;
pub mod parse;
pub mod prompt;
pub mod signals;
pub mod trigger;

pub use context::{MoodPayload, RegenerationContext, TriggerPayload, USER_REQUEST_EMOTION};
pub use initial::{ItineraryRequest, MAX_ITINERARY_DAYS};
pub use orchestrator::{RegenerationOrchestrator, DEFAULT_GENERATION_TIMEOUT};
pub use parse::{extract_json_text, parse_activity_list, parse_itinerary};
pub use signals::{Signal, SignalOutcome};
pub use trigger::{should_regenerate, Trigger, TriggerDecision, TriggerKind, TriggerPolicy};
