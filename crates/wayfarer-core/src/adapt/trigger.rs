//! Which signals warrant a regeneration, and whether its result is saved.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::mood::EmotionLabel;
use crate::weather::WeatherSnapshot;

/// Prompt template family, also used to label audit records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerKind {
    Weather,
    Mood,
}

impl TriggerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weather => "WEATHER",
            Self::Mood => "MOOD",
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An incoming reason to reconsider a day plan.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    Weather(WeatherSnapshot),
    Mood(EmotionLabel),
    /// Free-text request from the chat surface.
    UserRequest(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerDecision {
    pub regenerate: bool,
    /// `false` means the candidate is returned for review only.
    pub persist: bool,
    pub kind: TriggerKind,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerPolicy;

impl TriggerPolicy {
    pub fn new() -> Self {
        Self
    }

    pub fn should_regenerate(&self, trigger: &Trigger) -> bool {
        match trigger {
            Trigger::Weather(snapshot) => snapshot.is_severe,
            Trigger::Mood(label) => label.is_negative(),
            Trigger::UserRequest(_) => true,
        }
    }

    pub fn evaluate(&self, trigger: &Trigger) -> TriggerDecision {
        let (kind, persist) = match trigger {
            Trigger::Weather(_) => (TriggerKind::Weather, true),
            Trigger::Mood(_) => (TriggerKind::Mood, true),
            // Chat requests reuse the mood template and are never saved directly.
            Trigger::UserRequest(_) => (TriggerKind::Mood, false),
        };
        TriggerDecision {
            regenerate: self.should_regenerate(trigger),
            persist,
            kind,
        }
    }
}

pub fn should_regenerate(trigger: &Trigger) -> bool {
    TriggerPolicy::new().should_regenerate(trigger)
}
