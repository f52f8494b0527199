//! Emotion inference from interaction telemetry.

pub mod classifier;
pub mod tracker;

pub use classifier::{classify, EmotionLabel, MoodClassifier, MoodRule, MoodSnapshot};
pub use tracker::{InteractionEvent, MoodReport, MoodTracker, DEFAULT_REPORTING_INTERVAL_SECS};
