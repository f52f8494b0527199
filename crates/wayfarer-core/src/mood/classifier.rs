//! Rule-based emotion inference from interaction metrics.
//!
//! The rules form an ordered table; the first predicate that holds decides
//! the label, which makes the order itself the tie-break policy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rage clicks above this count read as frustration.
pub const RAGE_CLICK_THRESHOLD: u32 = 2;
/// Scroll velocity (px/s) above this reads as being overwhelmed.
pub const FAST_SCROLL_THRESHOLD: f64 = 2000.0;
/// Typing speed (keys/s) above this reads as excitement.
pub const FAST_TYPING_THRESHOLD: f64 = 5.0;
/// Typing speed (keys/s) below this, together with slow scrolling, reads as boredom.
pub const SLOW_TYPING_THRESHOLD: f64 = 1.0;
/// Scroll velocity (px/s) below this, together with slow typing, reads as boredom.
pub const SLOW_SCROLL_THRESHOLD: f64 = 200.0;

/// Interaction metrics for one reporting interval.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodSnapshot {
    #[serde(default)]
    pub typing_speed: f64,
    #[serde(default)]
    pub scroll_velocity: f64,
    #[serde(default, alias = "rageClicks")]
    pub rage_click_count: u32,
}

impl MoodSnapshot {
    /// Build a snapshot; negative or non-finite rates become zero.
    pub fn new(typing_speed: f64, scroll_velocity: f64, rage_click_count: u32) -> Self {
        Self {
            typing_speed: sanitize(typing_speed),
            scroll_velocity: sanitize(scroll_velocity),
            rage_click_count,
        }
    }

    pub fn sanitized(self) -> Self {
        Self::new(self.typing_speed, self.scroll_velocity, self.rage_click_count)
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Frustrated,
    Overwhelmed,
    Excited,
    Bored,
    Neutral,
}

impl EmotionLabel {
    pub const ALL: [EmotionLabel; 5] = [
        EmotionLabel::Frustrated,
        EmotionLabel::Overwhelmed,
        EmotionLabel::Excited,
        EmotionLabel::Bored,
        EmotionLabel::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Frustrated => "frustrated",
            Self::Overwhelmed => "overwhelmed",
            Self::Excited => "excited",
            Self::Bored => "bored",
            Self::Neutral => "neutral",
        }
    }

    /// Labels that warrant adapting the itinerary.
    pub fn is_negative(&self) -> bool {
        matches!(self, Self::Frustrated | Self::Overwhelmed | Self::Bored)
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EmotionLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown emotion: {s}"))
    }
}

/// One row of the rule table.
#[derive(Clone, Copy)]
pub struct MoodRule {
    pub label: EmotionLabel,
    pub description: &'static str,
    predicate: fn(&MoodSnapshot) -> bool,
}

impl MoodRule {
    pub fn matches(&self, snapshot: &MoodSnapshot) -> bool {
        (self.predicate)(snapshot)
    }
}

impl fmt::Debug for MoodRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoodRule")
            .field("label", &self.label)
            .field("description", &self.description)
            .finish()
    }
}

const RULES: [MoodRule; 4] = [
    MoodRule {
        label: EmotionLabel::Frustrated,
        description: "more than 2 rage clicks",
        predicate: |m| m.rage_click_count > RAGE_CLICK_THRESHOLD,
    },
    MoodRule {
        label: EmotionLabel::Overwhelmed,
        description: "scrolling faster than 2000 px/s",
        predicate: |m| m.scroll_velocity > FAST_SCROLL_THRESHOLD,
    },
    MoodRule {
        label: EmotionLabel::Excited,
        description: "typing faster than 5 keys/s",
        predicate: |m| m.typing_speed > FAST_TYPING_THRESHOLD,
    },
    MoodRule {
        label: EmotionLabel::Bored,
        description: "typing under 1 key/s and scrolling under 200 px/s",
        predicate: |m| m.typing_speed < SLOW_TYPING_THRESHOLD && m.scroll_velocity < SLOW_SCROLL_THRESHOLD,
    },
];

/// Ordered first-match classifier; falls back to [`EmotionLabel::Neutral`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MoodClassifier;

impl MoodClassifier {
    pub fn new() -> Self {
        Self
    }

    /// The rule table in evaluation order.
    pub fn rules(&self) -> &'static [MoodRule] {
        &RULES
    }

    /// The rule that decides `snapshot`, if any (none means neutral).
    pub fn explain(&self, snapshot: &MoodSnapshot) -> Option<&'static MoodRule> {
        RULES.iter().find(|rule| rule.matches(snapshot))
    }

    pub fn classify(&self, snapshot: &MoodSnapshot) -> EmotionLabel {
        self.explain(snapshot)
            .map(|rule| rule.label)
            .unwrap_or(EmotionLabel::Neutral)
    }
}

/// Convenience function using the default rule table.
pub fn classify(snapshot: &MoodSnapshot) -> EmotionLabel {
    MoodClassifier::new().classify(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn each_rule_in_isolation() {
        assert_eq!(classify(&MoodSnapshot::new(2.0, 500.0, 3)), EmotionLabel::Frustrated);
        assert_eq!(classify(&MoodSnapshot::new(2.0, 2500.0, 0)), EmotionLabel::Overwhelmed);
        assert_eq!(classify(&MoodSnapshot::new(6.0, 500.0, 0)), EmotionLabel::Excited);
        assert_eq!(classify(&MoodSnapshot::new(0.5, 100.0, 0)), EmotionLabel::Bored);
        assert_eq!(classify(&MoodSnapshot::new(3.0, 800.0, 1)), EmotionLabel::Neutral);
    }

    #[test]
    fn earlier_rules_win_ties() {
        // Rage clicks beat fast scrolling and fast typing.
        assert_eq!(classify(&MoodSnapshot::new(9.0, 5000.0, 5)), EmotionLabel::Frustrated);
        // Fast scrolling beats fast typing.
        assert_eq!(classify(&MoodSnapshot::new(9.0, 5000.0, 0)), EmotionLabel::Overwhelmed);
    }

    #[test]
    fn thresholds_are_strict() {
        assert_eq!(classify(&MoodSnapshot::new(2.0, 500.0, 2)), EmotionLabel::Neutral);
        assert_eq!(classify(&MoodSnapshot::new(2.0, 2000.0, 0)), EmotionLabel::Neutral);
        assert_eq!(classify(&MoodSnapshot::new(5.0, 500.0, 0)), EmotionLabel::Neutral);
        assert_eq!(classify(&MoodSnapshot::new(1.0, 100.0, 0)), EmotionLabel::Neutral);
        assert_eq!(classify(&MoodSnapshot::new(0.5, 200.0, 0)), EmotionLabel::Neutral);
    }

    #[test]
    fn absent_metrics_read_as_bored() {
        assert_eq!(classify(&MoodSnapshot::default()), EmotionLabel::Bored);
        let parsed: MoodSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(classify(&parsed), EmotionLabel::Bored);
    }

    #[test]
    fn invalid_rates_are_sanitized() {
        let snapshot = MoodSnapshot::new(f64::NAN, -30.0, 0);
        assert_eq!(snapshot.typing_speed, 0.0);
        assert_eq!(snapshot.scroll_velocity, 0.0);
    }

    #[test]
    fn accepts_rage_clicks_alias() {
        let snapshot: MoodSnapshot =
            serde_json::from_str(r#"{"typingSpeed":1.5,"scrollVelocity":300,"rageClicks":4}"#).unwrap();
        assert_eq!(snapshot.rage_click_count, 4);
    }

    #[test]
    fn explain_names_the_matching_rule() {
        let classifier = MoodClassifier::new();
        let rule = classifier.explain(&MoodSnapshot::new(0.0, 3000.0, 0)).unwrap();
        assert_eq!(rule.label, EmotionLabel::Overwhelmed);
        assert!(classifier.explain(&MoodSnapshot::new(3.0, 800.0, 0)).is_none());
        assert_eq!(classifier.rules().len(), 4);
    }

    #[test]
    fn negative_set() {
        let negative: Vec<_> = EmotionLabel::ALL.into_iter().filter(|l| l.is_negative()).collect();
        assert_eq!(
            negative,
            [EmotionLabel::Frustrated, EmotionLabel::Overwhelmed, EmotionLabel::Bored]
        );
        assert_eq!("Bored".parse::<EmotionLabel>(), Ok(EmotionLabel::Bored));
    }

    proptest! {
        #[test]
        fn classification_is_total_and_deterministic(
            typing in prop::num::f64::ANY,
            scroll in prop::num::f64::ANY,
            clicks in any::<u32>(),
        ) {
            let snapshot = MoodSnapshot { typing_speed: typing, scroll_velocity: scroll, rage_click_count: clicks };
            let first = classify(&snapshot);
            prop_assert!(EmotionLabel::ALL.contains(&first));
            prop_assert_eq!(first, classify(&snapshot));
        }
    }
}
