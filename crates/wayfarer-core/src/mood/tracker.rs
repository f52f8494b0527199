//! Windowed aggregation of raw UI telemetry into mood snapshots.
//!
//! A tracker belongs to one client session. Callers feed it interaction
//! events as they happen and poll [`MoodTracker::take_report`] once
//! [`MoodTracker::is_due`] says the reporting interval has elapsed.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::classifier::MoodSnapshot;

/// Default reporting interval in seconds.
pub const DEFAULT_REPORTING_INTERVAL_SECS: u64 = 30;

/// Minimum spacing between two scroll samples.
const SCROLL_SAMPLE_MS: i64 = 100;

/// Windows shorter than this are never reported.
const MIN_WINDOW_MS: i64 = 1000;

/// Click repeat count from which a click is a rage click.
const RAGE_CLICK_DETAIL: u32 = 3;

/// One raw interaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum InteractionEvent {
    /// Vertical scroll position after a scroll.
    Scroll { position_px: f64, at: DateTime<Utc> },
    KeyPress { backspace: bool, at: DateTime<Utc> },
    /// `detail` is the click repeat count reported by the UI.
    Click { detail: u32, at: DateTime<Utc> },
}

/// Aggregated metrics of one closed window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodReport {
    pub snapshot: MoodSnapshot,
    pub backspace_count: u32,
    pub window_secs: f64,
}

#[derive(Debug, Clone)]
pub struct MoodTracker {
    interval: Duration,
    window_start: DateTime<Utc>,
    last_scroll: (f64, DateTime<Utc>),
    max_scroll_velocity: f64,
    keypresses: u32,
    backspaces: u32,
    rage_clicks: u32,
}

impl MoodTracker {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_interval(now, DEFAULT_REPORTING_INTERVAL_SECS)
    }

    pub fn with_interval(now: DateTime<Utc>, interval_secs: u64) -> Self {
        let secs = i64::try_from(interval_secs.max(1)).unwrap_or(i64::MAX);
        Self {
            interval: Duration::try_seconds(secs).unwrap_or(Duration::MAX),
            window_start: now,
            last_scroll: (0.0, now),
            max_scroll_velocity: 0.0,
            keypresses: 0,
            backspaces: 0,
            rage_clicks: 0,
        }
    }

    pub fn record(&mut self, event: InteractionEvent) {
        match event {
            InteractionEvent::Scroll { position_px, at } => self.record_scroll(position_px, at),
            InteractionEvent::KeyPress { backspace, .. } => {
                self.keypresses += 1;
                if backspace {
                    self.backspaces += 1;
                }
            }
            InteractionEvent::Click { detail, .. } => {
                if detail >= RAGE_CLICK_DETAIL {
                    self.rage_clicks += 1;
                }
            }
        }
    }

    fn record_scroll(&mut self, position_px: f64, at: DateTime<Utc>) {
        let (last_y, last_at) = self.last_scroll;
        let elapsed_ms = (at - last_at).num_milliseconds();
        if elapsed_ms <= SCROLL_SAMPLE_MS {
            return;
        }
        let velocity = (position_px - last_y).abs() / elapsed_ms as f64 * 1000.0;
        if velocity.is_finite() && velocity > self.max_scroll_velocity {
            self.max_scroll_velocity = velocity;
        }
        self.last_scroll = (position_px, at);
    }

    /// Whether the reporting interval has elapsed since the window opened.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now - self.window_start >= self.interval
    }

    fn has_activity(&self) -> bool {
        self.max_scroll_velocity > 0.0 || self.keypresses > 0 || self.rage_clicks > 0
    }

    /// Close the window and return its metrics.
    ///
    /// Returns `None` and keeps accumulating when the window is under one
    /// second old or nothing happened in it.
    pub fn take_report(&mut self, now: DateTime<Utc>) -> Option<MoodReport> {
        let window_ms = (now - self.window_start).num_milliseconds();
        if window_ms < MIN_WINDOW_MS || !self.has_activity() {
            return None;
        }
        let window_secs = window_ms as f64 / 1000.0;
        let report = MoodReport {
            snapshot: MoodSnapshot::new(
                f64::from(self.keypresses) / window_secs,
                self.max_scroll_velocity,
                self.rage_clicks,
            ),
            backspace_count: self.backspaces,
            window_secs,
        };
        self.reset(now);
        Some(report)
    }

    fn reset(&mut self, now: DateTime<Utc>) {
        // The scroll baseline carries over so the next sample measures from
        // the last known position.
        self.window_start = now;
        self.max_scroll_velocity = 0.0;
        self.keypresses = 0;
        self.backspaces = 0;
        self.rage_clicks = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mood::{classify, EmotionLabel};
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap()
    }

    fn ms(n: i64) -> DateTime<Utc> {
        t0() + Duration::milliseconds(n)
    }

    #[test]
    fn typing_speed_is_presses_per_second() {
        let mut tracker = MoodTracker::new(t0());
        for i in 0..60 {
            tracker.record(InteractionEvent::KeyPress { backspace: i % 10 == 0, at: ms(i * 100) });
        }
        let report = tracker.take_report(ms(10_000)).unwrap();
        assert!((report.snapshot.typing_speed - 6.0).abs() < 1e-9);
        assert_eq!(report.backspace_count, 6);
        assert_eq!(classify(&report.snapshot), EmotionLabel::Excited);
    }

    #[test]
    fn scroll_keeps_window_maximum_and_skips_dense_samples() {
        let mut tracker = MoodTracker::new(t0());
        // 50ms after the window opened: too soon, ignored
        tracker.record(InteractionEvent::Scroll { position_px: 5000.0, at: ms(50) });
        // 500px over 200ms = 2500px/s
        tracker.record(InteractionEvent::Scroll { position_px: 500.0, at: ms(200) });
        // 100px over 1000ms = 100px/s
        tracker.record(InteractionEvent::Scroll { position_px: 600.0, at: ms(1200) });

        let report = tracker.take_report(ms(2000)).unwrap();
        assert!((report.snapshot.scroll_velocity - 2500.0).abs() < 1e-9);
        assert_eq!(classify(&report.snapshot), EmotionLabel::Overwhelmed);
    }

    #[test]
    fn triple_clicks_count_as_rage() {
        let mut tracker = MoodTracker::new(t0());
        for detail in [1, 2, 3, 4, 3, 5] {
            tracker.record(InteractionEvent::Click { detail, at: ms(300) });
        }
        let report = tracker.take_report(ms(5000)).unwrap();
        assert_eq!(report.snapshot.rage_click_count, 4);
        assert_eq!(classify(&report.snapshot), EmotionLabel::Frustrated);
    }

    #[test]
    fn short_or_idle_windows_are_not_reported() {
        let mut tracker = MoodTracker::new(t0());
        assert!(tracker.take_report(ms(31_000)).is_none());

        tracker.record(InteractionEvent::KeyPress { backspace: false, at: ms(100) });
        assert!(tracker.take_report(ms(500)).is_none());
        // Still accumulating after the refused report.
        assert!(tracker.take_report(ms(1500)).is_some());
    }

    #[test]
    fn report_resets_the_window() {
        let mut tracker = MoodTracker::with_interval(t0(), 10);
        tracker.record(InteractionEvent::KeyPress { backspace: false, at: ms(100) });
        assert!(!tracker.is_due(ms(9_999)));
        assert!(tracker.is_due(ms(10_000)));

        tracker.take_report(ms(10_000)).unwrap();
        assert!(!tracker.is_due(ms(15_000)));
        assert!(tracker.take_report(ms(20_000)).is_none());
    }

    #[test]
    fn events_deserialize_from_tagged_json() {
        let event: InteractionEvent = serde_json::from_str(
            r#"{"type":"click","detail":3,"at":"2026-05-01T09:00:01Z"}"#,
        )
        .unwrap();
        assert!(matches!(event, InteractionEvent::Click { detail: 3, .. }));
    }

    #[test]
    fn huge_interval_saturates_instead_of_overflowing() {
        let tracker = MoodTracker::with_interval(t0(), 10_000_000_000_000_000);
        assert!(!tracker.is_due(t0() + Duration::days(365 * 100)));

        let tracker = MoodTracker::with_interval(t0(), u64::MAX);
        assert!(!tracker.is_due(t0() + Duration::days(365 * 100)));
    }
}
