//! Mood commands: classify metrics, submit a report, replay telemetry.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use serde_json::json;
use wayfarer_core::mood::{InteractionEvent, MoodTracker};
use wayfarer_core::{Config, Database, MoodClassifier, MoodSnapshot, Signal};

use crate::common::{block_on, orchestrator, print_json, CliResult};

#[derive(Args)]
pub struct Metrics {
    /// Keystrokes per second
    #[arg(long, default_value = "0")]
    typing: f64,
    /// Peak scroll velocity in px/s
    #[arg(long, default_value = "0")]
    scroll: f64,
    /// Rage clicks in the window
    #[arg(long, default_value = "0")]
    rage: u32,
}

impl Metrics {
    fn snapshot(&self) -> MoodSnapshot {
        MoodSnapshot::new(self.typing, self.scroll, self.rage)
    }
}

#[derive(Subcommand)]
pub enum MoodAction {
    /// Classify metrics without recording anything
    Classify {
        #[command(flatten)]
        metrics: Metrics,
    },
    /// Record a mood report and adapt the day plan if needed
    Report {
        #[command(flatten)]
        metrics: Metrics,
        /// Trip ID
        #[arg(long, requires = "day")]
        trip: Option<String>,
        /// Day plan ID
        #[arg(long, requires = "trip")]
        day: Option<String>,
        /// Use the contents of this file as the generator's answer
        #[arg(long)]
        response_file: Option<PathBuf>,
    },
    /// Aggregate a JSON file of interaction events into windowed reports
    Replay {
        /// JSON array of interaction events
        events: PathBuf,
        /// Window length in seconds (defaults to mood.reporting_interval_secs)
        #[arg(long)]
        interval: Option<u64>,
    },
}

pub fn run(action: MoodAction) -> CliResult {
    match action {
        MoodAction::Classify { metrics } => {
            let snapshot = metrics.snapshot();
            let classifier = MoodClassifier::new();
            let emotion = classifier.classify(&snapshot);
            let rule = classifier.explain(&snapshot).map(|r| r.description);
            print_json(&json!({ "emotion": emotion, "rule": rule, "snapshot": snapshot }))?;
        }
        MoodAction::Report {
            metrics,
            trip,
            day,
            response_file,
        } => {
            let orchestrator = orchestrator(Database::open()?, response_file.as_deref())?;
            let signal = Signal::Mood {
                trip_id: trip,
                day_plan_id: day,
                snapshot: metrics.snapshot(),
            };
            let outcome = block_on(orchestrator.handle_signal(signal))??;
            print_json(&outcome)?;
        }
        MoodAction::Replay { events, interval } => {
            let content = std::fs::read_to_string(&events).map_err(|e| format!("{}: {e}", events.display()))?;
            let mut events: Vec<InteractionEvent> = serde_json::from_str(&content)?;
            events.sort_by_key(event_time);
            print_json(&replay(&events, interval)?)?;
        }
    }
    Ok(())
}

fn event_time(event: &InteractionEvent) -> DateTime<Utc> {
    match event {
        InteractionEvent::Scroll { at, .. } | InteractionEvent::KeyPress { at, .. } | InteractionEvent::Click { at, .. } => {
            *at
        }
    }
}

fn replay(events: &[InteractionEvent], interval: Option<u64>) -> CliResult<Vec<serde_json::Value>> {
    let Some(first) = events.first() else {
        return Ok(Vec::new());
    };
    let interval = match interval {
        Some(secs) => secs,
        None => Config::load()?.mood.reporting_interval_secs,
    };
    let classifier = MoodClassifier::new();
    let mut tracker = MoodTracker::with_interval(event_time(first), interval);
    let mut reports = Vec::new();

    let mut emit = |tracker: &mut MoodTracker, now: DateTime<Utc>| {
        if let Some(report) = tracker.take_report(now) {
            reports.push(json!({
                "closedAt": now,
                "emotion": classifier.classify(&report.snapshot),
                "report": report,
            }));
        }
    };

    for event in events {
        let at = event_time(event);
        if tracker.is_due(at) {
            emit(&mut tracker, at);
        }
        tracker.record(*event);
    }
    if let Some(last) = events.last() {
        emit(&mut tracker, event_time(last));
    }
    Ok(reports)
}
