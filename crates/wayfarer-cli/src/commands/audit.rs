//! Audit log commands.

use clap::Subcommand;
use wayfarer_core::{AuditKind, Database};

use crate::common::{print_json, CliResult};

#[derive(Subcommand)]
pub enum AuditAction {
    /// List audit events in the order they were recorded
    List {
        /// Only events of this trip
        #[arg(long)]
        trip: Option<String>,
        /// Only events of this kind (weather or mood)
        #[arg(long, value_parser = parse_kind)]
        kind: Option<AuditKind>,
    },
}

fn parse_kind(value: &str) -> Result<AuditKind, String> {
    AuditKind::parse(value).ok_or_else(|| format!("unknown audit kind: {value}"))
}

pub fn run(action: AuditAction) -> CliResult {
    let db = Database::open()?;

    match action {
        AuditAction::List { trip, kind } => {
            let events: Vec<_> = db
                .list_audit_events(trip.as_deref())?
                .into_iter()
                .filter(|e| kind.map_or(true, |k| e.kind == k))
                .collect();
            print_json(&events)?;
        }
    }
    Ok(())
}
