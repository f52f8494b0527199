//! SQLite-based itinerary storage.
//!
//! Provides persistent storage for:
//! - Trips and their preference blobs
//! - Day plans with their activity lists (JSON column, replaced whole)
//! - The append-only audit log of signals and regenerations

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;
use uuid::Uuid;

use super::data_dir;
use super::store::ItineraryStore;
use crate::audit::{AuditEvent, AuditKind};
use crate::error::{ContextKind, CoreError, DatabaseError, Result, ValidationError};
use crate::itinerary::{ActivityList, DayPlan, NeighborSummaries, Trip, TripPreferences};

/// SQLite database for trips, day plans and audit events.
///
/// The connection sits behind a mutex so one handle can be shared between
/// concurrent regenerations.
pub struct Database {
    conn: Mutex<Connection>,
}

/// Raw column values of a `trips` row, decoded outside the rusqlite closure.
struct TripRow {
    id: String,
    title: String,
    destination_city: String,
    country: String,
    preferences: String,
    created_at: String,
}

struct DayPlanRow {
    id: String,
    trip_id: String,
    day_index: u32,
    date: String,
    activities: String,
    updated_at: String,
}

struct AuditRow {
    id: String,
    kind: String,
    trip_id: Option<String>,
    day_plan_id: Option<String>,
    payload: String,
    applied_summary: Option<String>,
    created_at: String,
}

const TRIP_COLUMNS: &str = "id, title, destination_city, country, preferences, created_at";
const DAY_PLAN_COLUMNS: &str = "id, trip_id, day_index, date, activities, updated_at";
const AUDIT_COLUMNS: &str = "id, kind, trip_id, day_plan_id, payload, applied_summary, created_at";

impl Database {
    /// Open the database at `<data_dir>/wayfarer.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("wayfarer.db");
        Self::open_at(&path)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn: Mutex::new(conn) };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests and dry runs).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn: Mutex::new(conn) };
        db.migrate()?;
        Ok(db)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| DatabaseError::QueryFailed("connection mutex poisoned".into()).into())
    }

    fn migrate(&self) -> Result<()> {
        self.lock()?
            .execute_batch(
                "PRAGMA foreign_keys = ON;

                CREATE TABLE IF NOT EXISTS trips (
                    id               TEXT PRIMARY KEY,
                    title            TEXT NOT NULL,
                    destination_city TEXT NOT NULL,
                    country          TEXT NOT NULL DEFAULT '',
                    preferences      TEXT NOT NULL DEFAULT '{}',
                    created_at       TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS day_plans (
                    id          TEXT PRIMARY KEY,
                    trip_id     TEXT NOT NULL REFERENCES trips(id) ON DELETE CASCADE,
                    day_index   INTEGER NOT NULL,
                    date        TEXT NOT NULL,
                    activities  TEXT NOT NULL,
                    updated_at  TEXT NOT NULL,
                    UNIQUE (trip_id, day_index)
                );

                CREATE TABLE IF NOT EXISTS audit_events (
                    seq             INTEGER PRIMARY KEY AUTOINCREMENT,
                    id              TEXT NOT NULL UNIQUE,
                    kind            TEXT NOT NULL,
                    trip_id         TEXT,
                    day_plan_id     TEXT,
                    payload         TEXT NOT NULL,
                    applied_summary TEXT,
                    created_at      TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_day_plans_trip ON day_plans(trip_id, day_index);
                CREATE INDEX IF NOT EXISTS idx_audit_events_trip ON audit_events(trip_id);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    /// Create a trip with a fresh id.
    pub fn create_trip(
        &self,
        title: &str,
        destination_city: &str,
        country: &str,
        preferences: TripPreferences,
    ) -> Result<Trip> {
        let trip = Trip {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            destination_city: destination_city.to_string(),
            country: country.to_string(),
            preferences,
            created_at: Utc::now(),
        };
        self.lock()?.execute(
            "INSERT INTO trips (id, title, destination_city, country, preferences, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                trip.id,
                trip.title,
                trip.destination_city,
                trip.country,
                serde_json::to_string(&trip.preferences)?,
                trip.created_at.to_rfc3339(),
            ],
        )?;
        Ok(trip)
    }

    pub fn get_trip(&self, trip_id: &str) -> Result<Option<Trip>> {
        let row = self
            .lock()?
            .query_row(
                &format!("SELECT {TRIP_COLUMNS} FROM trips WHERE id = ?1"),
                params![trip_id],
                trip_row,
            )
            .optional()?;
        row.map(decode_trip).transpose()
    }

    pub fn list_trips(&self) -> Result<Vec<Trip>> {
        let rows = {
            let conn = self.lock()?;
            let mut stmt = conn.prepare(&format!("SELECT {TRIP_COLUMNS} FROM trips ORDER BY created_at"))?;
            let rows = stmt.query_map([], trip_row)?.collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };
        rows.into_iter().map(decode_trip).collect()
    }

    /// Add a day to a trip.
    ///
    /// # Errors
    /// `ContextNotFound` if the trip does not exist; a database error if the
    /// trip already has a plan for `day_index`.
    pub fn add_day_plan(
        &self,
        trip_id: &str,
        day_index: u32,
        date: NaiveDate,
        activities: ActivityList,
    ) -> Result<DayPlan> {
        if self.get_trip(trip_id)?.is_none() {
            return Err(CoreError::ContextNotFound {
                kind: ContextKind::Trip,
                id: trip_id.to_string(),
            });
        }
        let plan = new_day_plan(trip_id, day_index, date, activities);
        insert_day_plan(&*self.lock()?, &plan)?;
        Ok(plan)
    }

    /// Create a whole run of day plans for a trip that has none yet.
    ///
    /// All rows are written in one transaction.
    ///
    /// # Errors
    /// `ContextNotFound` if the trip does not exist; a validation error if
    /// it already has day plans.
    pub fn add_day_plans(&self, trip_id: &str, days: Vec<(NaiveDate, ActivityList)>) -> Result<Vec<DayPlan>> {
        if self.get_trip(trip_id)?.is_none() {
            return Err(CoreError::ContextNotFound {
                kind: ContextKind::Trip,
                id: trip_id.to_string(),
            });
        }
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let existing: u32 = tx.query_row(
            "SELECT COUNT(*) FROM day_plans WHERE trip_id = ?1",
            params![trip_id],
            |row| row.get(0),
        )?;
        if existing > 0 {
            return Err(ValidationError::InvalidValue {
                field: "trip".to_string(),
                message: format!("trip {trip_id} already has {existing} day plan(s)"),
            }
            .into());
        }
        let mut plans = Vec::with_capacity(days.len());
        for (day_index, (date, activities)) in (0u32..).zip(days) {
            let plan = new_day_plan(trip_id, day_index, date, activities);
            insert_day_plan(&tx, &plan)?;
            plans.push(plan);
        }
        tx.commit()?;
        debug!(trip_id, days = plans.len(), "day plans created");
        Ok(plans)
    }

    pub fn get_day_plan(&self, day_plan_id: &str) -> Result<Option<DayPlan>> {
        let row = self
            .lock()?
            .query_row(
                &format!("SELECT {DAY_PLAN_COLUMNS} FROM day_plans WHERE id = ?1"),
                params![day_plan_id],
                day_plan_row,
            )
            .optional()?;
        row.map(decode_day_plan).transpose()
    }

    /// Day plans of a trip ordered by day index.
    pub fn list_day_plans(&self, trip_id: &str) -> Result<Vec<DayPlan>> {
        let rows = {
            let conn = self.lock()?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {DAY_PLAN_COLUMNS} FROM day_plans WHERE trip_id = ?1 ORDER BY day_index"
            ))?;
            let rows = stmt
                .query_map(params![trip_id], day_plan_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };
        rows.into_iter().map(decode_day_plan).collect()
    }

    /// Audit events in append order, optionally limited to one trip.
    pub fn list_audit_events(&self, trip_id: Option<&str>) -> Result<Vec<AuditEvent>> {
        let rows = {
            let conn = self.lock()?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {AUDIT_COLUMNS} FROM audit_events
                 WHERE ?1 IS NULL OR trip_id = ?1
                 ORDER BY seq"
            ))?;
            let rows = stmt
                .query_map(params![trip_id], audit_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };
        rows.into_iter().map(decode_audit).collect()
    }

    fn nearest_summary(conn: &Connection, trip_id: &str, sql: &str, day_index: u32) -> Result<Option<String>> {
        let activities: Option<(String, String)> = conn
            .query_row(sql, params![trip_id, day_index], |row| Ok((row.get(0)?, row.get(1)?)))
            .optional()?;
        activities
            .map(|(id, json)| decode_activities(&id, &json).map(|list| list.summary()))
            .transpose()
    }
}

fn new_day_plan(trip_id: &str, day_index: u32, date: NaiveDate, activities: ActivityList) -> DayPlan {
    DayPlan {
        id: Uuid::new_v4().to_string(),
        trip_id: trip_id.to_string(),
        day_index,
        date,
        activities,
        updated_at: Utc::now(),
    }
}

fn insert_day_plan(conn: &Connection, plan: &DayPlan) -> Result<()> {
    conn.execute(
        "INSERT INTO day_plans (id, trip_id, day_index, date, activities, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            plan.id,
            plan.trip_id,
            plan.day_index,
            plan.date.to_string(),
            serde_json::to_string(&plan.activities)?,
            plan.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn insert_audit(conn: &Connection, event: &AuditEvent) -> Result<()> {
    conn.execute(
        "INSERT INTO audit_events (id, kind, trip_id, day_plan_id, payload, applied_summary, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            event.id,
            event.kind.as_str(),
            event.trip_id,
            event.day_plan_id,
            serde_json::to_string(&event.payload)?,
            event.applied_summary,
            event.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn update_activities(conn: &Connection, day_plan_id: &str, activities: &ActivityList) -> Result<()> {
    let updated = conn.execute(
        "UPDATE day_plans SET activities = ?1, updated_at = ?2 WHERE id = ?3",
        params![serde_json::to_string(activities)?, Utc::now().to_rfc3339(), day_plan_id],
    )?;
    if updated == 0 {
        return Err(CoreError::ContextNotFound {
            kind: ContextKind::DayPlan,
            id: day_plan_id.to_string(),
        });
    }
    Ok(())
}

fn trip_row(row: &Row<'_>) -> rusqlite::Result<TripRow> {
    Ok(TripRow {
        id: row.get(0)?,
        title: row.get(1)?,
        destination_city: row.get(2)?,
        country: row.get(3)?,
        preferences: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn day_plan_row(row: &Row<'_>) -> rusqlite::Result<DayPlanRow> {
    Ok(DayPlanRow {
        id: row.get(0)?,
        trip_id: row.get(1)?,
        day_index: row.get(2)?,
        date: row.get(3)?,
        activities: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn audit_row(row: &Row<'_>) -> rusqlite::Result<AuditRow> {
    Ok(AuditRow {
        id: row.get(0)?,
        kind: row.get(1)?,
        trip_id: row.get(2)?,
        day_plan_id: row.get(3)?,
        payload: row.get(4)?,
        applied_summary: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn corrupt(column: &'static str, id: &str, message: impl ToString) -> CoreError {
    DatabaseError::CorruptRow {
        column,
        id: id.to_string(),
        message: message.to_string(),
    }
    .into()
}

fn parse_timestamp(column: &'static str, id: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| corrupt(column, id, e))
}

fn decode_activities(id: &str, json: &str) -> Result<ActivityList> {
    serde_json::from_str(json).map_err(|e| corrupt("activities", id, e))
}

fn decode_trip(row: TripRow) -> Result<Trip> {
    Ok(Trip {
        preferences: serde_json::from_str(&row.preferences).map_err(|e| corrupt("preferences", &row.id, e))?,
        created_at: parse_timestamp("created_at", &row.id, &row.created_at)?,
        id: row.id,
        title: row.title,
        destination_city: row.destination_city,
        country: row.country,
    })
}

fn decode_day_plan(row: DayPlanRow) -> Result<DayPlan> {
    Ok(DayPlan {
        activities: decode_activities(&row.id, &row.activities)?,
        date: row
            .date
            .parse::<NaiveDate>()
            .map_err(|e| corrupt("date", &row.id, e))?,
        updated_at: parse_timestamp("updated_at", &row.id, &row.updated_at)?,
        id: row.id,
        trip_id: row.trip_id,
        day_index: row.day_index,
    })
}

fn decode_audit(row: AuditRow) -> Result<AuditEvent> {
    Ok(AuditEvent {
        kind: AuditKind::parse(&row.kind).ok_or_else(|| corrupt("kind", &row.id, format!("unknown kind '{}'", row.kind)))?,
        payload: serde_json::from_str(&row.payload).map_err(|e| corrupt("payload", &row.id, e))?,
        created_at: parse_timestamp("created_at", &row.id, &row.created_at)?,
        id: row.id,
        trip_id: row.trip_id,
        day_plan_id: row.day_plan_id,
        applied_summary: row.applied_summary,
    })
}

impl ItineraryStore for Database {
    fn read_trip(&self, trip_id: &str) -> Result<Option<Trip>> {
        self.get_trip(trip_id)
    }

    fn read_day_plan(&self, day_plan_id: &str) -> Result<Option<DayPlan>> {
        self.get_day_plan(day_plan_id)
    }

    fn read_trip_preferences(&self, trip_id: &str) -> Result<TripPreferences> {
        self.get_trip(trip_id)?
            .map(|trip| trip.preferences)
            .ok_or_else(|| CoreError::ContextNotFound {
                kind: ContextKind::Trip,
                id: trip_id.to_string(),
            })
    }

    fn read_neighbor_summaries(&self, day_plan_id: &str) -> Result<NeighborSummaries> {
        let plan = self.get_day_plan(day_plan_id)?.ok_or_else(|| CoreError::ContextNotFound {
            kind: ContextKind::DayPlan,
            id: day_plan_id.to_string(),
        })?;
        let conn = self.lock()?;
        let previous = Self::nearest_summary(
            &conn,
            &plan.trip_id,
            "SELECT id, activities FROM day_plans WHERE trip_id = ?1 AND day_index < ?2
             ORDER BY day_index DESC LIMIT 1",
            plan.day_index,
        )?;
        let next = Self::nearest_summary(
            &conn,
            &plan.trip_id,
            "SELECT id, activities FROM day_plans WHERE trip_id = ?1 AND day_index > ?2
             ORDER BY day_index ASC LIMIT 1",
            plan.day_index,
        )?;
        Ok(NeighborSummaries { previous, next })
    }

    fn create_day_plans(&self, trip_id: &str, days: Vec<(NaiveDate, ActivityList)>) -> Result<Vec<DayPlan>> {
        self.add_day_plans(trip_id, days)
    }

    fn replace_day_plan(&self, day_plan_id: &str, activities: &ActivityList) -> Result<()> {
        let conn = self.lock()?;
        update_activities(&conn, day_plan_id, activities)?;
        debug!(day_plan_id, activities = activities.len(), "day plan replaced");
        Ok(())
    }

    fn append_audit_event(&self, event: &AuditEvent) -> Result<()> {
        let conn = self.lock()?;
        insert_audit(&conn, event)?;
        debug!(id = %event.id, kind = event.kind.as_str(), "audit event appended");
        Ok(())
    }

    fn commit_regeneration(&self, day_plan_id: &str, activities: &ActivityList, event: &AuditEvent) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        update_activities(&tx, day_plan_id, activities)?;
        insert_audit(&tx, event)?;
        tx.commit()?;
        debug!(day_plan_id, audit_id = %event.id, "regeneration committed");
        Ok(())
    }
}
