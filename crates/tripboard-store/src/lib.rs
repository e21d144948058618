//! SQLite persistence for trips and segments

mod migrations;

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::Mutex;
use tripboard_core::{BatchOp, TripBatch, TripStore};
use tripboard_schema::{
    format_date, parse_date, Segment, SegmentId, Trip, TripDateRange, TripId, TripWithSegments,
};
use uuid::Uuid;

use crate::migrations::run_migrations;

/// SQLite-backed [`TripStore`]
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the database at the given path
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

#[async_trait]
impl TripStore for SqliteStore {
    // ─────────────────────────────────────────────────────────────────────────
    // Trips
    // ─────────────────────────────────────────────────────────────────────────

    async fn create_trip(&self, trip: &Trip) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            r#"INSERT INTO trips (id, title, start_date, end_date, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5)"#,
            params![
                trip.id.to_string(),
                trip.title,
                format_date(trip.dates.start),
                format_date(trip.dates.end),
                trip.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn list_trips(&self) -> Result<Vec<Trip>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            r#"SELECT id, title, start_date, end_date, created_at
               FROM trips
               ORDER BY start_date, created_at"#,
        )?;

        let rows = stmt.query_map([], row_to_trip)?;
        let mut trips = Vec::new();
        for row in rows {
            trips.push(row?);
        }
        Ok(trips)
    }

    async fn load_trip(&self, trip_id: TripId) -> Result<Option<TripWithSegments>> {
        let conn = self.conn.lock().await;
        let trip = conn
            .query_row(
                r#"SELECT id, title, start_date, end_date, created_at
                   FROM trips
                   WHERE id = ?1"#,
                [trip_id.to_string()],
                row_to_trip,
            )
            .optional()?;

        let Some(trip) = trip else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            r#"SELECT id, trip_id, place_name, start_date, end_date, notes
               FROM segments
               WHERE trip_id = ?1
               ORDER BY start_date, end_date"#,
        )?;
        let rows = stmt.query_map([trip_id.to_string()], row_to_segment)?;
        let mut segments = Vec::new();
        for row in rows {
            segments.push(row?);
        }

        Ok(Some(TripWithSegments { trip, segments }))
    }

    async fn delete_trip(&self, trip_id: TripId) -> Result<bool> {
        let conn = self.conn.lock().await;
        let count = conn.execute("DELETE FROM trips WHERE id = ?1", [trip_id.to_string()])?;
        Ok(count > 0)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Segments
    // ─────────────────────────────────────────────────────────────────────────

    async fn find_segment(&self, segment_id: SegmentId) -> Result<Option<Segment>> {
        let conn = self.conn.lock().await;
        let segment = conn
            .query_row(
                r#"SELECT id, trip_id, place_name, start_date, end_date, notes
                   FROM segments
                   WHERE id = ?1"#,
                [segment_id.to_string()],
                row_to_segment,
            )
            .optional()?;
        Ok(segment)
    }

    async fn apply(&self, batch: TripBatch) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        let trip_id = batch.trip_id.to_string();

        let exists = tx
            .query_row("SELECT 1 FROM trips WHERE id = ?1", [&trip_id], |_| Ok(()))
            .optional()?
            .is_some();
        if !exists {
            bail!("trip not found: {trip_id}");
        }

        // Any early return drops `tx`, which rolls the whole batch back.
        for op in &batch.ops {
            match op {
                BatchOp::SetTripDates(dates) => {
                    tx.execute(
                        "UPDATE trips SET start_date = ?1, end_date = ?2 WHERE id = ?3",
                        params![format_date(dates.start), format_date(dates.end), trip_id],
                    )?;
                }
                BatchOp::InsertSegment(segment) => {
                    if segment.trip_id != batch.trip_id {
                        bail!(
                            "segment {} belongs to trip {}, not {trip_id}",
                            segment.id,
                            segment.trip_id
                        );
                    }
                    tx.execute(
                        r#"INSERT INTO segments
                           (id, trip_id, place_name, start_date, end_date, notes, created_at)
                           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
                        params![
                            segment.id.to_string(),
                            trip_id,
                            segment.place_name,
                            format_date(segment.dates.start),
                            format_date(segment.dates.end),
                            segment.notes,
                            Utc::now().to_rfc3339(),
                        ],
                    )?;
                }
                BatchOp::UpdateSegment(segment) => {
                    let changed = tx.execute(
                        r#"UPDATE segments
                           SET place_name = ?1, start_date = ?2, end_date = ?3, notes = ?4
                           WHERE id = ?5 AND trip_id = ?6"#,
                        params![
                            segment.place_name,
                            format_date(segment.dates.start),
                            format_date(segment.dates.end),
                            segment.notes,
                            segment.id.to_string(),
                            trip_id,
                        ],
                    )?;
                    if changed == 0 {
                        bail!("segment not found: {}", segment.id);
                    }
                }
                BatchOp::DeleteSegment(id) => {
                    let changed = tx.execute(
                        "DELETE FROM segments WHERE id = ?1 AND trip_id = ?2",
                        params![id.to_string(), trip_id],
                    )?;
                    if changed == 0 {
                        bail!("segment not found: {id}");
                    }
                }
            }
        }

        tx.commit()?;
        tracing::debug!(%trip_id, ops = batch.ops.len(), "trip batch committed");
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Row mapping
// ─────────────────────────────────────────────────────────────────────────────

fn row_to_trip(row: &Row) -> rusqlite::Result<Trip> {
    Ok(Trip {
        id: uuid_column(row, 0)?,
        title: row.get(1)?,
        dates: TripDateRange::new(date_column(row, 2)?, date_column(row, 3)?),
        created_at: timestamp_column(row, 4)?,
    })
}

fn row_to_segment(row: &Row) -> rusqlite::Result<Segment> {
    Ok(Segment {
        id: uuid_column(row, 0)?,
        trip_id: uuid_column(row, 1)?,
        place_name: row.get(2)?,
        dates: TripDateRange::new(date_column(row, 3)?, date_column(row, 4)?),
        notes: row.get(5)?,
    })
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn uuid_column(row: &Row, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| conversion_error(idx, e))
}

/// Dates are stored as `YYYY-MM-DD` and read back through the strict parser.
fn date_column(row: &Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    parse_date(&raw).map_err(|e| conversion_error(idx, e))
}

fn timestamp_column(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}
