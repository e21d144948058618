use anyhow::Result;
use rusqlite::Connection;

pub(crate) fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"CREATE TABLE IF NOT EXISTS __tripboard_schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );"#,
    )?;

    let applied: std::collections::HashSet<i64> = {
        let mut stmt = conn.prepare("SELECT version FROM __tripboard_schema_version")?;
        let rows = stmt.query_map([], |row| row.get::<_, i64>(0))?;
        rows.collect::<rusqlite::Result<_>>()?
    };

    let migrations: Vec<(i64, &str)> = vec![
        (
            1,
            r#"
            CREATE TABLE IF NOT EXISTS trips (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS segments (
                id TEXT PRIMARY KEY,
                trip_id TEXT NOT NULL REFERENCES trips(id) ON DELETE CASCADE,
                place_name TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                notes TEXT,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_segments_trip_start ON segments(trip_id, start_date);
            "#,
        ),
        (
            2,
            r#"
            CREATE INDEX IF NOT EXISTS idx_trips_start ON trips(start_date);
            "#,
        ),
    ];

    for (version, sql) in migrations {
        if applied.contains(&version) {
            continue;
        }
        conn.execute_batch(sql)?;
        conn.execute(
            "INSERT INTO __tripboard_schema_version(version) VALUES (?1)",
            [version],
        )?;
        tracing::debug!(version, "applied storage migration");
    }

    Ok(())
}
