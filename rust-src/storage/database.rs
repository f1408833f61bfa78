//! SQLite queries over the toothbrush database.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags, Row};
use tracing::{debug, info};

use crate::models::{Granularity, Scope};


const DAILY_DEVICE_QUERY: &str = "
    SELECT t.toothbrush_id, td.toothbrush_day_id, td.date,
           tds.num_times_brushed, tds.total_time_brushed
    FROM ToothbrushDay td
    JOIN Toothbrush t ON td.toothbrush_id = t.toothbrush_id
    LEFT JOIN ToothbrushDailyStats tds ON td.toothbrush_day_id = tds.toothbrush_day_id
    WHERE t.toothbrush_id = ?1
    ORDER BY td.date";

const DAILY_ALL_QUERY: &str = "
    SELECT t.toothbrush_id, td.toothbrush_day_id, td.date,
           tds.num_times_brushed, tds.total_time_brushed
    FROM ToothbrushDay td
    JOIN Toothbrush t ON td.toothbrush_id = t.toothbrush_id
    LEFT JOIN ToothbrushDailyStats tds ON td.toothbrush_day_id = tds.toothbrush_day_id
    ORDER BY t.toothbrush_id, td.date";

const WEEKLY_DEVICE_QUERY: &str = "
    SELECT t.toothbrush_id, tw.toothbrush_week_id, tw.week_start_date,
           tws.avg_times_brushed_per_day, tws.avg_time_brushed_per_day
    FROM ToothbrushWeek tw
    JOIN Toothbrush t ON tw.toothbrush_id = t.toothbrush_id
    JOIN ToothbrushWeeklyStats tws ON tw.toothbrush_week_id = tws.toothbrush_week_id
    WHERE t.toothbrush_id = ?1
    ORDER BY tw.week_start_date";

const WEEKLY_ALL_QUERY: &str = "
    SELECT t.toothbrush_id, tw.toothbrush_week_id, tw.week_start_date,
           tws.avg_times_brushed_per_day, tws.avg_time_brushed_per_day
    FROM ToothbrushWeek tw
    JOIN Toothbrush t ON tw.toothbrush_id = t.toothbrush_id
    JOIN ToothbrushWeeklyStats tws ON tw.toothbrush_week_id = tws.toothbrush_week_id
    ORDER BY t.toothbrush_id, tw.week_start_date";


/// One row as returned by the period/stats join.
///
/// Daily rows carry an event count and total seconds, weekly rows carry
/// per-day averages. Both metrics are `None` for days without stats.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub device_id: String,
    pub period_id: i64,
    pub date: String,
    pub events: Option<f64>,
    pub seconds: Option<f64>,
}


/// Read-only handle on the toothbrush database.
///
/// The connection lives exactly as long as the store and is closed when it
/// is dropped, whichever branch the caller takes.
pub struct BrushingStore {
    conn: Connection,
    path: PathBuf,
}


impl BrushingStore {
    /// Open an existing database read-only.
    pub fn open(db_path: &Path) -> Result<Self> {
        if !db_path.exists() {
            anyhow::bail!("Database not found at {}", db_path.display());
        }

        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;

        debug!(path = %db_path.display(), "opened brushing database");

        Ok(Self {
            conn,
            path: db_path.to_path_buf(),
        })
    }

    /// Fetch every record for the scope, ordered by date ascending.
    ///
    /// All-device results are ordered by device first. An empty vector means
    /// there is nothing recorded for the scope.
    pub fn fetch(&self, granularity: Granularity, scope: &Scope) -> Result<Vec<RawRow>> {
        let sql = match (granularity, scope) {
            (Granularity::Daily, Scope::Device(_)) => DAILY_DEVICE_QUERY,
            (Granularity::Daily, Scope::AllDevices) => DAILY_ALL_QUERY,
            (Granularity::Weekly, Scope::Device(_)) => WEEKLY_DEVICE_QUERY,
            (Granularity::Weekly, Scope::AllDevices) => WEEKLY_ALL_QUERY,
        };

        let mut stmt = self
            .conn
            .prepare(sql)
            .with_context(|| format!("Failed to prepare {} query", granularity))?;

        let rows = match scope {
            Scope::Device(id) => stmt
                .query_map(params![id], map_row)?
                .collect::<rusqlite::Result<Vec<_>>>(),
            Scope::AllDevices => stmt
                .query_map([], map_row)?
                .collect::<rusqlite::Result<Vec<_>>>(),
        }
        .with_context(|| format!("Failed to read {} records", granularity))?;

        info!(
            %granularity,
            ?scope,
            rows = rows.len(),
            "fetched brushing records"
        );

        Ok(rows)
    }

    /// Close the connection, surfacing any error from SQLite.
    pub fn close(self) -> Result<()> {
        let path = self.path;
        self.conn
            .close()
            .map_err(|(_, e)| e)
            .with_context(|| format!("Failed to close database: {}", path.display()))?;
        debug!(path = %path.display(), "closed brushing database");
        Ok(())
    }
}


fn map_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        device_id: value_to_string(row.get_ref(0)?),
        period_id: row.get(1)?,
        date: row.get(2)?,
        events: row.get(3)?,
        seconds: row.get(4)?,
    })
}


/// Device ids may be stored as integers or text; report both as text.
fn value_to_string(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) | ValueRef::Blob(t) => String::from_utf8_lossy(t).into_owned(),
    }
}


/// Create the toothbrush tables if they are missing.
///
/// The reporting pipeline only reads; this is for seeding new databases.
#[allow(dead_code)]
pub fn init_database(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS Toothbrush (
            toothbrush_id INTEGER PRIMARY KEY
        );
        CREATE TABLE IF NOT EXISTS ToothbrushDay (
            toothbrush_day_id INTEGER PRIMARY KEY AUTOINCREMENT,
            toothbrush_id INTEGER NOT NULL REFERENCES Toothbrush(toothbrush_id),
            date TEXT NOT NULL,
            UNIQUE(toothbrush_id, date)
        );
        CREATE TABLE IF NOT EXISTS ToothbrushDailyStats (
            toothbrush_day_id INTEGER PRIMARY KEY REFERENCES ToothbrushDay(toothbrush_day_id),
            num_times_brushed INTEGER,
            total_time_brushed INTEGER
        );
        CREATE TABLE IF NOT EXISTS ToothbrushWeek (
            toothbrush_week_id INTEGER PRIMARY KEY AUTOINCREMENT,
            toothbrush_id INTEGER NOT NULL REFERENCES Toothbrush(toothbrush_id),
            week_start_date TEXT NOT NULL,
            UNIQUE(toothbrush_id, week_start_date)
        );
        CREATE TABLE IF NOT EXISTS ToothbrushWeeklyStats (
            toothbrush_week_id INTEGER PRIMARY KEY REFERENCES ToothbrushWeek(toothbrush_week_id),
            avg_times_brushed_per_day REAL,
            avg_time_brushed_per_day REAL
        );
        CREATE INDEX IF NOT EXISTS idx_toothbrush_day_date ON ToothbrushDay(date);
        CREATE INDEX IF NOT EXISTS idx_toothbrush_week_date ON ToothbrushWeek(week_start_date);",
    )?;

    Ok(conn)
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn add_day(conn: &Connection, device: i64, date: &str, stats: Option<(i64, i64)>) {
        conn.execute(
            "INSERT OR IGNORE INTO Toothbrush (toothbrush_id) VALUES (?1)",
            params![device],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO ToothbrushDay (toothbrush_id, date) VALUES (?1, ?2)",
            params![device, date],
        )
        .unwrap();
        if let Some((count, seconds)) = stats {
            conn.execute(
                "INSERT INTO ToothbrushDailyStats VALUES (last_insert_rowid(), ?1, ?2)",
                params![count, seconds],
            )
            .unwrap();
        }
    }

    fn add_week(conn: &Connection, device: i64, date: &str, stats: Option<(f64, f64)>) {
        conn.execute(
            "INSERT OR IGNORE INTO Toothbrush (toothbrush_id) VALUES (?1)",
            params![device],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO ToothbrushWeek (toothbrush_id, week_start_date) VALUES (?1, ?2)",
            params![device, date],
        )
        .unwrap();
        if let Some((avg_count, avg_seconds)) = stats {
            conn.execute(
                "INSERT INTO ToothbrushWeeklyStats VALUES (last_insert_rowid(), ?1, ?2)",
                params![avg_count, avg_seconds],
            )
            .unwrap();
        }
    }

    fn seeded_store(tmp_dir: &TempDir) -> BrushingStore {
        let db_path = tmp_dir.path().join("toothbrush_data.db");
        let conn = init_database(&db_path).unwrap();

        // Inserted out of order to prove the query sorts.
        add_day(&conn, 7, "2024-01-03", Some((1, 45)));
        add_day(&conn, 7, "2024-01-01", Some((2, 120)));
        add_day(&conn, 7, "2024-01-02", None);
        add_day(&conn, 3, "2024-01-05", Some((3, 200)));

        add_week(&conn, 2, "2024-01-01", Some((1.5, 90.0)));
        add_week(&conn, 1, "2024-01-08", Some((2.0, 110.0)));
        add_week(&conn, 1, "2024-01-01", Some((2.5, 130.0)));
        add_week(&conn, 1, "2024-01-15", None);
        drop(conn);

        BrushingStore::open(&db_path).unwrap()
    }

    #[test]
    fn test_open_missing_database_fails() {
        let tmp_dir = TempDir::new().unwrap();
        let result = BrushingStore::open(&tmp_dir.path().join("missing.db"));
        assert!(result.is_err());
    }

    #[test]
    fn test_daily_device_left_join_and_order() {
        let tmp_dir = TempDir::new().unwrap();
        let store = seeded_store(&tmp_dir);

        let rows = store
            .fetch(Granularity::Daily, &Scope::Device("7".to_string()))
            .unwrap();

        let dates: Vec<&str> = rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, ["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(rows[0].events, Some(2.0));
        assert_eq!(rows[0].seconds, Some(120.0));
        assert_eq!(rows[1].events, None);
        assert_eq!(rows[1].seconds, None);
        assert!(rows.iter().all(|r| r.device_id == "7"));
    }

    #[test]
    fn test_weekly_device_inner_join_drops_weeks_without_stats() {
        let tmp_dir = TempDir::new().unwrap();
        let store = seeded_store(&tmp_dir);

        let rows = store
            .fetch(Granularity::Weekly, &Scope::Device("1".to_string()))
            .unwrap();

        let dates: Vec<&str> = rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, ["2024-01-01", "2024-01-08"]);
        assert_eq!(rows[0].events, Some(2.5));
    }

    #[test]
    fn test_all_devices_ordered_by_device_then_date() {
        let tmp_dir = TempDir::new().unwrap();
        let store = seeded_store(&tmp_dir);

        let rows = store.fetch(Granularity::Weekly, &Scope::AllDevices).unwrap();
        let keys: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.device_id.as_str(), r.date.as_str()))
            .collect();
        assert_eq!(
            keys,
            [("1", "2024-01-01"), ("1", "2024-01-08"), ("2", "2024-01-01")]
        );

        let daily = store.fetch(Granularity::Daily, &Scope::AllDevices).unwrap();
        assert_eq!(daily.len(), 4);
        assert_eq!(daily[0].device_id, "3");
    }

    #[test]
    fn test_unknown_device_is_empty_not_error() {
        let tmp_dir = TempDir::new().unwrap();
        let store = seeded_store(&tmp_dir);

        for granularity in [Granularity::Daily, Granularity::Weekly] {
            let rows = store
                .fetch(granularity, &Scope::Device("999".to_string()))
                .unwrap();
            assert!(rows.is_empty());
        }
        store.close().unwrap();
    }
}
