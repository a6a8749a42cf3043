//! SQLite-based session history and statistics.
//!
//! Provides persistent storage for:
//! - Completed (and skipped) sessions
//! - Focus statistics, daily and all-time
//! - Key-value store for the serialized timer and alarm state

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{CoreError, DatabaseError};
use crate::timer::SessionKind;

/// One finished session, as recorded in the history table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: i64,
    pub kind: String,
    /// Nominal session length.
    pub duration_secs: u64,
    /// Real focused time credited to the session; zero for breaks.
    pub focused_secs: u64,
    pub skipped: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Stats {
    pub total_sessions: u64,
    pub completed_focus: u64,
    pub total_focus_secs: u64,
    pub total_break_secs: u64,
    pub skipped_sessions: u64,
    pub today_focus: u64,
    pub today_focus_secs: u64,
}

/// SQLite database for session history and application state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/focusloop/focusloop.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("focusloop.db");
        let conn = Connection::open(&path)
            .map_err(|source| DatabaseError::OpenFailed { path, source })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                kind          TEXT NOT NULL,
                duration_secs INTEGER NOT NULL,
                focused_secs  INTEGER NOT NULL DEFAULT 0,
                skipped       INTEGER NOT NULL DEFAULT 0,
                started_at    TEXT,
                completed_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_completed_at ON sessions(completed_at);
            CREATE INDEX IF NOT EXISTS idx_sessions_kind ON sessions(kind);",
        )?;
        Ok(())
    }

    /// Record a finished session.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_session(
        &self,
        kind: SessionKind,
        duration_secs: u64,
        focused_secs: u64,
        skipped: bool,
        started_at: Option<DateTime<Utc>>,
        completed_at: DateTime<Utc>,
    ) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO sessions (kind, duration_secs, focused_secs, skipped, started_at, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                kind.as_str(),
                duration_secs,
                focused_secs,
                skipped,
                started_at.map(|t| t.to_rfc3339()),
                completed_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent sessions, newest first.
    pub fn recent_sessions(&self, limit: u32) -> Result<Vec<SessionRecord>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, kind, duration_secs, focused_secs, skipped, started_at, completed_at
             FROM sessions ORDER BY completed_at DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok(SessionRecord {
                id: row.get(0)?,
                kind: row.get(1)?,
                duration_secs: row.get(2)?,
                focused_secs: row.get(3)?,
                skipped: row.get(4)?,
                started_at: row
                    .get::<_, Option<String>>(5)?
                    .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                    .map(|t| t.with_timezone(&Utc)),
                completed_at: row
                    .get::<_, String>(6)?
                    .parse::<DateTime<Utc>>()
                    .unwrap_or_default(),
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn stats_today(&self) -> Result<Stats, DatabaseError> {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        self.aggregate(Some(format!("{today}T00:00:00+00:00")))
    }

    pub fn stats_all(&self) -> Result<Stats, DatabaseError> {
        let mut stats = self.aggregate(None)?;
        let today = self.stats_today()?;
        stats.today_focus = today.today_focus;
        stats.today_focus_secs = today.today_focus_secs;
        Ok(stats)
    }

    fn aggregate(&self, since: Option<String>) -> Result<Stats, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT kind, COUNT(*),
                    COALESCE(SUM(duration_secs), 0),
                    COALESCE(SUM(focused_secs), 0),
                    COALESCE(SUM(skipped), 0)
             FROM sessions
             WHERE completed_at >= COALESCE(?1, '')
             GROUP BY kind",
        )?;

        let mut stats = Stats::default();
        let rows = stmt.query_map(params![since], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u64>(1)?,
                row.get::<_, u64>(2)?,
                row.get::<_, u64>(3)?,
                row.get::<_, u64>(4)?,
            ))
        })?;

        for row in rows {
            let (kind, count, duration_secs, focused_secs, skipped) = row?;
            stats.total_sessions += count;
            stats.skipped_sessions += skipped;
            match kind.as_str() {
                "focus" => {
                    stats.completed_focus += count;
                    stats.total_focus_secs += focused_secs;
                    if since.is_some() {
                        stats.today_focus += count;
                        stats.today_focus_secs += focused_secs;
                    }
                }
                "short_break" | "long_break" => {
                    stats.total_break_secs += duration_secs;
                }
                _ => {}
            }
        }
        Ok(stats)
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a value from the kv store.
    pub fn kv_delete(&self, key: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}
