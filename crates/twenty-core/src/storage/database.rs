//! SQLite persistence.
//!
//! Stores two things:
//! - the serialized cycle state under a kv key, so remaining time can be
//!   reconstructed after a process restart
//! - one row per completed phase, for statistics

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::cycle::{Cycle, Phase};
use crate::error::StorageError;

/// Key under which the serialized cycle lives in the kv table.
pub const CYCLE_STATE_KEY: &str = "cycle_state";

/// One completed phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub id: i64,
    pub phase: String,
    pub duration_min: u64,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Aggregates over completed phases, scoped to whatever window the
/// query covered.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Stats {
    pub phases: u64,
    pub work_phases: u64,
    pub break_phases: u64,
    pub work_min: u64,
    pub break_min: u64,
}

/// SQLite database at `~/.config/twenty/twenty.db`.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database, creating file and schema if needed.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?
            .join("twenty.db");
        let conn = Connection::open(&path)
            .map_err(|source| StorageError::OpenFailed { path, source })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database. Used by tests.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS phases (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                phase        TEXT NOT NULL,
                duration_min INTEGER NOT NULL,
                started_at   TEXT NOT NULL,
                completed_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_phases_completed_at ON phases(completed_at);",
        )?;
        Ok(())
    }

    // ── Key-value store ──────────────────────────────────────────────

    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query_map(params![key], |row| row.get::<_, String>(0))?;
        match rows.next() {
            Some(value) => Ok(Some(value?)),
            None => Ok(None),
        }
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    // ── Cycle state ──────────────────────────────────────────────────

    /// Load the persisted cycle, if any. Unreadable state is discarded
    /// with a warning rather than failing the caller.
    pub fn load_cycle(&self) -> Result<Option<Cycle>, StorageError> {
        match self.kv_get(CYCLE_STATE_KEY)? {
            Some(json) => match serde_json::from_str(&json) {
                Ok(cycle) => Ok(Some(cycle)),
                Err(e) => {
                    eprintln!("Warning: discarding unreadable cycle state: {e}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    pub fn save_cycle(&self, cycle: &Cycle) -> Result<(), StorageError> {
        let json =
            serde_json::to_string(cycle).map_err(|e| StorageError::Encode(e.to_string()))?;
        self.kv_set(CYCLE_STATE_KEY, &json)
    }

    // ── Phase history ────────────────────────────────────────────────

    /// Record a completed phase.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_phase(
        &self,
        phase: Phase,
        duration_min: u64,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<i64, StorageError> {
        self.conn.execute(
            "INSERT INTO phases (phase, duration_min, started_at, completed_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                phase_str(phase),
                duration_min,
                started_at.to_rfc3339(),
                completed_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn stats_today(&self) -> Result<Stats, StorageError> {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        self.stats_since(&format!("{today}T00:00:00+00:00"))
    }

    pub fn stats_all(&self) -> Result<Stats, StorageError> {
        self.stats_since("")
    }

    fn stats_since(&self, completed_after: &str) -> Result<Stats, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT phase, COUNT(*), COALESCE(SUM(duration_min), 0)
             FROM phases
             WHERE completed_at >= ?1
             GROUP BY phase",
        )?;

        let mut stats = Stats::default();
        let rows = stmt.query_map(params![completed_after], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u64>(1)?,
                row.get::<_, u64>(2)?,
            ))
        })?;

        for row in rows {
            let (phase, count, minutes) = row?;
            stats.phases += count;
            match phase.as_str() {
                "work" => {
                    stats.work_phases += count;
                    stats.work_min += minutes;
                }
                "break" => {
                    stats.break_phases += count;
                    stats.break_min += minutes;
                }
                _ => {}
            }
        }
        Ok(stats)
    }

    /// Most recently completed phases, newest first.
    pub fn recent_phases(&self, limit: u32) -> Result<Vec<PhaseRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, phase, duration_min, started_at, completed_at
             FROM phases
             ORDER BY completed_at DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, phase, duration_min, started_at, completed_at) = row?;
            records.push(PhaseRecord {
                id,
                phase,
                duration_min,
                started_at: parse_timestamp(&started_at)?,
                completed_at: parse_timestamp(&completed_at)?,
            });
        }
        Ok(records)
    }
}

fn phase_str(phase: Phase) -> &'static str {
    match phase {
        Phase::Work => "work",
        Phase::Break => "break",
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::QueryFailed(format!("bad timestamp '{s}': {e}")))
}
