use anyhow::anyhow;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::{OutcomeRecord, TelemetrySink};
use crate::error::Result;
use crate::mediation::{MediationOutcome, OutcomeKind};

/// Default location of the outcome journal
pub fn default_journal_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| anyhow!("Could not find data directory"))?;
    Ok(data_dir.join("com.aura.mediator").join("outcomes.db"))
}

/// SQLite persistence for outcome records
#[derive(Clone)]
pub struct OutcomeJournal {
    conn: Arc<Mutex<Connection>>,
}

impl OutcomeJournal {
    /// Open (or create) a journal at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Journal that lives only as long as the process
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let journal = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        journal.init_schema()?;
        Ok(journal)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock error: {}", e))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS outcomes (
                id TEXT PRIMARY KEY,
                timestamp TEXT NOT NULL,
                source_package TEXT NOT NULL,
                kind TEXT NOT NULL,
                outcome TEXT NOT NULL,
                elapsed_us INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_outcomes_timestamp ON outcomes(timestamp DESC);
            CREATE INDEX IF NOT EXISTS idx_outcomes_kind ON outcomes(kind);
            "#,
        )?;

        Ok(())
    }

    pub fn insert(&self, record: &OutcomeRecord) -> Result<()> {
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock error: {}", e))?;

        conn.execute(
            r#"
            INSERT INTO outcomes (id, timestamp, source_package, kind, outcome, elapsed_us)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                record.id,
                record.timestamp.to_rfc3339(),
                record.source_package,
                record.outcome.kind().as_str(),
                serde_json::to_string(&record.outcome)?,
                record.elapsed_us as i64,
            ],
        )?;

        Ok(())
    }

    /// Most recent records, newest first
    pub fn recent(&self, limit: usize) -> Result<Vec<OutcomeRecord>> {
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock error: {}", e))?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, timestamp, source_package, outcome, elapsed_us
            FROM outcomes
            ORDER BY timestamp DESC, rowid DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, timestamp, source_package, outcome, elapsed_us) = row?;
            let outcome: MediationOutcome = serde_json::from_str(&outcome)?;
            records.push(OutcomeRecord {
                id,
                timestamp: DateTime::parse_from_rfc3339(&timestamp)
                    .map_err(|e| anyhow!("Bad timestamp {}: {}", timestamp, e))?
                    .with_timezone(&Utc),
                source_package,
                outcome,
                elapsed_us: elapsed_us.max(0) as u64,
            });
        }

        Ok(records)
    }

    /// Number of stored records per outcome kind
    pub fn counts(&self) -> Result<BTreeMap<OutcomeKind, u64>> {
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock error: {}", e))?;

        let mut stmt = conn.prepare("SELECT kind, COUNT(*) FROM outcomes GROUP BY kind")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;

        let mut counts = BTreeMap::new();
        for row in rows {
            let (kind, count) = row?;
            match kind.parse::<OutcomeKind>() {
                Ok(kind) => {
                    counts.insert(kind, count.max(0) as u64);
                }
                Err(()) => tracing::warn!("Unknown outcome kind in journal: {}", kind),
            }
        }

        Ok(counts)
    }
}

impl TelemetrySink for OutcomeJournal {
    fn record(&self, record: &OutcomeRecord) {
        if let Err(e) = self.insert(record) {
            tracing::error!("Failed to persist outcome: {}", e);
        }
    }
}
