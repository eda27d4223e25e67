//! Migration state engine
//!
//! Reconciles local migration directories with the rows of the database's
//! migration-history table. The engine holds no state; running it twice on
//! identical inputs yields identical output.

use crate::error::CoreError;
use crate::workspace::SCHEMA_DIR_NAME;
use chrono::{DateTime, Utc};
use lazyprisma_db::{Client, HistoryRow};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Directory under the schema directory that holds migrations
pub const MIGRATIONS_DIR_NAME: &str = "migrations";

/// Fixed name of the history table written by the Prisma engines
pub const HISTORY_TABLE: &str = "_prisma_migrations";

/// The only query the application runs against the database
pub const HISTORY_QUERY: &str = "SELECT migration_name, checksum, started_at, finished_at, \
     rolled_back_at, logs FROM _prisma_migrations ORDER BY started_at ASC";

/// A migration, local or history-only.
///
/// The name is the whole directory basename; the conventional
/// `<timestamp>_<description>` shape is display sugar only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Migration {
    pub name: String,
    /// Filesystem path of the migration directory; empty for DB-only entries
    pub path: PathBuf,
    /// Completion timestamp from the history table
    pub applied_at: Option<DateTime<Utc>>,
    /// Attempt timestamp from the history table (failed rows)
    pub started_at: Option<DateTime<Utc>>,
    /// True when the directory lacks a non-empty migration.sql
    pub is_empty: bool,
    /// True when a non-empty down.sql exists
    pub has_down_sql: bool,
    /// Fingerprint of the local migration.sql
    pub checksum: Option<String>,
    /// Fingerprint recorded in the history table
    pub db_checksum: Option<String>,
    /// History row has neither a finish nor a rollback timestamp
    pub is_failed: bool,
    /// Local and recorded fingerprints are both present and differ
    pub checksum_mismatch: bool,
    /// Engine output captured for failed attempts
    pub logs: Option<String>,
}

impl Migration {
    /// The description part of a conventionally named migration
    pub fn display_name(&self) -> &str {
        match self.name.as_bytes().get(14) {
            Some(b'_') if self.name.len() > 15 => &self.name[15..],
            _ => &self.name,
        }
    }

    /// True for history rows without a local directory
    pub fn is_db_only(&self) -> bool {
        self.path.as_os_str().is_empty()
    }
}

/// A categorisation snapshot, recomputed on every refresh
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationCategory {
    /// Every migration appearing locally, annotated with DB-derived fields
    pub local: Vec<Migration>,
    /// Subset of `local` not applied in the database
    pub pending: Vec<Migration>,
    /// History rows without a local directory
    pub db_only: Vec<Migration>,
}

/// Path of the migrations directory inside a workspace
pub fn migrations_dir(project_dir: &Path) -> PathBuf {
    project_dir.join(SCHEMA_DIR_NAME).join(MIGRATIONS_DIR_NAME)
}

/// Enumerate local migration directories, sorted ascending by name.
///
/// The timestamp prefix is zero-padded, so lexicographic order coincides
/// with chronological order. Hidden entries and plain files (including the
/// lock file) are skipped. A missing migrations directory is an empty list,
/// not an error.
pub fn scan_local_migrations(project_dir: &Path) -> Result<Vec<Migration>, CoreError> {
    let dir = migrations_dir(project_dir);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut migrations = Vec::new();
    for entry in std::fs::read_dir(&dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || !entry.path().is_dir() {
            continue;
        }

        let path = entry.path();
        let sql_file = path.join("migration.sql");
        let is_empty = match std::fs::metadata(&sql_file) {
            Ok(meta) => !meta.is_file() || meta.len() == 0,
            Err(_) => true,
        };
        let checksum = if is_empty {
            None
        } else {
            checksum_file(&sql_file).ok()
        };

        let down_file = path.join("down.sql");
        let has_down_sql = std::fs::metadata(&down_file)
            .map(|meta| meta.is_file() && meta.len() > 0)
            .unwrap_or(false);

        migrations.push(Migration {
            name,
            path,
            is_empty,
            has_down_sql,
            checksum,
            ..Migration::default()
        });
    }

    migrations.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(migrations)
}

/// SHA-256 fingerprint of a SQL file, hex-encoded.
///
/// CRLF line endings are normalised to LF before hashing so locally
/// re-authored files match the checksum the engines record when the
/// migration was written on Windows. No other normalisation happens.
pub fn checksum_file(path: &Path) -> Result<String, CoreError> {
    let content = std::fs::read(path)?;
    Ok(checksum_bytes(&content))
}

fn checksum_bytes(content: &[u8]) -> String {
    let mut normalized = Vec::with_capacity(content.len());
    let mut iter = content.iter().peekable();
    while let Some(&byte) = iter.next() {
        if byte == b'\r' && iter.peek() == Some(&&b'\n') {
            continue;
        }
        normalized.push(byte);
    }

    let mut hasher = Sha256::new();
    hasher.update(&normalized);
    hex::encode(hasher.finalize())
}

/// Reconcile local migrations with history rows.
///
/// For each local migration found in history: a finish timestamp means
/// applied (with a mismatch flag when both fingerprints are present and
/// differ); neither finish nor rollback means in-transaction (failed); a
/// rollback without a finish counts as pending again. Local migrations
/// absent from history are pending. History rows without a local directory
/// become DB-only entries, in history order.
pub fn compare_migrations(local: &[Migration], history: &[HistoryRow]) -> MigrationCategory {
    let mut category = MigrationCategory::default();

    let history_map: HashMap<&str, &HistoryRow> =
        history.iter().map(|row| (row.name.as_str(), row)).collect();
    let local_names: HashSet<&str> = local.iter().map(|m| m.name.as_str()).collect();

    for local_mig in local {
        let mut migration = local_mig.clone();

        match history_map.get(migration.name.as_str()) {
            Some(row) => {
                migration.db_checksum = Some(row.checksum.clone());

                if row.finished_at.is_none() && row.rolled_back_at.is_none() {
                    migration.is_failed = true;
                    migration.logs = row.logs.clone();
                    migration.started_at = row.started_at;
                } else if let Some(finished) = row.finished_at {
                    migration.applied_at = Some(finished);
                }

                // A mismatch is only meaningful for applied, non-empty
                // migrations with both fingerprints present
                if !migration.is_empty && migration.applied_at.is_some() {
                    if let (Some(local_sum), Some(db_sum)) =
                        (&migration.checksum, &migration.db_checksum)
                    {
                        if !db_sum.is_empty() && local_sum != db_sum {
                            migration.checksum_mismatch = true;
                        }
                    }
                }

                // Applied then rolled back: pending again for the user
                if row.finished_at.is_none() && row.rolled_back_at.is_some() {
                    category.pending.push(migration.clone());
                }

                category.local.push(migration);
            }
            None => {
                category.pending.push(migration.clone());
                category.local.push(migration);
            }
        }
    }

    for row in history {
        if local_names.contains(row.name.as_str()) {
            continue;
        }

        let mut migration = Migration {
            name: row.name.clone(),
            path: PathBuf::new(),
            db_checksum: Some(row.checksum.clone()),
            ..Migration::default()
        };

        if row.finished_at.is_none() && row.rolled_back_at.is_none() {
            migration.is_failed = true;
            migration.logs = row.logs.clone();
            migration.started_at = row.started_at;
        } else if let Some(finished) = row.finished_at {
            migration.applied_at = Some(finished);
        }

        category.db_only.push(migration);
    }

    category
}

/// Error text patterns that mean "history table absent" across backends
const MISSING_TABLE_PATTERNS: &[&str] = &[
    "does not exist",
    "doesn't exist",
    "no such table",
    "invalid object name",
    "table or view does not exist",
];

/// True when a history-query error indicates the table has not been created
/// yet (expected before the first deploy)
pub fn is_missing_table_error(message: &str) -> bool {
    let lower = message.to_lowercase();
    MISSING_TABLE_PATTERNS
        .iter()
        .any(|pattern| lower.contains(pattern))
}

/// Result of a full engine run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOutcome {
    pub category: MigrationCategory,
    /// True when the history table was readable or known-absent
    pub db_connected: bool,
    /// True when the history table exists
    pub table_exists: bool,
}

/// Run the engine: scan local migrations, read history through the client
/// when one is available, and classify.
///
/// With no client (or a failing one) the engine degrades: all local
/// migrations are listed, `pending` and `db_only` stay empty, and no
/// DB-derived fields are set.
pub async fn categorize(
    project_dir: &Path,
    client: Option<&Client>,
) -> Result<EngineOutcome, CoreError> {
    let local = scan_local_migrations(project_dir)?;

    let Some(client) = client else {
        return Ok(degraded(local));
    };

    match client.query_history(HISTORY_QUERY).await {
        Ok(rows) => {
            tracing::debug!(local = local.len(), history = rows.len(), "engine run");
            Ok(EngineOutcome {
                category: compare_migrations(&local, &rows),
                db_connected: true,
                table_exists: true,
            })
        }
        Err(err) if is_missing_table_error(&err.to_string()) => Ok(EngineOutcome {
            category: compare_migrations(&local, &[]),
            db_connected: true,
            table_exists: false,
        }),
        Err(err) => {
            tracing::debug!(error = %err, "history query failed, degrading");
            Ok(degraded(local))
        }
    }
}

fn degraded(local: Vec<Migration>) -> EngineOutcome {
    EngineOutcome {
        category: MigrationCategory {
            local,
            pending: Vec::new(),
            db_only: Vec::new(),
        },
        db_connected: false,
        table_exists: false,
    }
}
