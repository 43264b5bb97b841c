//! Forward-only, numbered schema migrations (spec §4.4). Missing
//! migrations block startup; a failed migration rolls back via the
//! enclosing transaction.

use super::schema::MIGRATION_1_UP;
use crate::domain::error::{Error, Result};
use rusqlite::Connection;

struct Migration {
    version: i32,
    up: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    up: MIGRATION_1_UP,
}];

/// Apply any migrations newer than the database's current `schema_version`.
pub fn run_pending(conn: &mut Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")
        .map_err(Error::from)?;

    let current_version: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| row.get(0))
        .unwrap_or(0);

    for migration in MIGRATIONS.iter().filter(|m| m.version > current_version) {
        let tx = conn.transaction().map_err(Error::from)?;
        let applied_at = chrono::Utc::now().timestamp();
        let result = tx.execute_batch(migration.up);

        match result {
            Ok(()) => {
                tx.execute("DELETE FROM schema_version", []).map_err(Error::from)?;
                tx.execute(
                    "INSERT INTO schema_version (version) VALUES (?1)",
                    rusqlite::params![migration.version],
                )
                .map_err(Error::from)?;
                tx.execute(
                    "INSERT INTO migrations (version_from, version_to, status, applied_at) VALUES (?1, ?2, ?3, ?4)",
                    rusqlite::params![current_version, migration.version, "applied", applied_at],
                )
                .map_err(Error::from)?;
                tx.commit().map_err(Error::from)?;
            }
            Err(err) => {
                return Err(Error::migration(format!(
                    "migration {} failed, rolled back: {err}",
                    migration.version
                )));
            }
        }
    }

    Ok(())
}
