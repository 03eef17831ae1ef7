//! Versioned schema setup for carbonboard.
//!
//! Migrations are listed in order; each one runs at most once per database
//! and records its version in the `metadata` table.

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::schema::{CREATE_METADATA_TABLE, V1_STATEMENTS};

/// Key used to store the schema version in the metadata table.
const VERSION_KEY: &str = "schema_version";

/// One step of schema history.
#[derive(Debug)]
struct Migration {
    version: i32,
    description: &'static str,
    statements: &'static [&'static str],
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "emission factor and yearly emission collections",
    statements: V1_STATEMENTS,
}];

/// The schema version a fully migrated database reports.
pub const CURRENT_VERSION: i32 = 1;

/// Bring the database schema up to [`CURRENT_VERSION`].
///
/// Safe to call on every open: already-applied migrations are skipped.
///
/// # Errors
///
/// Returns an error if the stored version is unreadable or a migration fails.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute(CREATE_METADATA_TABLE, [])?;

    let mut version = schema_version(conn)?;
    if version > CURRENT_VERSION {
        return Err(Error::DatabaseMigration {
            message: format!(
                "database schema version {version} is newer than supported version {CURRENT_VERSION}"
            ),
        });
    }

    let start = version;
    for migration in MIGRATIONS.iter().filter(|m| m.version > start) {
        apply(conn, migration)?;
        version = migration.version;
    }

    debug!("Schema at version {}", version);
    Ok(())
}

/// Read the schema version, or 0 for a fresh database.
fn schema_version(conn: &Connection) -> Result<i32> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    match value {
        None => Ok(0),
        Some(value) => value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        }),
    }
}

/// Run one migration and record its version atomically.
fn apply(conn: &Connection, migration: &Migration) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    for statement in migration.statements {
        tx.execute(statement, []).map_err(|e| Error::DatabaseMigration {
            message: format!("v{} ({}): {e}", migration.version, migration.description),
        })?;
    }
    tx.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, migration.version.to_string()),
    )?;
    tx.commit()?;

    info!(
        "Applied schema migration v{}: {}",
        migration.version, migration.description
    );
    Ok(())
}
