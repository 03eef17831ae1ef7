//! Storage layer for carbonboard.
//!
//! This module provides `SQLite`-based persistent storage for the two
//! document collections: emission factors and yearly emissions.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::model::{EmissionFactor, RecordId, SortOrder, YearlyEmission};

const FACTOR_COLUMNS: &str = "id, model, ton_co2eq, updated_at";

/// Storage engine for emission records.
///
/// Every write runs in autocommit mode and is durable once the call returns.
/// Listings come back in natural order (ascending id) unless a sort is asked
/// for.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert a new emission factor.
    ///
    /// No uniqueness check is made on `model`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert(&self, model: &str, ton_co2eq: Option<f64>) -> Result<RecordId> {
        self.conn.execute(
            "INSERT INTO emission_factor (model, ton_co2eq, updated_at) VALUES (?1, ?2, ?3)",
            params![model, ton_co2eq, now_timestamp()],
        )?;

        let id = RecordId::new(self.conn.last_insert_rowid());
        debug!("Inserted emission factor with id {}", id);
        Ok(id)
    }

    /// Get an emission factor by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, id: RecordId) -> Result<Option<EmissionFactor>> {
        let sql = format!("SELECT {FACTOR_COLUMNS} FROM emission_factor WHERE id = ?1");
        let result = self
            .conn
            .query_row(&sql, [id.get()], Self::row_to_factor)
            .optional()?;
        Ok(result)
    }

    /// Get all emission factors in natural order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_all(&self) -> Result<Vec<EmissionFactor>> {
        let sql = format!("SELECT {FACTOR_COLUMNS} FROM emission_factor ORDER BY id ASC");
        self.query_factors(&sql)
    }

    /// Find the first emission factor whose model matches exactly.
    ///
    /// Matching is case-sensitive. When several records share the model,
    /// the one inserted first is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn find_by_model(&self, model: &str) -> Result<Option<EmissionFactor>> {
        let sql = format!(
            "SELECT {FACTOR_COLUMNS} FROM emission_factor WHERE model = ?1 ORDER BY id ASC LIMIT 1"
        );
        let result = self
            .conn
            .query_row(&sql, [model], Self::row_to_factor)
            .optional()?;
        Ok(result)
    }

    /// Get all emission factors ordered by tonnage.
    ///
    /// Ties keep natural order. Empty values sort before every number when
    /// ascending and after every number when descending.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn sorted(&self, order: SortOrder) -> Result<Vec<EmissionFactor>> {
        let sql = format!(
            "SELECT {FACTOR_COLUMNS} FROM emission_factor ORDER BY ton_co2eq {}, id ASC",
            order.as_sql()
        );
        self.query_factors(&sql)
    }

    /// Overwrite the model and tonnage of an emission factor.
    ///
    /// Returns `true` if a record was updated, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn update(&self, id: RecordId, model: &str, ton_co2eq: Option<f64>) -> Result<bool> {
        let affected = self.conn.execute(
            "UPDATE emission_factor SET model = ?1, ton_co2eq = ?2, updated_at = ?3 WHERE id = ?4",
            params![model, ton_co2eq, now_timestamp(), id.get()],
        )?;
        Ok(affected > 0)
    }

    /// Delete an emission factor by ID.
    ///
    /// Returns `true` if a record was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete(&self, id: RecordId) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM emission_factor WHERE id = ?1", [id.get()])?;
        Ok(affected > 0)
    }

    /// Mean tonnage over every emission factor that has one.
    ///
    /// Returns `None` when there is nothing to average.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn average_ton_co2eq(&self) -> Result<Option<f64>> {
        let average: Option<f64> =
            self.conn
                .query_row("SELECT AVG(ton_co2eq) FROM emission_factor", [], |row| {
                    row.get(0)
                })?;
        Ok(average)
    }

    /// Count emission factors in storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM emission_factor", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Get all yearly emissions in natural order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_yearly(&self) -> Result<Vec<YearlyEmission>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, year, ton_co2eq FROM greenhouse_gas_emissions_by_year ORDER BY id ASC",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(YearlyEmission {
                    id: RecordId::new(row.get(0)?),
                    year: row.get(1)?,
                    ton_co2eq: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Count yearly emissions in storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count_yearly(&self) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM greenhouse_gas_emissions_by_year",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let last: Option<String> = self.conn.query_row(
            "SELECT MAX(updated_at) FROM emission_factor",
            [],
            |row| row.get(0),
        )?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            emission_factors: self.count()?,
            yearly_emissions: self.count_yearly()?,
            average_ton_co2eq: self.average_ton_co2eq()?,
            last_updated: last.as_deref().and_then(parse_timestamp),
            db_size_bytes,
        })
    }

    fn query_factors(&self, sql: &str) -> Result<Vec<EmissionFactor>> {
        let mut stmt = self.conn.prepare(sql)?;
        let factors = stmt
            .query_map([], Self::row_to_factor)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(factors)
    }

    /// Convert a database row to an `EmissionFactor`.
    fn row_to_factor(row: &rusqlite::Row) -> rusqlite::Result<EmissionFactor> {
        let id: i64 = row.get(0)?;
        let model: String = row.get(1)?;
        let ton_co2eq: Option<f64> = row.get(2)?;
        let updated_at_str: String = row.get(3)?;

        let updated_at = parse_timestamp(&updated_at_str).unwrap_or_else(|| {
            warn!(
                "Unreadable updated_at '{}' on emission factor {}",
                updated_at_str, id
            );
            DateTime::<Utc>::UNIX_EPOCH
        });

        Ok(EmissionFactor {
            id: RecordId::new(id),
            model,
            ton_co2eq,
            updated_at,
        })
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageStats {
    /// Number of emission factors stored.
    pub emission_factors: i64,
    /// Number of yearly emission rows stored.
    pub yearly_emissions: i64,
    /// Current mean tonnage, if any.
    pub average_ton_co2eq: Option<f64>,
    /// Most recent insert or update.
    pub last_updated: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
