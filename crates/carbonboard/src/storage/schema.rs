//! `SQLite` schema definitions for carbonboard.
//!
//! Each document collection maps to one table. Column names are snake_case;
//! the serialized field names live on the model types.

/// SQL statement to create the emission factor table.
pub const CREATE_EMISSION_FACTOR_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS emission_factor (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    model TEXT NOT NULL,
    ton_co2eq REAL,
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
)
";

/// Exact-match lookups by model name.
pub const CREATE_MODEL_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_emission_factor_model ON emission_factor(model)
";

/// Sorted listings by tonnage.
pub const CREATE_TON_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_emission_factor_ton ON emission_factor(ton_co2eq, id)
";

/// SQL statement to create the yearly emission table.
///
/// Nothing in carbonboard writes to it; rows are loaded by whoever owns the
/// reporting data.
pub const CREATE_YEARLY_EMISSION_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS greenhouse_gas_emissions_by_year (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    year INTEGER NOT NULL,
    ton_co2eq REAL
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Statements making up schema version 1.
pub const V1_STATEMENTS: &[&str] = &[
    CREATE_EMISSION_FACTOR_TABLE,
    CREATE_MODEL_INDEX,
    CREATE_TON_INDEX,
    CREATE_YEARLY_EMISSION_TABLE,
];
