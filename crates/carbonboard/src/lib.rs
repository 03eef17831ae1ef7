//! `carbonboard` - a server-rendered dashboard for carbon-emission factors
//!
//! This library provides the storage, repository, rendering and HTTP layers
//! behind the `carbonboard` binary: a small CRUD application that records
//! vehicle models with their tonCO2eq figure and charts them.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod model;
pub mod repository;
pub mod storage;
pub mod views;

pub use config::Config;
pub use error::{Error, Result};
pub use http::{build_router, AppState};
pub use logging::init_logging;
pub use model::{EmissionFactor, RecordId, SortOrder, YearlyEmission};
pub use repository::{EmissionRepository, SqliteRepository};
pub use storage::{Storage, StorageStats};
pub use views::{Renderer, View};
