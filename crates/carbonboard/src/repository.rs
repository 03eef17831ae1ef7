//! Typed async access to the emission collections.
//!
//! Request handlers talk to an [`EmissionRepository`] trait object that is
//! built once at startup and shared through the router state. The `SQLite`
//! implementation runs each call on tokio's blocking pool.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::model::{EmissionFactor, RecordId, SortOrder, YearlyEmission};
use crate::storage::{Storage, StorageStats};

/// Operations the web layer needs from the data store.
#[async_trait]
pub trait EmissionRepository: Send + Sync + std::fmt::Debug {
    /// All emission factors in natural order.
    async fn list_all(&self) -> Result<Vec<EmissionFactor>>;

    /// First emission factor whose model equals `model` exactly.
    async fn find_by_model(&self, model: &str) -> Result<Option<EmissionFactor>>;

    /// Store a new emission factor and return its key.
    async fn insert(&self, model: &str, ton_co2eq: Option<f64>) -> Result<RecordId>;

    /// Overwrite model and tonnage. Returns `false` if `id` matched nothing.
    async fn update_by_id(&self, id: RecordId, model: &str, ton_co2eq: Option<f64>)
        -> Result<bool>;

    /// Remove a record. Returns `false` if `id` matched nothing.
    async fn delete_by_id(&self, id: RecordId) -> Result<bool>;

    /// All emission factors ordered by tonnage, ties in natural order.
    async fn sorted(&self, order: SortOrder) -> Result<Vec<EmissionFactor>>;

    /// Mean tonnage, `None` when there is nothing to average.
    async fn average_ton_co2eq(&self) -> Result<Option<f64>>;

    /// All yearly emissions in natural order.
    async fn list_yearly(&self) -> Result<Vec<YearlyEmission>>;

    /// Collection counts and related figures.
    async fn stats(&self) -> Result<StorageStats>;

    /// Shorthand for an ascending [`EmissionRepository::sorted`].
    async fn sorted_ascending(&self) -> Result<Vec<EmissionFactor>> {
        self.sorted(SortOrder::Ascending).await
    }

    /// Shorthand for a descending [`EmissionRepository::sorted`].
    async fn sorted_descending(&self) -> Result<Vec<EmissionFactor>> {
        self.sorted(SortOrder::Descending).await
    }
}

/// [`EmissionRepository`] backed by a single `SQLite` connection.
#[derive(Debug, Clone)]
pub struct SqliteRepository {
    storage: Arc<Mutex<Storage>>,
}

impl SqliteRepository {
    /// Wrap an already opened storage.
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
        }
    }

    /// Open (or create) the database file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Storage::open(path).map(Self::new)
    }

    /// Open a throwaway in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        Storage::open_in_memory().map(Self::new)
    }

    /// Run `op` against the storage on the blocking pool.
    async fn with_storage<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Storage) -> Result<T> + Send + 'static,
    {
        let storage = Arc::clone(&self.storage);
        tokio::task::spawn_blocking(move || {
            let guard = storage
                .lock()
                .map_err(|_| Error::internal("storage lock poisoned"))?;
            op(&guard)
        })
        .await
        .map_err(|e| Error::internal(format!("storage task failed: {e}")))?
    }
}

#[async_trait]
impl EmissionRepository for SqliteRepository {
    async fn list_all(&self) -> Result<Vec<EmissionFactor>> {
        self.with_storage(Storage::list_all).await
    }

    async fn find_by_model(&self, model: &str) -> Result<Option<EmissionFactor>> {
        let model = model.to_owned();
        self.with_storage(move |s| s.find_by_model(&model)).await
    }

    async fn insert(&self, model: &str, ton_co2eq: Option<f64>) -> Result<RecordId> {
        let model = model.to_owned();
        self.with_storage(move |s| s.insert(&model, ton_co2eq)).await
    }

    async fn update_by_id(
        &self,
        id: RecordId,
        model: &str,
        ton_co2eq: Option<f64>,
    ) -> Result<bool> {
        let model = model.to_owned();
        self.with_storage(move |s| s.update(id, &model, ton_co2eq))
            .await
    }

    async fn delete_by_id(&self, id: RecordId) -> Result<bool> {
        self.with_storage(move |s| s.delete(id)).await
    }

    async fn sorted(&self, order: SortOrder) -> Result<Vec<EmissionFactor>> {
        self.with_storage(move |s| s.sorted(order)).await
    }

    async fn average_ton_co2eq(&self) -> Result<Option<f64>> {
        self.with_storage(Storage::average_ton_co2eq).await
    }

    async fn list_yearly(&self) -> Result<Vec<YearlyEmission>> {
        self.with_storage(Storage::list_yearly).await
    }

    async fn stats(&self) -> Result<StorageStats> {
        self.with_storage(Storage::stats).await
    }
}
