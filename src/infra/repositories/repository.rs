//! Generic repository facade.

use async_trait::async_trait;
use sea_orm::IsolationLevel;
use validator::Validate;

use super::base::{DataRepository, KeyColumn, Record, RecordEntity};
use super::query::{self, Predicate};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::db::StoreHandle;
use crate::infra::transaction::within_transaction;
use crate::infra::unit_of_work::{
    self, ChangeTracker, ErrorSlot, FlushOutcome, StagedChange, Written,
};
use crate::types::{Page, PageRequest};

/// Repository over the records of entity `E`.
///
/// Owns one [`StoreHandle`] and one [`ChangeTracker`] for its lifetime.
/// Not meant to be shared between tasks: mutating calls take `&mut self`.
pub struct Repository<E: RecordEntity> {
    store: StoreHandle,
    changes: ChangeTracker<E::Model>,
    isolation: Option<IsolationLevel>,
}

impl<E: RecordEntity> Repository<E> {
    pub fn new(store: StoreHandle) -> Self {
        Self {
            store,
            changes: ChangeTracker::new(),
            isolation: None,
        }
    }

    /// Isolation level used for every transaction this repository opens.
    pub fn with_isolation(mut self, isolation: Option<IsolationLevel>) -> Self {
        self.isolation = isolation;
        self
    }

    /// Repository with its own dedicated pool.
    pub async fn open(config: &Config) -> AppResult<Self> {
        let store = StoreHandle::connect(config).await?;
        Ok(Self::new(store).with_isolation(config.isolation_level))
    }

    pub fn is_disposed(&self) -> bool {
        self.store.is_released()
    }

    fn ensure_open(&self) -> AppResult<()> {
        self.store.connection().map(|_| ())
    }

    async fn read_page(
        &self,
        predicate: Option<Predicate<E>>,
        page: PageRequest,
        key: KeyColumn<E>,
        ascending: bool,
    ) -> AppResult<Page<E::Model>> {
        let db = self.store.connection()?;
        within_transaction(db, self.isolation, "get_all_paged", move |txn| {
            Box::pin(async move { query::get_page::<E, _>(txn, predicate, page, key, ascending).await })
        })
        .await
    }

    async fn read_all(&self, predicate: Option<Predicate<E>>) -> AppResult<Vec<E::Model>> {
        let db = self.store.connection()?;
        within_transaction(db, self.isolation, "get_all", move |txn| {
            Box::pin(async move { query::get_all::<E, _>(txn, predicate).await })
        })
        .await
    }

    async fn read_count(&self, predicate: Option<Predicate<E>>) -> AppResult<u64> {
        let db = self.store.connection()?;
        within_transaction(db, self.isolation, "count", move |txn| {
            Box::pin(async move { query::count::<E, _>(txn, predicate).await })
        })
        .await
    }
}

#[async_trait]
impl<E: RecordEntity> DataRepository<E> for Repository<E> {
    async fn get_single(&self, predicate: Predicate<E>) -> AppResult<Option<E::Model>> {
        let db = self.store.connection()?;
        within_transaction(db, self.isolation, "get_single", move |txn| {
            Box::pin(async move { query::get_single::<E, _>(txn, predicate).await })
        })
        .await
    }

    async fn get_all(&self) -> AppResult<Vec<E::Model>> {
        self.read_all(None).await
    }

    async fn get_all_where(&self, predicate: Predicate<E>) -> AppResult<Vec<E::Model>> {
        self.read_all(Some(predicate)).await
    }

    async fn get_all_paged(
        &self,
        page: PageRequest,
        key: KeyColumn<E>,
        ascending: bool,
    ) -> AppResult<Page<E::Model>> {
        self.read_page(None, page, key, ascending).await
    }

    async fn get_all_paged_where(
        &self,
        predicate: Predicate<E>,
        page: PageRequest,
        key: KeyColumn<E>,
        ascending: bool,
    ) -> AppResult<Page<E::Model>> {
        self.read_page(Some(predicate), page, key, ascending).await
    }

    async fn count(&self) -> AppResult<u64> {
        self.read_count(None).await
    }

    async fn count_where(&self, predicate: Predicate<E>) -> AppResult<u64> {
        self.read_count(Some(predicate)).await
    }

    async fn attach(&mut self, record: E::Model) -> AppResult<E::Model> {
        let db = self.store.connection()?;
        within_transaction(db, self.isolation, "attach", move |txn| {
            Box::pin(async move {
                record.validate().map_err(|e| AppError::validation(&e))?;
                match unit_of_work::upsert::<E, _>(txn, &record).await? {
                    Written::Rows(_) => Ok(record),
                    Written::Inserted(stored) => Ok(stored),
                }
            })
        })
        .await
    }

    async fn detach(&mut self, record: E::Model) -> AppResult<()> {
        let db = self.store.connection()?;
        let id = record.id();
        within_transaction(db, self.isolation, "detach", move |txn| {
            Box::pin(async move {
                unit_of_work::remove::<E, _>(txn, &record).await?;
                Ok(())
            })
        })
        .await?;

        if self.changes.forget(&id) {
            tracing::debug!(?id, "Detached record dropped its staged change");
        }
        Ok(())
    }

    fn add(&mut self, record: E::Model) -> AppResult<()> {
        self.ensure_open()?;
        self.changes.add(record);
        Ok(())
    }

    fn update(&mut self, record: E::Model) -> AppResult<()> {
        self.ensure_open()?;
        self.changes.update(record);
        Ok(())
    }

    fn update_reporting(&mut self, record: E::Model) -> AppResult<ErrorSlot> {
        self.ensure_open()?;
        Ok(self.changes.update_reporting(record))
    }

    fn delete(&mut self, record: E::Model) -> AppResult<()> {
        self.ensure_open()?;
        self.changes.delete(record);
        Ok(())
    }

    async fn flush(&mut self) -> AppResult<FlushOutcome<E::Model>> {
        let db = self.store.connection()?;
        if self.changes.is_empty() {
            return Ok(FlushOutcome::empty());
        }

        let staged = self.changes.snapshot();
        tracing::debug!(entries = staged.len(), "Flushing staged changes");

        let outcome = within_transaction(db, self.isolation, "flush", move |txn| {
            Box::pin(async move { unit_of_work::apply::<E, _>(txn, &staged).await })
        })
        .await?;

        self.changes.clear();
        Ok(outcome)
    }

    fn pending_changes(&self) -> &[StagedChange<E::Model>] {
        self.changes.pending()
    }

    fn discard_changes(&mut self) {
        let dropped = self.changes.len();
        self.changes.clear();
        if dropped > 0 {
            tracing::debug!(dropped, "Discarded staged changes");
        }
    }

    async fn dispose(&mut self) -> AppResult<()> {
        if self.store.is_released() {
            return Ok(());
        }

        if !self.changes.is_empty() {
            tracing::warn!(
                dropped = self.changes.len(),
                "Disposing repository with unflushed changes"
            );
            self.changes.clear();
        }

        self.store.release().await
    }
}
