//! Record traits and the generic repository interface.
//!
//! A repository works on exactly one record type. The record is a sea-orm
//! model that exposes a stable identity; its entity's active model is used
//! to write it back.

use std::fmt::Debug;
use std::hash::Hash;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IdenStatic, Iterable, ModelTrait,
    PrimaryKeyToColumn, PrimaryKeyTrait,
};
use validator::Validate;

use super::query::Predicate;
use crate::errors::AppResult;
use crate::infra::unit_of_work::{ErrorSlot, FlushOutcome, StagedChange};
use crate::types::{Page, PageRequest};

/// A persisted row with a stable identity.
///
/// `validate` is the store-side check run before the record is written.
pub trait Record: Clone + Send + Sync + Validate + 'static {
    type Id: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    fn id(&self) -> Self::Id;
}

/// Entity whose model is a [`Record`]. Implemented for every such entity.
pub trait RecordEntity: EntityTrait<Model: Record, ActiveModel: Send + 'static> {}

impl<E> RecordEntity for E where E: EntityTrait<Model: Record, ActiveModel: Send + 'static> {}

/// Ordering key accepted by paged reads.
pub type KeyColumn<E> = <E as EntityTrait>::Column;

/// Generic repository over one record type.
///
/// Reads run in their own transaction. `add`, `update` and `delete` only
/// stage; nothing reaches the store until `flush`. `attach` and `detach`
/// write through immediately.
#[async_trait]
pub trait DataRepository<E: RecordEntity>: Send + Sync {
    /// First record matching `predicate`, `None` when nothing matches.
    async fn get_single(&self, predicate: Predicate<E>) -> AppResult<Option<E::Model>>;

    async fn get_all(&self) -> AppResult<Vec<E::Model>>;

    async fn get_all_where(&self, predicate: Predicate<E>) -> AppResult<Vec<E::Model>>;

    async fn get_all_paged(
        &self,
        page: PageRequest,
        key: KeyColumn<E>,
        ascending: bool,
    ) -> AppResult<Page<E::Model>>;

    async fn get_all_paged_where(
        &self,
        predicate: Predicate<E>,
        page: PageRequest,
        key: KeyColumn<E>,
        ascending: bool,
    ) -> AppResult<Page<E::Model>>;

    async fn count(&self) -> AppResult<u64>;

    async fn count_where(&self, predicate: Predicate<E>) -> AppResult<u64>;

    /// Write the record's current state to the store now. Returns the row
    /// as stored, with its identity.
    async fn attach(&mut self, record: E::Model) -> AppResult<E::Model>;

    /// Remove the record from the store now and forget any staged change for it.
    async fn detach(&mut self, record: E::Model) -> AppResult<()>;

    fn add(&mut self, record: E::Model) -> AppResult<()>;

    fn update(&mut self, record: E::Model) -> AppResult<()>;

    /// Stage an update; the returned slot receives this record's violations
    /// if a later flush is rejected.
    fn update_reporting(&mut self, record: E::Model) -> AppResult<ErrorSlot>;

    fn delete(&mut self, record: E::Model) -> AppResult<()>;

    /// Commit every staged change atomically. Reports the affected row count
    /// and every row inserted by the flush, with its store-assigned identity.
    async fn flush(&mut self) -> AppResult<FlushOutcome<E::Model>>;

    fn pending_changes(&self) -> &[StagedChange<E::Model>];

    fn discard_changes(&mut self);

    /// Release the store handle. Idempotent.
    async fn dispose(&mut self) -> AppResult<()>;
}

/// `pk = value` for every identity column of `record`.
pub(crate) fn identity_condition<E: RecordEntity>(record: &E::Model) -> Condition {
    E::PrimaryKey::iter().fold(Condition::all(), |condition, key| {
        let column = key.into_column();
        condition.add(column.eq(record.get(column)))
    })
}

/// Active model with every column of `record` set; identity columns only
/// when `with_keys` is true.
pub(crate) fn active_model_from<E: RecordEntity>(record: &E::Model, with_keys: bool) -> E::ActiveModel {
    let keys: Vec<String> = E::PrimaryKey::iter()
        .map(|key| key.into_column().as_str().to_owned())
        .collect();

    let mut model = <E::ActiveModel as ActiveModelTrait>::default();
    for column in E::Column::iter() {
        if !with_keys && keys.iter().any(|key| key == column.as_str()) {
            continue;
        }
        model.set(column, record.get(column));
    }
    model
}

/// Whether the store assigns identities on insert.
pub(crate) fn store_assigns_identity<E: RecordEntity>() -> bool {
    <E::PrimaryKey as PrimaryKeyTrait>::auto_increment()
}
