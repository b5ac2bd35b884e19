//! Unit of Work: staged changes committed on an explicit flush.
//!
//! `add`, `update` and `delete` only record intent in a [`ChangeTracker`].
//! Nothing touches the store until the owning repository flushes, at which
//! point every staged entry is validated and replayed in staging order
//! inside one transaction.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use sea_orm::{ConnectionTrait, QueryFilter};
use validator::Validate;

use crate::errors::{AppError, AppResult, ValidationFailure};
use crate::infra::repositories::{
    active_model_from, identity_condition, store_assigns_identity, Record, RecordEntity,
};

/// What a staged entry will do at flush time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

/// Caller-visible list of validation messages for one staged update.
///
/// Cleared when a flush starts and filled only if that flush rejects the
/// record.
#[derive(Debug, Clone, Default)]
pub struct ErrorSlot(Arc<Mutex<Vec<String>>>);

impl ErrorSlot {
    pub fn errors(&self) -> Vec<String> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).is_empty()
    }

    fn fill(&self, failure: &ValidationFailure) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(failure.messages());
    }

    fn clear(&self) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

/// A pending change and the record it applies to.
#[derive(Debug, Clone)]
pub struct StagedChange<R> {
    pub record: R,
    pub kind: ChangeKind,
    slot: Option<ErrorSlot>,
}

impl<R> StagedChange<R> {
    fn new(record: R, kind: ChangeKind, slot: Option<ErrorSlot>) -> Self {
        Self { record, kind, slot }
    }

    fn report(&self, failure: &ValidationFailure) {
        if let Some(slot) = &self.slot {
            slot.fill(failure);
        }
    }
}

/// Ordered buffer of staged changes with an identity index.
///
/// Added records are not indexed: their identity is assigned by the store
/// at flush time. A second update or delete of the same identity replaces
/// the staged entry in place.
pub struct ChangeTracker<R: Record> {
    entries: Vec<StagedChange<R>>,
    index: HashMap<R::Id, usize>,
}

impl<R: Record> Default for ChangeTracker<R> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<R: Record> ChangeTracker<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, record: R) {
        self.entries
            .push(StagedChange::new(record, ChangeKind::Added, None));
    }

    pub fn update(&mut self, record: R) {
        self.stage_keyed(record, ChangeKind::Modified, None);
    }

    pub fn update_reporting(&mut self, record: R) -> ErrorSlot {
        let slot = ErrorSlot::default();
        self.stage_keyed(record, ChangeKind::Modified, Some(slot.clone()));
        slot
    }

    pub fn delete(&mut self, record: R) {
        self.stage_keyed(record, ChangeKind::Deleted, None);
    }

    fn stage_keyed(&mut self, record: R, kind: ChangeKind, slot: Option<ErrorSlot>) {
        let id = record.id();
        let change = StagedChange::new(record, kind, slot);
        match self.index.get(&id) {
            Some(&position) => self.entries[position] = change,
            None => {
                self.index.insert(id, self.entries.len());
                self.entries.push(change);
            }
        }
    }

    /// Drop the keyed entry for `id`, if any.
    pub fn forget(&mut self, id: &R::Id) -> bool {
        let Some(position) = self.index.remove(id) else {
            return false;
        };
        self.entries.remove(position);
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        true
    }

    pub fn pending(&self) -> &[StagedChange<R>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Owned copy of the staged entries for replay.
    pub(crate) fn snapshot(&self) -> Vec<StagedChange<R>> {
        self.entries.clone()
    }
}

/// Result of a successful flush.
#[derive(Debug, Clone)]
pub struct FlushOutcome<R> {
    /// Rows inserted, updated or deleted.
    pub affected: u64,
    /// Rows inserted by the flush as stored, in staging order.
    pub inserted: Vec<R>,
}

impl<R> FlushOutcome<R> {
    pub fn empty() -> Self {
        Self {
            affected: 0,
            inserted: Vec::new(),
        }
    }
}

/// What replaying one staged entry did to the store.
pub(crate) enum Written<R> {
    Rows(u64),
    Inserted(R),
}

/// Validate then replay `changes` on `db`.
///
/// Every Added/Modified record is validated before anything is written and
/// all violations are reported together. The caller owns the transaction.
pub(crate) async fn apply<E, C>(
    db: &C,
    changes: &[StagedChange<E::Model>],
) -> AppResult<FlushOutcome<E::Model>>
where
    E: RecordEntity,
    C: ConnectionTrait,
{
    for change in changes {
        if let Some(slot) = &change.slot {
            slot.clear();
        }
    }

    let mut failure = ValidationFailure::default();
    for change in changes.iter().filter(|c| c.kind != ChangeKind::Deleted) {
        if let Err(errors) = change.record.validate() {
            let rejected = ValidationFailure::from(&errors);
            change.report(&rejected);
            failure.extend(rejected);
        }
    }
    if !failure.is_empty() {
        return Err(AppError::Validation(failure));
    }

    let mut outcome = FlushOutcome::empty();
    for change in changes {
        let written = match change.kind {
            ChangeKind::Added => insert::<E, C>(db, &change.record).await.map(Written::Inserted),
            ChangeKind::Modified => upsert::<E, C>(db, &change.record).await,
            ChangeKind::Deleted => remove::<E, C>(db, &change.record).await.map(Written::Rows),
        };

        match written {
            Ok(Written::Rows(rows)) => outcome.affected += rows,
            Ok(Written::Inserted(record)) => {
                outcome.affected += 1;
                outcome.inserted.push(record);
            }
            Err(err) => {
                if let AppError::Validation(rejected) = &err {
                    change.report(rejected);
                }
                return Err(err);
            }
        }
    }

    tracing::debug!(
        entries = changes.len(),
        affected = outcome.affected,
        inserted = outcome.inserted.len(),
        "Replayed staged changes"
    );
    Ok(outcome)
}

/// Insert a new row and read it back. Store-assigned identities are left
/// to the store.
pub(crate) async fn insert<E, C>(db: &C, record: &E::Model) -> AppResult<E::Model>
where
    E: RecordEntity,
    C: ConnectionTrait,
{
    let model = active_model_from::<E>(record, !store_assigns_identity::<E>());
    let inserted = E::insert(model).exec(db).await?;

    E::find_by_id(inserted.last_insert_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::internal("Inserted row could not be read back"))
}

/// Update the row with the record's identity, inserting it when absent.
///
/// An absent row of a store-assigned identity gets a fresh identity from the
/// store; the record's own key is not sent.
pub(crate) async fn upsert<E, C>(db: &C, record: &E::Model) -> AppResult<Written<E::Model>>
where
    E: RecordEntity,
    C: ConnectionTrait,
{
    let updated = E::update_many()
        .set(active_model_from::<E>(record, false))
        .filter(identity_condition::<E>(record))
        .exec(db)
        .await?;

    if updated.rows_affected > 0 {
        return Ok(Written::Rows(updated.rows_affected));
    }

    insert::<E, C>(db, record).await.map(Written::Inserted)
}

/// Delete the row with the record's identity. A missing row affects nothing.
pub(crate) async fn remove<E, C>(db: &C, record: &E::Model) -> AppResult<u64>
where
    E: RecordEntity,
    C: ConnectionTrait,
{
    let deleted = E::delete_many()
        .filter(identity_condition::<E>(record))
        .exec(db)
        .await?;
    Ok(deleted.rows_affected)
}
