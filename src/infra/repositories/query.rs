//! Query engine: filtered, ordered and paged reads.
//!
//! Filters are built with [`Predicate`], a small typed expression builder
//! translated into a SQL condition. Ordering keys are entity columns.

use std::fmt;
use std::marker::PhantomData;

use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, Iterable, Order, PaginatorTrait,
    PrimaryKeyToColumn, QueryFilter, QueryOrder, QuerySelect, Select, Value,
};

use super::base::{KeyColumn, RecordEntity};
use crate::errors::AppResult;
use crate::types::{Page, PageRequest};

/// Boolean filter over the records of entity `E`.
pub struct Predicate<E: EntityTrait> {
    condition: Condition,
    _entity: PhantomData<fn() -> E>,
}

impl<E: EntityTrait> Predicate<E> {
    fn from_condition(condition: Condition) -> Self {
        Self {
            condition,
            _entity: PhantomData,
        }
    }

    /// Matches every record.
    pub fn all() -> Self {
        Self::from_condition(Condition::all())
    }

    pub fn eq<V: Into<Value>>(column: E::Column, value: V) -> Self {
        Self::from_condition(Condition::all().add(column.eq(value)))
    }

    pub fn ne<V: Into<Value>>(column: E::Column, value: V) -> Self {
        Self::from_condition(Condition::all().add(column.ne(value)))
    }

    pub fn gt<V: Into<Value>>(column: E::Column, value: V) -> Self {
        Self::from_condition(Condition::all().add(column.gt(value)))
    }

    pub fn gte<V: Into<Value>>(column: E::Column, value: V) -> Self {
        Self::from_condition(Condition::all().add(column.gte(value)))
    }

    pub fn lt<V: Into<Value>>(column: E::Column, value: V) -> Self {
        Self::from_condition(Condition::all().add(column.lt(value)))
    }

    pub fn lte<V: Into<Value>>(column: E::Column, value: V) -> Self {
        Self::from_condition(Condition::all().add(column.lte(value)))
    }

    /// Inclusive range.
    pub fn between<V: Into<Value>>(column: E::Column, low: V, high: V) -> Self {
        Self::from_condition(Condition::all().add(column.between(low, high)))
    }

    pub fn is_in<V, I>(column: E::Column, values: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Self::from_condition(Condition::all().add(column.is_in(values)))
    }

    /// Substring match (`LIKE '%text%'`).
    pub fn contains(column: E::Column, text: &str) -> Self {
        Self::from_condition(Condition::all().add(column.contains(text)))
    }

    pub fn is_null(column: E::Column) -> Self {
        Self::from_condition(Condition::all().add(column.is_null()))
    }

    pub fn is_not_null(column: E::Column) -> Self {
        Self::from_condition(Condition::all().add(column.is_not_null()))
    }

    pub fn and(self, other: Predicate<E>) -> Self {
        Self::from_condition(Condition::all().add(self.condition).add(other.condition))
    }

    pub fn or(self, other: Predicate<E>) -> Self {
        Self::from_condition(Condition::any().add(self.condition).add(other.condition))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::from_condition(self.condition.not())
    }

    pub(crate) fn into_condition(self) -> Condition {
        self.condition
    }
}

impl<E: EntityTrait> Clone for Predicate<E> {
    fn clone(&self) -> Self {
        Self::from_condition(self.condition.clone())
    }
}

impl<E: EntityTrait> fmt::Debug for Predicate<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.condition).finish()
    }
}

impl<E: EntityTrait> Default for Predicate<E> {
    fn default() -> Self {
        Self::all()
    }
}

/// Base select, filtered when a predicate is given.
fn filtered<E: EntityTrait>(predicate: Option<Predicate<E>>) -> Select<E> {
    match predicate {
        Some(predicate) => E::find().filter(predicate.into_condition()),
        None => E::find(),
    }
}

/// First record matching `predicate`.
pub async fn get_single<E, C>(db: &C, predicate: Predicate<E>) -> AppResult<Option<E::Model>>
where
    E: RecordEntity,
    C: ConnectionTrait,
{
    Ok(filtered(Some(predicate)).one(db).await?)
}

/// Every record matching `predicate`, or every record when `None`.
pub async fn get_all<E, C>(db: &C, predicate: Option<Predicate<E>>) -> AppResult<Vec<E::Model>>
where
    E: RecordEntity,
    C: ConnectionTrait,
{
    let records = filtered(predicate).all(db).await?;
    tracing::debug!(rows = records.len(), "Fetched records");
    Ok(records)
}

pub async fn count<E, C>(db: &C, predicate: Option<Predicate<E>>) -> AppResult<u64>
where
    E: RecordEntity,
    C: ConnectionTrait,
{
    Ok(filtered(predicate).count(db).await?)
}

/// One page of the filtered set ordered by `key`.
///
/// Identity columns break ties in the same direction, so the ascending and
/// descending orders of one filtered set are exact reverses.
pub async fn get_page<E, C>(
    db: &C,
    predicate: Option<Predicate<E>>,
    request: PageRequest,
    key: KeyColumn<E>,
    ascending: bool,
) -> AppResult<Page<E::Model>>
where
    E: RecordEntity,
    C: ConnectionTrait,
{
    let page_size = request.effective_page_size(predicate.is_some());
    let select = filtered(predicate);

    let total_row_count = select.clone().count(db).await?;
    let window = request.window(page_size, total_row_count);
    if window.offset >= total_row_count {
        tracing::debug!(
            page = window.page_number,
            total = total_row_count,
            "Page starts past the last row"
        );
        return Ok(Page::new(Vec::new(), window, total_row_count));
    }

    let order = if ascending { Order::Asc } else { Order::Desc };
    let mut select = select.order_by(key, order.clone());
    for primary_key in E::PrimaryKey::iter() {
        select = select.order_by(primary_key.into_column(), order.clone());
    }

    let records = select
        .offset(window.offset)
        .limit(window.page_size)
        .all(db)
        .await?;

    tracing::debug!(
        page = window.page_number,
        page_size = window.page_size,
        total = total_row_count,
        rows = records.len(),
        "Fetched page"
    );

    Ok(Page::new(records, window, total_row_count))
}
