//! Repository layer - Data access abstraction
//!
//! A generic repository per record type: transactional reads, staged
//! writes committed by an explicit flush, and immediate attach/detach.

mod base;
pub mod entities;
pub mod query;
mod repository;

pub use base::{DataRepository, KeyColumn, Record, RecordEntity};
pub(crate) use base::{active_model_from, identity_condition, store_assigns_identity};
pub use entities::order::{Order, OrderRepository};
pub use query::Predicate;
pub use repository::Repository;
