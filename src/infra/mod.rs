//! Infrastructure layer - External systems integration
//!
//! This module handles all store concerns:
//! - Database pool and per-repository store handles
//! - Transaction boundaries
//! - Generic repositories and their query engine
//! - Unit of Work for staged changes

pub mod db;
pub mod repositories;
pub mod transaction;
pub mod unit_of_work;

pub use db::{Database, StoreHandle};
pub use repositories::{
    DataRepository, Order, OrderRepository, Predicate, Record, RecordEntity, Repository,
};
pub use transaction::within_transaction;
pub use unit_of_work::{ChangeKind, ChangeTracker, ErrorSlot, FlushOutcome, StagedChange};
