//! REST data access - Generic repository and unit of work over SeaORM
//!
//! A typed repository serves filtered, ordered and paged reads of any
//! entity, and stages adds, updates and deletes in a unit of work that is
//! validated and committed atomically on an explicit flush. An `orders`
//! HTTP resource sits on top as a thin consumer.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **infra**: Store handle, transactions, repositories and unit of work
//! - **services**: Application use cases over the repositories
//! - **api**: HTTP handlers and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve --port 3000
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use errors::{AppError, AppResult, ValidationFailure};
pub use infra::{
    DataRepository, FlushOutcome, Predicate, Record, RecordEntity, Repository, StoreHandle,
};
pub use types::{Page, PageRequest};
