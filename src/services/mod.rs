//! Application services layer - Use cases over the repositories.
//!
//! Services depend on the generic repository and are themselves exposed as
//! traits so the HTTP layer can be tested against mocks.

mod order_service;

pub use order_service::{OrderFilter, OrderManager, OrderService};
