//! Application state - Dependency injection container.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::Database;
use crate::services::{OrderManager, OrderService};
use crate::types::FaultMapping;

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Order service
    pub order_service: Arc<dyn OrderService>,
    /// Status used for generic failures on list endpoints
    pub fault_mapping: FaultMapping,
    /// Database pool, absent when services are injected manually
    pub database: Option<Arc<Database>>,
}

impl AppState {
    /// Create application state from a connected database and config.
    pub fn from_config(database: Arc<Database>, config: &Config) -> Self {
        let orders = OrderManager::new(database.get_connection(), config.isolation_level);

        Self {
            order_service: Arc::new(orders),
            fault_mapping: config.fault_mapping,
            database: Some(database),
        }
    }

    /// Create application state with a manually injected service.
    pub fn new(order_service: Arc<dyn OrderService>, fault_mapping: FaultMapping) -> Self {
        Self {
            order_service,
            fault_mapping,
            database: None,
        }
    }
}
