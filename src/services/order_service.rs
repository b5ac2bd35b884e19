//! Order service - Handles order-related use cases.
//!
//! Every call opens its own repository over the shared pool and releases it
//! before returning, so no staged change outlives a request.

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, IsolationLevel};
use serde::Deserialize;

use crate::errors::{AppError, AppResult};
use crate::infra::repositories::entities::order::{Column, Entity as OrderEntity};
use crate::infra::{DataRepository, Order, OrderRepository, Predicate, StoreHandle};
use crate::types::{Page, PageRequest};

/// Optional equality filters for order listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OrderFilter {
    pub customer_id: Option<i32>,
    pub store_id: Option<i32>,
    pub order_status: Option<i16>,
}

impl OrderFilter {
    pub fn is_empty(&self) -> bool {
        self.customer_id.is_none() && self.store_id.is_none() && self.order_status.is_none()
    }

    pub fn predicate(&self) -> Predicate<OrderEntity> {
        let mut predicate = Predicate::all();
        if let Some(customer_id) = self.customer_id {
            predicate = predicate.and(Predicate::eq(Column::CustomerId, customer_id));
        }
        if let Some(store_id) = self.store_id {
            predicate = predicate.and(Predicate::eq(Column::StoreId, store_id));
        }
        if let Some(order_status) = self.order_status {
            predicate = predicate.and(Predicate::eq(Column::OrderStatus, order_status));
        }
        predicate
    }
}

/// Order service trait for dependency injection.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Orders matching the filter; empty when none match
    async fn list_orders(&self, filter: OrderFilter) -> AppResult<Vec<Order>>;

    /// One page of orders by order date
    async fn list_orders_paged(
        &self,
        filter: OrderFilter,
        page: PageRequest,
        newest_first: bool,
    ) -> AppResult<Page<Order>>;

    async fn count_orders(&self, filter: OrderFilter) -> AppResult<u64>;

    /// Order by id, `None` when absent
    async fn get_order(&self, id: i32) -> AppResult<Option<Order>>;

    /// Stage and flush a new order; returns it with its assigned id
    async fn create_order(&self, order: Order) -> AppResult<Order>;

    /// Stage and flush an order update (inserted when absent)
    async fn update_order(&self, order: Order) -> AppResult<()>;

    /// Delete an order; `false` when it did not exist
    async fn delete_order(&self, id: i32) -> AppResult<bool>;
}

/// Concrete implementation of OrderService over the generic repository.
pub struct OrderManager {
    db: DatabaseConnection,
    isolation: Option<IsolationLevel>,
}

impl OrderManager {
    pub fn new(db: DatabaseConnection, isolation: Option<IsolationLevel>) -> Self {
        Self { db, isolation }
    }

    fn repository(&self) -> OrderRepository {
        OrderRepository::new(StoreHandle::shared(self.db.clone())).with_isolation(self.isolation)
    }
}

#[async_trait]
impl OrderService for OrderManager {
    async fn list_orders(&self, filter: OrderFilter) -> AppResult<Vec<Order>> {
        let orders = self.repository();
        if filter.is_empty() {
            orders.get_all().await
        } else {
            orders.get_all_where(filter.predicate()).await
        }
    }

    async fn list_orders_paged(
        &self,
        filter: OrderFilter,
        page: PageRequest,
        newest_first: bool,
    ) -> AppResult<Page<Order>> {
        let orders = self.repository();
        if filter.is_empty() {
            orders
                .get_all_paged(page, Column::OrderDate, !newest_first)
                .await
        } else {
            orders
                .get_all_paged_where(filter.predicate(), page, Column::OrderDate, !newest_first)
                .await
        }
    }

    async fn count_orders(&self, filter: OrderFilter) -> AppResult<u64> {
        let orders = self.repository();
        if filter.is_empty() {
            orders.count().await
        } else {
            orders.count_where(filter.predicate()).await
        }
    }

    async fn get_order(&self, id: i32) -> AppResult<Option<Order>> {
        self.repository()
            .get_single(Predicate::eq(Column::OrderId, id))
            .await
    }

    async fn create_order(&self, order: Order) -> AppResult<Order> {
        let mut orders = self.repository();
        let outcome = async {
            orders.add(order)?;
            orders.flush().await
        }
        .await;
        orders.dispose().await?;

        let created = outcome?
            .inserted
            .pop()
            .ok_or_else(|| AppError::internal("Flush reported no inserted order"))?;
        tracing::info!(id = created.order_id, "Order created");
        Ok(created)
    }

    async fn update_order(&self, order: Order) -> AppResult<()> {
        let mut orders = self.repository();
        let id = order.order_id;
        let outcome = async {
            orders.update(order)?;
            orders.flush().await
        }
        .await;
        orders.dispose().await?;

        outcome?;
        tracing::info!(id, "Order updated");
        Ok(())
    }

    async fn delete_order(&self, id: i32) -> AppResult<bool> {
        let mut orders = self.repository();
        let Some(order) = orders.get_single(Predicate::eq(Column::OrderId, id)).await? else {
            return Ok(false);
        };

        let outcome = async {
            orders.delete(order)?;
            orders.flush().await
        }
        .await;
        orders.dispose().await?;

        let affected = outcome?.affected;
        tracing::info!(id, affected, "Order deleted");
        Ok(affected > 0)
    }
}
