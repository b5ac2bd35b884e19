//! Shared fixtures: an in-memory SQLite store with the test tables.

#![allow(dead_code)]

use chrono::NaiveDate;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database as SeaDatabase, DatabaseConnection, DbBackend,
    EntityTrait, Schema,
};

use rest_data_access::infra::repositories::entities::order;
use rest_data_access::infra::{DataRepository, Order, OrderRepository, StoreHandle};

/// Tag table with a unique name, used to trigger store-side failures.
pub mod tag {
    use rest_data_access::Record;
    use sea_orm::entity::prelude::*;
    use validator::Validate;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Validate)]
    #[sea_orm(table_name = "tags")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        #[sea_orm(unique)]
        #[validate(length(min = 1, message = "must not be empty"))]
        pub name: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl Record for Model {
        type Id = i32;

        fn id(&self) -> i32 {
            self.id
        }
    }
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) {
    let schema = Schema::new(DbBackend::Sqlite);
    let statement = db
        .get_database_backend()
        .build(&schema.create_table_from_entity(entity));
    db.execute(statement).await.unwrap();
}

/// Fresh store. One connection so every query sees the same memory database.
pub async fn memory_store() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = SeaDatabase::connect(options).await.unwrap();
    create_table(&db, order::Entity).await;
    create_table(&db, tag::Entity).await;
    db
}

pub fn orders(db: &DatabaseConnection) -> OrderRepository {
    OrderRepository::new(StoreHandle::shared(db.clone()))
}

pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

/// Valid order placed on `day` of January 2024; the store assigns its id.
pub fn new_order(store_id: i32, day: u32) -> Order {
    Order {
        order_id: 0,
        customer_id: Some(100 + store_id),
        order_status: 1,
        order_date: date(day),
        required_date: date(day.min(27) + 1),
        shipped_date: None,
        store_id,
        staff_id: 2,
    }
}

/// Insert `count` orders with ids 1..=count.
///
/// Store ids alternate between 1 and 2, order dates cycle over ten days.
pub async fn seed_orders(db: &DatabaseConnection, count: u32) {
    let mut repo = orders(db);
    for i in 0..count {
        let store_id = if i % 2 == 0 { 1 } else { 2 };
        repo.add(new_order(store_id, 1 + i % 10)).unwrap();
    }
    if count > 0 {
        repo.flush().await.unwrap();
    }
}
