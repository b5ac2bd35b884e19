//! Sales order entity for SeaORM.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::infra::repositories::{Record, Repository};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Assigned by the store on insert
    #[sea_orm(primary_key)]
    #[serde(default)]
    pub order_id: i32,
    pub customer_id: Option<i32>,
    /// 1 pending, 2 processing, 3 rejected, 4 completed
    #[validate(range(min = 1, max = 4, message = "must be between 1 and 4"))]
    pub order_status: i16,
    pub order_date: Date,
    pub required_date: Date,
    pub shipped_date: Option<Date>,
    #[validate(range(min = 1, message = "must reference a store"))]
    pub store_id: i32,
    #[validate(range(min = 1, message = "must reference a staff member"))]
    pub staff_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Record for Model {
    type Id = i32;

    fn id(&self) -> i32 {
        self.order_id
    }
}

/// A sales order row.
pub type Order = Model;

/// Repository over sales orders.
pub type OrderRepository = Repository<Entity>;
