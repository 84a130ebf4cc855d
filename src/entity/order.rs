use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::order_item;

pub const DEFAULT_STATUS: &str = "Pending";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub customer_name: String,
  pub phone: String,
  pub address: String,
  pub payment_method: String,
  pub delivery_method: String,
  pub subtotal: i64,
  pub discount: i64,
  pub total: i64,
  pub status: String,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "order_item::Entity")]
  Items,
}

impl Related<order_item::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Items.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
