use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{product, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "feedbacks")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub product_id: i32,
  pub user_id: Option<i32>,
  pub rating: i32,
  pub comment: Option<String>,
  pub approved: bool,
  pub created_at: DateTime,
  pub reply: Option<String>,
  pub reply_by: Option<String>,
  pub replied_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "product::Entity",
    from = "Column::ProductId",
    to = "product::Column::Id",
    on_delete = "Cascade"
  )]
  Product,
  #[sea_orm(
    belongs_to = "user::Entity",
    from = "Column::UserId",
    to = "user::Column::Id",
    on_delete = "SetNull"
  )]
  User,
}

impl Related<product::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Product.def()
  }
}

impl Related<user::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::User.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
