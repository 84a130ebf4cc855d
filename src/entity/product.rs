use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::feedback;

/// Catalog entry. `price` and `original_price` are in cents,
/// `rating`/`reviews` are derived from approved feedback.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub name: String,
  pub description: Option<String>,
  pub price: i64,
  pub original_price: Option<i64>,
  pub discount_percent: i32,
  pub rating: f64,
  pub reviews: i32,
  pub image: Option<String>,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "feedback::Entity")]
  Feedbacks,
}

impl Related<feedback::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Feedbacks.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
