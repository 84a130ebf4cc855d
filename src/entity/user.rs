use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::feedback;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
  #[sea_orm(string_value = "user")]
  #[default]
  User,
  #[sea_orm(string_value = "admin")]
  Admin,
}

impl UserRole {
  pub fn as_str(&self) -> &'static str {
    match self {
      UserRole::User => "user",
      UserRole::Admin => "admin",
    }
  }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  #[sea_orm(unique)]
  pub email: String,
  pub name: String,
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub role: UserRole,
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
