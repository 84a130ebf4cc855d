use sea_orm_migration::prelude::*;

use super::{
  m20260301_000001_create_users::Users,
  m20260301_000002_create_products::Products,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    // No unique (user_id, product_id): repeated reviews are kept
    manager
      .create_table(
        Table::create()
          .table(Feedbacks::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Feedbacks::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Feedbacks::ProductId).integer().not_null())
          .col(ColumnDef::new(Feedbacks::UserId).integer().null())
          .col(ColumnDef::new(Feedbacks::Rating).integer().not_null())
          .col(ColumnDef::new(Feedbacks::Comment).text().null())
          .col(
            ColumnDef::new(Feedbacks::Approved)
              .boolean()
              .not_null()
              .default(true),
          )
          .col(ColumnDef::new(Feedbacks::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_feedbacks_product")
              .from(Feedbacks::Table, Feedbacks::ProductId)
              .to(Products::Table, Products::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_feedbacks_user")
              .from(Feedbacks::Table, Feedbacks::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::SetNull),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_feedbacks_product")
          .table(Feedbacks::Table)
          .col(Feedbacks::ProductId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Feedbacks::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Feedbacks {
  Table,
  Id,
  ProductId,
  UserId,
  Rating,
  Comment,
  Approved,
  CreatedAt,
}
