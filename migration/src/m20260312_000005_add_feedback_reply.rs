use sea_orm_migration::prelude::*;

use super::m20260301_000004_create_feedbacks::Feedbacks;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    // SQLite only allows one column per ALTER TABLE
    for mut col in [
      ColumnDef::new(FeedbacksExt::Reply).text().null().to_owned(),
      ColumnDef::new(FeedbacksExt::ReplyBy).string().null().to_owned(),
      ColumnDef::new(FeedbacksExt::RepliedAt).date_time().null().to_owned(),
    ] {
      manager
        .alter_table(
          Table::alter()
            .table(Feedbacks::Table)
            .add_column(&mut col)
            .to_owned(),
        )
        .await?;
    }

    Ok(())
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    for col in
      [FeedbacksExt::RepliedAt, FeedbacksExt::ReplyBy, FeedbacksExt::Reply]
    {
      manager
        .alter_table(
          Table::alter().table(Feedbacks::Table).drop_column(col).to_owned(),
        )
        .await?;
    }

    Ok(())
  }
}

#[derive(DeriveIden)]
enum FeedbacksExt {
  Reply,
  ReplyBy,
  RepliedAt,
}
