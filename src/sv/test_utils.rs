//! Shared test utilities for database setup

#[cfg(test)]
pub mod test_db {
  use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, DbBackend, EntityTrait,
    Schema,
  };

  use crate::entity::*;

  /// Creates an in-memory SQLite database with all required tables
  pub async fn setup() -> DatabaseConnection {
    let db = empty().await;

    // Parents before children, foreign keys are enforced
    create_table(&db, user::Entity).await;
    create_table(&db, product::Entity).await;
    create_table(&db, order::Entity).await;
    create_table(&db, order_item::Entity).await;
    create_table(&db, feedback::Entity).await;

    db
  }

  /// In-memory SQLite database without any tables
  pub async fn empty() -> DatabaseConnection {
    Database::connect("sqlite::memory:").await.unwrap()
  }

  pub async fn create_table<E: EntityTrait>(
    db: &DatabaseConnection,
    entity: E,
  ) {
    let schema = Schema::new(DbBackend::Sqlite);
    let stmt = schema.create_table_from_entity(entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();
  }
}
