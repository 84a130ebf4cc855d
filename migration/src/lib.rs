pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_users;
mod m20260301_000002_create_products;
mod m20260301_000003_create_orders;
mod m20260301_000004_create_feedbacks;
mod m20260312_000005_add_feedback_reply;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20260301_000001_create_users::Migration),
      Box::new(m20260301_000002_create_products::Migration),
      Box::new(m20260301_000003_create_orders::Migration),
      Box::new(m20260301_000004_create_feedbacks::Migration),
      Box::new(m20260312_000005_add_feedback_reply::Migration),
    ]
  }
}
