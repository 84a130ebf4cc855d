use anyhow::Context;

use crate::{
  config::Config,
  prelude::*,
  sv::{Auth, Fallback},
};

pub struct AppState {
  pub db: DatabaseConnection,
  pub config: Config,
  pub auth: Auth,
  pub fallback: Fallback,
}

impl AppState {
  /// Connects to the database and brings the schema up to date.
  pub async fn new(config: Config) -> anyhow::Result<Self> {
    let db = Database::connect(&config.db_url)
      .await
      .with_context(|| format!("Failed to connect to {}", config.db_url))?;

    migration::Migrator::up(&db, None)
      .await
      .context("Failed to run migrations")?;

    Ok(Self::with_db(db, config))
  }

  pub fn with_db(db: DatabaseConnection, config: Config) -> Self {
    let auth = Auth::new(&config.jwt_secret, config.token_ttl);
    let fallback = Fallback::new(config.fallback_file.clone());
    Self { db, config, auth, fallback }
  }
}
