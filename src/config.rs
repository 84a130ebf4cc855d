use std::{env, path::PathBuf};

use anyhow::Context;

use crate::prelude::*;

#[derive(Debug, Clone)]
pub struct Admin {
  pub email: String,
  pub password: String,
  pub name: String,
}

#[derive(Debug, Clone)]
pub struct Config {
  pub db_url: String,
  pub port: u16,
  pub jwt_secret: String,
  pub token_ttl: Duration,
  pub fallback_file: PathBuf,
  pub admin: Option<Admin>,
}

impl Config {
  pub fn from_env() -> anyhow::Result<Self> {
    let db_url = env::var("DATABASE_URL")
      .unwrap_or_else(|_| "sqlite:storefront.db?mode=rwc".into());

    let port =
      env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(3000);

    let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET not set")?;
    if jwt_secret.trim().is_empty() {
      anyhow::bail!("JWT_SECRET is empty");
    }

    let token_ttl = match env::var("TOKEN_TTL") {
      Ok(ttl) => humantime::parse_duration(&ttl)
        .with_context(|| format!("Invalid TOKEN_TTL `{ttl}`"))?,
      Err(_) => Duration::from_secs(7 * 24 * 3600),
    };

    let fallback_file = env::var("ORDERS_FALLBACK_FILE")
      .unwrap_or_else(|_| "data/orders_fallback.json".into())
      .into();

    let admin = match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
      (Ok(email), Ok(password)) => Some(Admin {
        email,
        password,
        name: env::var("ADMIN_NAME").unwrap_or_else(|_| "Admin".into()),
      }),
      _ => {
        debug!("ADMIN_EMAIL/ADMIN_PASSWORD not set, admin bootstrap skipped");
        None
      }
    };

    Ok(Self { db_url, port, jwt_secret, token_ttl, fallback_file, admin })
  }
}
