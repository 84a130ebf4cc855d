use std::sync::Arc;

use async_trait::async_trait;

use crate::{plugins::Plugin, prelude::*, state::AppState, sv};

/// Makes sure the configured admin account exists before serving requests.
pub struct AdminBootstrap;

#[async_trait]
impl Plugin for AdminBootstrap {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let Some(admin) = &app.config.admin else {
      warn!("No admin configured, admin routes unreachable until one exists");
      return Ok(());
    };

    let user = sv::User::new(&app.db)
      .bootstrap_admin(&admin.email, &admin.password, &admin.name)
      .await?;

    info!("Admin account ready: {} (#{})", user.email, user.id);
    Ok(())
  }
}
