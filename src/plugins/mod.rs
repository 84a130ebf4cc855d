pub mod bootstrap;
pub mod server;

use std::sync::Arc;

use anyhow::Context;

use crate::state::AppState;

#[async_trait::async_trait]
pub trait Plugin: Send + Sync {
  fn name(&self) -> &'static str {
    std::any::type_name::<Self>()
  }

  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()>;
}

/// Starts plugins in registration order. A failing plugin aborts startup.
pub struct App {
  plugins: Vec<Box<dyn Plugin>>,
}

impl App {
  pub fn new() -> Self {
    Self { plugins: Vec::new() }
  }

  pub fn register<P: Plugin + 'static>(mut self, plugin: P) -> Self {
    self.plugins.push(Box::new(plugin));
    self
  }

  pub async fn run(self, app: Arc<AppState>) -> anyhow::Result<()> {
    for plugin in self.plugins {
      let name = plugin.name();

      tracing::info!("init `{}`", name);

      plugin
        .start(app.clone())
        .await
        .with_context(|| format!("failed `{name}`"))?;
    }
    Ok(())
  }
}
