//! Command implementations.

pub mod channel;
pub mod check;
pub mod serve;
pub mod tick;
pub mod zone;

use anyhow::Result;
use soawatch_monitor::{Config, LocalStore, Monitor};
use std::sync::Arc;

use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Loaded configuration with the store path resolved
    pub config: Config,

    /// Output format requested on the command line
    pub output: Option<OutputFormat>,
}

impl Context {
    /// Requested output format, or `default`
    pub fn format_or(&self, default: OutputFormat) -> OutputFormat {
        self.output.unwrap_or(default)
    }

    /// Open the local store, creating its directory if needed.
    pub async fn store(&self) -> Result<Arc<LocalStore>> {
        let path = self
            .config
            .store
            .path
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("store.path is not set"))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        Ok(Arc::new(LocalStore::open(path).await?))
    }

    /// Validate the config and build the engine over the local store.
    pub async fn monitor(&self) -> Result<Monitor> {
        self.config.validate()?;
        let store = self.store().await?;
        Ok(Monitor::from_config(&self.config, store)?)
    }
}
