//! Explicit application context
//!
//! Configuration, its on-disk location, and the workspace directory travel
//! together through every operation instead of living in process globals,
//! so tests can run against isolated paths.

use crate::config::Config;
use anyhow::Result;
use std::path::PathBuf;

pub struct AppContext {
    pub config: Config,
    pub config_path: PathBuf,
    /// Directory under which project folders are created
    pub workspace: PathBuf,
}

impl AppContext {
    pub fn new(config: Config, config_path: PathBuf, workspace: PathBuf) -> Self {
        Self {
            config,
            config_path,
            workspace,
        }
    }

    /// Persist the current configuration to its recorded location.
    pub fn save_config(&self) -> Result<()> {
        self.config.save(&self.config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Provider;

    #[test]
    fn test_save_config_writes_to_recorded_path() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");

        let mut ctx = AppContext::new(
            Config::default(),
            config_path.clone(),
            dir.path().to_path_buf(),
        );
        ctx.config.provider = Some(Provider::HuggingFace);
        ctx.save_config().unwrap();

        let loaded = Config::load(&config_path);
        assert_eq!(loaded.provider, Some(Provider::HuggingFace));
    }
}
