//! Configuration management for ailang
//!
//! Stores settings in ~/.config/ailang/config.json

use crate::llm::models::{DEFAULT_HF_MODEL, DEFAULT_OPENROUTER_MODEL};
use crate::llm::Provider;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Active provider; `None` until the first-run setup picks one
    pub provider: Option<Provider>,
    pub hf_api_key: String,
    pub openrouter_api_key: String,
    pub hf_model: String,
    pub openrouter_model: String,
    /// Project directories created by `make`/`interactive`, in creation order.
    /// `clean` removes each of these and resets the list.
    pub project_dirs: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: None,
            hf_api_key: String::new(),
            openrouter_api_key: String::new(),
            hf_model: DEFAULT_HF_MODEL.to_string(),
            openrouter_model: DEFAULT_OPENROUTER_MODEL.to_string(),
            project_dirs: Vec::new(),
        }
    }
}

impl Config {
    /// Default config file location (~/.config/ailang/config.json)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ailang").join("config.json"))
    }

    /// Load config from disk, or return defaults.
    ///
    /// A malformed file is preserved as a `.corrupt` sibling and replaced by
    /// defaults; prior values are not recovered. This never fails.
    pub fn load(path: &Path) -> Self {
        if let Ok(content) = fs::read_to_string(path) {
            match serde_json::from_str(&content) {
                Ok(config) => return config,
                Err(err) => {
                    preserve_corrupt_config(path, &content);
                    eprintln!(
                        "  Warning: Config file was corrupted ({}). A backup was saved and defaults were loaded.",
                        err
                    );
                }
            }
        }
        Self::default()
    }

    /// Save config to disk, overwriting the file entirely.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory {}", dir.display()))?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        #[cfg(unix)]
        write_config_atomic(path, &content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        #[cfg(not(unix))]
        fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        Ok(())
    }

    pub fn api_key(&self, provider: Provider) -> &str {
        match provider {
            Provider::HuggingFace => &self.hf_api_key,
            Provider::OpenRouter => &self.openrouter_api_key,
        }
    }

    pub fn set_api_key(&mut self, provider: Provider, key: String) {
        match provider {
            Provider::HuggingFace => self.hf_api_key = key,
            Provider::OpenRouter => self.openrouter_api_key = key,
        }
    }

    pub fn model(&self, provider: Provider) -> &str {
        match provider {
            Provider::HuggingFace => &self.hf_model,
            Provider::OpenRouter => &self.openrouter_model,
        }
    }

    pub fn set_model(&mut self, provider: Provider, model_id: String) {
        match provider {
            Provider::HuggingFace => self.hf_model = model_id,
            Provider::OpenRouter => self.openrouter_model = model_id,
        }
    }

    /// Record a project directory so `clean` can find it later. Keeps order,
    /// skips duplicates.
    pub fn record_project_dir(&mut self, dir: PathBuf) {
        if !self.project_dirs.contains(&dir) {
            self.project_dirs.push(dir);
        }
    }
}

fn preserve_corrupt_config(path: &Path, content: &str) {
    let corrupt_path = path.with_extension("json.corrupt");
    if fs::rename(path, &corrupt_path).is_err() {
        let _ = fs::write(&corrupt_path, content);
    }
}

/// Write via temp file + rename so a crash mid-save never leaves a truncated
/// config. The file carries API keys, so it is created mode 0600.
#[cfg(unix)]
fn write_config_atomic(path: &Path, content: &str) -> Result<()> {
    use std::fs::OpenOptions;
    use std::os::unix::fs::PermissionsExt;

    let tmp_path = path.with_extension("tmp");
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp_path)?;

    if let Err(e) = file.set_permissions(fs::Permissions::from_mode(0o600)) {
        eprintln!("  Warning: Failed to set config file permissions: {}", e);
    }

    file.write_all(content.as_bytes())?;

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err.into());
    }
    Ok(())
}
