use std::{fs, io, path::Path, time::Duration};

use anyhow::{bail, Context};
use serde::Deserialize;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub request_timeout_ms: u64,
    pub transition_ms: u64,
    pub grid_columns: usize,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5000".into(),
            request_timeout_ms: 10_000,
            transition_ms: 250,
            grid_columns: 3,
            log_filter: "info".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    request_timeout_ms: Option<u64>,
    transition_ms: Option<u64>,
    grid_columns: Option<usize>,
    log_filter: Option<String>,
}

/// Defaults, then the TOML file at `path` if it exists, then the environment.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg: FileSettings = toml::from_str(&raw)
                .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
            settings.apply_file(file_cfg);
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()));
        }
    }

    settings.apply_env(|key| std::env::var(key).ok());
    Ok(settings)
}

impl Settings {
    fn apply_file(&mut self, file_cfg: FileSettings) {
        if let Some(v) = file_cfg.server_url {
            self.server_url = v;
        }
        if let Some(v) = file_cfg.request_timeout_ms {
            self.request_timeout_ms = v;
        }
        if let Some(v) = file_cfg.transition_ms {
            self.transition_ms = v;
        }
        if let Some(v) = file_cfg.grid_columns {
            self.grid_columns = v;
        }
        if let Some(v) = file_cfg.log_filter {
            self.log_filter = v;
        }
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("GALLERY_SERVER_URL") {
            self.server_url = v;
        }
        if let Some(v) = lookup("APP__SERVER_URL") {
            self.server_url = v;
        }

        if let Some(v) = lookup("APP__REQUEST_TIMEOUT_MS") {
            if let Ok(parsed) = v.parse::<u64>() {
                self.request_timeout_ms = parsed;
            }
        }
        if let Some(v) = lookup("APP__TRANSITION_MS") {
            if let Ok(parsed) = v.parse::<u64>() {
                self.transition_ms = parsed;
            }
        }
        if let Some(v) = lookup("APP__GRID_COLUMNS") {
            if let Ok(parsed) = v.parse::<usize>() {
                self.grid_columns = parsed;
            }
        }

        if let Some(v) = lookup("APP__LOG_FILTER") {
            self.log_filter = v;
        }
    }

    pub fn apply_overrides(
        &mut self,
        server_url: Option<String>,
        transition_ms: Option<u64>,
        grid_columns: Option<usize>,
    ) {
        if let Some(v) = server_url {
            self.server_url = v;
        }
        if let Some(v) = transition_ms {
            self.transition_ms = v;
        }
        if let Some(v) = grid_columns {
            self.grid_columns = v;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        Url::parse(self.server_url.trim())
            .with_context(|| format!("invalid server url '{}'", self.server_url))?;
        if self.grid_columns == 0 {
            bail!("grid_columns must be at least 1");
        }
        if self.request_timeout_ms == 0 {
            bail!("request_timeout_ms must be greater than zero");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn transition_duration(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
