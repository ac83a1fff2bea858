use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use voxmod_client::{Credentials, PollConfig};

/// Full runtime configuration: TOML + env vars + flag overrides.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub poll: PollSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Base URL of the speech service instance.
    pub url: String,
    /// API key; sent as the basic-auth password under the literal user "apikey".
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollSettings {
    /// Milliseconds between training-status probes.
    pub train_interval_ms: u64,
    /// Milliseconds between deletion-confirmation probes.
    pub probe_interval_ms: u64,
    /// Optional bound on how long any wait loop may run. Absent by default:
    /// the baseline behaviour is to wait as long as the service takes.
    #[serde(default)]
    pub deadline_secs: Option<u64>,
}

impl AppConfig {
    /// Explicit credentials for the client library.
    pub fn credentials(&self) -> anyhow::Result<Credentials> {
        if self.service.url.is_empty() {
            anyhow::bail!(
                "no service URL configured; pass --url, set VOXMOD_SERVICE__URL, \
                 or run `voxmod interactive` once to save one"
            );
        }
        if self.service.api_key.is_empty() {
            anyhow::bail!(
                "no API key configured; pass --api-key, set VOXMOD_SERVICE__API_KEY, \
                 or run `voxmod interactive` once to save one"
            );
        }
        Ok(Credentials::new(&self.service.url, &self.service.api_key))
    }

    /// Polling strategy for training waits. A per-invocation deadline (e.g.
    /// the `--timeout` flag) overrides the configured one.
    pub fn train_poll(&self, deadline_override: Option<u64>) -> PollConfig {
        poll_config(
            self.poll.train_interval_ms,
            deadline_override.or(self.poll.deadline_secs),
        )
    }

    /// Polling strategy for deletion-confirmation probes.
    pub fn probe_poll(&self) -> PollConfig {
        poll_config(self.poll.probe_interval_ms, self.poll.deadline_secs)
    }
}

fn poll_config(interval_ms: u64, deadline_secs: Option<u64>) -> PollConfig {
    let cfg = PollConfig::every(Duration::from_millis(interval_ms));
    match deadline_secs {
        Some(secs) => cfg.with_deadline(Duration::from_secs(secs)),
        None => cfg,
    }
}

/// Load configuration from:
/// 1. Built-in defaults
/// 2. The user config file (`~/.config/voxmod/config.toml`), if present
/// 3. A custom config file path (if provided)
/// 4. Environment variables prefixed with `VOXMOD_`, with `__` between the
///    table and the key (`VOXMOD_SERVICE__API_KEY`, `VOXMOD_POLL__TRAIN_INTERVAL_MS`)
/// 5. `--url` / `--api-key` flag overrides
pub fn load_config(
    config_file: Option<&PathBuf>,
    url: Option<&str>,
    api_key: Option<&str>,
) -> Result<AppConfig, ConfigError> {
    load_layers(&user_config_path(), "VOXMOD", config_file, url, api_key)
}

// The user-file path and env prefix are injected so tests can run against a
// scratch directory and a private prefix instead of the real home dir and
// any VOXMOD_* variables set on the machine.
fn load_layers(
    user_file: &Path,
    env_prefix: &str,
    config_file: Option<&PathBuf>,
    url: Option<&str>,
    api_key: Option<&str>,
) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder()
        // Layer 1: defaults baked in
        .set_default("service.url", "")?
        .set_default("service.api_key", "")?
        .set_default("poll.train_interval_ms", 100_i64)?
        .set_default("poll.probe_interval_ms", 10_i64)?
        // Layer 2: persistent user config
        .add_source(File::from(user_file).required(false));

    // Layer 3: optional user-supplied config file
    if let Some(path) = config_file {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    // Layer 4: environment variables. A single underscore ends the prefix;
    // nesting needs a double underscore, otherwise keys with underscores of
    // their own (api_key, train_interval_ms) would be split apart and lost.
    builder = builder.add_source(
        Environment::with_prefix(env_prefix)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // Layer 5: command-line overrides
    if let Some(url) = url {
        builder = builder.set_override("service.url", url)?;
    }
    if let Some(key) = api_key {
        builder = builder.set_override("service.api_key", key)?;
    }

    builder.build()?.try_deserialize()
}

/// Path of the persistent user configuration file.
pub fn user_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("voxmod")
        .join("config.toml")
}

#[derive(Serialize)]
struct SavedConfig {
    service: ServiceConfig,
}

/// Persist the service credentials for future runs.
///
/// Only the `[service]` table is written; polling settings keep their
/// defaults unless the file is edited by hand. Returns the path written.
pub fn save_credentials(url: &str, api_key: &str) -> anyhow::Result<PathBuf> {
    let path = user_config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let saved = SavedConfig {
        service: ServiceConfig {
            url: url.to_string(),
            api_key: api_key.to_string(),
        },
    };
    let body = toml::to_string_pretty(&saved)?;
    std::fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}
