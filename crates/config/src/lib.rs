use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "shopchat.toml",
    "config/shopchat.toml",
    "crates/config/shopchat.toml",
    "../shopchat.toml",
    "../config/shopchat.toml",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub realtime: RealtimeConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            database: DatabaseConfig::default(),
            realtime: RealtimeConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 7080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://shopchat.db".to_string(),
            max_connections: 10,
        }
    }
}

/// Settings for the realtime chat channel.
///
/// ```
/// use shopchat_config::RealtimeConfig;
///
/// let realtime = RealtimeConfig::default();
/// assert_eq!(realtime.outbound_queue_capacity, 64);
/// assert_eq!(realtime.storage_timeout_seconds, 5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Capacity of each connection's outbound event queue. A connection that
    /// cannot drain its queue is disconnected on overflow.
    #[serde(default = "RealtimeConfig::default_queue_capacity")]
    pub outbound_queue_capacity: usize,
    /// Upper bound on individual storage calls made on behalf of a connection.
    #[serde(default = "RealtimeConfig::default_storage_timeout")]
    pub storage_timeout_seconds: u64,
}

impl RealtimeConfig {
    const fn default_queue_capacity() -> usize {
        64
    }

    const fn default_storage_timeout() -> u64 {
        5
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            outbound_queue_capacity: Self::default_queue_capacity(),
            storage_timeout_seconds: Self::default_storage_timeout(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use shopchat_config::load;
///
/// std::env::remove_var("SHOPCHAT_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder();
    builder = builder
        .set_default("http.address", defaults.http.address.clone())
        .unwrap()
        .set_default("http.port", i64::from(defaults.http.port))
        .unwrap()
        .set_default("database.url", defaults.database.url.clone())
        .unwrap()
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )
        .unwrap()
        .set_default(
            "realtime.outbound_queue_capacity",
            defaults.realtime.outbound_queue_capacity as i64,
        )
        .unwrap()
        .set_default(
            "realtime.storage_timeout_seconds",
            i64::try_from(defaults.realtime.storage_timeout_seconds).unwrap_or(i64::MAX),
        )
        .unwrap();

    let environment_overrides = config::Environment::with_prefix("SHOPCHAT").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("SHOPCHAT_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via SHOPCHAT_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    debug!(?config, "loaded backend configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    #[serial]
    fn defaults_apply_without_file() {
        std::env::remove_var("SHOPCHAT_CONFIG");

        let config = load().expect("defaults should load");
        assert_eq!(config.http.port, 7080);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.realtime.outbound_queue_capacity, 64);
    }

    #[test]
    #[serial]
    fn config_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shopchat.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[http]\naddress = \"0.0.0.0\"\nport = 9000\n\n[realtime]\noutbound_queue_capacity = 8\nstorage_timeout_seconds = 2\n"
        )
        .unwrap();

        std::env::set_var("SHOPCHAT_CONFIG", &path);
        let config = load().expect("file-backed config should load");
        std::env::remove_var("SHOPCHAT_CONFIG");

        assert_eq!(config.http.address, "0.0.0.0");
        assert_eq!(config.http.port, 9000);
        assert_eq!(config.realtime.outbound_queue_capacity, 8);
        assert_eq!(config.realtime.storage_timeout_seconds, 2);
        // Sections absent from the file keep their defaults.
        assert_eq!(config.database.max_connections, 10);
    }
}
