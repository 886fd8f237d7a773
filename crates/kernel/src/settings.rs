use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "BOOKSHELF_ENV";
const CONFIG_DIR_ENV: &str = "BOOKSHELF_CONFIG_DIR";
const ENV_PREFIX: &str = "BOOKSHELF";

/// Plain process variables honoured on top of every other source.
const PORT_ENV: &str = "PORT";
const DATABASE_URL_ENV: &str = "DATABASE_URL";
const LEGACY_DATABASE_URL_ENV: &str = "MONGO_DB_URL";

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(anyhow!(
                "unsupported environment '{}'; expected local/staging/production",
                other
            )),
        }
    }
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub uploads: UploadSettings,
    #[serde(default)]
    pub books: BookSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, environment overlay,
    /// `BOOKSHELF__*` variables and finally `PORT` / `DATABASE_URL`.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .context("unable to resolve current directory")?
                .join("config"),
        };

        let database_url = std::env::var(DATABASE_URL_ENV)
            .or_else(|_| std::env::var(LEGACY_DATABASE_URL_ENV))
            .ok();

        Self::load_from(
            &config_dir,
            &environment,
            std::env::var(PORT_ENV).ok(),
            database_url,
        )
    }

    /// Build settings from an explicit config directory and overrides.
    pub fn load_from(
        config_dir: &Path,
        environment: &str,
        port: Option<String>,
        database_url: Option<String>,
    ) -> anyhow::Result<Self> {
        let parsed_environment: Environment = environment.parse()?;

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment));

        let cfg = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .set_override_option("server.port", port)
            .with_context(|| "invalid PORT override")?
            .set_override_option("database.url", database_url)
            .with_context(|| "invalid DATABASE_URL override")?
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        settings.environment = parsed_environment;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    #[serde(default = "ServerSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        5555
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: Self::default_request_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// `memory://`, `file://<dir>` or a bare directory path
    #[serde(default = "DatabaseSettings::default_url")]
    pub url: String,
}

impl DatabaseSettings {
    fn default_url() -> String {
        "file://data/books".to_string()
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
        }
    }
}

/// Where uploaded cover images land and how they are addressed.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    #[serde(default = "UploadSettings::default_dir")]
    pub dir: PathBuf,
    #[serde(default = "UploadSettings::default_url_prefix")]
    pub url_prefix: String,
    /// Absolute origin used in returned URLs; falls back to the request `Host`.
    #[serde(default)]
    pub public_base_url: Option<String>,
    #[serde(default = "UploadSettings::default_max_bytes")]
    pub max_bytes: usize,
}

impl UploadSettings {
    fn default_dir() -> PathBuf {
        PathBuf::from("uploads")
    }

    fn default_url_prefix() -> String {
        "/uploads".to_string()
    }

    // Multipart framing on top of the 5 MiB the client allows.
    fn default_max_bytes() -> usize {
        6 * 1024 * 1024
    }
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            dir: Self::default_dir(),
            url_prefix: Self::default_url_prefix(),
            public_base_url: None,
            max_bytes: Self::default_max_bytes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookSettings {
    /// Reject `publishYear` outside `[1800, current year + 1]` at the API layer.
    #[serde(default = "BookSettings::default_enforce_publish_year_range")]
    pub enforce_publish_year_range: bool,
}

impl BookSettings {
    fn default_enforce_publish_year_range() -> bool {
        true
    }
}

impl Default for BookSettings {
    fn default() -> Self {
        Self {
            enforce_publish_year_range: Self::default_enforce_publish_year_range(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default = "TelemetrySettings::default_log_level")]
    pub log_level: String,
}

impl TelemetrySettings {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            log_level: Self::default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_environment_is_local() {
        let settings = Settings::default();
        assert_eq!(settings.environment, Environment::Local);
    }

    #[test]
    fn default_server_listens_on_5555() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 5555);
        assert_eq!(settings.database.url, "file://data/books");
        assert_eq!(settings.uploads.url_prefix, "/uploads");
    }

    #[test]
    fn files_layer_base_then_environment() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("base.toml"),
            "[server]\nport = 7000\nhost = \"127.0.0.1\"\n[telemetry]\nlog_format = \"json\"\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("staging.toml"), "[server]\nport = 7100\n").unwrap();

        let settings = Settings::load_from(dir.path(), "staging", None, None).unwrap();

        assert_eq!(settings.environment, Environment::Staging);
        assert_eq!(settings.server.port, 7100);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.telemetry.log_format, LogFormat::Json);
    }

    #[test]
    fn plain_overrides_win_over_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("base.toml"),
            "[server]\nport = 7000\n[database]\nurl = \"memory://\"\n",
        )
        .unwrap();

        let settings = Settings::load_from(
            dir.path(),
            "local",
            Some("9090".to_string()),
            Some("file:///var/lib/bookshelf".to_string()),
        )
        .unwrap();

        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.database.url, "file:///var/lib/bookshelf");
    }

    #[test]
    fn unknown_environment_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load_from(dir.path(), "qa", None, None).unwrap_err();
        assert!(err.to_string().contains("unsupported environment 'qa'"));
    }
}
