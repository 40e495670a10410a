use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::constants::{FALLBACK_BTC_RATE_EUR, REFERENCE_PASSWORD_SHA3_512};

type DynError = Box<dyn std::error::Error + Send + Sync>;

fn default_port() -> u16 {
    8000
}

fn default_log_queue_capacity() -> usize {
    1024
}

/// Portal configuration file structure
///
/// Every field has a default so an empty file (or no file at all) is valid.
/// Secrets and remote connection fields are overridden from the environment
/// by [`PortalConfig::apply_env`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// HTTP port (default: 8000)
    pub port: u16,
    /// Directory for embedded SQLite databases (default: data)
    pub data_dir: PathBuf,
    /// Directory for recorded audio/video (default: recordings)
    pub recordings_dir: PathBuf,
    /// Directory for generated assets such as QR images (default: static)
    pub static_dir: PathBuf,
    /// Log records queued for the database before the oldest are dropped (default: 1024)
    pub log_queue_capacity: usize,
    pub auth: AuthConfig,
    pub scripts: ScriptsConfig,
    pub media: MediaConfig,
    pub checkout: CheckoutConfig,
    pub remote: RemoteConfig,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            data_dir: PathBuf::from("data"),
            recordings_dir: PathBuf::from("recordings"),
            static_dir: PathBuf::from("static"),
            log_queue_capacity: default_log_queue_capacity(),
            auth: AuthConfig::default(),
            scripts: ScriptsConfig::default(),
            media: MediaConfig::default(),
            checkout: CheckoutConfig::default(),
            remote: RemoteConfig::default(),
        }
    }
}

/// Login and session settings (maps to [auth] section in TOML)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Lowercase hex SHA3-512 digest the submitted password must match
    pub password_sha3_512: String,
    /// Secret used to sign session tokens; a random one is generated at
    /// startup when unset, so sessions do not survive a restart
    pub session_secret: Option<String>,
    /// Session lifetime in hours (default: 12)
    pub session_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password_sha3_512: REFERENCE_PASSWORD_SHA3_512.to_string(),
            session_secret: None,
            session_ttl_hours: 12,
        }
    }
}

/// Helper scripts (maps to [scripts] section in TOML)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
    /// Interpreter used to launch both scripts (default: python3)
    pub interpreter: String,
    pub no_args: PathBuf,
    pub with_args: PathBuf,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
            no_args: PathBuf::from("script_no_args.py"),
            with_args: PathBuf::from("script_with_args.py"),
        }
    }
}

/// External media tools (maps to [media] section in TOML)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// ffmpeg command line used to transcode uploads to WAV; `-y -loglevel error
    /// -i <input> <output.wav>` is appended. Unset disables transcoding.
    pub transcoder: Option<Vec<String>>,
    /// Speech-to-text command line; the WAV path is appended as the last
    /// argument and stdout is taken as the transcription. Unset disables it.
    ///
    /// Example: `transcriber = ["whisper-cli", "--no-timestamps", "-f"]`
    pub transcriber: Option<Vec<String>>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            transcoder: Some(vec!["ffmpeg".to_string()]),
            transcriber: None,
        }
    }
}

/// Checkout settings (maps to [checkout] section in TOML)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CheckoutConfig {
    /// Rate source returning `{"bitcoin": {"eur": <rate>}}`
    pub rate_url: String,
    /// EUR per BTC used when the rate source fails
    pub fallback_rate: f64,
    /// Timeout for the rate request in seconds (default: 5)
    pub rate_timeout_secs: u64,
    /// Merchant address placed in payment URIs
    pub btc_address: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            rate_url: "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin&vs_currencies=eur"
                .to_string(),
            fallback_rate: FALLBACK_BTC_RATE_EUR,
            rate_timeout_secs: 5,
            btc_address: "bc1qportal0000000000000000000000000000000".to_string(),
        }
    }
}

/// Remote SQL backend (maps to [remote] section in TOML)
///
/// The remote backend is selected when the environment variable named by
/// `indicator_env` is set. Connection fields normally come from the
/// `PORTAL_DB_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Environment variable whose presence selects the remote backend
    /// (default: WEBSITE_SITE_NAME)
    pub indicator_env: String,
    pub server: Option<String>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub port: u16,
    /// Credential profile looked up in the credentials file when no password is set
    pub credential_profile: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            indicator_env: "WEBSITE_SITE_NAME".to_string(),
            server: None,
            database: None,
            user: None,
            password: None,
            port: 5432,
            credential_profile: None,
        }
    }
}

impl PortalConfig {
    /// Load from an optional TOML file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, DynError> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;
                Self::from_toml(&content)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, DynError> {
        let config: PortalConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Override secrets and remote connection fields from the environment
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(secret) = non_empty("PORTAL_SESSION_SECRET") {
            self.auth.session_secret = Some(secret);
        }
        if let Some(server) = non_empty("PORTAL_DB_SERVER") {
            self.remote.server = Some(server);
        }
        if let Some(database) = non_empty("PORTAL_DB_DATABASE") {
            self.remote.database = Some(database);
        }
        if let Some(user) = non_empty("PORTAL_DB_USER") {
            self.remote.user = Some(user);
        }
        if let Some(password) = non_empty("PORTAL_DB_PASSWORD") {
            self.remote.password = Some(password);
        }
        if let Some(port) = non_empty("PORTAL_DB_PORT").and_then(|p| p.parse().ok()) {
            self.remote.port = port;
        }
    }
}

impl RemoteConfig {
    /// Whether the site-identity indicator selects the remote backend
    pub fn is_selected<F>(&self, lookup: F) -> bool
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(&self.indicator_env).is_some_and(|v| !v.is_empty())
    }
}
