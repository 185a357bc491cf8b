//! Application configuration management.

use serde::Deserialize;

/// Environment variable conventionally holding the UploadThing token.
pub const UPLOADTHING_TOKEN_ENV: &str = "UPLOADTHING_TOKEN";

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Object storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for verifying tokens.
    pub secret: String,
    /// Clock skew tolerated when checking `exp`, in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_secs: u64,
}

fn default_leeway() -> u64 {
    30
}

/// Object storage (UploadThing) configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Opaque provider token. Falls back to `UPLOADTHING_TOKEN` when unset.
    #[serde(default)]
    pub token: Option<String>,
    /// Provider API root.
    #[serde(default = "default_api_root")]
    pub api_root: String,
    /// CDN domain used to build public file URLs.
    #[serde(default = "default_cdn_domain")]
    pub cdn_domain: String,
    /// Timeout applied to every outbound provider request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_root() -> String {
    "https://api.uploadthing.com".to_string()
}

fn default_cdn_domain() -> String {
    "ufs.sh".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            token: None,
            api_root: default_api_root(),
            cdn_domain: default_cdn_domain(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl StorageSettings {
    /// Returns the provider token with surrounding whitespace and quotes removed.
    ///
    /// The configured value wins over `UPLOADTHING_TOKEN`. Blank values count
    /// as absent.
    #[must_use]
    pub fn resolved_token(&self) -> Option<String> {
        let usable = |raw: &str| Some(clean_token(raw)).filter(|token| !token.is_empty());
        self.token
            .as_deref()
            .and_then(usable)
            .or_else(|| std::env::var(UPLOADTHING_TOKEN_ENV).ok().as_deref().and_then(usable))
    }
}

fn clean_token(raw: &str) -> String {
    raw.trim().trim_matches(|c| c == '"' || c == '\'').to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("CALLFLOW").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
