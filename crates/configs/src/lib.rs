use anyhow::{anyhow, Result};
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
pub const DEFAULT_SECRET_KEY: &str = "change-this-secret-key";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub gist: GistConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
            worker_threads: Some(4),
            frontend_url: default_frontend_url(),
        }
    }
}

/// Location and credential of the Gist used as the datastore.
#[derive(Debug, Clone, Deserialize)]
pub struct GistConfig {
    #[serde(default)]
    pub gist_id: String,
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_gist_filename")]
    pub filename: String,
    #[serde(default = "default_gist_api_base")]
    pub api_base: String,
}

impl Default for GistConfig {
    fn default() -> Self {
        Self {
            gist_id: String::new(),
            token: String::new(),
            filename: default_gist_filename(),
            api_base: default_gist_api_base(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
    #[serde(default = "default_secret_key")]
    pub secret_key: String,
    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_password: default_admin_password(),
            secret_key: default_secret_key(),
            token_ttl_days: default_token_ttl_days(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
    #[serde(default = "default_rate_limit_enabled")]
    pub enabled: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: default_requests_per_minute(),
            enabled: default_rate_limit_enabled(),
        }
    }
}

fn default_frontend_url() -> String { "http://localhost:5173".into() }
fn default_gist_filename() -> String { "blog_data.json".into() }
fn default_gist_api_base() -> String { "https://api.github.com".into() }
fn default_admin_password() -> String { DEFAULT_ADMIN_PASSWORD.into() }
fn default_secret_key() -> String { DEFAULT_SECRET_KEY.into() }
fn default_token_ttl_days() -> i64 { 7 }
fn default_requests_per_minute() -> u32 { 60 }
fn default_rate_limit_enabled() -> bool { true }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load config.toml when present, otherwise start from defaults, then
    /// apply env-var fallbacks and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default().unwrap_or_default();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize_from_env();
        self.server.validate()?;
        self.gist.normalize_from_env();
        self.gist.warn_if_incomplete();
        self.auth.normalize_from_env();
        self.auth.validate()?;
        self.auth.warn_if_defaults();
        self.rate_limit.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    pub fn normalize_from_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse().ok()) {
            self.port = port;
        }
        if let Ok(url) = std::env::var("FRONTEND_URL") {
            self.frontend_url = url;
        }
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
    }

    pub fn validate(&mut self) -> Result<()> {
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 {
                self.worker_threads = Some(4);
            }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl GistConfig {
    pub fn normalize_from_env(&mut self) {
        if self.gist_id.trim().is_empty() {
            if let Ok(id) = std::env::var("GIST_ID") {
                self.gist_id = id;
            }
        }
        if self.token.trim().is_empty() {
            if let Ok(token) = std::env::var("GITHUB_TOKEN") {
                self.token = token;
            }
        }
    }

    pub fn warn_if_incomplete(&self) {
        if self.gist_id.trim().is_empty() {
            warn!("GIST_ID is not set; gist store calls will fail");
        }
        if self.token.trim().is_empty() {
            warn!("GITHUB_TOKEN is not set; gist store calls will fail");
        }
    }
}

impl AuthConfig {
    pub fn normalize_from_env(&mut self) {
        if let Ok(pw) = std::env::var("ADMIN_PASSWORD") {
            self.admin_password = pw;
        }
        if let Ok(key) = std::env::var("SECRET_KEY") {
            self.secret_key = key;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.admin_password.is_empty() {
            return Err(anyhow!("auth.admin_password must not be empty"));
        }
        if self.secret_key.is_empty() {
            return Err(anyhow!("auth.secret_key must not be empty"));
        }
        if self.token_ttl_days < 1 {
            return Err(anyhow!("auth.token_ttl_days must be >= 1"));
        }
        Ok(())
    }

    pub fn warn_if_defaults(&self) {
        if self.admin_password == DEFAULT_ADMIN_PASSWORD {
            warn!("using default admin password; set ADMIN_PASSWORD in the environment");
        }
        if self.secret_key == DEFAULT_SECRET_KEY {
            warn!("using default signing secret; set SECRET_KEY in the environment");
        }
    }
}

impl RateLimitConfig {
    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.requests_per_minute == 0 {
            return Err(anyhow!("rate_limit.requests_per_minute must be >= 1"));
        }
        Ok(())
    }
}
