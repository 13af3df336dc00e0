//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Session cookie configuration.
    #[serde(default)]
    pub session: SessionConfig,
    /// Login throttling and anti-forgery settings.
    #[serde(default)]
    pub security: SecurityConfig,
    /// Free tier caps.
    #[serde(default)]
    pub tiers: TierConfig,
    /// Subscription webhook configuration.
    #[serde(default)]
    pub stripe: StripeConfig,
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

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
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

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime in seconds.
    #[serde(default = "default_session_ttl")]
    pub ttl_secs: u64,
    /// Whether cookies carry the `Secure` attribute.
    #[serde(default = "default_true")]
    pub secure_cookies: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_session_ttl(),
            secure_cookies: true,
        }
    }
}

fn default_session_ttl() -> u64 {
    86_400 // 24 hours
}

fn default_true() -> bool {
    true
}

/// Login throttling and anti-forgery settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Failed logins allowed before an identifier is locked.
    #[serde(default = "default_max_login_attempts")]
    pub max_login_attempts: u32,
    /// Lockout duration in seconds.
    #[serde(default = "default_fifteen_minutes")]
    pub lockout_secs: u64,
    /// Window in seconds after which the failure counter restarts.
    #[serde(default = "default_fifteen_minutes")]
    pub attempt_window_secs: u64,
    /// Interval in seconds between rate limiter sweeps.
    #[serde(default = "default_rate_limit_sweep")]
    pub rate_limit_sweep_secs: u64,
    /// CSRF token lifetime in seconds.
    #[serde(default = "default_csrf_expiry")]
    pub csrf_token_expiry_secs: u64,
    /// Interval in seconds between CSRF store sweeps.
    #[serde(default = "default_csrf_sweep")]
    pub csrf_sweep_secs: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_login_attempts: default_max_login_attempts(),
            lockout_secs: default_fifteen_minutes(),
            attempt_window_secs: default_fifteen_minutes(),
            rate_limit_sweep_secs: default_rate_limit_sweep(),
            csrf_token_expiry_secs: default_csrf_expiry(),
            csrf_sweep_secs: default_csrf_sweep(),
        }
    }
}

fn default_max_login_attempts() -> u32 {
    5
}

fn default_fifteen_minutes() -> u64 {
    900
}

fn default_rate_limit_sweep() -> u64 {
    300 // 5 minutes
}

fn default_csrf_expiry() -> u64 {
    86_400 // 24 hours
}

fn default_csrf_sweep() -> u64 {
    1_800 // 30 minutes
}

/// Free tier caps. Premium accounts are unlimited.
#[derive(Debug, Clone, Deserialize)]
pub struct TierConfig {
    /// Maximum persons on the free tier.
    #[serde(default = "default_free_persons")]
    pub free_person_limit: u64,
    /// Maximum bills on the free tier.
    #[serde(default = "default_free_bills")]
    pub free_bill_limit: u64,
    /// Maximum provisions on the free tier.
    #[serde(default = "default_free_provisions")]
    pub free_provision_limit: u64,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            free_person_limit: default_free_persons(),
            free_bill_limit: default_free_bills(),
            free_provision_limit: default_free_provisions(),
        }
    }
}

fn default_free_persons() -> u64 {
    5
}

fn default_free_bills() -> u64 {
    5
}

fn default_free_provisions() -> u64 {
    10
}

/// Subscription webhook configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StripeConfig {
    /// Signing secret of the webhook endpoint. Webhooks are refused when unset.
    pub webhook_secret: Option<String>,
    /// Accepted clock skew for signed payloads, in seconds.
    #[serde(default)]
    pub tolerance_secs: Option<u64>,
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
            .add_source(config::Environment::with_prefix("TANZIA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
