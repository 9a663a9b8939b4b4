use tourline_core::representation::ProfitStrategy;
use tourline_core::types::EntityId;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// PostgreSQL URL. `None` runs against the in-memory repository.
    pub database_url: Option<String>,
    /// Owner assigned to new tours when no caller identity resolves.
    /// Development only; unset means such creations are denied.
    pub fallback_manager_id: Option<EntityId>,
    /// Business rule used for estimated-profit representations.
    pub profit_strategy: ProfitStrategy,
    /// Emit JSON log lines instead of human-readable text.
    pub log_json: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                    |
    /// |---------------------------|----------------------------|
    /// | `HOST`                    | `0.0.0.0`                  |
    /// | `PORT`                    | `3000`                     |
    /// | `CORS_ORIGINS`            | `http://localhost:4200`    |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                       |
    /// | `DATABASE_URL`            | unset (in-memory store)    |
    /// | `DEV_FALLBACK_MANAGER_ID` | unset                      |
    /// | `PROFIT_STRATEGY`         | `recorded`                 |
    /// | `LOG_FORMAT`              | `text`                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:4200".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let fallback_manager_id = std::env::var("DEV_FALLBACK_MANAGER_ID")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                s.trim()
                    .parse()
                    .expect("DEV_FALLBACK_MANAGER_ID must be a valid UUID")
            });

        let profit_strategy: ProfitStrategy = std::env::var("PROFIT_STRATEGY")
            .unwrap_or_else(|_| "recorded".into())
            .parse()
            .unwrap_or_else(|e| panic!("PROFIT_STRATEGY is invalid: {e}"));

        let log_json = std::env::var("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            database_url,
            fallback_manager_id,
            profit_strategy,
            log_json,
        }
    }
}
