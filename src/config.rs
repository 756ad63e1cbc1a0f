use std::env;
use std::net::SocketAddr;
use anyhow::{Context, Result};

/// The application's configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// The URL of the PostgreSQL database. `None` runs on the in-memory store.
    pub database_url: Option<String>,
    /// The address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// The lifetime of a minted session cookie in days.
    pub session_duration_days: i64,
    /// The front-end origin allowed by CORS.
    pub cors_origin: String,
    /// Whether session cookies carry the `Secure` attribute.
    pub secure_cookies: bool,
    /// Maximum number of pooled PostgreSQL connections.
    pub db_pool_max_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3333)),
            session_duration_days: 7,
            cors_origin: "http://localhost:3000".to_string(),
            secure_cookies: false,
            db_pool_max_size: 16,
        }
    }
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let session_duration_days: i64 = env::var("SESSION_DURATION_DAYS")
            .unwrap_or_else(|_| defaults.session_duration_days.to_string())
            .parse()
            .context("Invalid SESSION_DURATION_DAYS")?;

        if session_duration_days <= 0 {
            anyhow::bail!("SESSION_DURATION_DAYS must be a positive number of days");
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            bind_addr: match env::var("BIND_ADDR") {
                Ok(addr) => addr.parse().context("Invalid BIND_ADDR")?,
                Err(_) => defaults.bind_addr,
            },
            session_duration_days,
            cors_origin: env::var("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            secure_cookies: env::var("APP_ENV")
                .map(|app_env| app_env == "production")
                .unwrap_or(false),
            db_pool_max_size: env::var("DB_POOL_MAX_SIZE")
                .unwrap_or_else(|_| defaults.db_pool_max_size.to_string())
                .parse()
                .context("Invalid DB_POOL_MAX_SIZE")?,
        })
    }
}
