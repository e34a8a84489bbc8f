use anyhow::{Context, Result, bail};
use std::env;
use std::str::FromStr;
use tracing::Level;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StoreBackend {
    MySql,
    /// Offline/demo mode: nothing survives a restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" => Ok(StoreBackend::MySql),
            "memory" => Ok(StoreBackend::Memory),
            other => bail!("unknown STORE_BACKEND `{other}`, expected `mysql` or `memory`"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub store_backend: StoreBackend,
    /// Required for the MySQL backend only.
    pub database_url: Option<String>,
    pub api_path: String,

    // Rate limiting
    pub rate_per_min: u32,

    pub log_dir: String,
    pub log_level: Level,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let store_backend: StoreBackend = var_or("STORE_BACKEND", "mysql").parse()?;
        let database_url = env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::MySql && database_url.is_none() {
            bail!("DATABASE_URL must be set when STORE_BACKEND is mysql");
        }

        let api_path = var_or("API_PATH", "/api/desprendibles");
        if !api_path.starts_with('/') {
            bail!("API_PATH must start with `/`, got `{api_path}`");
        }

        Ok(Self {
            server_addr: var_or("SERVER_ADDR", "127.0.0.1:8080"),
            store_backend,
            database_url,
            api_path,
            rate_per_min: var_or("RATE_PER_MIN", "1000")
                .parse()
                .context("RATE_PER_MIN must be a non-negative integer")?,
            log_dir: var_or("LOG_DIR", "logs"),
            log_level: var_or("LOG_LEVEL", "debug")
                .parse()
                .context("LOG_LEVEL must be one of trace, debug, info, warn, error")?,
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
