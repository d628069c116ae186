use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

/// Outbound calls are bounded by this unless `OUTBOUND_TIMEOUT_SECS` says otherwise.
pub const DEFAULT_OUTBOUND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    /// Extraction service credential. Absence is reported per request, not at startup.
    pub firecrawl_api_key: Option<String>,
    pub outbound_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let firecrawl_api_key = lookup("FIRECRAWL_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("PORT").unwrap_or_else(|| "3000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        let outbound_timeout = match lookup("OUTBOUND_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw
                    .parse::<u64>()
                    .map_err(|e| AppError::ConfigError(format!("Invalid outbound timeout: {}", e)))?;
                if secs == 0 {
                    return Err(AppError::ConfigError("Outbound timeout must be positive".to_string()));
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_OUTBOUND_TIMEOUT,
        };

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            firecrawl_api_key,
            outbound_timeout,
        })
    }
}
