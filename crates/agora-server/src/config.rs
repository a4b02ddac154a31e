use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path: PathBuf = get("AGORA_DB_PATH").unwrap_or_else(|| "agora.db".into()).into();
        let host = get("AGORA_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match get("AGORA_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("AGORA_PORT is not a port number: {raw}"))?,
            None => 3000,
        };

        Ok(Self { db_path, host, port })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port).parse()?;
        Ok(addr)
    }
}
