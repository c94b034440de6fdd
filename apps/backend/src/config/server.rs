use std::env;

use crate::error::AppError;

/// Bind address for the HTTP/websocket server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Read `BACKEND_HOST` (default `0.0.0.0`) and `BACKEND_PORT` (default `3001`).
    pub fn from_env() -> Result<Self, AppError> {
        let host = env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = match env::var("BACKEND_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| AppError::config(format!("BACKEND_PORT must be a port number, got '{raw}'")))?,
            Err(_) => 3001,
        };
        Ok(Self { host, port })
    }
}
