use std::env;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub admin_username: String,
    pub admin_password: String,
    pub session_ttl_hours: i64,
    pub max_photo_bytes: usize,
    pub base_delivery_rate: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            admin_username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            admin_password: env::var("ADMIN_PASSWORD")
                .unwrap_or_else(|_| "bikaner2026".to_string()),
            session_ttl_hours: parse_or_default("ADMIN_SESSION_TTL_HOURS", 24)?,
            max_photo_bytes: parse_or_default("MAX_PHOTO_BYTES", 5 * 1024 * 1024)?,
            base_delivery_rate: parse_or_default("BASE_DELIVERY_RATE", 50)?,
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
