use std::env;

use crate::constants::{DEFAULT_GROUP_INVITE_EXPIRES_DAYS, DEFAULT_INVITE_EXPIRES_HOURS};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub allowed_origins: Vec<String>,
    pub jwt_secret: String,
    pub token_expire_minutes: i64,
    pub invite_expires_hours: i64,
    pub group_invite_expires_days: i64,
    pub notification_service_url: Option<String>,
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists (development)
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| "Invalid SERVER_PORT")?;

        let database_url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?;

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| "JWT_SECRET must be set for token signing")?;

        let token_expire_minutes = env::var("TOKEN_EXPIRE_MINUTES")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .map_err(|_| "Invalid TOKEN_EXPIRE_MINUTES")?;

        let invite_expires_hours = env::var("INVITE_EXPIRES_HOURS")
            .unwrap_or_else(|_| DEFAULT_INVITE_EXPIRES_HOURS.to_string())
            .parse()
            .map_err(|_| "Invalid INVITE_EXPIRES_HOURS")?;

        let group_invite_expires_days = env::var("GROUP_INVITE_EXPIRES_DAYS")
            .unwrap_or_else(|_| DEFAULT_GROUP_INVITE_EXPIRES_DAYS.to_string())
            .parse()
            .map_err(|_| "Invalid GROUP_INVITE_EXPIRES_DAYS")?;

        let notification_service_url = env::var("NOTIFICATION_SERVICE_URL").ok();

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            server_host,
            server_port,
            database_url,
            allowed_origins,
            jwt_secret,
            token_expire_minutes,
            invite_expires_hours,
            group_invite_expires_days,
            notification_service_url,
            environment,
        })
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
