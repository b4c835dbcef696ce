use std::env;
use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// Minimum HS256 secret size (256 bits).
pub const MIN_JWT_SECRET_BYTES: usize = 32;

pub const DEFAULT_JWT_EXPIRATION_SECS: i64 = 3600;
/// Longest session token lifetime accepted (one year).
pub const MAX_JWT_EXPIRATION_SECS: i64 = 365 * 24 * 3600;
pub const DEFAULT_MAX_ID_TOKEN_LENGTH: usize = 5000;
pub const DEFAULT_FIREBASE_AUTH_BASE_URL: &str = "https://identitytoolkit.googleapis.com";
pub const DEFAULT_FIREBASE_VERIFY_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppSettings {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub firebase: FirebaseConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    pub name: String,
    pub environment: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Only used by the health indicator. No pool is created when unset.
    pub url: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiration_secs: i64,
    pub max_id_token_length: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FirebaseConfig {
    #[serde(skip_serializing)]
    pub api_key: String,
    pub project_id: String,
    pub auth_base_url: String,
    pub verify_timeout_secs: u64,
}

impl AppSettings {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the settings from an arbitrary key lookup. `from_env` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| AppError::Configuration(format!("{} must be set", key)))
        };

        // App config
        let app_name = lookup("APP_NAME").unwrap_or_else(|| "firebase-token-exchange".to_string());
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        // Database config
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        // Server config
        let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let server_port = lookup("SERVER_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .map_err(|_| AppError::Configuration("SERVER_PORT must be a valid port number".to_string()))?;

        // CORS origins
        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Auth config
        let jwt_secret = required("JWT_SECRET")?;
        if jwt_secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(AppError::Configuration(format!(
                "JWT_SECRET must be at least {} bytes long",
                MIN_JWT_SECRET_BYTES
            )));
        }

        let jwt_expiration_secs = match lookup("JWT_EXPIRATION_SECS") {
            Some(value) => value
                .parse::<i64>()
                .ok()
                .filter(|secs| *secs > 0 && *secs <= MAX_JWT_EXPIRATION_SECS)
                .ok_or_else(|| AppError::Configuration(format!(
                    "JWT_EXPIRATION_SECS must be between 1 and {} seconds",
                    MAX_JWT_EXPIRATION_SECS
                )))?,
            None => DEFAULT_JWT_EXPIRATION_SECS,
        };

        let max_id_token_length = match lookup("AUTH_MAX_ID_TOKEN_LENGTH") {
            Some(value) => value
                .parse::<usize>()
                .ok()
                .filter(|len| *len > 0)
                .ok_or_else(|| AppError::Configuration("AUTH_MAX_ID_TOKEN_LENGTH must be a positive number".to_string()))?,
            None => DEFAULT_MAX_ID_TOKEN_LENGTH,
        };

        // Firebase config
        let firebase_api_key = required("FIREBASE_API_KEY")?;
        let firebase_project_id = required("FIREBASE_PROJECT_ID")?;
        let firebase_auth_base_url = lookup("FIREBASE_AUTH_BASE_URL")
            .unwrap_or_else(|| DEFAULT_FIREBASE_AUTH_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let firebase_verify_timeout_secs = match lookup("FIREBASE_VERIFY_TIMEOUT_SECS") {
            Some(value) => value
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| AppError::Configuration("FIREBASE_VERIFY_TIMEOUT_SECS must be a positive number of seconds".to_string()))?,
            None => DEFAULT_FIREBASE_VERIFY_TIMEOUT_SECS,
        };

        Ok(Self {
            app: AppConfig {
                name: app_name,
                environment,
            },
            database: DatabaseConfig {
                url: database_url,
            },
            server: ServerConfig {
                host: server_host,
                port: server_port,
                cors_origins,
            },
            auth: AuthConfig {
                jwt_secret,
                jwt_expiration_secs,
                max_id_token_length,
            },
            firebase: FirebaseConfig {
                api_key: firebase_api_key,
                project_id: firebase_project_id,
                auth_base_url: firebase_auth_base_url,
                verify_timeout_secs: firebase_verify_timeout_secs,
            },
        })
    }
}
