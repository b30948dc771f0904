use std::env;
use std::fmt::Display;
use std::str::FromStr;

const DEFAULT_JWT_SECRET: &str = "default-secret-change-me";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    MongoDB,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(StorageBackend::MongoDB),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

/// Token and password settings shared with the handlers and the auth middleware
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub token_ttl_hours: i64,
    pub cookie_secure: bool,
    pub bcrypt_cost: u32,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            jwt_issuer: "feedback-service".to_string(),
            token_ttl_hours: 168,
            cookie_secure: false,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub cors_origins: Vec<String>,
    pub auth: AuthSettings,
}

impl Config {
    /// Reads the configuration from the process environment (call `dotenv()` first)
    pub fn from_env() -> Result<Self, String> {
        let defaults = AuthSettings::default();

        let storage: StorageBackend = parse_or("STORAGE_BACKEND", StorageBackend::MongoDB)?;
        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty());
        if storage == StorageBackend::MongoDB && database_url.is_none() {
            return Err("DATABASE_URL must be set when STORAGE_BACKEND=mongodb".to_string());
        }

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            log::warn!("⚠️  JWT_SECRET not set, using the insecure default secret");
            defaults.jwt_secret.clone()
        });

        let bcrypt_cost: u32 = parse_or("BCRYPT_COST", defaults.bcrypt_cost)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(format!("BCRYPT_COST must be between 4 and 31, got {}", bcrypt_cost));
        }

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or("PORT", 3002)?,
            storage,
            database_url,
            cors_origins,
            auth: AuthSettings {
                jwt_secret,
                jwt_issuer: env::var("JWT_ISSUER").unwrap_or(defaults.jwt_issuer),
                token_ttl_hours: parse_or("TOKEN_TTL_HOURS", defaults.token_ttl_hours)?,
                cookie_secure: parse_or("COOKIE_SECURE", defaults.cookie_secure)?,
                bcrypt_cost,
            },
        })
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("Invalid {} value '{}': {}", key, raw, e)),
        Err(_) => Ok(default),
    }
}
