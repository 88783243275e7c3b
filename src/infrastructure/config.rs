use std::env;

/// Signing key used by debug builds when `JWT_SECRET` is unset
pub const DEV_JWT_SECRET: &str = "secret";

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Empty means any origin
    pub cors_allowed_origins: Vec<String>,
    pub seed_demo: bool,
}

/// Resolve the JWT signing key. Only debug builds fall back to the
/// development key.
pub fn jwt_secret_from(value: Option<String>, allow_dev_default: bool) -> Result<String, String> {
    match value.filter(|v| !v.trim().is_empty()) {
        Some(secret) => Ok(secret),
        None if allow_dev_default => Ok(DEV_JWT_SECRET.to_string()),
        None => Err("JWT_SECRET environment variable must be set in production".to_string()),
    }
}

impl Config {
    /// Read the configuration, failing when a required setting is missing.
    pub fn from_env() -> Result<Self, String> {
        jwt_secret_from(env::var("JWT_SECRET").ok(), cfg!(debug_assertions))?;

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://biblioteca.db?mode=rwc".to_string());

        Ok(Self {
            database_url,
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            seed_demo: env::var("SEED_DEMO").is_ok(),
        })
    }
}
