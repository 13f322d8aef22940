use anyhow::Result;
use std::env;

pub struct AppConfig {
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub dispatch: DispatchConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        let database = DatabaseConfig {
            host: env::var("DATABASE_HOST")?,
            port: env::var("DATABASE_PORT")?.parse()?,
            username: env::var("DATABASE_USERNAME")?,
            password: env::var("DATABASE_PASSWORD")?,
            database: env::var("DATABASE_NAME")?,
        };
        let redis = RedisConfig {
            host: env::var("REDIS_HOST")?,
            port: env::var("REDIS_PORT")?.parse()?,
        };
        let dispatch = DispatchConfig::from_env()?;
        Ok(Self {
            database,
            redis,
            dispatch,
        })
    }
}

pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

pub struct RedisConfig {
    pub host: String,
    pub port: u16,
}

// Tunables for the dispatch core. The defaults mirror the product
// behavior: a 10-minute acceptance window anchored at broadcast time, a
// 10-minute customer grace window anchored at creation time, and a 5 km
// search radius.
pub struct DispatchConfig {
    pub broadcast_window_minutes: i64,
    pub grace_window_minutes: i64,
    pub search_radius_meters: f64,
}

impl DispatchConfig {
    fn from_env() -> Result<Self> {
        let broadcast_window_minutes = optional_var("BROADCAST_WINDOW_MINUTES", 10)?;
        let grace_window_minutes = optional_var("GRACE_WINDOW_MINUTES", 10)?;
        let search_radius_meters = match env::var("SEARCH_RADIUS_METERS") {
            Ok(raw) => raw.parse()?,
            Err(_) => 5_000.0,
        };
        Ok(Self {
            broadcast_window_minutes,
            grace_window_minutes,
            search_radius_meters,
        })
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            broadcast_window_minutes: 10,
            grace_window_minutes: 10,
            search_radius_meters: 5_000.0,
        }
    }
}

fn optional_var(key: &str, default: i64) -> Result<i64> {
    match env::var(key) {
        Ok(raw) => Ok(raw.parse()?),
        Err(_) => Ok(default),
    }
}
