use crate::error::{Error, Result};
use dotenvy::dotenv;
use rust_decimal::Decimal;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub scheduling_api_url: String,
    pub http_timeout_secs: u64,
    pub booking_window_days: usize,
    pub booking_fee: Decimal,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            scheduling_api_url: get_env("SCHEDULING_API_URL")?,
            http_timeout_secs: get_env_parse_or("HTTP_TIMEOUT_SECS", 30)?,
            booking_window_days: get_env_parse_or("BOOKING_WINDOW_DAYS", 7)?,
            booking_fee: get_env_parse_or("BOOKING_FEE", Decimal::new(39900, 2))?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
