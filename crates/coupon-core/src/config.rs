use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Model used when `COUPON_GEMINI_MODEL` is not set.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";

/// Endpoint root used when `COUPON_GEMINI_BASE_URL` is not set.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/";

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://localhost:3000,\
http://localhost:5174,http://127.0.0.1:5173,http://127.0.0.1:3000";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let gemini_api_key = require("GEMINI_API_KEY")?;

    let env = parse_environment(&or_default("COUPON_ENV", "development"))?;

    let raw_addr = or_default("COUPON_BIND_ADDR", "0.0.0.0:8080");
    let bind_addr = raw_addr
        .parse::<SocketAddr>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "COUPON_BIND_ADDR".to_string(),
            reason: e.to_string(),
        })?;

    let log_level = or_default("COUPON_LOG_LEVEL", "info");
    let gemini_model = or_default("COUPON_GEMINI_MODEL", DEFAULT_GEMINI_MODEL);
    if gemini_model.trim().is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "COUPON_GEMINI_MODEL".to_string(),
            reason: "model identifier must not be empty".to_string(),
        });
    }
    let gemini_base_url = or_default("COUPON_GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL);
    let cors_origins = parse_origins(&or_default("COUPON_CORS_ORIGINS", DEFAULT_CORS_ORIGINS));

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        gemini_api_key,
        gemini_model,
        gemini_base_url,
        cors_origins,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "COUPON_ENV".to_string(),
            reason: format!("expected development, test, or production; got {other:?}"),
        }),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
