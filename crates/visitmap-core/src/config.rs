use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/";
pub const DEFAULT_GEOCODER_USER_AGENT: &str = "visitmap/0.1 (visit-route-mapping)";

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

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("VISITMAP_ENV", "development"));

    let bind_addr = parse("VISITMAP_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("VISITMAP_LOG_LEVEL", "info");
    let geocoder_url = or_default("VISITMAP_GEOCODER_URL", DEFAULT_GEOCODER_URL);

    // The public Nominatim usage policy asks for a contactable client label,
    // so production deployments must set one explicitly.
    let geocoder_user_agent = match lookup("VISITMAP_GEOCODER_USER_AGENT") {
        Ok(ua) if !ua.trim().is_empty() => ua,
        _ if env == Environment::Production => {
            return Err(ConfigError::MissingEnvVar(
                "VISITMAP_GEOCODER_USER_AGENT".to_string(),
            ));
        }
        _ => DEFAULT_GEOCODER_USER_AGENT.to_string(),
    };

    let geocoder_timeout_secs = parse_u64("VISITMAP_GEOCODER_TIMEOUT_SECS", "10")?;
    if geocoder_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "VISITMAP_GEOCODER_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let geocoder_throttle_ms = parse_u64("VISITMAP_GEOCODER_THROTTLE_MS", "1000")?;
    let map_padding_px = parse_u32("VISITMAP_MAP_PADDING_PX", "50")?;
    let api_keys = lookup("VISITMAP_API_KEYS")
        .ok()
        .filter(|s| !s.trim().is_empty());

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        geocoder_url,
        geocoder_user_agent,
        geocoder_timeout_secs,
        geocoder_throttle_ms,
        map_padding_px,
        api_keys,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
