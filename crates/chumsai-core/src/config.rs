use crate::app_config::{AppConfig, Environment, SheetsCredential, SourceConfig, DEFAULT_MAP_URL};
use crate::nearby::{SearchParams, MAX_RESULTS, SEARCH_RADIUS_KM};
use crate::ConfigError;

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
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("CHUMSAI_ENV", "development"))?;
    let bind_addr = parse_addr("CHUMSAI_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("CHUMSAI_LOG_LEVEL", "info");

    let radius_km = parse_f64("CHUMSAI_SEARCH_RADIUS_KM", &SEARCH_RADIUS_KM.to_string())?;
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(invalid(
            "CHUMSAI_SEARCH_RADIUS_KM",
            format!("must be a positive number of kilometres, got {radius_km}"),
        ));
    }
    let max_results = parse_usize("CHUMSAI_MAX_RESULTS", &MAX_RESULTS.to_string())?;
    if max_results == 0 {
        return Err(invalid("CHUMSAI_MAX_RESULTS", "must be at least 1".to_string()));
    }

    let map_url = or_default("CHUMSAI_MAP_URL", DEFAULT_MAP_URL);
    let http_timeout_secs = parse_u64("CHUMSAI_HTTP_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("CHUMSAI_USER_AGENT", "chumsai-finder/0.1");

    let source = match or_default("CHUMSAI_SOURCE", "sheets").as_str() {
        "sheets" => {
            let sheet_id = require("GOOGLE_SHEET_ID")?;
            let credential = match (
                optional("GOOGLE_SHEETS_API_KEY"),
                optional("GOOGLE_SHEETS_ACCESS_TOKEN"),
            ) {
                (Some(key), _) => SheetsCredential::ApiKey(key),
                (None, Some(token)) => SheetsCredential::AccessToken(token),
                (None, None) => {
                    return Err(ConfigError::MissingEnvVar(
                        "GOOGLE_SHEETS_API_KEY".to_string(),
                    ))
                }
            };
            SourceConfig::Sheets {
                sheet_id,
                range: or_default("CHUMSAI_SHEET_RANGE", "A:Z"),
                credential,
            }
        }
        "csv" => SourceConfig::Csv {
            path: PathBuf::from(or_default("CHUMSAI_CSV_PATH", "./data/chumsai.csv")),
        },
        other => {
            return Err(invalid(
                "CHUMSAI_SOURCE",
                format!("expected `sheets` or `csv`, got `{other}`"),
            ))
        }
    };

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        search: SearchParams {
            radius_km,
            max_results,
        },
        map_url,
        http_timeout_secs,
        user_agent,
        source,
        line_channel_secret: optional("LINE_CHANNEL_SECRET"),
        line_channel_access_token: optional("LINE_CHANNEL_ACCESS_TOKEN"),
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CHUMSAI_ENV".to_string(),
            reason: format!("unknown environment `{other}`"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
