use std::net::SocketAddr;
use std::path::PathBuf;

use crate::nearby::SearchParams;
use crate::ConfigError;

/// Full-map link shown when nothing is nearby and on every result card.
pub const DEFAULT_MAP_URL: &str = "https://www.google.com/maps/@18.521605,98.958027,13.55z/data=!4m2!6m1!1s1hyMB4Sb3fpkfYkYIFFnG6Y6-Jq3EPAQ?entry=ttu&g_ep=EgoyMDI2MDIwNC4wIKXMDSoASAFQAw%3D%3D";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// How the Sheets client authenticates.
#[derive(Clone, PartialEq, Eq)]
pub enum SheetsCredential {
    /// Sent as the `key` query parameter.
    ApiKey(String),
    /// Sent as a bearer token.
    AccessToken(String),
}

impl std::fmt::Debug for SheetsCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetsCredential::ApiKey(_) => f.write_str("ApiKey([redacted])"),
            SheetsCredential::AccessToken(_) => f.write_str("AccessToken([redacted])"),
        }
    }
}

/// Where site rows come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    Sheets {
        sheet_id: String,
        range: String,
        credential: SheetsCredential,
    },
    Csv {
        path: PathBuf,
    },
}

impl SourceConfig {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            SourceConfig::Sheets { .. } => "sheets",
            SourceConfig::Csv { .. } => "csv",
        }
    }
}

#[derive(Clone)]
pub struct LineCredentials {
    pub channel_secret: String,
    pub channel_access_token: String,
}

impl std::fmt::Debug for LineCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineCredentials")
            .field("channel_secret", &"[redacted]")
            .field("channel_access_token", &"[redacted]")
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub search: SearchParams,
    pub map_url: String,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    pub source: SourceConfig,
    pub line_channel_secret: Option<String>,
    pub line_channel_access_token: Option<String>,
}

impl AppConfig {
    /// LINE credentials, required only by the webhook server.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] naming the first absent variable.
    pub fn line_credentials(&self) -> Result<LineCredentials, ConfigError> {
        let channel_secret = self
            .line_channel_secret
            .clone()
            .ok_or_else(|| ConfigError::MissingEnvVar("LINE_CHANNEL_SECRET".to_string()))?;
        let channel_access_token = self.line_channel_access_token.clone().ok_or_else(|| {
            ConfigError::MissingEnvVar("LINE_CHANNEL_ACCESS_TOKEN".to_string())
        })?;
        Ok(LineCredentials {
            channel_secret,
            channel_access_token,
        })
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("search", &self.search)
            .field("map_url", &self.map_url)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("source", &self.source)
            .field(
                "line_channel_secret",
                &self.line_channel_secret.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "line_channel_access_token",
                &self.line_channel_access_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}
