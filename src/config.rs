use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use crate::assistant::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};

/// Application-level constants
pub const APP_NAME: &str = "PatientDashboard";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_DIAGNOSIS_PYTHON: &str = "./venv/bin/python";
pub const DEFAULT_DIAGNOSIS_SCRIPT: &str = "./backend/scraper-agent/ai_diagnosis_api.py";
pub const DEFAULT_DIAGNOSIS_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_DIAGNOSIS_MAX_RESULTS: u32 = 3;
pub const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 60;

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    format!("{}=info,tower_http=info", env!("CARGO_CRATE_NAME"))
}

/// Default database location: ~/PatientDashboard/patients.db
pub fn default_database_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(APP_NAME).join("patients.db"))
}

/// Load `.env` from the working directory or one of its parents.
///
/// Returns the loaded path, or `None` when there is no such file. A file
/// that exists but cannot be parsed is an error.
pub fn load_dotenv() -> Result<Option<PathBuf>, dotenvy::Error> {
    skip_missing(dotenvy::dotenv())
}

/// Load a specific env file; a missing file is not an error.
pub fn load_dotenv_from(path: &Path) -> Result<Option<PathBuf>, dotenvy::Error> {
    skip_missing(dotenvy::from_path(path).map(|()| path.to_path_buf()))
}

fn skip_missing(
    result: Result<PathBuf, dotenvy::Error>,
) -> Result<Option<PathBuf>, dotenvy::Error> {
    match result {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Cannot determine home directory; set DATABASE_PATH")]
    NoHomeDir,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosisConfig {
    pub python: PathBuf,
    pub script: PathBuf,
    pub timeout_secs: u64,
    pub max_results: u32,
}

/// Runtime configuration, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub database_path: PathBuf,
    /// Allowed CORS origins; empty allows any origin.
    pub cors_origins: Vec<String>,
    pub gemini: GeminiConfig,
    pub diagnosis: DiagnosisConfig,
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var).filter(|v| !v.trim().is_empty()) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}

fn require_positive(var: &'static str, secs: u64) -> Result<(), ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Invalid {
            var,
            value: "0".into(),
            reason: "must be at least 1".into(),
        });
    }
    Ok(())
}

fn string_var(lookup: &impl Fn(&str) -> Option<String>, var: &str, default: &str) -> String {
    lookup(var)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let default_host = IpAddr::from([127, 0, 0, 1]);
        let database_path = match lookup("DATABASE_PATH").filter(|v| !v.trim().is_empty()) {
            Some(path) => PathBuf::from(path.trim()),
            None => default_database_path().ok_or(ConfigError::NoHomeDir)?,
        };

        let diagnosis = DiagnosisConfig {
            python: string_var(&lookup, "DIAGNOSIS_PYTHON", DEFAULT_DIAGNOSIS_PYTHON).into(),
            script: string_var(&lookup, "DIAGNOSIS_SCRIPT", DEFAULT_DIAGNOSIS_SCRIPT).into(),
            timeout_secs: parse_var(
                &lookup,
                "DIAGNOSIS_TIMEOUT_SECS",
                DEFAULT_DIAGNOSIS_TIMEOUT_SECS,
            )?,
            max_results: parse_var(
                &lookup,
                "DIAGNOSIS_MAX_RESULTS",
                DEFAULT_DIAGNOSIS_MAX_RESULTS,
            )?,
        };
        require_positive("DIAGNOSIS_TIMEOUT_SECS", diagnosis.timeout_secs)?;

        let gemini = GeminiConfig {
            api_key: string_var(&lookup, "GEMINI_API_KEY", ""),
            model: string_var(&lookup, "GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            base_url: string_var(&lookup, "GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
            timeout_secs: parse_var(&lookup, "GEMINI_TIMEOUT_SECS", DEFAULT_GEMINI_TIMEOUT_SECS)?,
        };
        require_positive("GEMINI_TIMEOUT_SECS", gemini.timeout_secs)?;

        Ok(Self {
            host: parse_var(&lookup, "HOST", default_host)?,
            port: parse_var(&lookup, "PORT", DEFAULT_PORT)?,
            database_path,
            cors_origins: lookup("CORS_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            gemini,
            diagnosis,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
