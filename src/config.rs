use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::import::InputFormat;
use crate::pipeline::ReportOptions;

/// Application-level constants
pub const APP_NAME: &str = "esam-report";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_INPUT_DIR: &str = "./input";
pub const DEFAULT_OUTPUT_DIR: &str = "./excel";
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 50;

/// Filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "esam_report=info,tower_http=info"
}

/// Filter for `--verbose`: pipeline stage counts and request traces.
pub fn verbose_log_filter() -> &'static str {
    "esam_report=debug,tower_http=debug"
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Where batch mode looks for `<name>.csv`.
    pub input_dir: PathBuf,
    /// Where batch mode writes `<name>.xlsx`.
    pub output_dir: PathBuf,
    pub bind: SocketAddr,
    pub max_upload_bytes: u64,
    pub accepted_extensions: Vec<InputFormat>,
    /// Skip the first physical row of the export.
    pub has_header: bool,
    pub fill_date_gaps: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            accepted_extensions: vec![InputFormat::Csv],
            has_header: true,
            fill_date_gaps: false,
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `ESAM_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup("ESAM_INPUT_DIR") {
            config.input_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("ESAM_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(bind) = lookup("ESAM_BIND") {
            config.bind = parse_bind("ESAM_BIND", &bind)?;
        }
        if let Some(mb) = lookup("ESAM_MAX_UPLOAD_MB") {
            config.max_upload_bytes = parse_upload_mb("ESAM_MAX_UPLOAD_MB", &mb)?;
        }
        if let Some(list) = lookup("ESAM_ACCEPT") {
            config.accepted_extensions = parse_accept("ESAM_ACCEPT", &list)?;
        }
        if let Some(flag) = lookup("ESAM_HAS_HEADER") {
            config.has_header = parse_flag("ESAM_HAS_HEADER", &flag)?;
        }
        if let Some(flag) = lookup("ESAM_FILL_DATE_GAPS") {
            config.fill_date_gaps = parse_flag("ESAM_FILL_DATE_GAPS", &flag)?;
        }

        Ok(config)
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            fill_date_gaps: self.fill_date_gaps,
        }
    }
}

fn invalid(key: &'static str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn parse_bind(key: &'static str, value: &str) -> Result<SocketAddr, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|e: std::net::AddrParseError| invalid(key, value, e.to_string()))
}

pub fn parse_upload_mb(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    let mb: u64 = value
        .trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| invalid(key, value, e.to_string()))?;
    if mb == 0 {
        return Err(invalid(key, value, "must be at least 1"));
    }
    mb.checked_mul(1024 * 1024)
        .ok_or_else(|| invalid(key, value, "too large"))
}

/// Comma-separated extensions, e.g. `csv,xlsx`.
pub fn parse_accept(key: &'static str, value: &str) -> Result<Vec<InputFormat>, ConfigError> {
    let mut formats = Vec::new();
    for ext in value.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let format = InputFormat::from_extension(ext)
            .ok_or_else(|| invalid(key, value, format!("unknown extension {ext:?}")))?;
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    if formats.is_empty() {
        return Err(invalid(key, value, "no extensions given"));
    }
    Ok(formats)
}

pub fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value, "expected true or false")),
    }
}
