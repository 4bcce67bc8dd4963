//! TOML configuration file parsing and layering
//!
//! Settings start from built-in defaults, then the config file is applied,
//! then command-line flags. Every value is validated on the way in.

use super::args::Args;
use crate::core::logging::LogFormat;
use crate::core::validation::{validate_api_url, validate_timeout_secs, ValidationError};
use crate::core::version::default_api_url;
use crate::scanner::api::DEFAULT_SCAN_TIMEOUT;
use crate::service::api::DEFAULT_REQUEST_TIMEOUT;
use std::path::{Path, PathBuf};
use std::time::Duration;

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

const KNOWN_KEYS: [&str; 8] = [
    "api-url",
    "data-dir",
    "scan-timeout",
    "request-timeout",
    "log-level",
    "log-file",
    "log-format",
    "color",
];

/// Effective runtime settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_url: String,
    pub data_dir: PathBuf,
    pub scan_timeout: Duration,
    pub request_timeout: Duration,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    pub log_format: LogFormat,
    /// `None` detects from the terminal
    pub color: Option<bool>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: default_api_url().to_string(),
            data_dir: default_data_dir(),
            scan_timeout: DEFAULT_SCAN_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            log_level: None,
            log_file: None,
            log_format: LogFormat::Text,
            color: None,
        }
    }
}

/// `<config dir>/Ecoscan/ecoscan.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("Ecoscan").join("ecoscan.toml"))
}

/// `<data dir>/Ecoscan`, or `.ecoscan` when the platform has no data dir
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("Ecoscan"))
        .unwrap_or_else(|| PathBuf::from(".ecoscan"))
}

/// Read and parse the config file
///
/// An explicitly named file must exist. Without one the default location is
/// tried and a missing default file yields `Ok(None)`.
pub async fn load_config_file(
    explicit: Option<&Path>,
) -> Result<Option<(PathBuf, toml::Table)>, ValidationError> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(ValidationError::new(&format!(
                    "The specified configuration file does not exist: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(None),
        },
    };

    let contents = tokio::fs::read_to_string(&path).await.map_err(|e| {
        ValidationError::new(&format!(
            "Error reading configuration file {}: {}",
            path.display(),
            e
        ))
    })?;
    let table = toml::from_str::<toml::Table>(&contents).map_err(|e| {
        ValidationError::new(&format!(
            "Error parsing configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    Ok(Some((path, table)))
}

impl Settings {
    /// Apply values from a parsed config file
    ///
    /// A key holding the wrong TOML type is an error rather than being
    /// silently skipped.
    pub fn apply_toml_values(&mut self, config: &toml::Table) -> Result<(), ValidationError> {
        if let Some(url) = get_str(config, "api-url")? {
            self.api_url = validate_api_url(url)?;
        }
        if let Some(dir) = get_str(config, "data-dir")? {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(secs) = get_integer(config, "scan-timeout")? {
            self.scan_timeout = Duration::from_secs(validate_timeout_secs("scan-timeout", secs)?);
        }
        if let Some(secs) = get_integer(config, "request-timeout")? {
            self.request_timeout =
                Duration::from_secs(validate_timeout_secs("request-timeout", secs)?);
        }
        if let Some(level) = get_str(config, "log-level")? {
            self.log_level = Some(parse_log_level(level)?);
        }
        if let Some(file) = get_str(config, "log-file")? {
            self.log_file = log_file_setting(Path::new(file));
        }
        if let Some(format) = get_str(config, "log-format")? {
            self.log_format = parse_log_format(format)?;
        }
        if let Some(value) = config.get("color") {
            let color = value
                .as_bool()
                .ok_or_else(|| ValidationError::new("color must be true or false"))?;
            self.color = Some(color);
        }
        Ok(())
    }

    /// Apply command-line flags on top of the current values
    pub fn apply_args(&mut self, args: &Args) -> Result<(), ValidationError> {
        if let Some(url) = &args.api_url {
            self.api_url = validate_api_url(url)?;
        }
        if let Some(dir) = &args.data_dir {
            self.data_dir = dir.clone();
        }
        if let Some(secs) = args.scan_timeout {
            self.scan_timeout = Duration::from_secs(validate_timeout_secs("scan-timeout", secs)?);
        }
        if let Some(secs) = args.request_timeout {
            self.request_timeout =
                Duration::from_secs(validate_timeout_secs("request-timeout", secs)?);
        }
        if let Some(level) = &args.log_level {
            self.log_level = Some(parse_log_level(level)?);
        }
        if let Some(file) = &args.log_file {
            self.log_file = log_file_setting(file);
        }
        if let Some(format) = &args.log_format {
            self.log_format = parse_log_format(format)?;
        }
        if let Some(color) = args.color_override() {
            self.color = Some(color);
        }
        Ok(())
    }

    pub fn color_enabled(&self) -> bool {
        self.color
            .unwrap_or_else(|| std::io::IsTerminal::is_terminal(&std::io::stdout()))
    }
}

/// Keys in `config` this version does not understand
pub fn unknown_keys(config: &toml::Table) -> Vec<&str> {
    config
        .keys()
        .map(|k| k.as_str())
        .filter(|k| !KNOWN_KEYS.contains(k))
        .collect()
}

fn get_str<'a>(config: &'a toml::Table, key: &str) -> Result<Option<&'a str>, ValidationError> {
    match config.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(Some)
            .ok_or_else(|| ValidationError::new(&format!("{} must be a string", key))),
    }
}

fn get_integer(config: &toml::Table, key: &str) -> Result<Option<i64>, ValidationError> {
    match config.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_integer()
            .map(Some)
            .ok_or_else(|| ValidationError::new(&format!("{} must be a whole number of seconds", key))),
    }
}

fn parse_log_level(level: &str) -> Result<String, ValidationError> {
    let lower = level.to_ascii_lowercase();
    if LOG_LEVELS.contains(&lower.as_str()) {
        Ok(lower)
    } else {
        Err(ValidationError::new(&format!(
            "log-level '{}' must be one of {}",
            level,
            LOG_LEVELS.join(", ")
        )))
    }
}

fn parse_log_format(format: &str) -> Result<LogFormat, ValidationError> {
    LogFormat::parse(format).ok_or_else(|| {
        ValidationError::new(&format!(
            "log-format '{}' must be one of text, ext, json",
            format
        ))
    })
}

// "none" and "-" disable file logging
fn log_file_setting(file: &Path) -> Option<PathBuf> {
    match file.to_str() {
        Some(s) if s.eq_ignore_ascii_case("none") || s == "-" => None,
        _ => Some(file.to_path_buf()),
    }
}
