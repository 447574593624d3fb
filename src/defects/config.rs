use crate::error::{DefectError, Result};
use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

pub const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BODY_LIMIT: usize = 50 * 1024 * 1024;

/// Paths the record API owns; the image route may not overlap them.
const RESERVED_ROUTES: &[&str] = &["/api/defects", "/api/health"];

/// Server configuration, stored in `<data-dir>/config.json`.
///
/// Every field has a default, so a partial file (or none at all) is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DefectsConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub records: RecordsConfig,
    #[serde(default)]
    pub images: ImagesConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Largest accepted request body. Images travel inline, so this is generous.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
    #[serde(default = "default_cors_origin")]
    pub cors_allow_origin: String,
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_body_limit() -> usize {
    DEFAULT_BODY_LIMIT
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: DEFAULT_PORT,
            body_limit_bytes: DEFAULT_BODY_LIMIT,
            cors_allow_origin: default_cors_origin(),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// The configured origin as an `Access-Control-Allow-Origin` value.
    pub fn cors_origin(&self) -> Result<HeaderValue> {
        HeaderValue::from_str(&self.cors_allow_origin).map_err(|_| {
            DefectError::Config(format!(
                "server.cors_allow_origin is not a valid header value: {:?}",
                self.cors_allow_origin
            ))
        })
    }
}

/// What to do when the record file exists but cannot be read.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OnCorrupt {
    /// Refuse to start.
    #[default]
    Fail,
    /// Move the unreadable file aside and start with no records.
    StartEmpty,
}

impl FromStr for OnCorrupt {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "fail" => Ok(OnCorrupt::Fail),
            "start-empty" => Ok(OnCorrupt::StartEmpty),
            other => Err(format!(
                "unknown policy '{}', expected 'fail' or 'start-empty'",
                other
            )),
        }
    }
}

impl fmt::Display for OnCorrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnCorrupt::Fail => write!(f, "fail"),
            OnCorrupt::StartEmpty => write!(f, "start-empty"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordsConfig {
    #[serde(default = "default_records_file")]
    pub file_name: String,
    #[serde(default)]
    pub on_corrupt: OnCorrupt,
}

fn default_records_file() -> String {
    crate::store::fs::DEFAULT_RECORDS_FILE.to_string()
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            file_name: default_records_file(),
            on_corrupt: OnCorrupt::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImagesConfig {
    #[serde(default = "default_images_dir")]
    pub dir_name: String,
    /// Path prefix clients use to fetch images; stored filenames are appended to it.
    #[serde(default = "default_route_prefix")]
    pub route_prefix: String,
}

fn default_images_dir() -> String {
    crate::store::fs::DEFAULT_IMAGES_DIR.to_string()
}

fn default_route_prefix() -> String {
    "/api/images".to_string()
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            dir_name: default_images_dir(),
            route_prefix: default_route_prefix(),
        }
    }
}

/// Optional vocabularies for free-text fields. An empty list accepts anything.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationConfig {
    #[serde(default)]
    pub statuses: Vec<String>,
    #[serde(default)]
    pub severities: Vec<String>,
}

impl ValidationConfig {
    pub fn check_status(&self, value: &str) -> Result<()> {
        check_vocabulary("status", &self.statuses, value)
    }

    pub fn check_severity(&self, value: &str) -> Result<()> {
        check_vocabulary("severity", &self.severities, value)
    }
}

fn check_vocabulary(field: &'static str, allowed: &[String], value: &str) -> Result<()> {
    if allowed.is_empty() || allowed.iter().any(|a| a == value) {
        Ok(())
    } else {
        Err(DefectError::InvalidField {
            field,
            value: value.to_string(),
        })
    }
}

impl DefectsConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);
        if !config_path.exists() {
            return Ok(Self::default());
        }
        Self::load_file(config_path)
    }

    /// Load config from an explicit path, which must exist
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            DefectError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: DefectsConfig = serde_json::from_str(&content).map_err(|e| {
            DefectError::Config(format!("cannot parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(DefectError::Io)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(DefectError::Serialization)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content).map_err(DefectError::Io)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.records.file_name.is_empty() {
            return Err(DefectError::Config("records.file_name is empty".to_string()));
        }
        if self.images.dir_name.is_empty() {
            return Err(DefectError::Config("images.dir_name is empty".to_string()));
        }
        check_route_prefix(&self.images.route_prefix)?;
        self.server.cors_origin()?;
        if self.server.body_limit_bytes == 0 {
            return Err(DefectError::Config(
                "server.body_limit_bytes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Checks that `prefix` can be mounted as `<prefix>/:filename` next to the
/// record routes.
pub fn check_route_prefix(prefix: &str) -> Result<()> {
    let invalid = |reason: &str| {
        Err(DefectError::Config(format!(
            "images.route_prefix {}: {}",
            reason, prefix
        )))
    };
    if !prefix.starts_with('/') {
        return invalid("must start with '/'");
    }
    if prefix.contains([':', '*']) {
        return invalid("must not contain ':' or '*'");
    }
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() || trimmed.contains("//") {
        return invalid("needs at least one non-empty segment");
    }
    let overlaps = RESERVED_ROUTES.iter().any(|reserved| {
        trimmed == *reserved
            || trimmed
                .strip_prefix(reserved)
                .is_some_and(|rest| rest.starts_with('/'))
    });
    if overlaps {
        return invalid("overlaps the defect API routes");
    }
    Ok(())
}
