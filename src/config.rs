//! qrbadge runtime configuration handling

use crate::badge::BadgeOptions;
use crate::color::ColorSpec;
use crate::error::{Error, Result};
use crate::metadata::DEFAULT_TABLE;
use crate::qr::StyleOptions;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration structure persisted to disk or environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QrBadgeConfig {
    /// Output location and overlay policy
    pub output: OutputOptions,
    /// Metadata defaults and store location
    pub metadata: MetadataOptions,
    /// Logo badge geometry
    pub badge: BadgeOptions,
    /// QR raster styling
    pub style: StyleOptions,
    /// Logging configuration
    pub logging: LoggingOptions,
}

impl QrBadgeConfig {
    /// Load configuration from an explicit path or fall back to discovered defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = explicit_path {
            Self::from_file(path)?
        } else if let Some(path) = Self::discover_file()? {
            tracing::info!("Using configuration file: {}", path.display());
            Self::from_file(&path)?
        } else {
            tracing::debug!("No qrbadge.toml / qrbadge.yaml found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Attempt to locate a configuration file in common locations.
    fn discover_file() -> Result<Option<PathBuf>> {
        let cwd =
            env::current_dir().map_err(|e| Error::Config(format!("Failed to read cwd: {e}")))?;
        for candidate in ["qrbadge.toml", "qrbadge.yaml", "qrbadge.yml"] {
            let path = cwd.join(candidate);
            if path.exists() {
                return Ok(Some(path));
            }
        }

        if let Some(xdg_config) = env::var_os("XDG_CONFIG_HOME") {
            let base = PathBuf::from(xdg_config).join("qrbadge");
            for candidate in ["config.toml", "config.yaml"] {
                let path = base.join(candidate);
                if path.exists() {
                    return Ok(Some(path));
                }
            }
        }

        Ok(None)
    }

    /// Read configuration from a concrete file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;

        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase()
            .as_str()
        {
            "toml" => toml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse TOML {}: {e}", path.display()))
            }),
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse YAML {}: {e}", path.display()))
            }),
            other => Err(Error::Config(format!(
                "Unsupported config format '{}', expected toml/yaml",
                other
            ))),
        }
    }

    /// Apply environment variable overrides after file/default loading.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply `QRBADGE_*` overrides read through `lookup`.
    pub(crate) fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        self.output.apply_overrides(&lookup);
        self.metadata.apply_overrides(&lookup);
        self.style.apply_overrides(&lookup);
        self.logging.apply_overrides(&lookup);
    }
}

/// Where generated images go and how the logo overlay is placed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    /// Directory receiving the PNG files (created if absent)
    pub dir: PathBuf,
    /// Logo loaded before generating, if any
    pub logo: Option<PathBuf>,
    /// Side in pixels the badge is resized to before pasting
    pub overlay_size: u32,
    /// Largest overlay area accepted, as a share of the symbol area
    pub max_overlay_ratio: f64,
    /// Reject oversized overlays instead of warning
    pub strict_overlay: bool,
    /// Decode each written image and compare it with the input
    pub verify: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("out"),
            logo: None,
            overlay_size: 70,
            max_overlay_ratio: 0.28,
            strict_overlay: false,
            verify: false,
        }
    }
}

impl OutputOptions {
    fn apply_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup("QRBADGE_OUT_DIR") {
            self.dir = PathBuf::from(dir);
        }
        if let Some(logo) = lookup("QRBADGE_LOGO") {
            self.logo = if logo.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(logo))
            };
        }
        if let Some(size) = lookup("QRBADGE_OVERLAY_SIZE") {
            if let Ok(parsed) = size.parse::<u32>() {
                self.overlay_size = parsed;
            }
        }
        if let Some(ratio) = lookup("QRBADGE_MAX_OVERLAY_RATIO") {
            if let Ok(parsed) = ratio.parse::<f64>() {
                self.max_overlay_ratio = parsed.clamp(0.0, 1.0);
            }
        }
        if let Some(flag) = lookup("QRBADGE_STRICT_OVERLAY").and_then(|v| parse_flag(&v)) {
            self.strict_overlay = flag;
        }
        if let Some(flag) = lookup("QRBADGE_VERIFY").and_then(|v| parse_flag(&v)) {
            self.verify = flag;
        }
    }
}

/// Values recorded with each generated code
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataOptions {
    /// SQLite database file; metadata is not recorded when unset
    pub database: Option<PathBuf>,
    /// Table receiving the records
    pub table: String,
    /// Author stored with each record
    pub author: String,
    /// Description stored with each record
    pub description: String,
}

impl Default for MetadataOptions {
    fn default() -> Self {
        Self {
            database: None,
            table: DEFAULT_TABLE.to_string(),
            author: "<default>".to_string(),
            description: "<default>".to_string(),
        }
    }
}

impl MetadataOptions {
    fn apply_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) {
        if let Some(db) = lookup("QRBADGE_DATABASE") {
            self.database = if db.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(db))
            };
        }
        if let Some(table) = lookup("QRBADGE_TABLE") {
            self.table = table;
        }
        if let Some(author) = lookup("QRBADGE_AUTHOR") {
            self.author = author;
        }
        if let Some(description) = lookup("QRBADGE_DESCRIPTION") {
            self.description = description;
        }
    }
}

impl StyleOptions {
    pub(crate) fn apply_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) {
        if let Some(shape) = lookup("QRBADGE_SHAPE") {
            match shape.parse() {
                Ok(parsed) => self.shape = parsed,
                Err(e) => tracing::warn!("Ignoring QRBADGE_SHAPE: {e}"),
            }
        }
        if let Some(fill) = lookup("QRBADGE_FILL") {
            match fill.parse() {
                Ok(parsed) => self.fill = parsed,
                Err(e) => tracing::warn!("Ignoring QRBADGE_FILL: {e}"),
            }
        }
        if let Some(color) = lookup("QRBADGE_COLOR") {
            self.color = parse_color(&color);
        }
        if let Some(color) = lookup("QRBADGE_GRADIENT_COLOR") {
            self.gradient_color = Some(parse_color(&color));
        }
        if let Some(color) = lookup("QRBADGE_BACKGROUND") {
            self.background = parse_color(&color);
        }
        if let Some(size) = lookup("QRBADGE_MODULE_SIZE") {
            if let Ok(parsed) = size.parse::<u32>() {
                self.module_size = parsed;
            }
        }
        if let Some(mask) = lookup("QRBADGE_MASK_IMAGE") {
            self.mask_image = Some(PathBuf::from(mask));
        }
    }
}

/// Structured logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    /// Default log level (overridable via `QRBADGE_LOG_LEVEL`)
    pub level: String,
    /// Optional log file path for teeing structured logs
    pub file: Option<PathBuf>,
    /// Force ANSI colors in stdout logging
    pub color: bool,
    /// Optional log rotation strategy applied to `file`
    pub rotation: Option<LogRotation>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            color: true,
            rotation: None,
        }
    }
}

impl LoggingOptions {
    fn apply_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) {
        if let Some(level) = lookup("QRBADGE_LOG_LEVEL") {
            self.level = level;
        }
        if let Some(file) = lookup("QRBADGE_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }
        if let Some(color) = lookup("QRBADGE_LOG_COLOR").and_then(|v| parse_flag(&v)) {
            self.color = color;
        }
        if let Some(rotation) = lookup("QRBADGE_LOG_ROTATION") {
            if let Some(parsed) = LogRotation::from_str(&rotation) {
                self.rotation = Some(parsed);
            }
        }
    }
}

/// Supported log rotation policies for file sinks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    /// Rotate log files once per hour
    Hourly,
    /// Rotate log files once per day
    Daily,
}

impl LogRotation {
    fn from_str(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            _ => None,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

fn parse_color(value: &str) -> ColorSpec {
    match value.parse() {
        Ok(color) => color,
        Err(never) => match never {},
    }
}
