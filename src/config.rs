//! Application configuration module.
//!
//! Handles loading, validating, and merging `caption-press.toml`. Stock
//! defaults are the base layer; a user file in the config directory overrides
//! any subset of keys.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [fonts]
//! dir = "fonts"                 # Relative to the config directory
//! palette = ["creamy", "American", "Typewriter"]   # <dir>/<name>.ttf
//!
//! [fit]
//! max_font_size = 200.0         # Search starts here and walks down
//!
//! [normalize]
//! min_width = 1200
//! min_height = 1200
//! max_width = 1920
//! max_height = 1080
//!
//! [output]
//! format = "png"                # png | jpeg | tiff | bmp
//! jpeg_quality = 75             # 1-100
//!
//! [mail]
//! host = "smtp.gmail.com"
//! port = 587
//! username = ""
//! from = ""
//! password_env = "CAPTION_PRESS_SMTP_PASSWORD"
//! subject = "Image Attachment"
//! timeout_secs = 30
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [mail]
//! username = "me@example.com"
//! from = "me@example.com"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{OutputFormat, Quality, ResolutionBand};
use crate::style::FontPalette;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Name of the user config file looked up in the config directory.
pub const CONFIG_FILE_NAME: &str = "caption-press.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Application configuration loaded from `caption-press.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Font palette offered by name.
    pub fonts: FontsConfig,
    /// Font-fit search settings.
    pub fit: FitConfig,
    /// Resolution band for loaded images.
    pub normalize: ResolutionBand,
    /// Default output format and encoder settings.
    pub output: OutputConfig,
    /// SMTP relay settings.
    pub mail: MailConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let max = self.fit.max_font_size;
        if !max.is_finite() || max < 1.0 {
            return Err(ConfigError::Validation(
                "fit.max_font_size must be at least 1".into(),
            ));
        }
        let band = &self.normalize;
        if [band.min_width, band.min_height, band.max_width, band.max_height].contains(&0) {
            return Err(ConfigError::Validation(
                "normalize bounds must be non-zero".into(),
            ));
        }
        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(ConfigError::Validation(
                "output.jpeg_quality must be 1-100".into(),
            ));
        }
        if self.fonts.palette.iter().any(|n| n.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "fonts.palette entries must not be empty".into(),
            ));
        }
        if self.mail.port == 0 {
            return Err(ConfigError::Validation("mail.port must be non-zero".into()));
        }
        if self.mail.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "mail.timeout_secs must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Font palette with `fonts.dir` resolved against `base` when relative.
    pub fn font_palette(&self, base: &Path) -> FontPalette {
        let dir = Path::new(&self.fonts.dir);
        let dir = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            base.join(dir)
        };
        FontPalette::new(dir, self.fonts.palette.clone())
    }
}

/// Fonts offered by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontsConfig {
    /// Directory holding `<name>.ttf` files.
    pub dir: String,
    /// Font names shown to the user.
    pub palette: Vec<String>,
}

impl Default for FontsConfig {
    fn default() -> Self {
        Self {
            dir: "fonts".to_string(),
            palette: vec![
                "creamy".to_string(),
                "American".to_string(),
                "Typewriter".to_string(),
            ],
        }
    }
}

/// Font-fit search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FitConfig {
    /// Largest font size tried. The search walks down one unit at a time.
    pub max_font_size: f32,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            max_font_size: crate::text::DEFAULT_MAX_FONT_SIZE,
        }
    }
}

/// Output encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Format used when none is given on the command line.
    pub format: OutputFormat,
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub jpeg_quality: u32,
}

impl OutputConfig {
    pub fn quality(&self) -> Quality {
        Quality::new(self.jpeg_quality)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Png,
            jpeg_quality: 75,
        }
    }
}

/// SMTP relay settings. The password is never stored in the file; it is read
/// from the environment variable named by `password_env`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    /// Sender address. Falls back to `username` when empty.
    pub from: String,
    pub password_env: String,
    pub subject: String,
    /// Upper bound for the whole SMTP exchange, in seconds.
    pub timeout_secs: u64,
}

impl MailConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn sender(&self) -> &str {
        if self.from.is_empty() {
            &self.username
        } else {
            &self.from
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            username: String::new(),
            from: String::new(),
            password_env: "CAPTION_PRESS_SMTP_PASSWORD".to_string(),
            subject: "Image Attachment".to_string(),
            timeout_secs: 30,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(AppConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config does not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Path of the user config file inside `dir`.
pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

/// Load `caption-press.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let path = config_path(dir);
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AppConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `caption-press.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<AppConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `caption-press.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# caption-press configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file as caption-press.toml in the config directory
# (the current directory unless --config is given).
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Fonts
# ---------------------------------------------------------------------------
[fonts]
# Directory holding the palette fonts, relative to the config directory.
dir = "fonts"

# Names offered by --font. Each resolves to <dir>/<name>.ttf.
# A path ending in .ttf or .otf is also accepted by --font.
palette = ["creamy", "American", "Typewriter"]

# ---------------------------------------------------------------------------
# Font fitting
# ---------------------------------------------------------------------------
[fit]
# Largest font size tried. Each caption starts here and steps down by 1
# until its rendered text fits inside the image.
max_font_size = 200.0

# ---------------------------------------------------------------------------
# Normalization
# ---------------------------------------------------------------------------
[normalize]
# Loaded images outside this band are resampled (Lanczos3), keeping their
# aspect ratio. Oversized images shrink to fit the max box; undersized
# images grow to cover the min box.
min_width = 1200
min_height = 1200
max_width = 1920
max_height = 1080

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Format used when --format is not given: png, jpeg, tiff or bmp.
format = "png"

# JPEG encoding quality (1 = worst, 100 = best).
jpeg_quality = 75

# ---------------------------------------------------------------------------
# Mail delivery
# ---------------------------------------------------------------------------
[mail]
# SMTP relay, reached with STARTTLS.
host = "smtp.gmail.com"
port = 587

# Login name. Also used as the sender when `from` is empty.
username = ""
from = ""

# Environment variable holding the SMTP password.
password_env = "CAPTION_PRESS_SMTP_PASSWORD"

subject = "Image Attachment"

# Give up on the relay after this many seconds.
timeout_secs = 30
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = AppConfig::default();
        assert_eq!(config.fonts.dir, "fonts");
        assert_eq!(config.fonts.palette, vec!["creamy", "American", "Typewriter"]);
        assert_eq!(config.fit.max_font_size, 200.0);
        assert_eq!(config.normalize, ResolutionBand::default());
        assert_eq!(config.output.format, OutputFormat::Png);
        assert_eq!(config.output.quality().value(), 75);
        assert_eq!(config.mail.port, 587);
        assert_eq!(config.mail.subject, "Image Attachment");
        assert_eq!(config.mail.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn default_config_is_valid() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[output]
format = "jpeg"
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.output.format, OutputFormat::Jpeg);
        // Defaults preserved
        assert_eq!(config.output.jpeg_quality, 75);
        assert_eq!(config.mail.host, "smtp.gmail.com");
    }

    #[test]
    fn unknown_format_token_is_rejected() {
        let toml = r#"
[output]
format = "gif"
"#;
        assert!(toml::from_str::<AppConfig>(toml).is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml = r#"
[mail]
hostname = "typo.example.com"
"#;
        assert!(toml::from_str::<AppConfig>(toml).is_err());
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.output.jpeg_quality = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.fit.max_font_size = 0.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.normalize.max_width = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.mail.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.fonts.palette.push("  ".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn sender_falls_back_to_username() {
        let mut mail = MailConfig {
            username: "me@example.com".into(),
            ..MailConfig::default()
        };
        assert_eq!(mail.sender(), "me@example.com");
        mail.from = "Captions <bot@example.com>".into();
        assert_eq!(mail.sender(), "Captions <bot@example.com>");
    }

    #[test]
    fn relative_font_dir_resolves_against_base() {
        let palette = AppConfig::default().font_palette(Path::new("/etc/caption-press"));
        let font = palette.resolve("creamy").unwrap();
        assert_eq!(font.path(), Path::new("/etc/caption-press/fonts/creamy.ttf"));
    }

    #[test]
    fn absolute_font_dir_is_kept() {
        let mut config = AppConfig::default();
        config.fonts.dir = "/usr/share/fonts/meme".into();
        let font = config.font_palette(Path::new("/ignored")).resolve("Typewriter").unwrap();
        assert_eq!(font.path(), Path::new("/usr/share/fonts/meme/Typewriter.ttf"));
    }

    // =========================================================================
    // merge / load
    // =========================================================================

    #[test]
    fn merge_overrides_scalars_and_keeps_siblings() {
        let base: toml::Value = toml::from_str("[mail]\nhost = \"a\"\nport = 1\n").unwrap();
        let overlay: toml::Value = toml::from_str("[mail]\nport = 2\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["mail"]["host"].as_str(), Some("a"));
        assert_eq!(merged["mail"]["port"].as_integer(), Some(2));
    }

    #[test]
    fn merge_replaces_arrays_wholesale() {
        let base: toml::Value = toml::from_str("[fonts]\npalette = [\"a\", \"b\"]\n").unwrap();
        let overlay: toml::Value = toml::from_str("[fonts]\npalette = [\"c\"]\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["fonts"]["palette"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.mail.host, "smtp.gmail.com");
        assert_eq!(config.fonts.palette.len(), 3);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            config_path(tmp.path()),
            r#"
[fonts]
palette = ["Impact"]

[normalize]
max_width = 1280
max_height = 720
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.fonts.palette, vec!["Impact"]);
        assert_eq!(config.normalize.max_width, 1280);
        assert_eq!(config.normalize.max_height, 720);
        // Unspecified values are defaults
        assert_eq!(config.normalize.min_width, 1200);
        assert_eq!(config.fonts.dir, "fonts");
    }

    #[test]
    fn load_config_rejects_invalid_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(config_path(tmp.path()), "[output]\njpeg_quality = 101\n").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn load_config_reports_bad_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(config_path(tmp.path()), "[mail\n").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let config: AppConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = AppConfig::default();
        assert_eq!(config.fonts.palette, defaults.fonts.palette);
        assert_eq!(config.normalize, defaults.normalize);
        assert_eq!(config.output.jpeg_quality, defaults.output.jpeg_quality);
        assert_eq!(config.mail.password_env, defaults.mail.password_env);
        assert_eq!(config.mail.timeout_secs, defaults.mail.timeout_secs);
    }
}
