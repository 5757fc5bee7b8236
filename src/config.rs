//! Behavior configuration.
//!
//! Handles loading, validating, and merging the behavior config file. A config
//! file is sparse: it is merged over the stock defaults, so it only needs the
//! values it changes.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [lazy]
//! throttle = "200ms"        # Quiet window of the scroll-polling fallback
//! observer = "auto"         # "auto" uses the intersection watcher when available,
//!                           # "never" always uses scroll polling
//!
//! [gallery]
//! debounce = "150ms"        # Quiet period before the position indicator refreshes
//!
//! [classes]
//! fade = "lazy"             # Added to replacement images (opacity 0)
//! loaded = "lazy--loaded"   # Added once the replacement has loaded (opacity 1)
//! modal_active = "is-active"
//!
//! [selectors]
//! lazy_image = "lazy"       # Class of placeholder <img> elements
//! gallery = "gallery-images"
//! gallery_item = "gallery-image"
//! open_trigger = "open-gallery"
//! index_display = "gallery-index"
//! modal = "modal"
//! close = "modal-close"
//! prev = "btn-prev"         # Element id, not a class
//! next = "btn-next"         # Element id, not a class
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Behavior configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BehaviorConfig {
    /// Lazy image activation settings.
    pub lazy: LazyConfig,
    /// Gallery timing settings.
    pub gallery: GalleryConfig,
    /// CSS classes the behavior layer applies.
    pub classes: ClassConfig,
    /// Structural conventions used to find elements on the page.
    pub selectors: SelectorConfig,
}

impl BehaviorConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lazy.throttle.is_zero() {
            return Err(ConfigError::Validation(
                "lazy.throttle must be greater than zero".into(),
            ));
        }
        if self.gallery.debounce.is_zero() {
            return Err(ConfigError::Validation(
                "gallery.debounce must be greater than zero".into(),
            ));
        }
        let names = [
            ("classes.fade", &self.classes.fade),
            ("classes.loaded", &self.classes.loaded),
            ("classes.modal_active", &self.classes.modal_active),
            ("selectors.lazy_image", &self.selectors.lazy_image),
            ("selectors.gallery", &self.selectors.gallery),
            ("selectors.gallery_item", &self.selectors.gallery_item),
            ("selectors.open_trigger", &self.selectors.open_trigger),
            ("selectors.index_display", &self.selectors.index_display),
            ("selectors.modal", &self.selectors.modal),
            ("selectors.close", &self.selectors.close),
            ("selectors.prev", &self.selectors.prev),
            ("selectors.next", &self.selectors.next),
        ];
        for (key, value) in names {
            if value.is_empty() || value.chars().any(char::is_whitespace) {
                return Err(ConfigError::Validation(format!(
                    "{key} must be a single non-empty name, got {value:?}"
                )));
            }
        }
        if self.classes.fade == self.classes.loaded {
            return Err(ConfigError::Validation(
                "classes.fade and classes.loaded must differ".into(),
            ));
        }
        Ok(())
    }
}

/// Whether the intersection watcher may be used when the host offers one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObserverMode {
    #[default]
    Auto,
    Never,
}

/// Lazy image activation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LazyConfig {
    /// Quiet window of the scroll-polling fallback.
    #[serde(with = "humantime_serde")]
    pub throttle: Duration,
    pub observer: ObserverMode,
}

impl Default for LazyConfig {
    fn default() -> Self {
        Self {
            throttle: Duration::from_millis(200),
            observer: ObserverMode::Auto,
        }
    }
}

/// Gallery timing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Quiet period after the last gallery scroll before the indicator refreshes.
    #[serde(with = "humantime_serde")]
    pub debounce: Duration,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(150),
        }
    }
}

/// CSS state classes applied by the behavior layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassConfig {
    /// Added to a replacement image on creation (opacity 0).
    pub fade: String,
    /// Added once the replacement finished loading (transition to opacity 1).
    pub loaded: String,
    /// Toggled on the modal container.
    pub modal_active: String,
}

impl Default for ClassConfig {
    fn default() -> Self {
        Self {
            fade: "lazy".to_string(),
            loaded: "lazy--loaded".to_string(),
            modal_active: "is-active".to_string(),
        }
    }
}

/// Class names (and two element ids) the page markup follows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectorConfig {
    pub lazy_image: String,
    pub gallery: String,
    pub gallery_item: String,
    pub open_trigger: String,
    pub index_display: String,
    pub modal: String,
    pub close: String,
    /// Element id of the "previous" button.
    pub prev: String,
    /// Element id of the "next" button.
    pub next: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            lazy_image: "lazy".to_string(),
            gallery: "gallery-images".to_string(),
            gallery_item: "gallery-image".to_string(),
            open_trigger: "open-gallery".to_string(),
            index_display: "gallery-index".to_string(),
            modal: "modal".to_string(),
            close: "modal-close".to_string(),
            prev: "btn-prev".to_string(),
            next: "btn-next".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(BehaviorConfig::default())?)
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

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<BehaviorConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: BehaviorConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config file at `path`, falling back to stock defaults when it
/// does not exist.
pub fn load_config(path: &Path) -> Result<BehaviorConfig, ConfigError> {
    resolve_config(load_raw_config(path)?)
}

/// A documented stock config file.
pub fn stock_config_toml() -> &'static str {
    r#"# simple-gal-client behavior configuration
# All options are optional; values below are the defaults.

[lazy]
# Quiet window of the scroll-polling fallback. The first scroll in a quiet
# window schedules one visibility sweep; later scrolls in the same window
# are ignored.
throttle = "200ms"
# "auto": use the host intersection watcher when it exists.
# "never": always poll on scroll.
observer = "auto"

[gallery]
# Quiet period after the last gallery scroll before "N / M" refreshes.
debounce = "150ms"

[classes]
# Replacement images start with `fade` (opacity 0) and gain `loaded`
# (opacity 1) once they finish loading.
fade = "lazy"
loaded = "lazy--loaded"
# Toggled on the modal container when the gallery opens.
modal_active = "is-active"

[selectors]
# Placeholder images are <img> elements with this class.
lazy_image = "lazy"
gallery = "gallery-images"
gallery_item = "gallery-image"
open_trigger = "open-gallery"
index_display = "gallery-index"
modal = "modal"
close = "modal-close"
# Element ids of the optional previous/next buttons.
prev = "btn-prev"
next = "btn-next"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_timings() {
        let config = BehaviorConfig::default();
        assert_eq!(config.lazy.throttle, Duration::from_millis(200));
        assert_eq!(config.gallery.debounce, Duration::from_millis(150));
        assert_eq!(config.lazy.observer, ObserverMode::Auto);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(BehaviorConfig::default().validate().is_ok());
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let value: toml::Value = toml::from_str(stock_config_toml()).unwrap();
        let config = resolve_config(Some(value)).unwrap();
        assert_eq!(config, BehaviorConfig::default());
    }

    #[test]
    fn parse_partial_config() {
        let overlay: toml::Value = toml::from_str(
            r#"
            [lazy]
            throttle = "50ms"
            "#,
        )
        .unwrap();
        let config = resolve_config(Some(overlay)).unwrap();
        assert_eq!(config.lazy.throttle, Duration::from_millis(50));
        assert_eq!(config.lazy.observer, ObserverMode::Auto);
        assert_eq!(config.gallery.debounce, Duration::from_millis(150));
    }

    #[test]
    fn parse_observer_never() {
        let overlay: toml::Value = toml::from_str("[lazy]\nobserver = \"never\"").unwrap();
        let config = resolve_config(Some(overlay)).unwrap();
        assert_eq!(config.lazy.observer, ObserverMode::Never);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let overlay: toml::Value = toml::from_str("[lazy]\nthrotle = \"50ms\"").unwrap();
        assert!(matches!(
            resolve_config(Some(overlay)),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn zero_debounce_is_invalid() {
        let overlay: toml::Value = toml::from_str("[gallery]\ndebounce = \"0s\"").unwrap();
        let err = resolve_config(Some(overlay)).unwrap_err();
        assert!(err.to_string().contains("gallery.debounce"));
    }

    #[test]
    fn class_names_with_whitespace_are_invalid() {
        let mut config = BehaviorConfig::default();
        config.classes.loaded = "lazy loaded".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("classes.loaded"));
    }

    #[test]
    fn fade_and_loaded_must_differ() {
        let mut config = BehaviorConfig::default();
        config.classes.loaded = config.classes.fade.clone();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("client.toml")).unwrap();
        assert_eq!(config, BehaviorConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("client.toml");
        fs::write(
            &path,
            r#"
            [classes]
            modal_active = "open"

            [selectors]
            prev = "previous"
            "#,
        )
        .unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.classes.modal_active, "open");
        assert_eq!(config.selectors.prev, "previous");
        assert_eq!(config.selectors.next, "btn-next");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("client.toml");
        fs::write(&path, "[lazy\nthrottle = ").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("a = 1\nb = 2").unwrap();
        let overlay: toml::Value = toml::from_str("b = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"].as_integer(), Some(1));
        assert_eq!(merged["b"].as_integer(), Some(3));
    }

    #[test]
    fn merge_toml_deep_nested() {
        let base: toml::Value = toml::from_str(
            r#"
            [lazy]
            throttle = "200ms"
            observer = "auto"
            "#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str("[lazy]\nobserver = \"never\"").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["lazy"]["throttle"].as_str(), Some("200ms"));
        assert_eq!(merged["lazy"]["observer"].as_str(), Some("never"));
    }
}
