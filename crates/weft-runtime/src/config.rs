#![forbid(unsafe_code)]

//! Policy-as-data configuration for the UI core.
//!
//! Every tunable the scheduler, the drag-and-drop machinery and the panels
//! consult lives in one [`UiConfig`] that can be loaded from TOML or JSON at
//! startup.
//!
//! # Loading
//!
//! ```toml
//! # weft.toml
//! min_render_interval_ms = 8
//! drag_threshold = 6.0
//! ```
//!
//! ```rust,ignore
//! let config = UiConfig::from_toml_file("weft.toml")?.with_env_overrides();
//! ```
//!
//! # Defaults
//!
//! `UiConfig::default()` reproduces the built-in constants exactly.

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use web_time::Duration;

/// Default minimum time between two renders of the visual pass.
pub const DEFAULT_MIN_RENDER_INTERVAL_MS: u64 = 16;

/// Default cap on layout waves per frame.
pub const DEFAULT_MAX_LAYOUT_WAVES: usize = 64;

/// Environment variable overriding [`UiConfig::min_render_interval_ms`].
pub const ENV_MIN_RENDER_INTERVAL_MS: &str = "WEFT_MIN_RENDER_INTERVAL_MS";

/// Environment variable overriding [`UiConfig::max_layout_waves`].
pub const ENV_MAX_LAYOUT_WAVES: &str = "WEFT_MAX_LAYOUT_WAVES";

/// Runtime configuration for one UI session.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct UiConfig {
    /// Minimum milliseconds between two visual passes.
    pub min_render_interval_ms: u64,
    /// Maximum number of layout waves processed in one frame before the
    /// remainder is deferred to the next frame.
    pub max_layout_waves: usize,
    /// Pointer travel (DIP) before a pressed tab button starts dragging.
    pub drag_threshold: f64,
    /// Slack (DIP) around a tab-button strip before an in-host drag detaches.
    pub strip_detach_margin: f64,
    /// Default separator thickness of new split panels.
    pub separator_size: f64,
    /// Fraction of the destination selector's width/height that maps to a
    /// split destination on each edge.
    pub selector_edge_fraction: f64,
    /// Client width of windows created by tearing off a tab.
    pub new_window_width: f64,
    /// Client height of windows created by tearing off a tab.
    pub new_window_height: f64,
    /// Distance scrolled per wheel notch.
    pub wheel_scroll_step: f64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            min_render_interval_ms: DEFAULT_MIN_RENDER_INTERVAL_MS,
            max_layout_waves: DEFAULT_MAX_LAYOUT_WAVES,
            drag_threshold: 4.0,
            strip_detach_margin: 16.0,
            separator_size: 4.0,
            selector_edge_fraction: 0.25,
            new_window_width: 800.0,
            new_window_height: 600.0,
            wheel_scroll_step: 48.0,
        }
    }
}

impl UiConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.checked()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        config.checked()
    }

    /// Serialize to pretty TOML.
    #[cfg(feature = "config")]
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Validation(vec![e.to_string()]))
    }

    #[cfg(feature = "config")]
    fn checked(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Apply `WEFT_*` environment overrides. Unparseable values are ignored
    /// with a warning.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (environment in production,
    /// a map in tests).
    #[must_use]
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup(ENV_MIN_RENDER_INTERVAL_MS) {
            match raw.trim().parse::<u64>() {
                Ok(value) => self.min_render_interval_ms = value,
                Err(err) => tracing::warn!(
                    target: "weft.config",
                    key = ENV_MIN_RENDER_INTERVAL_MS,
                    value = %raw,
                    error = %err,
                    "ignoring unparseable override"
                ),
            }
        }
        if let Some(raw) = lookup(ENV_MAX_LAYOUT_WAVES) {
            match raw.trim().parse::<usize>() {
                Ok(value) if value > 0 => self.max_layout_waves = value,
                Ok(_) => tracing::warn!(
                    target: "weft.config",
                    key = ENV_MAX_LAYOUT_WAVES,
                    "ignoring zero wave limit"
                ),
                Err(err) => tracing::warn!(
                    target: "weft.config",
                    key = ENV_MAX_LAYOUT_WAVES,
                    value = %raw,
                    error = %err,
                    "ignoring unparseable override"
                ),
            }
        }
        self
    }

    /// Minimum render interval as a duration.
    #[must_use]
    pub fn min_render_interval(&self) -> Duration {
        Duration::from_millis(self.min_render_interval_ms)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_layout_waves == 0 {
            errors.push("max_layout_waves must be > 0".into());
        }
        for (name, value) in [
            ("drag_threshold", self.drag_threshold),
            ("strip_detach_margin", self.strip_detach_margin),
            ("separator_size", self.separator_size),
            ("wheel_scroll_step", self.wheel_scroll_step),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                errors.push(format!("{name} must be a finite value >= 0, got {value}"));
            }
        }
        if !(self.selector_edge_fraction > 0.0 && self.selector_edge_fraction <= 0.5) {
            errors.push(format!(
                "selector_edge_fraction must be in (0, 0.5], got {}",
                self.selector_edge_fraction
            ));
        }
        if !(self.new_window_width > 0.0 && self.new_window_height > 0.0) {
            errors.push(format!(
                "new window size must be positive, got {}x{}",
                self.new_window_width, self.new_window_height
            ));
        }

        errors
    }
}

/// Errors from loading a [`UiConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_is_valid() {
        assert!(UiConfig::default().validate().is_empty());
        assert_eq!(
            UiConfig::default().min_render_interval(),
            Duration::from_millis(16)
        );
    }

    #[test]
    fn validate_catches_zero_waves() {
        let config = UiConfig {
            max_layout_waves: 0,
            ..UiConfig::default()
        };
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.contains("max_layout_waves")));
    }

    #[test]
    fn validate_catches_bad_edge_fraction() {
        let config = UiConfig {
            selector_edge_fraction: 0.75,
            ..UiConfig::default()
        };
        assert!(
            config
                .validate()
                .iter()
                .any(|e| e.contains("selector_edge_fraction"))
        );
    }

    #[test]
    fn validate_catches_nan() {
        let config = UiConfig {
            drag_threshold: f64::NAN,
            ..UiConfig::default()
        };
        assert!(config.validate().iter().any(|e| e.contains("drag_threshold")));
    }

    #[test]
    fn overrides_apply_and_ignore_garbage() {
        let env: HashMap<&str, &str> = [
            (ENV_MIN_RENDER_INTERVAL_MS, "5"),
            (ENV_MAX_LAYOUT_WAVES, "not-a-number"),
        ]
        .into_iter()
        .collect();
        let config =
            UiConfig::default().with_overrides_from(|k| env.get(k).map(|v| (*v).to_string()));
        assert_eq!(config.min_render_interval_ms, 5);
        assert_eq!(config.max_layout_waves, DEFAULT_MAX_LAYOUT_WAVES);
    }

    #[test]
    fn zero_wave_override_is_rejected() {
        let config = UiConfig::default().with_overrides_from(|k| {
            (k == ENV_MAX_LAYOUT_WAVES).then(|| "0".to_string())
        });
        assert_eq!(config.max_layout_waves, DEFAULT_MAX_LAYOUT_WAVES);
    }

    #[cfg(feature = "config")]
    #[test]
    fn toml_partial_uses_defaults() {
        let config = UiConfig::from_toml_str("drag_threshold = 9.5\n").expect("valid toml");
        assert_eq!(config.drag_threshold, 9.5);
        assert_eq!(config.max_layout_waves, DEFAULT_MAX_LAYOUT_WAVES);
    }

    #[cfg(feature = "config")]
    #[test]
    fn json_validation_failure_is_reported() {
        let err = UiConfig::from_json_str(r#"{"max_layout_waves": 0}"#).expect_err("invalid");
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("max_layout_waves"));
    }

    #[cfg(feature = "config")]
    #[test]
    fn toml_file_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("weft.toml");
        let config = UiConfig {
            separator_size: 6.0,
            ..UiConfig::default()
        };
        std::fs::write(&path, config.to_toml_string().expect("serialize")).expect("write");
        let loaded = UiConfig::from_toml_file(&path).expect("load");
        assert_eq!(loaded, config);
    }
}
