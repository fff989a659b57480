use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Prefix for environment overrides, e.g. `DESKWM_THEME__BORDER_WIDTH=2`.
pub const ENV_PREFIX: &str = "DESKWM";

/// Error types for configuration operations
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid configuration format: {reason}")]
    InvalidFormat { reason: String },

    #[error("Invalid theme: {reason}")]
    InvalidTheme { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Load error: {0}")]
    Load(#[from] config::ConfigError),
}

/// Decoration theme snapshot.
///
/// Sizes are logical units; the frame subsystem scales them by `scale`
/// to get pixel metrics. Colors are `0xRRGGBB`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub border_width: u16,
    pub title_height: u16,
    pub button_width: u16,
    pub padding: u16,
    pub scale: f32,
    pub background: u32,
    pub title_color: u32,
    pub close_color: u32,
    pub maximize_color: u32,
    pub iconify_color: u32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            border_width: 4,
            title_height: 24,
            button_width: 32,
            padding: 4,
            scale: 1.0,
            background: 0x3c3c3c,
            title_color: 0xe0e0e0,
            close_color: 0xff5555,
            maximize_color: 0x50fa7b,
            iconify_color: 0xf1fa8c,
        }
    }
}

impl Theme {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ConfigError::InvalidTheme {
                reason: format!("scale must be a positive number, got {}", self.scale),
            });
        }
        if self.title_height == 0 {
            return Err(ConfigError::InvalidTheme {
                reason: "title_height must be non-zero".to_string(),
            });
        }
        if self.button_width == 0 {
            return Err(ConfigError::InvalidTheme {
                reason: "button_width must be non-zero".to_string(),
            });
        }
        for (name, color) in [
            ("background", self.background),
            ("title_color", self.title_color),
            ("close_color", self.close_color),
            ("maximize_color", self.maximize_color),
            ("iconify_color", self.iconify_color),
        ] {
            if color > 0xffffff {
                return Err(ConfigError::InvalidTheme {
                    reason: format!("{} is not a 0xRRGGBB color: {:#x}", name, color),
                });
            }
        }
        Ok(())
    }
}

/// What a double click on the title bar does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DoubleClickAction {
    #[default]
    Maximize,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Behaviour {
    pub double_click_action: DoubleClickAction,
    /// Max time between two title bar presses, in milliseconds
    pub double_click_ms: u32,
}

impl Default for Behaviour {
    fn default() -> Self {
        Self {
            double_click_action: DoubleClickAction::Maximize,
            double_click_ms: 400,
        }
    }
}

/// Main configuration for the window manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WmConfig {
    pub theme: Theme,
    pub behaviour: Behaviour,
}

impl WmConfig {
    /// Default location: `$XDG_CONFIG_HOME/deskwm/config.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("deskwm")
            .join("config.toml")
    }

    /// Load defaults, then the TOML file, then `DESKWM_*` environment overrides.
    ///
    /// An explicitly given path must exist; the default path is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound {
                        path: path.display().to_string(),
                    });
                }
                Self::load_layered(path, true, Some(ENV_PREFIX))
            }
            None => Self::load_layered(&Self::default_path(), false, Some(ENV_PREFIX)),
        }
    }

    /// Load from a file, optionally layering environment variables with `env_prefix`.
    pub fn load_layered(
        file: &Path,
        required: bool,
        env_prefix: Option<&str>,
    ) -> Result<Self, ConfigError> {
        debug!("Loading configuration from {}", file.display());

        let mut builder = config::Config::builder().add_source(
            config::File::from(file)
                .format(config::FileFormat::Toml)
                .required(required),
        );
        if let Some(prefix) = env_prefix {
            builder = builder.add_source(
                config::Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let loaded: WmConfig = builder.build()?.try_deserialize()?;
        loaded.theme.validate()?;
        info!(
            "Theme: border={} title={} button={} padding={} scale={}",
            loaded.theme.border_width,
            loaded.theme.title_height,
            loaded.theme.button_width,
            loaded.theme.padding,
            loaded.theme.scale
        );
        Ok(loaded)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidFormat {
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_toml()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_optional_file_gives_defaults() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("absent.toml");
        let config = WmConfig::load_layered(&path, false, None).unwrap();
        assert_eq!(config, WmConfig::default());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("absent.toml");
        let err = WmConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[theme]\nborder_width = 2\nscale = 2.0\n\n[behaviour]\ndouble_click_action = \"none\"\n",
        )
        .unwrap();

        let config = WmConfig::load_layered(&path, true, None).unwrap();
        assert_eq!(config.theme.border_width, 2);
        assert_eq!(config.theme.scale, 2.0);
        assert_eq!(config.theme.title_height, 24);
        assert_eq!(config.behaviour.double_click_action, DoubleClickAction::None);
        assert_eq!(config.behaviour.double_click_ms, 400);
    }

    #[test]
    fn test_environment_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[theme]\nborder_width = 2\ntitle_height = 30\n").unwrap();

        // prefix unique to this test so parallel tests never see it
        std::env::set_var("DESKWMENVTEST_THEME__BORDER_WIDTH", "7");
        let layered = WmConfig::load_layered(&path, true, Some("DESKWMENVTEST"));
        let plain = WmConfig::load_layered(&path, true, None);
        std::env::remove_var("DESKWMENVTEST_THEME__BORDER_WIDTH");

        let layered = layered.unwrap();
        assert_eq!(layered.theme.border_width, 7);
        assert_eq!(layered.theme.title_height, 30);
        assert_eq!(plain.unwrap().theme.border_width, 2);
    }

    #[test]
    fn test_invalid_scale_is_rejected() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[theme]\nscale = 0.0\n").unwrap();

        let err = WmConfig::load_layered(&path, true, None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTheme { .. }));
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = WmConfig::default();
        config.theme.title_height = 30;
        config.theme.background = 0x102030;
        config.save(&path).unwrap();

        let loaded = WmConfig::load_layered(&path, true, None).unwrap();
        assert_eq!(loaded, config);
    }
}
