//! Configuration for rpgfree.
//!
//! Supports loading configuration from:
//! - `~/.config/rpgfree/config.toml` for user defaults
//! - `rpgfree.toml` in the current directory
//! - An explicit `--config` file
//! - Environment variables (RPGFREE_*)
//! - Command-line arguments (highest priority)

use std::path::{Path, PathBuf};

use open_mainframe_rpg::{BinToInt, ConvertOptions, MoveaStyle};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Project configuration file name.
pub const PROJECT_FILE: &str = "rpgfree.toml";

/// Complete configuration for rpgfree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Conversion settings.
    pub convert: ConvertOptions,
}

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Parse error in a config file.
    #[error("Parse error in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    /// An environment variable holds a value of the wrong shape.
    #[error("Invalid value '{value}' for {var}")]
    InvalidEnv { var: String, value: String },
    /// Serialization error.
    #[error("Serialization error: {message}")]
    Serialize { message: String },
}

impl Config {
    /// Load configuration from the default locations, then `explicit` if
    /// given, then the process environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(user_config) = Self::user_config_path() {
            if user_config.is_file() {
                config = config.merge(Self::load_from_file(&user_config)?);
            }
        }

        let project = Path::new(PROJECT_FILE);
        if project.is_file() {
            config = config.merge(Self::load_from_file(project)?);
        }

        if let Some(path) = explicit {
            config = config.merge(Self::load_from_file(path)?);
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the user configuration file path.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("rpgfree").join("config.toml"))
    }

    /// Merge another config into this one. Values in `other` that differ
    /// from the defaults win.
    pub fn merge(mut self, other: Config) -> Self {
        let defaults = ConvertOptions::default();
        let ours = &mut self.convert;
        let theirs = other.convert;

        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(
                    if theirs.$field != defaults.$field {
                        ours.$field = theirs.$field;
                    }
                )*
            };
        }
        take!(
            convert_bin_to_int,
            add_inz,
            right_margin,
            left_margin,
            left_margin_continued,
            alt_movel,
            indy_movea_style,
            add_ext_dev_flag,
            remove_free_dir,
            remove_old_dir,
            replace_copy_in_rpg,
            replace_copy_in_sqlrpg,
            temp_var1,
            temp_var2,
        );

        self
    }

    /// Apply `RPGFREE_*` variables, read through `var`.
    pub fn apply_env(
        &mut self,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let opts = &mut self.convert;

        if let Some(val) = var("RPGFREE_BIN_TO_INT") {
            opts.convert_bin_to_int = match val.to_ascii_lowercase().as_str() {
                "disable" => BinToInt::Disable,
                "always" => BinToInt::Always,
                "auto" => BinToInt::Auto,
                _ => return Err(invalid("RPGFREE_BIN_TO_INT", val)),
            };
        }
        if let Some(val) = var("RPGFREE_MOVEA_STYLE") {
            opts.indy_movea_style = match val.to_ascii_uppercase().as_str() {
                "FOR" => MoveaStyle::For,
                "LIST" => MoveaStyle::List,
                _ => return Err(invalid("RPGFREE_MOVEA_STYLE", val)),
            };
        }
        for (key, slot) in [
            ("RPGFREE_LEFT_MARGIN", &mut opts.left_margin),
            ("RPGFREE_LEFT_MARGIN_CONTINUED", &mut opts.left_margin_continued),
            ("RPGFREE_RIGHT_MARGIN", &mut opts.right_margin),
        ] {
            if let Some(val) = var(key) {
                *slot = val.trim().parse().map_err(|_| invalid(key, val))?;
            }
        }
        for (key, slot) in [
            ("RPGFREE_ADD_INZ", &mut opts.add_inz),
            ("RPGFREE_ALT_MOVEL", &mut opts.alt_movel),
        ] {
            if let Some(val) = var(key) {
                *slot = parse_flag(&val).ok_or_else(|| invalid(key, val))?;
            }
        }
        if let Some(val) = var("RPGFREE_TEMP_VAR1") {
            opts.temp_var1 = val;
        }
        if let Some(val) = var("RPGFREE_TEMP_VAR2") {
            opts.temp_var2 = val;
        }
        Ok(())
    }

    /// Generate a default configuration file.
    pub fn generate_default() -> Result<String, ConfigError> {
        toml::to_string_pretty(&Config::default()).map_err(|e| ConfigError::Serialize {
            message: e.to_string(),
        })
    }
}

fn invalid(var: &str, value: String) -> ConfigError {
    ConfigError::InvalidEnv {
        var: var.to_string(),
        value,
    }
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
