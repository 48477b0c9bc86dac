//! Thumbnail settings module.
//!
//! Handles loading and validating `thumbcache.toml`. Settings are an explicit
//! value constructed once and handed to
//! [`Resolver::new`](crate::resolver::Resolver::new) — there is no
//! process-wide singleton or ambient lookup.
//!
//! ## Configuration Options
//!
//! ```toml
//! # Physical directory containing the source images. Thumbnails are cached
//! # under "<base_image_path>/Thumbnails/<bucket>/".
//! base_image_path = "content/img"
//!
//! # Prefix for the logical (web-addressable) paths returned to callers,
//! # e.g. "/content/img/Thumbnails/small-100x100/photo.jpg".
//! base_virtual_path = "/content/img"
//!
//! # Substituted when a requested source image does not exist. Relative paths
//! # are resolved against base_image_path.
//! missing_image_path = "missing.jpg"
//!
//! # Named sizes. Names are matched case-insensitively and must be unique.
//! [[aliases]]
//! name = "small"
//! width = 100
//! height = 100
//!
//! [[aliases]]
//! name = "banner"
//! width = 600
//! height = 200
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::naming::Size;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// A named thumbnail size, e.g. `small` → 100×100.
///
/// The cache bucket for an alias is `"{name}-{width}x{height}"`, so renaming
/// an alias or changing its dimensions starts a fresh bucket and leaves old
/// entries untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SizeAlias {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl SizeAlias {
    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }
}

/// Thumbnail settings loaded from `thumbcache.toml`.
///
/// All fields have defaults; user config files need only specify the values
/// they want to override.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailSettings {
    /// Physical directory containing source images and the `Thumbnails/` tree.
    pub base_image_path: PathBuf,
    /// Prefix for logical paths returned from the request surface.
    pub base_virtual_path: String,
    /// Image substituted when a requested source does not exist. Relative
    /// paths are resolved against `base_image_path`.
    pub missing_image_path: PathBuf,
    /// Named sizes available to callers.
    pub aliases: Vec<SizeAlias>,
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self {
            base_image_path: PathBuf::from("content/img"),
            base_virtual_path: "/content/img".to_string(),
            missing_image_path: PathBuf::from("missing.jpg"),
            aliases: Vec::new(),
        }
    }
}

impl ThumbnailSettings {
    /// Load settings from a TOML file and validate them.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let settings: Self = toml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings values.
    ///
    /// Alias dimensions are checked here, once, so requests through an alias
    /// never hit the dimension check at request time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_virtual_path.is_empty() {
            return Err(ConfigError::Validation(
                "base_virtual_path must not be empty".into(),
            ));
        }
        if self.missing_image_path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "missing_image_path must not be empty".into(),
            ));
        }
        for alias in &self.aliases {
            if alias.name.is_empty() {
                return Err(ConfigError::Validation(
                    "alias name must not be empty".into(),
                ));
            }
            if alias.width == 0 || alias.height == 0 {
                return Err(ConfigError::Validation(format!(
                    "alias '{}' dimensions must be nonzero (got {}x{})",
                    alias.name, alias.width, alias.height
                )));
            }
        }
        for (i, alias) in self.aliases.iter().enumerate() {
            if self.aliases[..i]
                .iter()
                .any(|other| other.name.eq_ignore_ascii_case(&alias.name))
            {
                return Err(ConfigError::Validation(format!(
                    "duplicate alias name '{}' (names are case-insensitive)",
                    alias.name
                )));
            }
        }
        Ok(())
    }

    /// Look up an alias by name, case-insensitively.
    pub fn find_alias(&self, name: &str) -> Option<&SizeAlias> {
        self.aliases
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// The resolved physical path of the missing-image placeholder.
    pub fn missing_image(&self) -> PathBuf {
        if self.missing_image_path.is_absolute() {
            self.missing_image_path.clone()
        } else {
            self.base_image_path.join(&self.missing_image_path)
        }
    }
}

/// A documented stock `thumbcache.toml` with all options at their defaults.
pub fn stock_config_toml() -> String {
    r#"# thumbcache configuration

# Physical directory containing the source images. Thumbnails are cached
# under "<base_image_path>/Thumbnails/<bucket>/".
base_image_path = "content/img"

# Prefix for the logical (web-addressable) paths returned to callers.
base_virtual_path = "/content/img"

# Substituted when a requested source image does not exist. Relative paths
# are resolved against base_image_path.
missing_image_path = "missing.jpg"

# Named sizes. Names are matched case-insensitively and must be unique.
# The cache bucket for an alias is "<name>-<width>x<height>".
[[aliases]]
name = "small"
width = 100
height = 100

[[aliases]]
name = "medium"
width = 300
height = 300
"#
    .to_string()
}
