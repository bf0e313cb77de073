//! Prefixer settings as loaded from host configuration.
//!
//! Defines the YAML-serializable settings a host reads once at boot and turns
//! into an immutable [`IdentifierPrefixer`](crate::IdentifierPrefixer).
//!
//! # Example YAML
//!
//! ```yaml
//! prefix: "app_"
//! bundles:
//!   - App\Entity
//! encoding: UTF-8
//! skip_inheritance_children: false
//! legacy_identity_sequences: false
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Prefix used when the configuration does not name one.
pub const DEFAULT_PREFIX: &str = "sf";

/// Encoding used when the configuration does not name one.
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// Raw prefixer settings.
///
/// Every field has a default, so partial documents load.
///
/// # Examples
///
/// ```
/// use table_prefix::PrefixSettings;
///
/// let settings = PrefixSettings::default();
/// assert_eq!(settings.prefix, "sf");
/// assert!(settings.bundles.is_empty());
/// assert_eq!(settings.encoding, "UTF-8");
/// assert!(!settings.skip_inheritance_children);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixSettings {
    /// Prepended to table, index, constraint, join table and sequence names.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Namespace filters; when non-empty only classes whose namespace
    /// contains one of them are prefixed.
    #[serde(default)]
    pub bundles: Vec<String>,
    /// Encoding label the prefix is converted to.
    #[serde(default = "default_encoding")]
    pub encoding: String,
    /// Skip single-table-inheritance classes that are not the hierarchy root.
    #[serde(default)]
    pub skip_inheritance_children: bool,
    /// Regenerate PostgreSQL identity generators from the prefixed table name.
    #[serde(default)]
    pub legacy_identity_sequences: bool,
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_encoding() -> String {
    DEFAULT_ENCODING.to_string()
}

impl Default for PrefixSettings {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            bundles: Vec::new(),
            encoding: default_encoding(),
            skip_inheritance_children: false,
            legacy_identity_sequences: false,
        }
    }
}

impl PrefixSettings {
    /// Loads settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::PrefixError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::PrefixError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let settings = serde_yaml::from_reader(reader)?;
        Ok(settings)
    }

    /// Parses settings from a YAML string.
    ///
    /// # Examples
    ///
    /// ```
    /// use table_prefix::PrefixSettings;
    ///
    /// let settings = PrefixSettings::from_yaml("prefix: app_\n").unwrap();
    /// assert_eq!(settings.prefix, "app_");
    /// assert_eq!(settings.encoding, "UTF-8");
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Saves the settings as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::PrefixError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::PrefixError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }
}
