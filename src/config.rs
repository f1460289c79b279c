//! Renderer configuration.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Tunables for a [`Renderer`](crate::Renderer).
///
/// Loaded from TOML; missing fields take their defaults and unknown fields are ignored.
///
/// ```toml
/// strict_keys = true
/// auto_flush = false
/// max_update_batches = 16
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Missing or duplicate keys in keyed children are errors instead of falling back
    /// to positional diffing.
    pub strict_keys: bool,
    /// [`Renderer::render`](crate::Renderer::render) flushes queued state updates
    /// before returning.
    pub auto_flush: bool,
    /// Batches a single flush may drain before giving up with
    /// [`Error::UpdateLoop`](crate::Error::UpdateLoop).
    pub max_update_batches: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strict_keys: cfg!(debug_assertions),
            auto_flush: true,
            max_update_batches: 64,
        }
    }
}

impl Config {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Fails when the document is not valid TOML or a field has the wrong type.
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse renderer config")
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Sets [`Config::strict_keys`].
    #[must_use]
    pub const fn strict_keys(mut self, strict: bool) -> Self {
        self.strict_keys = strict;
        self
    }

    /// Sets [`Config::auto_flush`].
    #[must_use]
    pub const fn auto_flush(mut self, auto_flush: bool) -> Self {
        self.auto_flush = auto_flush;
        self
    }

    /// Sets [`Config::max_update_batches`].
    #[must_use]
    pub const fn max_update_batches(mut self, limit: usize) -> Self {
        self.max_update_batches = limit;
        self
    }
}
