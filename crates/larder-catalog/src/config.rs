use std::path::Path;

use larder_store::JournalConfig;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};

/// Configuration for a [`Catalog`](crate::Catalog).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Journal location. `None` keeps the catalog in memory only.
    pub journal: Option<JournalConfig>,
    /// Field limits enforced on recipe input.
    pub limits: Limits,
    /// Capacity of each change subscriber's broadcast channel.
    pub channel_capacity: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            journal: None,
            limits: Limits::default(),
            channel_capacity: 256,
        }
    }
}

impl CatalogConfig {
    /// An in-memory configuration with default limits.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// A configuration journaling to `path`.
    pub fn persistent(path: impl AsRef<Path>) -> Self {
        Self {
            journal: Some(JournalConfig::new(path.as_ref())),
            ..Self::default()
        }
    }

    pub fn from_toml_str(s: &str) -> CatalogResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| CatalogError::Config(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Reject configurations a catalog cannot honor.
    pub fn check(&self) -> CatalogResult<()> {
        if self.channel_capacity == 0 {
            return Err(CatalogError::Config(
                "channel_capacity must be at least 1".into(),
            ));
        }
        for (field, bounds) in [("serving", self.limits.serving), ("time", self.limits.time)] {
            if bounds.min == 0 || bounds.min > bounds.max {
                return Err(CatalogError::Config(format!(
                    "limits.{field}: need 1 <= min <= max, got {}..={}",
                    bounds.min, bounds.max
                )));
            }
        }
        Ok(())
    }
}

/// Inclusive numeric range for a recipe field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: u32,
    pub max: u32,
}

impl Bounds {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Zero is never inside, whatever `min` says.
    pub fn contains(&self, value: u32) -> bool {
        value >= 1 && (self.min..=self.max).contains(&value)
    }
}

/// Limits applied to recipe drafts.
///
/// The defaults match the ranges of the recipe form's steppers: 1 to 100
/// servings and 1 to 600 minutes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub serving: Bounds,
    /// Minutes.
    pub time: Bounds,
    /// Reject recipes whose instructions are blank.
    pub require_instructions: bool,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            serving: Bounds::new(1, 100),
            time: Bounds::new(1, 600),
            require_instructions: true,
        }
    }
}
