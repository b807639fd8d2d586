// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Combiner configuration system

use crate::combiner::DEFAULT_PRECISION;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file picked up by [`CombinerConfig::load`]
pub const CONFIG_FILE: &str = "combiner.toml";

/// How candidate triangle pairs are found
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntersectionMode {
    /// Test every pair
    #[default]
    BruteForce,
    /// Cull pairs through a bounding volume hierarchy
    Bvh,
}

impl std::str::FromStr for IntersectionMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "brute_force" | "brute-force" => Ok(Self::BruteForce),
            "bvh" => Ok(Self::Bvh),
            other => bail!("Unknown intersection mode: {}", other),
        }
    }
}

/// Combiner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombinerConfig {
    /// Geometric tolerance for every comparison
    pub precision: f64,
    /// Candidate search used while computing cut lines
    pub intersection: IntersectionMode,
}

impl Default for CombinerConfig {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            intersection: IntersectionMode::default(),
        }
    }
}

impl CombinerConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: CombinerConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `combiner.toml` if present, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };

        if let Ok(precision) = std::env::var("POLYFRAME_COMBINER_PRECISION") {
            config.precision = precision
                .parse()
                .with_context(|| format!("Invalid POLYFRAME_COMBINER_PRECISION: {}", precision))?;
        }

        if let Ok(mode) = std::env::var("POLYFRAME_COMBINER_INTERSECTION") {
            config.intersection = mode.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.precision.is_finite() && self.precision > 0.0) {
            bail!("precision must be positive and finite, got {}", self.precision);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CombinerConfig::default();
        assert_eq!(config.precision, DEFAULT_PRECISION);
        assert_eq!(config.intersection, IntersectionMode::BruteForce);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: CombinerConfig = toml::from_str("intersection = \"bvh\"").unwrap();
        assert_eq!(config.precision, DEFAULT_PRECISION);
        assert_eq!(config.intersection, IntersectionMode::Bvh);
    }

    #[test]
    fn test_invalid_precision() {
        let config = CombinerConfig {
            precision: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("bvh".parse::<IntersectionMode>().unwrap(), IntersectionMode::Bvh);
        assert_eq!(
            "Brute-Force".parse::<IntersectionMode>().unwrap(),
            IntersectionMode::BruteForce
        );
        assert!("octree".parse::<IntersectionMode>().is_err());
    }
}
