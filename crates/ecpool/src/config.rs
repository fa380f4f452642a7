//! TOML configuration for the `ecpool` tool.
//!
//! Every field is optional. Unset erasure parameters are left out of the
//! parameter map so the codec applies its own defaults.

use std::collections::HashMap;
use std::path::Path;

use ecpool_erasure::{K_KEY, M_KEY, TECHNIQUE_KEY, W_KEY};
use serde::Deserialize;

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Erasure coding parameters.
    pub erasure: ErasureSection,
    /// Logging configuration.
    pub log: LogSection,
}

/// `[erasure]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ErasureSection {
    /// Coding technique. Only `"reed_sol_van"` is implemented.
    pub technique: Option<String>,
    /// Number of data chunks.
    pub k: Option<u32>,
    /// Number of coding chunks.
    pub m: Option<u32>,
    /// Galois field word size: 8, 16 or 32.
    pub w: Option<u32>,
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`, `"warn"`).
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CliConfig {
    /// Load config from a TOML file, or use defaults if no path given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)?;
                let config: CliConfig = toml::from_str(&content)?;
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse config from a TOML string (used in tests).
    #[cfg(test)]
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Codec parameters as the `erasure-code-*` string map.
    pub fn erasure_parameters(&self) -> HashMap<String, String> {
        let mut parameters = HashMap::new();
        if let Some(technique) = &self.erasure.technique {
            parameters.insert(TECHNIQUE_KEY.to_string(), technique.clone());
        }
        let counts = [
            (K_KEY, self.erasure.k),
            (M_KEY, self.erasure.m),
            (W_KEY, self.erasure.w),
        ];
        for (key, value) in counts {
            if let Some(v) = value {
                parameters.insert(key.to_string(), v.to_string());
            }
        }
        parameters
    }
}
