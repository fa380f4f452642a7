//! String-keyed codec parameters.
//!
//! The storage layer hands the codec a flat `name -> value` map. Parsing is
//! lenient: a missing, empty, or malformed value falls back to its default
//! with a diagnostic instead of failing construction.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::galois::WordSize;

/// Parameter name for the data chunk count.
pub const K_KEY: &str = "erasure-code-k";
/// Parameter name for the coding chunk count.
pub const M_KEY: &str = "erasure-code-m";
/// Parameter name for the Galois field word size.
pub const W_KEY: &str = "erasure-code-w";
/// Parameter name for the coding technique.
pub const TECHNIQUE_KEY: &str = "erasure-code-technique";

/// Default data chunk count.
pub const DEFAULT_K: usize = 7;
/// Default coding chunk count.
pub const DEFAULT_M: usize = 3;
/// Default word size.
pub const DEFAULT_W: WordSize = WordSize::W8;
/// Default technique name.
pub const DEFAULT_TECHNIQUE: &str = "reed_sol_van";

/// Typed codec parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Technique name, e.g. `"reed_sol_van"`.
    pub technique: String,
    /// Number of data chunks.
    pub k: usize,
    /// Number of coding chunks.
    pub m: usize,
    /// Galois field word size.
    pub w: WordSize,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            technique: DEFAULT_TECHNIQUE.to_string(),
            k: DEFAULT_K,
            m: DEFAULT_M,
            w: DEFAULT_W,
        }
    }
}

impl Profile {
    /// Parse a parameter map, substituting defaults for anything unusable.
    pub fn parse(parameters: &HashMap<String, String>) -> Self {
        let technique = match parameters.get(TECHNIQUE_KEY).map(|s| s.trim()) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => DEFAULT_TECHNIQUE.to_string(),
        };

        let k = to_count(K_KEY, parameters, DEFAULT_K);
        let m = to_count(M_KEY, parameters, DEFAULT_M);

        let w_bits = to_int(W_KEY, parameters, i64::from(DEFAULT_W.bits()));
        let w = u32::try_from(w_bits)
            .ok()
            .and_then(WordSize::from_bits)
            .unwrap_or_else(|| {
                warn!(w = w_bits, "w must be one of {{8, 16, 32}}, reverting to 8");
                WordSize::W8
            });

        debug!(%technique, k, m, %w, "parsed erasure code profile");

        Self { technique, k, m, w }
    }

    /// Render back into a parameter map.
    pub fn to_parameters(&self) -> HashMap<String, String> {
        HashMap::from([
            (TECHNIQUE_KEY.to_string(), self.technique.clone()),
            (K_KEY.to_string(), self.k.to_string()),
            (M_KEY.to_string(), self.m.to_string()),
            (W_KEY.to_string(), self.w.bits().to_string()),
        ])
    }
}

/// Parse `name` as a base-10 integer, or return `default`.
pub fn to_int(name: &str, parameters: &HashMap<String, String>, default: i64) -> i64 {
    let value = match parameters.get(name) {
        Some(v) if !v.is_empty() => v,
        _ => {
            debug!(name, default, "parameter defaults");
            return default;
        }
    };

    match value.trim().parse::<i64>() {
        Ok(r) => {
            debug!(name, value = r, "parameter set");
            r
        }
        Err(e) => {
            warn!(name, %value, error = %e, default, "could not parse parameter, using default");
            default
        }
    }
}

/// Like [`to_int`], but values below 1 also fall back to `default`.
fn to_count(name: &str, parameters: &HashMap<String, String>, default: usize) -> usize {
    let raw = to_int(name, parameters, default as i64);
    match usize::try_from(raw) {
        Ok(n) if n >= 1 => n,
        _ => {
            warn!(name, value = raw, default, "parameter must be at least 1, using default");
            default
        }
    }
}
