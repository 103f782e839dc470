//! Named scalar weights consumed by heuristic hooks.
//!
//! Weights persist as a flat JSON object of `name -> number`. Loading ignores
//! names the current build does not know about so that weight files survive
//! heuristic changes; a point update with an unknown name is an error.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

/// Errors from weight lookups and persistence.
#[derive(Debug, Error)]
pub enum WeightsError {
    #[error("Unknown weight: {0}")]
    UnknownWeight(String),

    #[error("Weights I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Weights file is not a flat JSON object of numbers: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fixed set of named tunable weights.
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicWeights {
    values: BTreeMap<String, f64>,
}

impl HeuristicWeights {
    /// Build from `(name, default)` pairs. The names fixed here are the only
    /// ones `set` and `merge_known` will accept.
    pub fn from_defaults(defaults: &[(&str, f64)]) -> Self {
        Self {
            values: defaults
                .iter()
                .map(|(name, value)| ((*name).to_string(), *value))
                .collect(),
        }
    }

    /// Value of `name`, or 0.0 for an unknown name.
    #[inline]
    pub fn get(&self, name: &str) -> f64 {
        self.values.get(name).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn set(&mut self, name: &str, value: f64) -> Result<(), WeightsError> {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(WeightsError::UnknownWeight(name.to_string())),
        }
    }

    /// Overwrite known names from `other`; unknown names are ignored.
    /// Returns how many values were applied.
    pub fn merge_known<'a, I>(&mut self, other: I) -> usize
    where
        I: IntoIterator<Item = (&'a String, &'a f64)>,
    {
        let mut applied = 0;
        for (name, value) in other {
            if let Some(slot) = self.values.get_mut(name.as_str()) {
                *slot = *value;
                applied += 1;
            } else {
                debug!(weight = %name, "Ignoring unknown weight");
            }
        }
        applied
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Snapshot as a plain map.
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        self.values.clone()
    }

    /// Write all weights as pretty JSON with sorted keys.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), WeightsError> {
        let json = serde_json::to_string_pretty(&self.values)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Read a JSON object and apply the names this set knows about.
    pub fn load_json<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, WeightsError> {
        let content = fs::read_to_string(path)?;
        let parsed: BTreeMap<String, f64> = serde_json::from_str(&content)?;
        Ok(self.merge_known(parsed.iter()))
    }
}
