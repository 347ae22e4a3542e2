//! Pairwise correlation table for the supported pairs

use std::collections::HashMap;

/// Symmetric correlation lookup keyed by unordered pair-id pairs.
///
/// A pair's correlation with itself is never stored. Unknown combinations
/// resolve to 0.0 and are treated as uncorrelated, not as an error.
#[derive(Debug, Clone, Default)]
pub struct CorrelationTable {
    inner: HashMap<(String, String), f64>,
}

impl CorrelationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a correlation coefficient, clamped to [-1, 1].
    /// Self-correlations are ignored.
    pub fn insert(&mut self, a: &str, b: &str, correlation: f64) {
        if a == b {
            return;
        }
        self.inner
            .insert(Self::key(a, b), correlation.clamp(-1.0, 1.0));
    }

    /// Look up the correlation between two pairs, defaulting to 0.0.
    pub fn get(&self, a: &str, b: &str) -> f64 {
        if a == b {
            return 0.0;
        }
        self.inner.get(&Self::key(a, b)).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn key(a: &str, b: &str) -> (String, String) {
        if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        }
    }
}
