//! Unique name bookkeeping
//!
//! MJCF requires names to be unique per element type, SDFormat requires
//! unique names among the frames of a model. Conversions claim every name
//! they emit through [`UniqueNames`] so that duplicates in the source are
//! renamed instead of rejected.

use std::collections::{HashMap, HashSet};

/// Names claimed so far, grouped by namespace
#[derive(Debug, Clone, Default)]
pub struct UniqueNames {
    used: HashMap<String, HashSet<String>>,
    counters: HashMap<(String, String), usize>,
}

impl UniqueNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `base`, or the first free `base_N` (N starting at 1)
    pub fn claim(&mut self, namespace: &str, base: &str) -> String {
        let used = self.used.entry(namespace.to_string()).or_default();
        let name = if used.contains(base) {
            (1..)
                .map(|i| format!("{}_{}", base, i))
                .find(|candidate| !used.contains(candidate))
                .unwrap_or_else(|| base.to_string())
        } else {
            base.to_string()
        };
        used.insert(name.clone());
        name
    }

    /// Mark a name as taken without renaming it
    pub fn reserve(&mut self, namespace: &str, name: &str) {
        self.used
            .entry(namespace.to_string())
            .or_default()
            .insert(name.to_string());
    }

    pub fn contains(&self, namespace: &str, name: &str) -> bool {
        self.used
            .get(namespace)
            .is_some_and(|names| names.contains(name))
    }

    /// Next `prefix_N` name for an unnamed element, counting per prefix
    pub fn next_unnamed(&mut self, namespace: &str, prefix: &str) -> String {
        loop {
            let counter = self
                .counters
                .entry((namespace.to_string(), prefix.to_string()))
                .or_insert(0);
            let candidate = format!("{}_{}", prefix, counter);
            *counter += 1;
            if !self.contains(namespace, &candidate) {
                self.reserve(namespace, &candidate);
                return candidate;
            }
        }
    }
}
