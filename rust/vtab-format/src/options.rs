use serde::{Deserialize, Serialize};

/// Configuration of a [`Builder`](crate::Builder).
///
/// Deserializes from partial JSON: missing keys fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderOptions {
    /// Number of bytes allocated up front. The buffer doubles when it runs out.
    pub initial_capacity: usize,
    /// Write scalar fields even when they equal their default value.
    pub force_defaults: bool,
    /// Share one vtable between tables with byte-identical vtables.
    pub dedup_vtables: bool,
}

impl BuilderOptions {
    pub const DEFAULT_INITIAL_CAPACITY: usize = 1024;

    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    pub fn with_force_defaults(mut self, force_defaults: bool) -> Self {
        self.force_defaults = force_defaults;
        self
    }

    pub fn with_dedup_vtables(mut self, dedup_vtables: bool) -> Self {
        self.dedup_vtables = dedup_vtables;
        self
    }
}

impl Default for BuilderOptions {
    fn default() -> Self {
        BuilderOptions {
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
            force_defaults: false,
            dedup_vtables: true,
        }
    }
}

/// Limits applied when verifying a table tree against its descriptors.
///
/// Both limits bound the work done on untrusted input: `max_depth` caps the
/// recursion, `max_tables` caps the number of distinct tables visited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierOptions {
    /// Maximum nesting depth of tables below the root.
    pub max_depth: usize,
    /// Maximum number of tables verified in one pass.
    pub max_tables: usize,
}

impl VerifierOptions {
    pub const DEFAULT_MAX_DEPTH: usize = 64;
    pub const DEFAULT_MAX_TABLES: usize = 1_000_000;

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_tables(mut self, max_tables: usize) -> Self {
        self.max_tables = max_tables;
        self
    }
}

impl Default for VerifierOptions {
    fn default() -> Self {
        VerifierOptions {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_tables: Self::DEFAULT_MAX_TABLES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let options: BuilderOptions = serde_json::from_str(r#"{"force_defaults": true}"#).unwrap();
        assert!(options.force_defaults);
        assert!(options.dedup_vtables);
        assert_eq!(
            options.initial_capacity,
            BuilderOptions::DEFAULT_INITIAL_CAPACITY
        );
    }

    #[test]
    fn test_with_methods() {
        let options = BuilderOptions::default()
            .with_initial_capacity(16)
            .with_dedup_vtables(false);
        assert_eq!(options.initial_capacity, 16);
        assert!(!options.dedup_vtables);
        assert!(!options.force_defaults);
    }

    #[test]
    fn test_verifier_options() {
        let options: VerifierOptions = serde_json::from_str(r#"{"max_tables": 10}"#).unwrap();
        assert_eq!(options.max_tables, 10);
        assert_eq!(options.max_depth, VerifierOptions::DEFAULT_MAX_DEPTH);
        assert_eq!(
            VerifierOptions::default().with_max_depth(3).max_depth,
            3
        );
    }
}
