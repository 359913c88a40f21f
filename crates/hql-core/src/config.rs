//! Compiler configuration for safety limits and keyword handling.

use serde::Deserialize;

/// Compiler configuration, constructed once and shared read-only.
///
/// # Defaults
///
/// - `max_query_bytes`: 4096
/// - `max_nesting_depth`: 64
/// - `case_insensitive_keywords`: `false`
///
/// # Example
///
/// ```
/// use hql_core::CompilerConfig;
///
/// let config = CompilerConfig::default().with_max_nesting_depth(8);
/// assert_eq!(config.max_query_bytes(), 4096);
/// assert_eq!(config.max_nesting_depth(), 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Longest accepted query, in bytes.
    max_query_bytes: usize,
    /// Deepest accepted nesting of groups and negations.
    max_nesting_depth: usize,
    /// Whether `and`, `or` and `not` are keywords in any case.
    case_insensitive_keywords: bool,
}

impl CompilerConfig {
    /// Creates a configuration with explicit values.
    #[must_use]
    pub const fn new(
        max_query_bytes: usize,
        max_nesting_depth: usize,
        case_insensitive_keywords: bool,
    ) -> Self {
        Self {
            max_query_bytes,
            max_nesting_depth,
            case_insensitive_keywords,
        }
    }

    /// Returns the longest accepted query in bytes.
    #[must_use]
    pub const fn max_query_bytes(&self) -> usize {
        self.max_query_bytes
    }

    /// Returns the deepest accepted nesting.
    #[must_use]
    pub const fn max_nesting_depth(&self) -> usize {
        self.max_nesting_depth
    }

    /// Returns whether keywords match in any case.
    #[must_use]
    pub const fn case_insensitive_keywords(&self) -> bool {
        self.case_insensitive_keywords
    }

    /// Replaces the byte limit.
    #[must_use]
    pub const fn with_max_query_bytes(mut self, limit: usize) -> Self {
        self.max_query_bytes = limit;
        self
    }

    /// Replaces the nesting limit.
    #[must_use]
    pub const fn with_max_nesting_depth(mut self, limit: usize) -> Self {
        self.max_nesting_depth = limit;
        self
    }

    /// Enables or disables case-insensitive keywords.
    #[must_use]
    pub const fn with_case_insensitive_keywords(mut self, enabled: bool) -> Self {
        self.case_insensitive_keywords = enabled;
        self
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_query_bytes: 4096,
            max_nesting_depth: 64,
            case_insensitive_keywords: false,
        }
    }
}
