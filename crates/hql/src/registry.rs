//! Named dialects available to the compiler.
//!
//! Dialects are data. Each is described by a YAML document that
//! deserialises into a [`DialectDescriptor`] and is validated into an
//! immutable [`Dialect`] when it enters the registry. The four built-in
//! dialects ship embedded in the crate.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

use hql_core::{Dialect, DialectDescriptor, DialectError};
use tracing::debug;

const REGISTRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::registry");

const BUILTIN_DIALECTS: [&str; 4] = [
    include_str!("../dialects/illust.yaml"),
    include_str!("../dialects/album.yaml"),
    include_str!("../dialects/topic.yaml"),
    include_str!("../dialects/author.yaml"),
];

/// A set of dialects keyed by name.
///
/// # Example
///
/// ```
/// use hql::DialectRegistry;
///
/// let registry = DialectRegistry::builtin()?;
/// let names: Vec<&str> = registry.names().collect();
/// assert_eq!(names, ["album", "author", "illust", "topic"]);
/// assert!(registry.get("illust").is_some_and(|d| d.default_field().is_some()));
/// # Ok::<(), hql::DialectError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct DialectRegistry {
    dialects: BTreeMap<String, Dialect>,
}

impl DialectRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the `illust`, `album`, `topic` and
    /// `author` dialects.
    ///
    /// # Errors
    ///
    /// Returns a [`DialectError`] if an embedded document fails validation.
    pub fn builtin() -> Result<Self, DialectError> {
        let mut registry = Self::new();
        for document in BUILTIN_DIALECTS {
            registry.load_yaml(document)?;
        }
        Ok(registry)
    }

    /// Creates a registry from a YAML sequence of dialect documents.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::Malformed`] for YAML that does not match the
    /// descriptor shape, a validation error for an inconsistent dialect, or
    /// [`DialectError::DuplicateDialect`] when two entries share a name.
    ///
    /// # Example
    ///
    /// ```
    /// use hql::DialectRegistry;
    ///
    /// let registry = DialectRegistry::from_yaml(
    ///     r#"
    /// - name: notes
    ///   default_field: body
    ///   fields:
    ///     - key: body
    ///       type: string
    ///       operators: [":", "~"]
    /// "#,
    /// )?;
    /// assert_eq!(registry.len(), 1);
    /// # Ok::<(), hql::DialectError>(())
    /// ```
    pub fn from_yaml(text: &str) -> Result<Self, DialectError> {
        let descriptors: Vec<DialectDescriptor> =
            serde_saphyr::from_str(text).map_err(|error| malformed(&error))?;
        let mut registry = Self::new();
        for descriptor in descriptors {
            registry.register(Dialect::try_from(descriptor)?)?;
        }
        Ok(registry)
    }

    /// Validates and registers a single YAML dialect document.
    ///
    /// # Errors
    ///
    /// See [`DialectRegistry::from_yaml`].
    pub fn load_yaml(&mut self, text: &str) -> Result<(), DialectError> {
        let descriptor: DialectDescriptor =
            serde_saphyr::from_str(text).map_err(|error| malformed(&error))?;
        self.register(Dialect::try_from(descriptor)?)
    }

    /// Adds a dialect.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::DuplicateDialect`] if the name is taken.
    pub fn register(&mut self, dialect: Dialect) -> Result<(), DialectError> {
        match self.dialects.entry(dialect.name().to_owned()) {
            Entry::Occupied(entry) => Err(DialectError::DuplicateDialect {
                name: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                debug!(
                    target: REGISTRY_TARGET,
                    dialect = dialect.name(),
                    fields = dialect.fields().len(),
                    "registered dialect"
                );
                entry.insert(dialect);
                Ok(())
            }
        }
    }

    /// Returns the dialect called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Dialect> {
        self.dialects.get(name)
    }

    /// Returns the registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.dialects.keys().map(String::as_str)
    }

    /// Returns the number of dialects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dialects.len()
    }

    /// Returns `true` if no dialect is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dialects.is_empty()
    }
}

fn malformed(error: &dyn fmt::Display) -> DialectError {
    DialectError::Malformed {
        message: error.to_string(),
    }
}
