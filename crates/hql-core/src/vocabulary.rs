//! Vocabulary lookup: resolving reference names to canonical entities.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dialect::ReferenceKind;

/// A successfully resolved reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedRef {
    /// Identifier of the backing entity.
    id: u64,
    /// The entity's canonical name.
    canonical: String,
}

impl ResolvedRef {
    /// Creates a resolved reference.
    #[must_use]
    pub fn new(id: u64, canonical: impl Into<String>) -> Self {
        Self {
            id,
            canonical: canonical.into(),
        }
    }

    /// Returns the entity identifier.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Returns the canonical name.
    #[must_use]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

/// The outcome of resolving one name.
///
/// An unresolved name is not an error: it compiles to a predicate that
/// matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// The name maps to a known entity.
    Resolved(ResolvedRef),
    /// The name matches nothing in the vocabulary.
    Unresolved,
}

impl Resolution {
    /// Returns `true` for [`Resolution::Resolved`].
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// Returns the resolved reference, if any.
    #[must_use]
    pub const fn as_resolved(&self) -> Option<&ResolvedRef> {
        match self {
            Self::Resolved(reference) => Some(reference),
            Self::Unresolved => None,
        }
    }
}

/// Read-only capability that maps reference names to entities.
///
/// Implementations are supplied per compilation and must be safe for
/// concurrent reads when compilations run on several threads. Lookups must
/// not block: callers that need I/O prefetch before compiling.
pub trait VocabularyLookup {
    /// Resolves `text` as a name of the given kind.
    fn resolve(&self, kind: ReferenceKind, text: &str) -> Resolution;
}

impl<T: VocabularyLookup + ?Sized> VocabularyLookup for &T {
    fn resolve(&self, kind: ReferenceKind, text: &str) -> Resolution {
        (**self).resolve(kind, text)
    }
}

/// An in-memory vocabulary with case-insensitive names and aliases.
///
/// # Example
///
/// ```
/// use hql_core::{MemoryVocabulary, ReferenceKind, VocabularyLookup};
///
/// let mut vocabulary = MemoryVocabulary::new();
/// vocabulary.insert(ReferenceKind::Tag, 7, "Landscape");
/// vocabulary.insert_alias(ReferenceKind::Tag, "scenery", 7);
///
/// let found = vocabulary.resolve(ReferenceKind::Tag, "SCENERY");
/// assert_eq!(found.as_resolved().map(|r| r.canonical()), Some("Landscape"));
/// assert!(!vocabulary.resolve(ReferenceKind::Author, "landscape").is_resolved());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryVocabulary {
    entities: BTreeMap<(ReferenceKind, u64), String>,
    names: BTreeMap<(ReferenceKind, String), u64>,
}

impl MemoryVocabulary {
    /// Creates an empty vocabulary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity under its canonical name, replacing any previous entity
    /// with the same id together with its names and aliases.
    pub fn insert(&mut self, kind: ReferenceKind, id: u64, canonical: impl Into<String>) {
        let name: String = canonical.into();
        if self.entities.contains_key(&(kind, id)) {
            self.names
                .retain(|(name_kind, _), named| *name_kind != kind || *named != id);
        }
        self.names.insert((kind, name.to_lowercase()), id);
        self.entities.insert((kind, id), name);
    }

    /// Adds another name for an existing entity. Returns `false` when no
    /// entity with `id` exists for `kind`.
    pub fn insert_alias(&mut self, kind: ReferenceKind, alias: &str, id: u64) -> bool {
        if !self.entities.contains_key(&(kind, id)) {
            return false;
        }
        self.names.insert((kind, alias.to_lowercase()), id);
        true
    }

    /// Returns the number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if the vocabulary holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl VocabularyLookup for MemoryVocabulary {
    fn resolve(&self, kind: ReferenceKind, text: &str) -> Resolution {
        self.names
            .get(&(kind, text.to_lowercase()))
            .and_then(|&id| {
                self.entities
                    .get(&(kind, id))
                    .map(|canonical| ResolvedRef::new(id, canonical.clone()))
            })
            .map_or(Resolution::Unresolved, Resolution::Resolved)
    }
}
