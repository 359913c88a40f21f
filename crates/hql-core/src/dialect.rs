//! Dialect descriptors: the recognised fields of one entity's query syntax.
//!
//! A [`Dialect`] is immutable configuration. It is built once, either in
//! code through [`FieldSpec`] builders or from data through
//! [`DialectDescriptor`], validated, and then shared read-only by every
//! compilation.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A relational operator written between a field name and its value.
///
/// `-` is the range operator: it never appears between a field and a value
/// but a field must list it to accept range literals such as `100-200`.
///
/// # Example
///
/// ```
/// use hql_core::Operator;
///
/// let op: Operator = ">=".parse()?;
/// assert_eq!(op, Operator::Ge);
/// assert!(op.is_ordering());
/// # Ok::<(), hql_core::OperatorParseError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Operator {
    /// `=`: equality.
    #[serde(rename = "=")]
    Eq,
    /// `!=`: inequality.
    #[serde(rename = "!=")]
    Ne,
    /// `>`: strictly greater.
    #[serde(rename = ">")]
    Gt,
    /// `>=`: greater or equal.
    #[serde(rename = ">=")]
    Ge,
    /// `<`: strictly less.
    #[serde(rename = "<")]
    Lt,
    /// `<=`: less or equal.
    #[serde(rename = "<=")]
    Le,
    /// `:`: the default relation (equality, or match for text).
    #[serde(rename = ":")]
    Colon,
    /// `-`: range between two bounds.
    #[serde(rename = "-")]
    Range,
    /// `~`: pattern match.
    #[serde(rename = "~")]
    Match,
}

impl Operator {
    /// Returns the operator's source symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Colon => ":",
            Self::Range => "-",
            Self::Match => "~",
        }
    }

    /// Returns `true` for `>`, `>=`, `<` and `<=`.
    #[must_use]
    pub const fn is_ordering(self) -> bool {
        matches!(self, Self::Gt | Self::Ge | Self::Lt | Self::Le)
    }

    /// Returns `true` for operators that may be written between a field name
    /// and its value. The range operator only appears inside values.
    #[must_use]
    pub const fn is_filter_operator(self) -> bool {
        !matches!(self, Self::Range)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Error raised when parsing an operator symbol fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported operator: '{0}'")]
pub struct OperatorParseError(String);

impl FromStr for Operator {
    type Err = OperatorParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim() {
            "=" => Ok(Self::Eq),
            "!=" => Ok(Self::Ne),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Ge),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Le),
            ":" => Ok(Self::Colon),
            "-" => Ok(Self::Range),
            "~" => Ok(Self::Match),
            other => Err(OperatorParseError(other.to_owned())),
        }
    }
}

/// The vocabulary a reference-typed field resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// Plain tags.
    Tag,
    /// Topics (works, characters, series).
    Topic,
    /// Authors and artists.
    Author,
    /// User-curated collections.
    Collection,
    /// Annotations attached to tags.
    Annotation,
}

impl ReferenceKind {
    /// Returns the lower-case identifier for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Topic => "topic",
            Self::Author => "author",
            Self::Collection => "collection",
            Self::Annotation => "annotation",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The declared value type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Free text, compared by equality or pattern match.
    String,
    /// A signed integer; single values only.
    Integer,
    /// A signed integer that also accepts range literals.
    Range,
    /// A byte count written with an optional unit suffix.
    Size,
    /// A calendar date written `YYYY-MM-DD`.
    Date,
    /// A truth value.
    Boolean,
    /// One of a fixed set of values, matched case-insensitively.
    Enum(Vec<String>),
    /// A name resolved against the caller's vocabulary.
    Reference(ReferenceKind),
}

impl ValueType {
    /// Returns the lower-case name of the type.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Range => "range",
            Self::Size => "size",
            Self::Date => "date",
            Self::Boolean => "boolean",
            Self::Enum(_) => "enum",
            Self::Reference(_) => "reference",
        }
    }

    /// Returns `true` if values of this type have a total order, so ordering
    /// operators make sense.
    #[must_use]
    pub const fn is_ordered(&self) -> bool {
        matches!(self, Self::Integer | Self::Range | Self::Size | Self::Date)
    }

    /// Returns `true` if this type accepts range literals.
    #[must_use]
    pub const fn accepts_ranges(&self) -> bool {
        matches!(self, Self::Range | Self::Size | Self::Date)
    }

    /// Returns `true` if a dash range written against this type is read back
    /// as plain text (`2020-2021` as a tag name).
    #[must_use]
    pub const fn reads_dash_range_as_text(&self) -> bool {
        matches!(
            self,
            Self::String | Self::Enum(_) | Self::Reference(_) | Self::Boolean
        )
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reference(kind) => write!(f, "{kind} reference"),
            Self::Enum(values) => write!(f, "enum of [{}]", values.join(", ")),
            other => f.write_str(other.name()),
        }
    }
}

/// Describes one recognised field: its key, type and operators.
///
/// # Example
///
/// ```
/// use hql_core::{FieldSpec, Operator, ReferenceKind, ValueType};
///
/// let spec = FieldSpec::new(
///     "tag",
///     ValueType::Reference(ReferenceKind::Tag),
///     [Operator::Colon, Operator::Eq, Operator::Ne],
/// )
/// .with_aliases(["tags"])
/// .multi_valued();
/// assert!(spec.allows(Operator::Colon));
/// assert!(!spec.allows(Operator::Gt));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    key: String,
    aliases: Vec<String>,
    value_type: ValueType,
    operators: BTreeSet<Operator>,
    multi_valued: bool,
}

impl FieldSpec {
    /// Creates a field with no aliases.
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        value_type: ValueType,
        operators: impl IntoIterator<Item = Operator>,
    ) -> Self {
        Self {
            key: key.into(),
            aliases: Vec::new(),
            value_type,
            operators: operators.into_iter().collect(),
            multi_valued: false,
        }
    }

    /// Adds alternative names for the field.
    #[must_use]
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Marks the field as accepting collection literals (`{a, b}`).
    #[must_use]
    pub const fn multi_valued(mut self) -> Self {
        self.multi_valued = true;
        self
    }

    /// Returns the canonical key emitted in predicates.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the alternative names.
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Returns the declared value type.
    #[must_use]
    pub const fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// Returns the permitted operators.
    #[must_use]
    pub const fn operators(&self) -> &BTreeSet<Operator> {
        &self.operators
    }

    /// Returns `true` if `operator` is permitted for this field.
    #[must_use]
    pub fn allows(&self, operator: Operator) -> bool {
        self.operators.contains(&operator)
    }

    /// Returns `true` if the field accepts collection literals.
    #[must_use]
    pub const fn is_multi_valued(&self) -> bool {
        self.multi_valued
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.key.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    fn validate(&self, dialect: &str) -> Result<(), DialectError> {
        let field = || self.key.clone();
        if self.operators.is_empty() {
            return Err(DialectError::NoOperators {
                dialect: dialect.to_owned(),
                field: field(),
            });
        }
        if let ValueType::Enum(values) = &self.value_type {
            if values.is_empty() {
                return Err(DialectError::EmptyEnum {
                    dialect: dialect.to_owned(),
                    field: field(),
                });
            }
        }
        if let Some(operator) = self
            .operators
            .iter()
            .copied()
            .find(|op| op.is_ordering() && !self.value_type.is_ordered())
        {
            return Err(DialectError::OrderingOnUnorderedType {
                dialect: dialect.to_owned(),
                field: field(),
                operator,
            });
        }
        if self.allows(Operator::Range) && !self.value_type.accepts_ranges() {
            return Err(DialectError::RangeOnScalarType {
                dialect: dialect.to_owned(),
                field: field(),
            });
        }
        if self.allows(Operator::Match) && self.value_type != ValueType::String {
            return Err(DialectError::MatchOnNonText {
                dialect: dialect.to_owned(),
                field: field(),
            });
        }
        Ok(())
    }
}

/// A validated, immutable dialect.
///
/// # Example
///
/// ```
/// use hql_core::{Dialect, FieldSpec, Operator, ValueType};
///
/// let dialect = Dialect::new(
///     "album",
///     Some("title"),
///     vec![FieldSpec::new("title", ValueType::String, [Operator::Colon, Operator::Eq])
///         .with_aliases(["name"])],
/// )?;
/// assert_eq!(dialect.field("NAME").map(|f| f.key()), Some("title"));
/// # Ok::<(), hql_core::DialectError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    name: String,
    fields: Vec<FieldSpec>,
    index: BTreeMap<String, usize>,
    default_field: Option<usize>,
}

impl Dialect {
    /// Validates and builds a dialect.
    ///
    /// # Errors
    ///
    /// Returns a [`DialectError`] when a field or alias name is declared
    /// twice, when the default field is unknown or rejects `:`, or when a
    /// field's operator whitelist does not fit its value type.
    pub fn new(
        name: impl Into<String>,
        default_field: Option<&str>,
        fields: Vec<FieldSpec>,
    ) -> Result<Self, DialectError> {
        let dialect: String = name.into();
        if dialect.trim().is_empty() {
            return Err(DialectError::EmptyName);
        }

        let mut index = BTreeMap::new();
        for (position, spec) in fields.iter().enumerate() {
            spec.validate(&dialect)?;
            for field_name in spec.names() {
                if index.insert(field_name.to_lowercase(), position).is_some() {
                    return Err(DialectError::DuplicateField {
                        dialect,
                        field: field_name.to_owned(),
                    });
                }
            }
        }

        let default_position = match default_field {
            None => None,
            Some(wanted) => {
                let Some(&position) = index.get(&wanted.to_lowercase()) else {
                    return Err(DialectError::UnknownDefaultField {
                        dialect,
                        field: wanted.to_owned(),
                    });
                };
                if fields
                    .get(position)
                    .is_none_or(|spec| !spec.allows(Operator::Colon))
                {
                    return Err(DialectError::DefaultFieldRejectsColon {
                        dialect,
                        field: wanted.to_owned(),
                    });
                }
                Some(position)
            }
        };

        Ok(Self {
            name: dialect,
            fields,
            index,
            default_field: default_position,
        })
    }

    /// Returns the dialect name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns every field in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Looks up a field by key or alias, case-insensitively.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.index
            .get(&name.to_lowercase())
            .and_then(|&position| self.fields.get(position))
    }

    /// Returns the field bare values are matched against.
    #[must_use]
    pub fn default_field(&self) -> Option<&FieldSpec> {
        self.default_field
            .and_then(|position| self.fields.get(position))
    }

    /// Returns the boolean field named by a bare word, if any.
    #[must_use]
    pub fn flag_field(&self, word: &str) -> Option<&FieldSpec> {
        self.field(word)
            .filter(|spec| *spec.value_type() == ValueType::Boolean)
    }
}

/// The data form of a value type name inside a [`FieldDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueTypeName {
    /// See [`ValueType::String`].
    String,
    /// See [`ValueType::Integer`].
    Integer,
    /// See [`ValueType::Range`].
    Range,
    /// See [`ValueType::Size`].
    Size,
    /// See [`ValueType::Date`].
    Date,
    /// See [`ValueType::Boolean`].
    Boolean,
    /// See [`ValueType::Enum`]; values come from `values`.
    Enum,
    /// See [`ValueType::Reference`]; the kind comes from `reference`.
    Reference,
}

/// A field as written in a dialect document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDescriptor {
    /// Canonical key.
    pub key: String,
    /// Alternative names.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Value type name.
    #[serde(rename = "type")]
    pub value_type: ValueTypeName,
    /// Vocabulary for `reference` fields.
    #[serde(default)]
    pub reference: Option<ReferenceKind>,
    /// Known values for `enum` fields.
    #[serde(default)]
    pub values: Vec<String>,
    /// Operator whitelist.
    pub operators: Vec<Operator>,
    /// Whether collection literals are accepted.
    #[serde(default)]
    pub multi_valued: bool,
}

/// A dialect as written in a dialect document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DialectDescriptor {
    /// Dialect name used to select it at compile time.
    pub name: String,
    /// Field bare values are matched against.
    #[serde(default)]
    pub default_field: Option<String>,
    /// Recognised fields.
    pub fields: Vec<FieldDescriptor>,
}

impl FieldDescriptor {
    fn into_spec(self, dialect: &str) -> Result<FieldSpec, DialectError> {
        let value_type = match self.value_type {
            ValueTypeName::String => ValueType::String,
            ValueTypeName::Integer => ValueType::Integer,
            ValueTypeName::Range => ValueType::Range,
            ValueTypeName::Size => ValueType::Size,
            ValueTypeName::Date => ValueType::Date,
            ValueTypeName::Boolean => ValueType::Boolean,
            ValueTypeName::Enum => ValueType::Enum(self.values),
            ValueTypeName::Reference => {
                let Some(kind) = self.reference else {
                    return Err(DialectError::MissingReferenceKind {
                        dialect: dialect.to_owned(),
                        field: self.key,
                    });
                };
                ValueType::Reference(kind)
            }
        };
        let spec = FieldSpec::new(self.key, value_type, self.operators).with_aliases(self.aliases);
        Ok(if self.multi_valued {
            spec.multi_valued()
        } else {
            spec
        })
    }
}

impl TryFrom<DialectDescriptor> for Dialect {
    type Error = DialectError;

    fn try_from(descriptor: DialectDescriptor) -> Result<Self, Self::Error> {
        let DialectDescriptor {
            name,
            default_field,
            fields,
        } = descriptor;
        let specs = fields
            .into_iter()
            .map(|field| field.into_spec(&name))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(name, default_field.as_deref(), specs)
    }
}

/// Errors raised while building or registering dialects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DialectError {
    /// The dialect name is blank.
    #[error("dialect name must not be empty")]
    EmptyName,

    /// Two fields share a key or alias.
    #[error("dialect '{dialect}': field name '{field}' is declared twice")]
    DuplicateField {
        /// Dialect being built.
        dialect: String,
        /// The repeated name.
        field: String,
    },

    /// The default field is not declared.
    #[error("dialect '{dialect}': default field '{field}' is not declared")]
    UnknownDefaultField {
        /// Dialect being built.
        dialect: String,
        /// The missing field.
        field: String,
    },

    /// The default field does not accept `:`, so bare values cannot use it.
    #[error("dialect '{dialect}': default field '{field}' must allow ':'")]
    DefaultFieldRejectsColon {
        /// Dialect being built.
        dialect: String,
        /// The offending field.
        field: String,
    },

    /// A field permits no operator at all.
    #[error("dialect '{dialect}': field '{field}' permits no operators")]
    NoOperators {
        /// Dialect being built.
        dialect: String,
        /// The offending field.
        field: String,
    },

    /// An ordering operator on a type without an order.
    #[error("dialect '{dialect}': field '{field}' cannot use '{operator}' on an unordered type")]
    OrderingOnUnorderedType {
        /// Dialect being built.
        dialect: String,
        /// The offending field.
        field: String,
        /// The rejected operator.
        operator: Operator,
    },

    /// The range operator on a type that has no range form.
    #[error("dialect '{dialect}': field '{field}' cannot accept ranges")]
    RangeOnScalarType {
        /// Dialect being built.
        dialect: String,
        /// The offending field.
        field: String,
    },

    /// The match operator on a non-string field.
    #[error("dialect '{dialect}': field '{field}' cannot use '~' on a non-string type")]
    MatchOnNonText {
        /// Dialect being built.
        dialect: String,
        /// The offending field.
        field: String,
    },

    /// An enum field without values.
    #[error("dialect '{dialect}': enum field '{field}' declares no values")]
    EmptyEnum {
        /// Dialect being built.
        dialect: String,
        /// The offending field.
        field: String,
    },

    /// A reference field without a vocabulary kind.
    #[error("dialect '{dialect}': reference field '{field}' needs a reference kind")]
    MissingReferenceKind {
        /// Dialect being built.
        dialect: String,
        /// The offending field.
        field: String,
    },

    /// Two dialects share a name.
    #[error("dialect '{name}' is registered twice")]
    DuplicateDialect {
        /// The repeated name.
        name: String,
    },

    /// A dialect document could not be deserialised.
    #[error("malformed dialect document: {message}")]
    Malformed {
        /// Deserialiser message.
        message: String,
    },
}
