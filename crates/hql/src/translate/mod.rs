//! The two consumers of a semantic tree.
//!
//! [`lower`] produces the executable [`Predicate`](hql_core::Predicate);
//! [`annotate`] produces highlight spans for the query box. Both read the
//! same analysis result, so a compilation resolves each reference once.

mod predicate;
mod visual;

pub use predicate::lower;
pub use visual::{annotate, annotate_lexical};
