//! Unit tests for `hql_core` types.

mod span_tests;

mod behaviour;
