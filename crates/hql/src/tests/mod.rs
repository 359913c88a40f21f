//! Unit tests for `hql`.

mod support;

mod predicate_tests;
mod visual_tests;

mod behaviour;
