//! Unit tests for `hql_syntax`.


mod behaviour;
