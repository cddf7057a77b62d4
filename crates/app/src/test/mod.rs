//! Shared fixtures for database-backed service tests.

mod db;
pub(crate) mod helpers;

pub(crate) use context::TestContext;
