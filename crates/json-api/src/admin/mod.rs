//! Staff-only routes

pub(crate) mod orders;
