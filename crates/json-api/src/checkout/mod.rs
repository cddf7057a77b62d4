//! Checkout

mod errors;
pub(crate) mod handler;
