//! Checkout

pub mod errors;
pub mod pricing;
pub mod service;
pub mod validation;

pub use errors::CheckoutError;
pub use service::*;
