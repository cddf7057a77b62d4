//! Storefront Domain Concerns

pub mod carts;
pub mod checkout;
pub mod orders;
pub mod products;
pub mod users;
