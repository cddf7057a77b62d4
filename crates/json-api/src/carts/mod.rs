//! Carts

mod errors;
mod handlers;
pub(crate) mod items;
mod owner;

pub(crate) use handlers::*;
pub(crate) use owner::CART_SESSION_HEADER;
