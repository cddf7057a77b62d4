//! Cart owner resolution.

use salvo::prelude::{Depot, Request, StatusError};

use storefront_app::domain::carts::data::{CartOwner, SessionToken};

use crate::extensions::*;

/// Header carrying an anonymous shopper's session token.
pub(crate) const CART_SESSION_HEADER: &str = "x-cart-session";

/// The signed-in user's cart, or the anonymous session's cart.
pub(super) fn cart_owner(req: &Request, depot: &Depot) -> Result<CartOwner, StatusError> {
    if let Some(user) = depot.current_user() {
        return Ok(CartOwner::User(user.uuid));
    }

    session_token(req)?
        .map(CartOwner::Session)
        .ok_or_else(|| {
            StatusError::unauthorized().brief("Sign in or send an x-cart-session header")
        })
}

pub(super) fn session_token(req: &Request) -> Result<Option<SessionToken>, StatusError> {
    req.header::<String>(CART_SESSION_HEADER)
        .map(|value| SessionToken::parse(&value))
        .transpose()
        .or_400("invalid x-cart-session header")
}
