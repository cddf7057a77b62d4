//! Merge Cart Handler

use std::sync::Arc;

use salvo::prelude::*;
use tracing::info;

use crate::{
    carts::{errors::into_status_error, get::CartResponse, owner::session_token},
    extensions::*,
    state::State,
};

/// Merge Cart Handler
///
/// Moves the anonymous cart named by the `x-cart-session` header into the
/// signed-in user's cart. Quantities are summed and capped at current stock.
#[endpoint(
    tags("cart"),
    summary = "Merge Session Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Merged cart"),
        (status_code = StatusCode::BAD_REQUEST, description = "Missing or invalid session header"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Not signed in"),
    ),
)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let Some(session) = session_token(req)? else {
        return Err(StatusError::bad_request().brief("x-cart-session header is required"));
    };

    let cart = state
        .app
        .carts
        .merge_session_cart(session, user.uuid)
        .await
        .map_err(into_status_error)?;

    info!(user_uuid = %user.uuid, lines = cart.items.len(), "cart merged");

    Ok(Json(CartResponse::from_record(cart)?))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use storefront_app::domain::carts::{MockCartsService, data::CartOwner};

    use crate::{
        carts::CART_SESSION_HEADER,
        test_helpers::{Mocks, TEST_CUSTOMER, make_cart},
    };

    use super::*;

    fn route() -> Router {
        Router::with_path("cart/merge").post(handler)
    }

    #[tokio::test]
    async fn test_merge_moves_session_cart_to_user() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_merge_session_cart()
            .once()
            .withf(|session, user| {
                session.as_str() == "sess-1" && *user == TEST_CUSTOMER.uuid
            })
            .return_once(|_, user| Ok(make_cart(CartOwner::User(user), &[(1000, 3)])));

        let service = Mocks {
            carts,
            ..Mocks::default()
        }
        .signed_in(TEST_CUSTOMER, route());

        let mut res = TestClient::post("http://example.com/cart/merge")
            .add_header(CART_SESSION_HEADER, "sess-1", true)
            .send(&service)
            .await;

        let body: CartResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.subtotal, 3000);

        Ok(())
    }

    #[tokio::test]
    async fn test_merge_without_session_header_returns_400() -> TestResult {
        let mut carts = MockCartsService::new();

        carts.expect_merge_session_cart().never();

        let service = Mocks {
            carts,
            ..Mocks::default()
        }
        .signed_in(TEST_CUSTOMER, route());

        let res = TestClient::post("http://example.com/cart/merge")
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_merge_requires_sign_in() -> TestResult {
        let mut carts = MockCartsService::new();

        carts.expect_merge_session_cart().never();

        let service = Mocks {
            carts,
            ..Mocks::default()
        }
        .anonymous(route());

        let res = TestClient::post("http://example.com/cart/merge")
            .add_header(CART_SESSION_HEADER, "sess-1", true)
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }
}
