//! App Router

use salvo::Router;

use crate::{
    admin,
    auth::middleware::{handler as resolve_user, require_user, staff_only},
    carts, checkout, orders, products,
};

/// Every API route. Bearer tokens are optional at the top level; routes that
/// need a caller add their own guard.
pub(crate) fn app_router() -> Router {
    Router::new()
        .hoop(resolve_user)
        .push(
            Router::with_path("products")
                .get(products::index::handler)
                .post(products::create::handler)
                .push(
                    Router::with_path("{product}")
                        .get(products::get::handler)
                        .put(products::update::handler)
                        .delete(products::delete::handler),
                ),
        )
        .push(
            Router::with_path("cart")
                .get(carts::get::handler)
                .delete(carts::clear::handler)
                .push(Router::with_path("merge").post(carts::merge::handler))
                .push(
                    Router::with_path("items")
                        .post(carts::items::create::handler)
                        .push(
                            Router::with_path("{product}")
                                .put(carts::items::update::handler)
                                .delete(carts::items::delete::handler),
                        ),
                ),
        )
        .push(
            Router::with_path("checkout")
                .hoop(require_user)
                .post(checkout::handler::handler),
        )
        .push(
            Router::with_path("orders")
                .hoop(require_user)
                .get(orders::index::handler)
                .push(Router::with_path("{order}").get(orders::get::handler)),
        )
        .push(
            Router::with_path("admin")
                .hoop(require_user)
                .hoop(staff_only)
                .push(
                    Router::with_path("orders")
                        .get(admin::orders::index::handler)
                        .push(
                            Router::with_path("{order}")
                                .get(admin::orders::get::handler)
                                .push(
                                    Router::with_path("status")
                                        .put(admin::orders::status::handler),
                                ),
                        ),
                ),
        )
}

#[cfg(test)]
mod tests {
    use salvo::{
        affix_state::inject,
        http::{StatusCode, header::AUTHORIZATION},
        prelude::Service,
        test::TestClient,
    };
    use testresult::TestResult;

    use storefront_app::{
        auth::MockAuthService,
        domain::{orders::MockOrdersService, products::MockProductsService},
    };

    use crate::test_helpers::{Mocks, TEST_CUSTOMER, TEST_STAFF};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        Service::new(
            Router::new()
                .hoop(inject(mocks.into_state()))
                .push(app_router()),
        )
    }

    fn auth_returning(user: storefront_app::auth::AuthenticatedUser) -> MockAuthService {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer()
            .once()
            .return_once(move |_| Ok(user));

        auth
    }

    #[tokio::test]
    async fn test_catalog_is_public() -> TestResult {
        let mut products = MockProductsService::new();

        products
            .expect_list_products()
            .once()
            .return_once(|| Ok(vec![]));

        let res = TestClient::get("http://example.com/products")
            .send(&make_service(Mocks {
                products,
                ..Mocks::default()
            }))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_requires_sign_in() -> TestResult {
        let res = TestClient::post("http://example.com/checkout")
            .json(&serde_json::json!({}))
            .send(&make_service(Mocks::default()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_admin_routes_reject_customers() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_list_all_orders().never();

        let res = TestClient::get("http://example.com/admin/orders")
            .add_header(AUTHORIZATION, "Bearer customer-token", true)
            .send(&make_service(Mocks {
                orders,
                auth: auth_returning(TEST_CUSTOMER),
                ..Mocks::default()
            }))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn test_admin_routes_admit_staff() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_list_all_orders()
            .once()
            .return_once(|_| Ok(vec![]));

        let res = TestClient::get("http://example.com/admin/orders")
            .add_header(AUTHORIZATION, "Bearer staff-token", true)
            .send(&make_service(Mocks {
                orders,
                auth: auth_returning(TEST_STAFF),
                ..Mocks::default()
            }))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }
}
