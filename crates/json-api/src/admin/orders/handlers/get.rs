//! Get Any Order Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, get::OrderResponse},
    state::State,
};

/// Get Any Order Handler
///
/// Staff view of a single order, whoever placed it.
#[endpoint(
    tags("admin"),
    summary = "Get Any Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order found"),
        (status_code = StatusCode::FORBIDDEN, description = "Staff only"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    depot.staff_or_403()?;

    let order = state
        .app
        .orders
        .get_any_order(order.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use storefront_app::{
        auth::AuthenticatedUser,
        domain::orders::{MockOrdersService, OrdersServiceError, records::OrderUuid},
    };

    use crate::test_helpers::{Mocks, TEST_CUSTOMER, TEST_STAFF, make_order};

    use super::*;

    fn make_service(orders: MockOrdersService, user: AuthenticatedUser) -> Service {
        Mocks {
            orders,
            ..Mocks::default()
        }
        .signed_in(user, Router::with_path("admin/orders/{order}").get(handler))
    }

    #[tokio::test]
    async fn test_staff_sees_customer_order() -> TestResult {
        let uuid = OrderUuid::new();

        let mut orders = MockOrdersService::new();

        orders
            .expect_get_any_order()
            .once()
            .withf(move |order| *order == uuid)
            .return_once(move |_| Ok(make_order(uuid, TEST_CUSTOMER.uuid)));

        let mut res = TestClient::get(format!("http://example.com/admin/orders/{uuid}"))
            .send(&make_service(orders, TEST_STAFF))
            .await;

        let body: OrderResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.uuid, uuid.into_uuid());
        assert_eq!(body.user_uuid, TEST_CUSTOMER.uuid.into_uuid());
        assert_eq!(body.items.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_order_returns_404() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_get_any_order()
            .once()
            .return_once(|_| Err(OrdersServiceError::NotFound));

        let res = TestClient::get(format!(
            "http://example.com/admin/orders/{}",
            Uuid::now_v7()
        ))
        .send(&make_service(orders, TEST_STAFF))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }

    #[tokio::test]
    async fn test_customer_gets_403() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_get_any_order().never();

        let res = TestClient::get(format!(
            "http://example.com/admin/orders/{}",
            Uuid::now_v7()
        ))
        .send(&make_service(orders, TEST_CUSTOMER))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }
}
