//! Checkout Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use storefront_app::domain::{
    carts::data::CartOwner,
    checkout::validation::FieldErrors,
    orders::data::{BillingDetails, PaymentMethod},
};

use crate::{
    checkout::errors::{Rejection, StockErrorResponse, ValidationErrorResponse},
    extensions::*,
    observability::{CheckoutOutcome, record_checkout},
    orders::get::OrderResponse,
    state::State,
};

/// Checkout Request
///
/// Missing fields are reported per field rather than rejecting the body.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub(crate) struct CheckoutRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,

    /// One of `credit_card`, `debit_card`, `paypal`, `cod`
    pub payment_method: String,
}

impl CheckoutRequest {
    /// Billing details for the checkout service.
    ///
    /// An unusable payment method is reported together with every other
    /// failing field so the form can be fixed in one pass.
    fn into_billing(self) -> Result<BillingDetails, FieldErrors> {
        let payment_method = self.payment_method.trim().parse::<PaymentMethod>().ok();

        let billing = BillingDetails {
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            city: self.city,
            state: self.state,
            postal_code: self.postal_code,
            payment_method: payment_method.unwrap_or(PaymentMethod::CreditCard),
        };

        if payment_method.is_some() {
            return Ok(billing);
        }

        let mut errors = billing.validate().err().unwrap_or_default();

        if self.payment_method.trim().is_empty() {
            errors.insert("payment_method", "This field is required.");
        } else {
            errors.insert("payment_method", "Select a valid payment method.");
        }

        Err(errors)
    }
}

/// Checkout Handler
///
/// Places an order from the signed-in user's cart. Anonymous carts must be
/// merged first.
#[endpoint(
    tags("checkout"),
    summary = "Place Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Order placed", body = OrderResponse),
        (status_code = StatusCode::BAD_REQUEST, description = "Cart is empty"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Not signed in"),
        (status_code = StatusCode::CONFLICT, description = "Not enough stock", body = StockErrorResponse),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Invalid billing details", body = ValidationErrorResponse),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CheckoutRequest>,
    depot: &mut Depot,
    res: &mut Response,
) {
    let caller = depot
        .obtain_or_500::<Arc<State>>()
        .and_then(|state| depot.user_or_401().map(|user| (state, user)));

    let (state, user) = match caller {
        Ok(caller) => caller,
        Err(status) => {
            res.render(status);

            return;
        }
    };

    let billing = match json.into_inner().into_billing() {
        Ok(billing) => billing,
        Err(errors) => {
            // An empty cart outranks billing errors.
            let rejection = match state.app.carts.get_cart(CartOwner::User(user.uuid)).await {
                Ok(cart) if cart.is_empty() => Rejection::EmptyCart,
                Ok(_) => Rejection::InvalidBilling(errors),
                Err(source) => {
                    error!("checkout cart lookup failed: {source}");

                    Rejection::Failed(StatusError::internal_server_error())
                }
            };

            record_checkout(rejection.outcome());
            rejection.render(res);

            return;
        }
    };

    let placed = state
        .app
        .checkout
        .place_order(user.uuid, CartOwner::User(user.uuid), billing)
        .await;

    let order = match placed {
        Ok(order) => order,
        Err(error) => {
            let rejection = Rejection::from(error);

            if let Rejection::InsufficientStock { product_name, .. } = &rejection {
                warn!(user_uuid = %user.uuid, product_name = %product_name, "checkout rejected for stock");
            }

            record_checkout(rejection.outcome());
            rejection.render(res);

            return;
        }
    };

    record_checkout(CheckoutOutcome::Placed);

    info!(
        user_uuid = %user.uuid,
        order_number = %order.order_number,
        total_amount = order.total_amount,
        "order placed"
    );

    if let Err(source) = res.add_header(LOCATION, format!("/orders/{}", order.uuid), true) {
        warn!("failed to set location header: {source}");
    }

    res.status_code(StatusCode::CREATED);
    res.render(Json(OrderResponse::from(order)));
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use storefront_app::domain::{
        carts::{MockCartsService, records::CartRecord},
        checkout::{CheckoutError, MockCheckoutService},
        orders::records::OrderUuid,
    };

    use crate::test_helpers::{Mocks, TEST_CUSTOMER, make_billing, make_cart, make_order};

    use super::*;

    fn make_service(checkout: MockCheckoutService) -> Service {
        Mocks {
            checkout,
            ..Mocks::default()
        }
        .signed_in(TEST_CUSTOMER, Router::with_path("checkout").post(handler))
    }

    fn valid_body() -> Value {
        json!({
            "full_name": "Ada Lovelace",
            "email": "ada@example.com",
            "phone": "555-0100",
            "address": "12 Analytical Row",
            "city": "London",
            "state": "LDN",
            "postal_code": "N1 9GU",
            "payment_method": "credit_card",
        })
    }

    #[tokio::test]
    async fn test_checkout_places_order_for_user_cart() -> TestResult {
        let uuid = OrderUuid::new();

        let mut checkout = MockCheckoutService::new();

        checkout
            .expect_place_order()
            .once()
            .withf(|customer, cart, billing| {
                *customer == TEST_CUSTOMER.uuid
                    && *cart == CartOwner::User(TEST_CUSTOMER.uuid)
                    && *billing == make_billing()
            })
            .return_once(move |customer, _, _| Ok(make_order(uuid, customer)));

        let mut res = TestClient::post("http://example.com/checkout")
            .json(&valid_body())
            .send(&make_service(checkout))
            .await;

        let body: OrderResponse = res.take_json().await?;
        let location = res.headers().get("location").and_then(|v| v.to_str().ok());

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(location, Some(format!("/orders/{uuid}").as_str()));
        assert_eq!(body.uuid, uuid.into_uuid());
        assert_eq!(body.status, "pending");

        Ok(())
    }

    #[tokio::test]
    async fn test_empty_cart_returns_400() -> TestResult {
        let mut checkout = MockCheckoutService::new();

        checkout
            .expect_place_order()
            .once()
            .return_once(|_, _, _| Err(CheckoutError::EmptyCart));

        let res = TestClient::post("http://example.com/checkout")
            .json(&valid_body())
            .send(&make_service(checkout))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_billing_returns_422_with_field_messages() -> TestResult {
        let mut errors = FieldErrors::new();

        errors.insert("email", "Enter a valid email address.");

        let mut checkout = MockCheckoutService::new();

        checkout
            .expect_place_order()
            .once()
            .return_once(move |_, _, _| Err(CheckoutError::InvalidBillingInfo(errors)));

        let mut body = valid_body();
        body["email"] = json!("not-an-email");

        let mut res = TestClient::post("http://example.com/checkout")
            .json(&body)
            .send(&make_service(checkout))
            .await;

        let response: ValidationErrorResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].field, "email");
        assert_eq!(response.errors[0].message, "Enter a valid email address.");

        Ok(())
    }

    fn make_service_with_cart(checkout: MockCheckoutService, cart: CartRecord) -> Service {
        let mut carts = MockCartsService::new();

        carts
            .expect_get_cart()
            .once()
            .withf(|owner| *owner == CartOwner::User(TEST_CUSTOMER.uuid))
            .return_once(move |_| Ok(cart));

        Mocks {
            checkout,
            carts,
            ..Mocks::default()
        }
        .signed_in(TEST_CUSTOMER, Router::with_path("checkout").post(handler))
    }

    #[tokio::test]
    async fn test_bad_payment_method_is_reported_with_other_fields() -> TestResult {
        let mut checkout = MockCheckoutService::new();

        checkout.expect_place_order().never();

        let cart = make_cart(CartOwner::User(TEST_CUSTOMER.uuid), &[(1500, 1)]);

        let mut res = TestClient::post("http://example.com/checkout")
            .json(&json!({ "full_name": "Ada Lovelace", "payment_method": "cheque" }))
            .send(&make_service_with_cart(checkout, cart))
            .await;

        let response: ValidationErrorResponse = res.take_json().await?;
        let fields: Vec<&str> = response.errors.iter().map(|e| e.field.as_str()).collect();

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));
        assert!(fields.contains(&"payment_method"), "payment method flagged");
        assert!(fields.contains(&"email"), "missing email flagged");
        assert!(!fields.contains(&"full_name"), "full name was supplied");

        Ok(())
    }

    #[tokio::test]
    async fn test_empty_cart_outranks_bad_payment_method() -> TestResult {
        let mut checkout = MockCheckoutService::new();

        checkout.expect_place_order().never();

        let mut body = valid_body();
        body["payment_method"] = json!("cheque");

        let res = TestClient::post("http://example.com/checkout")
            .json(&body)
            .send(&make_service_with_cart(
                checkout,
                CartRecord::empty(CartOwner::User(TEST_CUSTOMER.uuid)),
            ))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_insufficient_stock_returns_409_with_product() -> TestResult {
        let mut checkout = MockCheckoutService::new();

        checkout.expect_place_order().once().return_once(|_, _, _| {
            Err(CheckoutError::InsufficientStock {
                product_name: "Teapot".to_string(),
                available: 1,
            })
        });

        let mut res = TestClient::post("http://example.com/checkout")
            .json(&valid_body())
            .send(&make_service(checkout))
            .await;

        let response: StockErrorResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));
        assert_eq!(response.product_name, "Teapot");
        assert_eq!(response.available, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_storage_failure_returns_500() -> TestResult {
        let mut checkout = MockCheckoutService::new();

        checkout
            .expect_place_order()
            .once()
            .return_once(|_, _, _| Err(CheckoutError::Storage(sqlx::Error::PoolClosed)));

        let res = TestClient::post("http://example.com/checkout")
            .json(&valid_body())
            .send(&make_service(checkout))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));

        Ok(())
    }

    #[tokio::test]
    async fn test_anonymous_checkout_returns_401() -> TestResult {
        let mut checkout = MockCheckoutService::new();

        checkout.expect_place_order().never();

        let service = Mocks {
            checkout,
            ..Mocks::default()
        }
        .anonymous(Router::with_path("checkout").post(handler));

        let res = TestClient::post("http://example.com/checkout")
            .json(&valid_body())
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }
}
