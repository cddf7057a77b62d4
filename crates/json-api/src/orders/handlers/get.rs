//! Get Order Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::orders::records::{OrderItemRecord, OrderRecord};

use crate::{extensions::*, orders::errors::into_status_error, state::State};

/// Order Response
///
/// Amounts are minor currency units.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderResponse {
    pub uuid: Uuid,

    /// Human-readable order number, e.g. `ORD-000042`
    pub order_number: String,
    pub user_uuid: Uuid,
    pub status: String,
    pub billing: BillingResponse,
    pub items: Vec<OrderItemResponse>,
    pub subtotal: u64,
    pub shipping: u64,
    pub total_amount: u64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct BillingResponse {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub payment_method: String,
}

/// Order line with the name and price captured at purchase time.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderItemResponse {
    pub product_uuid: Uuid,
    pub product_name: String,
    pub quantity: u64,
    pub unit_price: u64,
}

impl From<OrderItemRecord> for OrderItemResponse {
    fn from(item: OrderItemRecord) -> Self {
        Self {
            product_uuid: item.product_uuid.into(),
            product_name: item.product_name,
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

impl From<OrderRecord> for OrderResponse {
    fn from(order: OrderRecord) -> Self {
        let billing = order.billing;

        Self {
            uuid: order.uuid.into(),
            order_number: order.order_number,
            user_uuid: order.user_uuid.into(),
            status: order.status.to_string(),
            billing: BillingResponse {
                full_name: billing.full_name,
                email: billing.email,
                phone: billing.phone,
                address: billing.address,
                city: billing.city,
                state: billing.state,
                postal_code: billing.postal_code,
                payment_method: billing.payment_method.to_string(),
            },
            items: order.items.into_iter().map(Into::into).collect(),
            subtotal: order.subtotal,
            shipping: order.shipping,
            total_amount: order.total_amount,
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
        }
    }
}

/// Get Order Handler
///
/// Returns one of the caller's orders. Other customers' orders are reported
/// as missing.
#[endpoint(
    tags("orders"),
    summary = "Get Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order found"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let order = state
        .app
        .orders
        .get_order(user.uuid, order.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}
