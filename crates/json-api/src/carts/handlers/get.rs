//! Get Cart Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::{
    carts::records::{CartItemRecord, CartRecord},
    checkout::pricing::{OrderTotals, PricedLine},
};

use crate::{
    carts::{errors::into_status_error, owner::cart_owner},
    extensions::*,
    state::State,
};

/// Cart Response
///
/// Prices are current catalog prices; checkout re-reads them.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartResponse {
    /// Absent until the first item is added
    pub uuid: Option<Uuid>,
    pub items: Vec<CartItemResponse>,
    pub subtotal: u64,

    /// Shipping that checkout would charge right now
    pub shipping: u64,
    pub total: u64,
}

/// Cart Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartItemResponse {
    pub product_uuid: Uuid,
    pub product_name: String,
    pub unit_price: u64,
    pub quantity: u64,
    pub line_total: u64,

    /// Current stock of the product
    pub available: u64,
}

impl CartResponse {
    pub(crate) fn from_record(cart: CartRecord) -> Result<Self, StatusError> {
        let lines: Vec<PricedLine> = cart
            .items
            .iter()
            .map(|item| PricedLine {
                unit_price: item.unit_price,
                quantity: item.quantity,
            })
            .collect();

        let totals = if lines.is_empty() {
            OrderTotals {
                subtotal: 0,
                shipping: 0,
                total: 0,
            }
        } else {
            OrderTotals::from_lines(&lines).or_500("cart total out of range")?
        };

        let items = cart
            .items
            .into_iter()
            .map(CartItemResponse::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            uuid: cart.uuid.map(Into::into),
            items,
            subtotal: totals.subtotal,
            shipping: totals.shipping,
            total: totals.total,
        })
    }
}

impl TryFrom<CartItemRecord> for CartItemResponse {
    type Error = StatusError;

    fn try_from(item: CartItemRecord) -> Result<Self, Self::Error> {
        let line_total = item
            .line_total()
            .ok_or("overflow")
            .or_500("cart line total out of range")?;

        Ok(Self {
            product_uuid: item.product_uuid.into(),
            product_name: item.product_name,
            unit_price: item.unit_price,
            quantity: item.quantity,
            line_total,
            available: item.available,
        })
    }
}

/// Get Cart Handler
#[endpoint(
    tags("cart"),
    summary = "Get Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Current cart"),
        (status_code = StatusCode::UNAUTHORIZED, description = "No user or cart session"),
    ),
)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let owner = cart_owner(req, depot)?;

    let cart = state
        .app
        .carts
        .get_cart(owner)
        .await
        .map_err(into_status_error)?;

    Ok(Json(CartResponse::from_record(cart)?))
}
