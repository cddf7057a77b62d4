//! Checkout Errors
//!
//! Validation and stock failures carry JSON bodies the storefront can show
//! next to the form; everything else is a plain status.

use salvo::{
    http::{StatusCode, StatusError},
    oapi::ToSchema,
    prelude::{Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

use storefront_app::domain::checkout::{CheckoutError, validation::FieldErrors};

use crate::observability::CheckoutOutcome;

/// One failing billing field.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct FieldErrorResponse {
    pub field: String,
    pub message: String,
}

/// 422 body for invalid billing details.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ValidationErrorResponse {
    pub message: String,
    pub errors: Vec<FieldErrorResponse>,
}

/// 409 body naming the product that ran out.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct StockErrorResponse {
    pub message: String,
    pub product_name: String,
    pub available: u64,
}

/// Why a checkout request was turned away.
#[derive(Debug)]
pub(crate) enum Rejection {
    EmptyCart,
    InvalidBilling(FieldErrors),
    InsufficientStock { product_name: String, available: u64 },
    Failed(StatusError),
}

impl From<CheckoutError> for Rejection {
    fn from(error: CheckoutError) -> Self {
        match error {
            CheckoutError::EmptyCart => Self::EmptyCart,
            CheckoutError::InvalidBillingInfo(errors) => Self::InvalidBilling(errors),
            CheckoutError::InsufficientStock {
                product_name,
                available,
            } => Self::InsufficientStock {
                product_name,
                available,
            },
            CheckoutError::InvalidAmount => {
                error!("checkout total out of range");

                Self::Failed(StatusError::internal_server_error())
            }
            CheckoutError::Storage(source) => {
                error!("checkout storage failure: {source}");

                Self::Failed(StatusError::internal_server_error())
            }
        }
    }
}

impl Rejection {
    pub(crate) fn outcome(&self) -> CheckoutOutcome {
        match self {
            Self::EmptyCart => CheckoutOutcome::EmptyCart,
            Self::InvalidBilling(_) => CheckoutOutcome::InvalidBilling,
            Self::InsufficientStock { .. } => CheckoutOutcome::InsufficientStock,
            Self::Failed(_) => CheckoutOutcome::Failed,
        }
    }

    pub(crate) fn render(self, res: &mut Response) {
        match self {
            Self::EmptyCart => {
                res.render(StatusError::bad_request().brief("Your cart is empty."));
            }
            Self::InvalidBilling(errors) => {
                res.status_code(StatusCode::UNPROCESSABLE_ENTITY);
                res.render(Json(ValidationErrorResponse {
                    message: "Please correct the highlighted fields.".to_string(),
                    errors: errors
                        .iter()
                        .map(|(field, message)| FieldErrorResponse {
                            field: field.to_string(),
                            message: message.to_string(),
                        })
                        .collect(),
                }));
            }
            Self::InsufficientStock {
                product_name,
                available,
            } => {
                res.status_code(StatusCode::CONFLICT);
                res.render(Json(StockErrorResponse {
                    message: format!(
                        "Not enough stock for {product_name}. Only {available} available."
                    ),
                    product_name,
                    available,
                }));
            }
            Self::Failed(status) => res.render(status),
        }
    }
}
