//! Checkout errors.

use thiserror::Error;

use crate::domain::checkout::validation::FieldErrors;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("invalid billing information")]
    InvalidBillingInfo(FieldErrors),

    #[error("not enough stock for {product_name}, only {available} available")]
    InsufficientStock { product_name: String, available: u64 },

    #[error("order amount out of range")]
    InvalidAmount,

    #[error("storage error")]
    Storage(#[source] sqlx::Error),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(error: sqlx::Error) -> Self {
        Self::Storage(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_names_product_and_availability() {
        let error = CheckoutError::InsufficientStock {
            product_name: "Teapot".to_string(),
            available: 2,
        };

        assert_eq!(
            error.to_string(),
            "not enough stock for Teapot, only 2 available"
        );
    }

    #[test]
    fn sql_errors_are_storage_failures() {
        let error = CheckoutError::from(sqlx::Error::PoolTimedOut);

        assert!(matches!(error, CheckoutError::Storage(_)));
    }
}
