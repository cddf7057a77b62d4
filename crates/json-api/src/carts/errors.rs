//! Cart Errors

use salvo::http::StatusError;
use tracing::error;

use storefront_app::domain::carts::CartsServiceError;

pub(crate) fn into_status_error(error: CartsServiceError) -> StatusError {
    match error {
        CartsServiceError::NotFound | CartsServiceError::InvalidReference => {
            StatusError::not_found().brief("Product not found in catalog or cart")
        }
        CartsServiceError::InvalidQuantity => {
            StatusError::bad_request().brief("Quantity must be at least one")
        }
        CartsServiceError::InsufficientStock {
            product_name,
            available,
        } => StatusError::conflict().brief(format!(
            "Only {available} of \"{product_name}\" in stock"
        )),
        CartsServiceError::Sql(source) => {
            error!("cart storage failure: {source}");

            StatusError::internal_server_error()
        }
    }
}
