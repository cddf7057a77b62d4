//! Checkout service.

use async_trait::async_trait;
use mockall::automock;
use tracing::{error, info, warn};

use crate::{
    database::Db,
    domain::{
        carts::{
            data::CartOwner,
            records::CartItemRecord,
            repositories::{PgCartItemsRepository, PgCartsRepository},
        },
        checkout::{
            errors::CheckoutError,
            pricing::{OrderTotals, PricedLine},
        },
        orders::{
            data::{BillingDetails, NewOrder, NewOrderItem},
            records::{OrderItemUuid, OrderRecord, OrderUuid},
            repository::PgOrdersRepository,
        },
        products::{records::ProductRecord, repository::PgProductsRepository},
        users::records::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgCheckoutService {
    db: Db,
    carts_repository: PgCartsRepository,
    items_repository: PgCartItemsRepository,
    products_repository: PgProductsRepository,
    orders_repository: PgOrdersRepository,
}

impl PgCheckoutService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            carts_repository: PgCartsRepository::new(),
            items_repository: PgCartItemsRepository::new(),
            products_repository: PgProductsRepository::new(),
            orders_repository: PgOrdersRepository::new(),
        }
    }
}

/// A cart line paired with the product row locked for it.
struct LockedLine {
    line: CartItemRecord,
    product: ProductRecord,
}

fn insufficient_stock(product_name: String, available: u64) -> CheckoutError {
    CheckoutError::InsufficientStock {
        product_name,
        available,
    }
}

#[async_trait]
impl CheckoutService for PgCheckoutService {
    #[tracing::instrument(
        name = "checkout.service.place_order",
        skip(self, cart, billing),
        fields(
            user_uuid = %customer,
            cart_owner = %cart,
            order_number = tracing::field::Empty,
            line_count = tracing::field::Empty
        ),
        err
    )]
    async fn place_order(
        &self,
        customer: UserUuid,
        cart: CartOwner,
        billing: BillingDetails,
    ) -> Result<OrderRecord, CheckoutError> {
        let span = tracing::Span::current();

        let mut conn = self.db.acquire().await?;

        let cart_uuid = self
            .carts_repository
            .find_cart(&mut conn, &cart)
            .await?
            .ok_or(CheckoutError::EmptyCart)?;

        let lines = self
            .items_repository
            .get_cart_items(&mut conn, cart_uuid)
            .await?;

        drop(conn);

        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        span.record("line_count", lines.len());

        billing.validate().map_err(CheckoutError::InvalidBillingInfo)?;

        let billing = billing.trimmed();

        if let Some(short) = lines.iter().find(|line| line.quantity > line.available) {
            warn!(
                product_uuid = %short.product_uuid,
                requested = short.quantity,
                available = short.available,
                "checkout rejected, insufficient stock"
            );

            return Err(insufficient_stock(
                short.product_name.clone(),
                short.available,
            ));
        }

        let quoted = OrderTotals::from_lines(
            &lines
                .iter()
                .map(|line| PricedLine {
                    unit_price: line.unit_price,
                    quantity: line.quantity,
                })
                .collect::<Vec<_>>(),
        )?;

        let mut tx = self.db.begin_transaction().await?;

        // A second checkout of the same cart queues here and then finds the
        // lines already consumed.
        if self
            .carts_repository
            .lock_cart(&mut tx, cart_uuid)
            .await?
            .is_none()
        {
            return Err(CheckoutError::EmptyCart);
        }

        let mut lines = self
            .items_repository
            .lock_cart_items(&mut tx, cart_uuid)
            .await?;

        if lines.is_empty() {
            warn!(cart_uuid = %cart_uuid, "checkout rejected, cart consumed concurrently");

            return Err(CheckoutError::EmptyCart);
        }

        // Lock in ascending product order so concurrent checkouts over the
        // same products queue instead of deadlocking.
        lines.sort_by_key(|line| line.product_uuid);

        let mut locked = Vec::with_capacity(lines.len());

        for line in lines {
            let product = match self
                .products_repository
                .lock_product(&mut tx, line.product_uuid)
                .await
            {
                Ok(product) => product,
                Err(sqlx::Error::RowNotFound) => {
                    warn!(
                        product_uuid = %line.product_uuid,
                        "checkout rejected, product no longer available"
                    );

                    return Err(insufficient_stock(line.product_name, 0));
                }
                Err(error) => return Err(error.into()),
            };

            if product.stock < line.quantity {
                warn!(
                    product_uuid = %product.uuid,
                    requested = line.quantity,
                    available = product.stock,
                    "checkout rejected, stock changed before lock"
                );

                return Err(insufficient_stock(product.name, product.stock));
            }

            locked.push(LockedLine { line, product });
        }

        let totals = OrderTotals::from_lines(
            &locked
                .iter()
                .map(|locked| PricedLine {
                    unit_price: locked.product.price,
                    quantity: locked.line.quantity,
                })
                .collect::<Vec<_>>(),
        )?;

        if totals != quoted {
            info!(
                quoted_total = quoted.total,
                total = totals.total,
                "prices changed during checkout, charging locked prices"
            );
        }

        let order_uuid = OrderUuid::new();

        let mut order = self
            .orders_repository
            .create_order(
                &mut tx,
                NewOrder {
                    uuid: order_uuid,
                    user_uuid: customer,
                    billing,
                    subtotal: totals.subtotal,
                    shipping: totals.shipping,
                    total_amount: totals.total,
                },
            )
            .await?;

        for LockedLine { line, product } in locked {
            let item = self
                .orders_repository
                .create_order_item(
                    &mut tx,
                    NewOrderItem {
                        uuid: OrderItemUuid::new(),
                        order_uuid,
                        product_uuid: product.uuid,
                        product_name: product.name,
                        quantity: line.quantity,
                        unit_price: product.price,
                    },
                )
                .await?;

            order.items.push(item);

            self.products_repository
                .decrement_stock(&mut tx, product.uuid, line.quantity)
                .await?;

            let deleted = self
                .items_repository
                .delete_item(&mut tx, cart_uuid, line.product_uuid)
                .await?;

            if deleted != 1 {
                error!(
                    cart_uuid = %cart_uuid,
                    product_uuid = %line.product_uuid,
                    deleted,
                    "checkout aborted, cart line vanished while locked"
                );

                return Err(sqlx::Error::RowNotFound.into());
            }
        }

        tx.commit().await?;

        span.record("order_number", order.order_number.as_str());

        info!(
            order_uuid = %order.uuid,
            order_number = %order.order_number,
            total_amount = order.total_amount,
            "order placed"
        );

        Ok(order)
    }
}

#[automock]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Turn the owner's cart into a pending order for `customer`.
    ///
    /// Runs as one transaction: the cart and products are locked and re-read, the order
    /// and its items are written, stock is decremented and the consumed cart
    /// lines are removed. Any failure leaves the database untouched.
    async fn place_order(
        &self,
        customer: UserUuid,
        cart: CartOwner,
        billing: BillingDetails,
    ) -> Result<OrderRecord, CheckoutError>;
}
