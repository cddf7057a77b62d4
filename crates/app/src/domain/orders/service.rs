//! Orders service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        orders::{
            data::OrderStatus,
            errors::OrdersServiceError,
            records::{OrderRecord, OrderUuid},
            repository::PgOrdersRepository,
        },
        users::records::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    repository: PgOrdersRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgOrdersRepository::new(),
        }
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    async fn list_orders(&self, customer: UserUuid) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let mut conn = self.db.acquire().await?;

        Ok(self.repository.list_user_orders(&mut conn, customer).await?)
    }

    async fn get_order(
        &self,
        customer: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut conn = self.db.acquire().await?;

        let record = self.repository.get_order(&mut conn, order).await?;

        // Another customer's order is indistinguishable from a missing one.
        if record.user_uuid != customer {
            return Err(OrdersServiceError::NotFound);
        }

        Ok(record)
    }

    async fn get_any_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError> {
        let mut conn = self.db.acquire().await?;

        Ok(self.repository.get_order(&mut conn, order).await?)
    }

    async fn list_all_orders(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let mut conn = self.db.acquire().await?;

        Ok(self.repository.list_orders(&mut conn, status).await?)
    }

    async fn update_status(
        &self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let current = self.repository.lock_order(&mut tx, order).await?;

        if !current.status.can_transition_to(status) {
            return Err(OrdersServiceError::InvalidTransition {
                from: current.status,
                to: status,
            });
        }

        let updated = self.repository.update_status(&mut tx, order, status).await?;

        tx.commit().await?;

        info!(
            order_number = %updated.order_number,
            from = %current.status,
            to = %status,
            "order status changed"
        );

        Ok(updated)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// List a customer's orders, newest first.
    async fn list_orders(&self, customer: UserUuid) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// Retrieve one of the customer's orders with its items.
    async fn get_order(
        &self,
        customer: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Retrieve any customer's order with its items. Staff only.
    async fn get_any_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError>;

    /// List every order, optionally narrowed to one status.
    async fn list_all_orders(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// Move an order to a new status.
    ///
    /// Delivered and cancelled orders are final.
    async fn update_status(
        &self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::{TestContext, helpers::place_order};

    use super::*;

    #[tokio::test]
    async fn list_orders_returns_only_customer_orders_newest_first() -> TestResult {
        let ctx = TestContext::new().await;
        let alice = ctx.create_user("alice@example.com").await;
        let bob = ctx.create_user("bob@example.com").await;

        let first = place_order(&ctx, alice, 1000, 1).await?;
        let second = place_order(&ctx, alice, 2000, 1).await?;
        place_order(&ctx, bob, 3000, 1).await?;

        let orders = ctx.orders.list_orders(alice).await?;

        let uuids: Vec<_> = orders.iter().map(|order| order.uuid).collect();

        assert_eq!(uuids, vec![second.uuid, first.uuid]);
        assert!(orders.iter().all(|order| order.items.len() == 1));

        Ok(())
    }

    #[tokio::test]
    async fn get_order_includes_item_snapshots() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("snap@example.com").await;

        let placed = place_order(&ctx, user, 1500, 2).await?;

        let order = ctx.orders.get_order(user, placed.uuid).await?;

        assert_eq!(order.order_number, placed.order_number);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.items[0].unit_price, 1500);
        assert_eq!(order.items_total(), Some(order.subtotal));

        Ok(())
    }

    #[tokio::test]
    async fn get_order_of_another_customer_is_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = ctx.create_user("owner@example.com").await;
        let other = ctx.create_user("other@example.com").await;

        let placed = place_order(&ctx, owner, 1000, 1).await?;

        let result = ctx.orders.get_order(other, placed.uuid).await;

        assert!(matches!(result, Err(OrdersServiceError::NotFound)));

        Ok(())
    }

    #[tokio::test]
    async fn get_unknown_order_is_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("missing@example.com").await;

        let result = ctx.orders.get_order(user, OrderUuid::new()).await;

        assert!(matches!(result, Err(OrdersServiceError::NotFound)));

        Ok(())
    }

    #[tokio::test]
    async fn get_any_order_ignores_ownership() -> TestResult {
        let ctx = TestContext::new().await;
        let customer = ctx.create_user("customer@example.com").await;

        let placed = place_order(&ctx, customer, 1200, 1).await?;

        let order = ctx.orders.get_any_order(placed.uuid).await?;

        assert_eq!(order.user_uuid, customer);
        assert_eq!(order.order_number, placed.order_number);
        assert_eq!(order.items.len(), 1);

        let missing = ctx.orders.get_any_order(OrderUuid::new()).await;

        assert!(matches!(missing, Err(OrdersServiceError::NotFound)));

        Ok(())
    }

    #[tokio::test]
    async fn list_all_orders_filters_by_status() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("filter@example.com").await;

        let pending = place_order(&ctx, user, 1000, 1).await?;
        let shipped = place_order(&ctx, user, 1000, 1).await?;

        ctx.orders
            .update_status(shipped.uuid, OrderStatus::Shipped)
            .await?;

        let all = ctx.orders.list_all_orders(None).await?;
        let only_pending = ctx
            .orders
            .list_all_orders(Some(OrderStatus::Pending))
            .await?;

        assert_eq!(all.len(), 2);
        assert_eq!(only_pending.len(), 1);
        assert_eq!(only_pending[0].uuid, pending.uuid);

        Ok(())
    }

    #[tokio::test]
    async fn update_status_moves_open_order() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("status@example.com").await;

        let placed = place_order(&ctx, user, 1000, 1).await?;
        assert_eq!(placed.status, OrderStatus::Pending);

        let updated = ctx
            .orders
            .update_status(placed.uuid, OrderStatus::Processing)
            .await?;

        assert_eq!(updated.status, OrderStatus::Processing);
        assert_eq!(updated.items.len(), 1);
        assert!(updated.updated_at >= placed.updated_at);

        Ok(())
    }

    #[tokio::test]
    async fn terminal_status_cannot_change() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("final@example.com").await;

        let placed = place_order(&ctx, user, 1000, 1).await?;

        ctx.orders
            .update_status(placed.uuid, OrderStatus::Cancelled)
            .await?;

        let result = ctx
            .orders
            .update_status(placed.uuid, OrderStatus::Processing)
            .await;

        assert!(matches!(
            result,
            Err(OrdersServiceError::InvalidTransition {
                from: OrderStatus::Cancelled,
                to: OrderStatus::Processing,
            })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn update_status_of_unknown_order_is_not_found() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx
            .orders
            .update_status(OrderUuid::new(), OrderStatus::Shipped)
            .await;

        assert!(matches!(result, Err(OrdersServiceError::NotFound)));

        Ok(())
    }
}
