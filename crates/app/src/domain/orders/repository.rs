//! Orders Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, PgConnection, Postgres, Row, postgres::PgRow, query_as};
use uuid::Uuid;

use crate::{
    database::{to_i64, try_get_u64},
    domain::{
        orders::{
            data::{BillingDetails, NewOrder, NewOrderItem, OrderStatus, PaymentMethod},
            records::{OrderItemRecord, OrderItemUuid, OrderRecord, OrderUuid},
        },
        products::records::ProductUuid,
        users::records::UserUuid,
    },
};

const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const CREATE_ORDER_ITEM_SQL: &str = include_str!("sql/create_order_item.sql");
const GET_ORDER_SQL: &str = include_str!("sql/get_order.sql");
const GET_ORDER_FOR_UPDATE_SQL: &str = include_str!("sql/get_order_for_update.sql");
const LIST_USER_ORDERS_SQL: &str = include_str!("sql/list_user_orders.sql");
const LIST_ORDERS_SQL: &str = include_str!("sql/list_orders.sql");
const GET_ORDER_ITEMS_SQL: &str = include_str!("sql/get_order_items.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("sql/update_order_status.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert the order header. The order number is assigned by the database.
    pub(crate) async fn create_order(
        &self,
        conn: &mut PgConnection,
        order: NewOrder,
    ) -> Result<OrderRecord, sqlx::Error> {
        let billing = order.billing;

        query_as::<Postgres, OrderRecord>(CREATE_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(order.user_uuid.into_uuid())
            .bind(billing.full_name)
            .bind(billing.email)
            .bind(billing.phone)
            .bind(billing.address)
            .bind(billing.city)
            .bind(billing.state)
            .bind(billing.postal_code)
            .bind(billing.payment_method.as_str())
            .bind(to_i64(order.subtotal, "subtotal")?)
            .bind(to_i64(order.shipping, "shipping")?)
            .bind(to_i64(order.total_amount, "total_amount")?)
            .fetch_one(conn)
            .await
    }

    pub(crate) async fn create_order_item(
        &self,
        conn: &mut PgConnection,
        item: NewOrderItem,
    ) -> Result<OrderItemRecord, sqlx::Error> {
        query_as::<Postgres, OrderItemRecord>(CREATE_ORDER_ITEM_SQL)
            .bind(item.uuid.into_uuid())
            .bind(item.order_uuid.into_uuid())
            .bind(item.product_uuid.into_uuid())
            .bind(item.product_name)
            .bind(to_i64(item.quantity, "quantity")?)
            .bind(to_i64(item.unit_price, "unit_price")?)
            .fetch_one(conn)
            .await
    }

    pub(crate) async fn get_order(
        &self,
        conn: &mut PgConnection,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        let order = query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut *conn)
            .await?;

        self.attach_items(conn, vec![order])
            .await?
            .into_iter()
            .next()
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Read an order header under a row lock, without items.
    pub(crate) async fn lock_order(
        &self,
        conn: &mut PgConnection,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_FOR_UPDATE_SQL)
            .bind(order.into_uuid())
            .fetch_one(conn)
            .await
    }

    pub(crate) async fn list_user_orders(
        &self,
        conn: &mut PgConnection,
        user: UserUuid,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        let orders = query_as::<Postgres, OrderRecord>(LIST_USER_ORDERS_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut *conn)
            .await?;

        self.attach_items(conn, orders).await
    }

    pub(crate) async fn list_orders(
        &self,
        conn: &mut PgConnection,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        let orders = query_as::<Postgres, OrderRecord>(LIST_ORDERS_SQL)
            .bind(status.map(OrderStatus::as_str))
            .fetch_all(&mut *conn)
            .await?;

        self.attach_items(conn, orders).await
    }

    pub(crate) async fn update_status(
        &self,
        conn: &mut PgConnection,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, sqlx::Error> {
        let order = query_as::<Postgres, OrderRecord>(UPDATE_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .fetch_one(&mut *conn)
            .await?;

        self.attach_items(conn, vec![order])
            .await?
            .into_iter()
            .next()
            .ok_or(sqlx::Error::RowNotFound)
    }

    async fn attach_items(
        &self,
        conn: &mut PgConnection,
        mut orders: Vec<OrderRecord>,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        if orders.is_empty() {
            return Ok(orders);
        }

        let uuids: Vec<Uuid> = orders.iter().map(|order| order.uuid.into_uuid()).collect();

        let items = query_as::<Postgres, OrderItemRecord>(GET_ORDER_ITEMS_SQL)
            .bind(uuids)
            .fetch_all(conn)
            .await?;

        for item in items {
            if let Some(order) = orders.iter_mut().find(|order| order.uuid == item.order_uuid) {
                order.items.push(item);
            }
        }

        Ok(orders)
    }
}

fn decode_column<T>(col: &str, value: &str) -> Result<T, sqlx::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse::<T>().map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let payment_method: String = row.try_get("payment_method")?;
        let status: String = row.try_get("status")?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            order_number: row.try_get("order_number")?,
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            billing: BillingDetails {
                full_name: row.try_get("full_name")?,
                email: row.try_get("email")?,
                phone: row.try_get("phone")?,
                address: row.try_get("address")?,
                city: row.try_get("city")?,
                state: row.try_get("state")?,
                postal_code: row.try_get("postal_code")?,
                payment_method: decode_column::<PaymentMethod>("payment_method", &payment_method)?,
            },
            subtotal: try_get_u64(row, "subtotal")?,
            shipping: try_get_u64(row, "shipping")?,
            total_amount: try_get_u64(row, "total_amount")?,
            status: decode_column::<OrderStatus>("status", &status)?,
            items: Vec::new(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OrderItemUuid::from_uuid(row.try_get("uuid")?),
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            product_name: row.try_get("product_name")?,
            quantity: try_get_u64(row, "quantity")?,
            unit_price: try_get_u64(row, "unit_price")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
