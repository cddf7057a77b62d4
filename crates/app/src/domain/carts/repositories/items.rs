//! Cart Items Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, PgConnection, Postgres, Row, postgres::PgRow, query, query_as, query_scalar};

use crate::{
    database::{to_i64, try_get_u64},
    domain::{
        carts::records::{CartItemRecord, CartItemUuid, CartUuid},
        products::records::ProductUuid,
    },
};

const GET_CART_ITEMS_SQL: &str = include_str!("../sql/get_cart_items.sql");
const LOCK_CART_ITEMS_SQL: &str = include_str!("../sql/lock_cart_items.sql");
const GET_ITEM_QUANTITY_SQL: &str = include_str!("../sql/get_item_quantity.sql");
const UPSERT_CART_ITEM_SQL: &str = include_str!("../sql/upsert_cart_item.sql");
const DELETE_CART_ITEM_SQL: &str = include_str!("../sql/delete_cart_item.sql");
const DELETE_CART_ITEMS_SQL: &str = include_str!("../sql/delete_cart_items.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartItemsRepository;

impl PgCartItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_cart_items(
        &self,
        conn: &mut PgConnection,
        cart: CartUuid,
    ) -> Result<Vec<CartItemRecord>, sqlx::Error> {
        query_as::<Postgres, CartItemRecord>(GET_CART_ITEMS_SQL)
            .bind(cart.into_uuid())
            .fetch_all(conn)
            .await
    }

    /// Read the cart's lines and lock them until the enclosing transaction
    /// ends, so their quantities cannot change underneath a checkout.
    pub(crate) async fn lock_cart_items(
        &self,
        conn: &mut PgConnection,
        cart: CartUuid,
    ) -> Result<Vec<CartItemRecord>, sqlx::Error> {
        query_as::<Postgres, CartItemRecord>(LOCK_CART_ITEMS_SQL)
            .bind(cart.into_uuid())
            .fetch_all(conn)
            .await
    }

    pub(crate) async fn get_item_quantity(
        &self,
        conn: &mut PgConnection,
        cart: CartUuid,
        product: ProductUuid,
    ) -> Result<Option<u64>, sqlx::Error> {
        let quantity: Option<i64> = query_scalar(GET_ITEM_QUANTITY_SQL)
            .bind(cart.into_uuid())
            .bind(product.into_uuid())
            .fetch_optional(conn)
            .await?;

        quantity
            .map(|quantity| {
                u64::try_from(quantity).map_err(|e| sqlx::Error::ColumnDecode {
                    index: "quantity".to_string(),
                    source: Box::new(e),
                })
            })
            .transpose()
    }

    /// Insert the line or overwrite its quantity when the product is already
    /// in the cart.
    pub(crate) async fn upsert_item(
        &self,
        conn: &mut PgConnection,
        cart: CartUuid,
        product: ProductUuid,
        quantity: u64,
    ) -> Result<(), sqlx::Error> {
        query(UPSERT_CART_ITEM_SQL)
            .bind(CartItemUuid::new().into_uuid())
            .bind(cart.into_uuid())
            .bind(product.into_uuid())
            .bind(to_i64(quantity, "quantity")?)
            .execute(conn)
            .await?;

        Ok(())
    }

    pub(crate) async fn delete_item(
        &self,
        conn: &mut PgConnection,
        cart: CartUuid,
        product: ProductUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_ITEM_SQL)
            .bind(cart.into_uuid())
            .bind(product.into_uuid())
            .execute(conn)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn delete_items(
        &self,
        conn: &mut PgConnection,
        cart: CartUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_ITEMS_SQL)
            .bind(cart.into_uuid())
            .execute(conn)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for CartItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CartItemUuid::from_uuid(row.try_get("uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            product_name: row.try_get("product_name")?,
            unit_price: try_get_u64(row, "unit_price")?,
            available: try_get_u64(row, "available")?,
            quantity: try_get_u64(row, "quantity")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
