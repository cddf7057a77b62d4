//! Products Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, PgConnection, Postgres, Row, postgres::PgRow, query, query_as};

use crate::{
    database::{to_i64, try_get_u64},
    domain::products::{
        data::{NewProduct, ProductUpdate},
        records::{ProductRecord, ProductUuid},
    },
};

const LIST_PRODUCTS_SQL: &str = include_str!("sql/list_products.sql");
const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");
const LOCK_PRODUCT_SQL: &str = include_str!("sql/lock_product.sql");
const CREATE_PRODUCT_SQL: &str = include_str!("sql/create_product.sql");
const UPDATE_PRODUCT_SQL: &str = include_str!("sql/update_product.sql");
const DECREMENT_STOCK_SQL: &str = include_str!("sql/decrement_stock.sql");
const DELETE_PRODUCT_SQL: &str = include_str!("sql/delete_product.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgProductsRepository;

impl PgProductsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_products(
        &self,
        conn: &mut PgConnection,
    ) -> Result<Vec<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(LIST_PRODUCTS_SQL)
            .fetch_all(conn)
            .await
    }

    pub(crate) async fn get_product(
        &self,
        conn: &mut PgConnection,
        product: ProductUuid,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_one(conn)
            .await
    }

    /// Read a product under an exclusive row lock held until the enclosing
    /// transaction ends.
    pub(crate) async fn lock_product(
        &self,
        conn: &mut PgConnection,
        product: ProductUuid,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(LOCK_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_one(conn)
            .await
    }

    pub(crate) async fn create_product(
        &self,
        conn: &mut PgConnection,
        product: NewProduct,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(CREATE_PRODUCT_SQL)
            .bind(product.uuid.into_uuid())
            .bind(product.name.trim())
            .bind(to_i64(product.price, "price")?)
            .bind(to_i64(product.stock, "stock")?)
            .fetch_one(conn)
            .await
    }

    pub(crate) async fn update_product(
        &self,
        conn: &mut PgConnection,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(UPDATE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .bind(update.name.trim())
            .bind(to_i64(update.price, "price")?)
            .bind(to_i64(update.stock, "stock")?)
            .fetch_one(conn)
            .await
    }

    /// Subtract `quantity` from the product's stock.
    ///
    /// The `stock >= 0` check constraint rejects a decrement that would go
    /// negative, so callers must hold the row lock and validate first.
    pub(crate) async fn decrement_stock(
        &self,
        conn: &mut PgConnection,
        product: ProductUuid,
        quantity: u64,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(DECREMENT_STOCK_SQL)
            .bind(product.into_uuid())
            .bind(to_i64(quantity, "quantity")?)
            .fetch_one(conn)
            .await
    }

    pub(crate) async fn delete_product(
        &self,
        conn: &mut PgConnection,
        product: ProductUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .execute(conn)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for ProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            price: try_get_u64(row, "price")?,
            stock: try_get_u64(row, "stock")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
