//! Carts Repository

use sqlx::{PgConnection, query, query_scalar};
use uuid::Uuid;

use crate::domain::carts::{data::CartOwner, records::CartUuid};

const FIND_CART_SQL: &str = include_str!("../sql/find_cart.sql");
const CREATE_CART_SQL: &str = include_str!("../sql/create_cart.sql");
const DELETE_CART_SQL: &str = include_str!("../sql/delete_cart.sql");
const LOCK_CART_SQL: &str = include_str!("../sql/lock_cart.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartsRepository;

impl PgCartsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_cart(
        &self,
        conn: &mut PgConnection,
        owner: &CartOwner,
    ) -> Result<Option<CartUuid>, sqlx::Error> {
        let uuid: Option<Uuid> = query_scalar(FIND_CART_SQL)
            .bind(owner.user_uuid())
            .bind(owner.session_token())
            .fetch_optional(conn)
            .await?;

        Ok(uuid.map(CartUuid::from_uuid))
    }

    /// Lock the cart row until the enclosing transaction ends.
    ///
    /// New lines reference the cart by foreign key, so inserts into a locked
    /// cart wait. Returns `None` when the cart has been deleted meanwhile.
    pub(crate) async fn lock_cart(
        &self,
        conn: &mut PgConnection,
        cart: CartUuid,
    ) -> Result<Option<CartUuid>, sqlx::Error> {
        let uuid: Option<Uuid> = query_scalar(LOCK_CART_SQL)
            .bind(cart.into_uuid())
            .fetch_optional(conn)
            .await?;

        Ok(uuid.map(CartUuid::from_uuid))
    }

    /// Return the owner's cart, creating it first when missing.
    ///
    /// Concurrent creators race on the per-owner unique index; the loser's
    /// insert is a no-op and both read back the same row.
    pub(crate) async fn find_or_create_cart(
        &self,
        conn: &mut PgConnection,
        owner: &CartOwner,
    ) -> Result<CartUuid, sqlx::Error> {
        if let Some(cart) = self.find_cart(&mut *conn, owner).await? {
            return Ok(cart);
        }

        query(CREATE_CART_SQL)
            .bind(CartUuid::new().into_uuid())
            .bind(owner.user_uuid())
            .bind(owner.session_token())
            .execute(&mut *conn)
            .await?;

        self.find_cart(conn, owner)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub(crate) async fn delete_cart(
        &self,
        conn: &mut PgConnection,
        cart: CartUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_SQL)
            .bind(cart.into_uuid())
            .execute(conn)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}
