//! Carts service.

use async_trait::async_trait;
use mockall::automock;
use sqlx::PgConnection;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        carts::{
            data::{CartOwner, NewCartItem, SessionToken},
            errors::CartsServiceError,
            records::{CartRecord, CartUuid},
            repositories::{PgCartItemsRepository, PgCartsRepository},
        },
        products::{records::ProductUuid, repository::PgProductsRepository},
        users::records::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    carts_repository: PgCartsRepository,
    items_repository: PgCartItemsRepository,
    products_repository: PgProductsRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            carts_repository: PgCartsRepository::new(),
            items_repository: PgCartItemsRepository::new(),
            products_repository: PgProductsRepository::new(),
        }
    }

    async fn load_cart(
        &self,
        conn: &mut PgConnection,
        owner: CartOwner,
    ) -> Result<CartRecord, CartsServiceError> {
        let Some(cart) = self.carts_repository.find_cart(&mut *conn, &owner).await? else {
            return Ok(CartRecord::empty(owner));
        };

        let items = self.items_repository.get_cart_items(conn, cart).await?;

        Ok(CartRecord {
            uuid: Some(cart),
            owner,
            items,
        })
    }

    /// Set a line's quantity after checking it against current stock.
    async fn store_quantity(
        &self,
        conn: &mut PgConnection,
        cart: CartUuid,
        product: ProductUuid,
        quantity: u64,
    ) -> Result<(), CartsServiceError> {
        let record = self
            .products_repository
            .get_product(&mut *conn, product)
            .await?;

        if quantity > record.stock {
            return Err(CartsServiceError::InsufficientStock {
                product_name: record.name,
                available: record.stock,
            });
        }

        self.items_repository
            .upsert_item(conn, cart, product, quantity)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn get_cart(&self, owner: CartOwner) -> Result<CartRecord, CartsServiceError> {
        let mut conn = self.db.acquire().await?;

        self.load_cart(&mut conn, owner).await
    }

    async fn add_item(
        &self,
        owner: CartOwner,
        item: NewCartItem,
    ) -> Result<CartRecord, CartsServiceError> {
        if item.quantity == 0 {
            return Err(CartsServiceError::InvalidQuantity);
        }

        let mut tx = self.db.begin_transaction().await?;

        let cart = self
            .carts_repository
            .find_or_create_cart(&mut tx, &owner)
            .await?;

        let existing = self
            .items_repository
            .get_item_quantity(&mut tx, cart, item.product_uuid)
            .await?
            .unwrap_or(0);

        let quantity = existing
            .checked_add(item.quantity)
            .ok_or(CartsServiceError::InvalidQuantity)?;

        self.store_quantity(&mut tx, cart, item.product_uuid, quantity)
            .await?;

        let updated = self.load_cart(&mut tx, owner).await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn update_item(
        &self,
        owner: CartOwner,
        product: ProductUuid,
        quantity: u64,
    ) -> Result<CartRecord, CartsServiceError> {
        if quantity == 0 {
            return self.remove_item(owner, product).await;
        }

        let mut tx = self.db.begin_transaction().await?;

        let cart = self
            .carts_repository
            .find_cart(&mut tx, &owner)
            .await?
            .ok_or(CartsServiceError::NotFound)?;

        if self
            .items_repository
            .get_item_quantity(&mut tx, cart, product)
            .await?
            .is_none()
        {
            return Err(CartsServiceError::NotFound);
        }

        self.store_quantity(&mut tx, cart, product, quantity).await?;

        let updated = self.load_cart(&mut tx, owner).await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn remove_item(
        &self,
        owner: CartOwner,
        product: ProductUuid,
    ) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let cart = self
            .carts_repository
            .find_cart(&mut tx, &owner)
            .await?
            .ok_or(CartsServiceError::NotFound)?;

        let rows_affected = self
            .items_repository
            .delete_item(&mut tx, cart, product)
            .await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        let updated = self.load_cart(&mut tx, owner).await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn clear_cart(&self, owner: CartOwner) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        if let Some(cart) = self.carts_repository.find_cart(&mut tx, &owner).await? {
            self.items_repository.delete_items(&mut tx, cart).await?;
        }

        tx.commit().await?;

        Ok(())
    }

    async fn merge_session_cart(
        &self,
        session: SessionToken,
        user: UserUuid,
    ) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let user_owner = CartOwner::User(user);

        let session_cart = self
            .load_cart(&mut tx, CartOwner::Session(session))
            .await?;

        let Some(session_cart_uuid) = session_cart.uuid else {
            let cart = self.load_cart(&mut tx, user_owner).await?;

            tx.commit().await?;

            return Ok(cart);
        };

        let user_cart = self
            .carts_repository
            .find_or_create_cart(&mut tx, &user_owner)
            .await?;

        for item in &session_cart.items {
            let existing = self
                .items_repository
                .get_item_quantity(&mut tx, user_cart, item.product_uuid)
                .await?
                .unwrap_or(0);

            let quantity = existing.saturating_add(item.quantity).min(item.available);

            if quantity > 0 {
                self.items_repository
                    .upsert_item(&mut tx, user_cart, item.product_uuid, quantity)
                    .await?;
            }
        }

        self.carts_repository
            .delete_cart(&mut tx, session_cart_uuid)
            .await?;

        let merged = self.load_cart(&mut tx, user_owner).await?;

        tx.commit().await?;

        info!(
            user_uuid = %user,
            merged_lines = session_cart.items.len(),
            "merged session cart into user cart"
        );

        Ok(merged)
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Retrieve the owner's cart. Owners without a cart get an empty one.
    async fn get_cart(&self, owner: CartOwner) -> Result<CartRecord, CartsServiceError>;

    /// Add a product to the cart, increasing the quantity when the product is
    /// already present.
    async fn add_item(
        &self,
        owner: CartOwner,
        item: NewCartItem,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Set the quantity of a line already in the cart. Zero removes it.
    async fn update_item(
        &self,
        owner: CartOwner,
        product: ProductUuid,
        quantity: u64,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Remove a product from the cart.
    async fn remove_item(
        &self,
        owner: CartOwner,
        product: ProductUuid,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Remove every line from the cart.
    async fn clear_cart(&self, owner: CartOwner) -> Result<(), CartsServiceError>;

    /// Move an anonymous session's cart into the user's cart.
    async fn merge_session_cart(
        &self,
        session: SessionToken,
        user: UserUuid,
    ) -> Result<CartRecord, CartsServiceError>;
}
