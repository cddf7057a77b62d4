//! Cart Records

use jiff::Timestamp;

use crate::{
    domain::{carts::data::CartOwner, products::records::ProductUuid},
    uuids::TypedUuid,
};

/// Cart UUID
pub type CartUuid = TypedUuid<CartRecord>;

/// Cart Record
#[derive(Debug, Clone)]
pub struct CartRecord {
    /// `None` until the owner first adds an item.
    pub uuid: Option<CartUuid>,
    pub owner: CartOwner,
    pub items: Vec<CartItemRecord>,
}

impl CartRecord {
    #[must_use]
    pub fn empty(owner: CartOwner) -> Self {
        Self {
            uuid: None,
            owner,
            items: Vec::new(),
        }
    }

    /// Sum of line totals at current prices, `None` on overflow.
    #[must_use]
    pub fn subtotal(&self) -> Option<u64> {
        self.items
            .iter()
            .try_fold(0_u64, |sum, item| sum.checked_add(item.line_total()?))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Cart Item UUID
pub type CartItemUuid = TypedUuid<CartItemRecord>;

/// One product + quantity pairing, joined with the product's current state.
#[derive(Debug, Clone)]
pub struct CartItemRecord {
    pub uuid: CartItemUuid,
    pub product_uuid: ProductUuid,
    pub product_name: String,

    /// Current product price in minor units.
    pub unit_price: u64,

    /// Current product stock.
    pub available: u64,
    pub quantity: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CartItemRecord {
    #[must_use]
    pub fn line_total(&self) -> Option<u64> {
        self.unit_price.checked_mul(self.quantity)
    }
}
