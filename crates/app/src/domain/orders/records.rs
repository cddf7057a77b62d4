//! Order Records

use jiff::Timestamp;

use crate::{
    domain::{
        orders::data::{BillingDetails, OrderStatus},
        products::records::ProductUuid,
        users::records::UserUuid,
    },
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Order Record
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub uuid: OrderUuid,

    /// Human-readable number from the storage sequence, e.g. `ORD-000042`.
    pub order_number: String,
    pub user_uuid: UserUuid,
    pub billing: BillingDetails,
    pub subtotal: u64,
    pub shipping: u64,
    pub total_amount: u64,
    pub status: OrderStatus,
    pub items: Vec<OrderItemRecord>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl OrderRecord {
    /// Sum of `quantity * unit_price` over the items, `None` on overflow.
    #[must_use]
    pub fn items_total(&self) -> Option<u64> {
        self.items
            .iter()
            .try_fold(0_u64, |sum, item| sum.checked_add(item.line_total()?))
    }
}

/// Order Item UUID
pub type OrderItemUuid = TypedUuid<OrderItemRecord>;

/// Order Item Record
///
/// Name and price are snapshots taken at purchase time.
#[derive(Debug, Clone)]
pub struct OrderItemRecord {
    pub uuid: OrderItemUuid,
    pub order_uuid: OrderUuid,
    pub product_uuid: ProductUuid,
    pub product_name: String,
    pub quantity: u64,
    pub unit_price: u64,
    pub created_at: Timestamp,
}

impl OrderItemRecord {
    #[must_use]
    pub fn line_total(&self) -> Option<u64> {
        self.unit_price.checked_mul(self.quantity)
    }
}
