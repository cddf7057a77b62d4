//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use storefront_app::{
    auth::{AuthenticatedUser, MockAuthService},
    context::AppContext,
    domain::{
        carts::{
            MockCartsService,
            data::CartOwner,
            records::{CartItemRecord, CartItemUuid, CartRecord, CartUuid},
        },
        checkout::MockCheckoutService,
        orders::{
            MockOrdersService,
            data::{BillingDetails, OrderStatus, PaymentMethod},
            records::{OrderItemRecord, OrderItemUuid, OrderRecord, OrderUuid},
        },
        products::{
            MockProductsService,
            records::{ProductRecord, ProductUuid},
        },
        users::{MockUsersService, records::UserUuid},
    },
};

use crate::{extensions::*, state::State};

pub(crate) const TEST_CUSTOMER: AuthenticatedUser = AuthenticatedUser {
    uuid: UserUuid::from_uuid(Uuid::from_u128(1)),
    is_staff: false,
};

pub(crate) const TEST_STAFF: AuthenticatedUser = AuthenticatedUser {
    uuid: UserUuid::from_uuid(Uuid::from_u128(2)),
    is_staff: true,
};

/// One mock per service. Any call without a matching expectation fails the test.
#[derive(Default)]
pub(crate) struct Mocks {
    pub(crate) users: MockUsersService,
    pub(crate) products: MockProductsService,
    pub(crate) carts: MockCartsService,
    pub(crate) orders: MockOrdersService,
    pub(crate) checkout: MockCheckoutService,
    pub(crate) auth: MockAuthService,
}

impl Mocks {
    pub(crate) fn into_state(self) -> Arc<State> {
        State::from_app_context(AppContext {
            users: Arc::new(self.users),
            products: Arc::new(self.products),
            carts: Arc::new(self.carts),
            orders: Arc::new(self.orders),
            checkout: Arc::new(self.checkout),
            auth: Arc::new(self.auth),
        })
    }

    /// Serve `route` without an authenticated caller.
    pub(crate) fn anonymous(self, route: Router) -> Service {
        Service::new(Router::new().hoop(inject(self.into_state())).push(route))
    }

    /// Serve `route` as if the auth middleware had resolved `user`.
    pub(crate) fn signed_in(self, user: AuthenticatedUser, route: Router) -> Service {
        Service::new(
            Router::new()
                .hoop(inject(self.into_state()))
                .hoop(InjectUser(user))
                .push(route),
        )
    }
}

struct InjectUser(AuthenticatedUser);

#[salvo::handler]
impl InjectUser {
    async fn handle(
        &self,
        req: &mut Request,
        depot: &mut Depot,
        res: &mut Response,
        ctrl: &mut FlowCtrl,
    ) {
        depot.insert_user(self.0);
        ctrl.call_next(req, depot, res).await;
    }
}

pub(crate) fn make_product(uuid: ProductUuid, name: &str, price: u64, stock: u64) -> ProductRecord {
    ProductRecord {
        uuid,
        name: name.to_string(),
        price,
        stock,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
        deleted_at: None,
    }
}

pub(crate) fn make_billing() -> BillingDetails {
    BillingDetails {
        full_name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        phone: "555-0100".to_string(),
        address: "12 Analytical Row".to_string(),
        city: "London".to_string(),
        state: "LDN".to_string(),
        postal_code: "N1 9GU".to_string(),
        payment_method: PaymentMethod::CreditCard,
    }
}

/// A pending order for `customer` with a single line of two units at 1500.
pub(crate) fn make_order(uuid: OrderUuid, customer: UserUuid) -> OrderRecord {
    OrderRecord {
        uuid,
        order_number: "ORD-000001".to_string(),
        user_uuid: customer,
        billing: make_billing(),
        subtotal: 3000,
        shipping: 500,
        total_amount: 3500,
        status: OrderStatus::Pending,
        items: vec![OrderItemRecord {
            uuid: OrderItemUuid::new(),
            order_uuid: uuid,
            product_uuid: ProductUuid::new(),
            product_name: "Teapot".to_string(),
            quantity: 2,
            unit_price: 1500,
            created_at: Timestamp::UNIX_EPOCH,
        }],
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

/// A cart holding one line per `(unit_price, quantity)` pair.
pub(crate) fn make_cart(owner: CartOwner, lines: &[(u64, u64)]) -> CartRecord {
    CartRecord {
        uuid: Some(CartUuid::new()),
        owner,
        items: lines
            .iter()
            .map(|&(unit_price, quantity)| CartItemRecord {
                uuid: CartItemUuid::new(),
                product_uuid: ProductUuid::new(),
                product_name: "Teapot".to_string(),
                unit_price,
                available: 10,
                quantity,
                created_at: Timestamp::UNIX_EPOCH,
                updated_at: Timestamp::UNIX_EPOCH,
            })
            .collect(),
    }
}
