//! Test Helpers

use testresult::TestResult;

use crate::{
    domain::{
        carts::{
            CartsService, CartsServiceError,
            data::{CartOwner, NewCartItem, SessionToken},
            records::CartRecord,
        },
        checkout::CheckoutService,
        orders::{
            data::{BillingDetails, PaymentMethod},
            records::OrderRecord,
        },
        products::{
            ProductsService, ProductsServiceError,
            data::NewProduct,
            records::{ProductRecord, ProductUuid},
        },
        users::records::UserUuid,
    },
    test::TestContext,
};

pub(crate) fn new_product(uuid: ProductUuid, price: u64, stock: u64) -> NewProduct {
    NewProduct {
        uuid,
        name: format!("Product {uuid}"),
        price,
        stock,
    }
}

pub(crate) async fn create_product(
    ctx: &TestContext,
    name: &str,
    price: u64,
    stock: u64,
) -> Result<ProductRecord, ProductsServiceError> {
    ctx.products
        .create_product(NewProduct {
            name: name.to_string(),
            ..new_product(ProductUuid::new(), price, stock)
        })
        .await
}

pub(crate) fn session(token: &str) -> CartOwner {
    CartOwner::Session(SessionToken::parse(token).expect("test session token should be valid"))
}

pub(crate) fn billing() -> BillingDetails {
    BillingDetails {
        full_name: "Grace Hopper".to_string(),
        email: "grace@example.com".to_string(),
        phone: "555-0199".to_string(),
        address: "1 Compiler Court".to_string(),
        city: "Arlington".to_string(),
        state: "VA".to_string(),
        postal_code: "22201".to_string(),
        payment_method: PaymentMethod::CashOnDelivery,
    }
}

pub(crate) async fn fill_cart(
    ctx: &TestContext,
    owner: &CartOwner,
    lines: &[(ProductUuid, u64)],
) -> Result<CartRecord, CartsServiceError> {
    let mut cart = ctx.carts.get_cart(owner.clone()).await?;

    for &(product_uuid, quantity) in lines {
        cart = ctx
            .carts
            .add_item(
                owner.clone(),
                NewCartItem {
                    product_uuid,
                    quantity,
                },
            )
            .await?;
    }

    Ok(cart)
}

/// Place a single-line order for `user` through the checkout service.
pub(crate) async fn place_order(
    ctx: &TestContext,
    user: UserUuid,
    price: u64,
    quantity: u64,
) -> TestResult<OrderRecord> {
    let owner = CartOwner::User(user);
    let product = create_product(ctx, "Widget", price, quantity).await?;

    fill_cart(ctx, &owner, &[(product.uuid, quantity)]).await?;

    Ok(ctx.checkout.place_order(user, owner, billing()).await?)
}
