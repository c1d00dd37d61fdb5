//! End-to-end cart-to-order flows over the in-memory store.

use paperbark_core::{OrderStatus, UserId};
use paperbark_integration_tests::{TestStorefront, price, shipping};
use paperbark_storefront::services::{CartError, CheckoutError};

#[tokio::test]
async fn browse_add_checkout_cancel() {
    let shop = TestStorefront::new();
    let user = UserId::new(1);

    let guide = shop.product("Field Guide", 2499);
    let notebook = shop.product("Notebook", 1250);

    // Build up a cart: 2x guide, 1x notebook
    shop.cart.add(user, guide.id).await.expect("add guide");
    shop.cart.add(user, guide.id).await.expect("add guide again");
    shop.cart.add(user, notebook.id).await.expect("add notebook");

    let cart = shop.cart.view(user).await.expect("view cart");
    assert_eq!(cart.lines.len(), 2);
    assert_eq!(cart.total_quantity(), 3);
    assert_eq!(cart.total_price(), price(2 * 2499 + 1250));

    // Checkout freezes the totals and empties the cart
    let order = shop
        .checkout
        .checkout(user, shipping())
        .await
        .expect("checkout");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_price, price(2 * 2499 + 1250));
    assert_eq!(order.lines.len(), 2);
    assert_eq!(order.computed_total(), order.total_price);
    assert!(shop.cart.view(user).await.expect("view").is_empty());

    // The order shows up in history and can still be cancelled
    let history = shop.checkout.orders(user).await.expect("orders");
    assert_eq!(history.len(), 1);
    let cancelled = shop.checkout.cancel(user, order.id).await.expect("cancel");
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn checkout_uses_prices_current_at_that_moment() {
    let shop = TestStorefront::new();
    let user = UserId::new(1);
    let guide = shop.product("Field Guide", 1000);

    shop.cart.add(user, guide.id).await.expect("add");

    // The catalog changes the price while the product sits in the cart;
    // the cart reflects it, because nothing is frozen yet.
    shop.store.set_product_price(guide.id, price(1500));
    let cart = shop.cart.view(user).await.expect("view");
    assert_eq!(cart.total_price(), price(1500));

    // Checkout freezes the price in effect right now...
    let order = shop
        .checkout
        .checkout(user, shipping())
        .await
        .expect("checkout");
    assert_eq!(order.total_price, price(1500));

    // ...and later changes no longer matter.
    shop.store.set_product_price(guide.id, price(9900));
    let reread = shop.checkout.order(user, order.id).await.expect("order");
    assert_eq!(reread.total_price, price(1500));
    assert_eq!(reread.lines[0].unit_price, price(1500));
}

#[tokio::test]
async fn empty_cart_cannot_be_checked_out() {
    let shop = TestStorefront::new();
    let user = UserId::new(1);

    let err = shop.checkout.checkout(user, shipping()).await.unwrap_err();
    assert!(matches!(err, CheckoutError::EmptyCart));
    assert_eq!(shop.checkout.order_count(user).await.expect("count"), 0);

    // Same after a cart existed and was emptied again
    let guide = shop.product("Field Guide", 1000);
    let line = shop.cart.add(user, guide.id).await.expect("add");
    shop.cart.remove(user, line.id).await.expect("remove");

    let err = shop.checkout.checkout(user, shipping()).await.unwrap_err();
    assert!(matches!(err, CheckoutError::EmptyCart));
    assert_eq!(shop.checkout.order_count(user).await.expect("count"), 0);
}

#[tokio::test]
async fn carts_and_orders_are_per_user() {
    let shop = TestStorefront::new();
    let alice = UserId::new(1);
    let bob = UserId::new(2);
    let guide = shop.product("Field Guide", 1000);

    shop.cart.add(alice, guide.id).await.expect("add");
    shop.cart.add(bob, guide.id).await.expect("add");
    shop.cart.add(bob, guide.id).await.expect("add");

    // Alice checking out does not disturb Bob's cart
    let order = shop
        .checkout
        .checkout(alice, shipping())
        .await
        .expect("checkout");
    assert!(shop.cart.view(alice).await.expect("view").is_empty());
    assert_eq!(shop.cart.view(bob).await.expect("view").total_quantity(), 2);

    // Bob cannot see, cancel, or list Alice's order
    assert!(matches!(
        shop.checkout.order(bob, order.id).await.unwrap_err(),
        CheckoutError::OrderNotFound
    ));
    assert!(matches!(
        shop.checkout.cancel(bob, order.id).await.unwrap_err(),
        CheckoutError::OrderNotFound
    ));
    assert!(shop.checkout.orders(bob).await.expect("orders").is_empty());

    // And Bob cannot touch lines in Alice's (new) cart
    let line = shop.cart.add(alice, guide.id).await.expect("add");
    assert!(matches!(
        shop.cart.remove(bob, line.id).await.unwrap_err(),
        CartError::LineNotFound
    ));
}

#[tokio::test]
async fn order_lifecycle_after_fulfillment_starts() {
    let shop = TestStorefront::new();
    let user = UserId::new(1);
    let guide = shop.product("Field Guide", 1000);

    shop.cart.add(user, guide.id).await.expect("add");
    let order = shop
        .checkout
        .checkout(user, shipping())
        .await
        .expect("checkout");

    // Fulfillment picks the order up
    shop.store
        .force_order_status(order.id, OrderStatus::Processing);

    // Too late to cancel, and the status stays put
    let err = shop.checkout.cancel(user, order.id).await.unwrap_err();
    assert!(matches!(
        err,
        CheckoutError::InvalidTransition {
            from: OrderStatus::Processing
        }
    ));
    let order = shop.checkout.order(user, order.id).await.expect("order");
    assert_eq!(order.status, OrderStatus::Processing);

    // Status filters see the updated state
    let processing = shop
        .checkout
        .orders_with_status(user, OrderStatus::Processing)
        .await
        .expect("filtered orders");
    assert_eq!(processing.len(), 1);
    let pending = shop
        .checkout
        .orders_with_status(user, OrderStatus::Pending)
        .await
        .expect("filtered orders");
    assert!(pending.is_empty());
}
