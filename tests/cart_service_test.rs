use std::sync::Arc;

use rust_decimal_macros::dec;
use tokio::sync::mpsc;

use darna_api::events::EventSender;
use darna_api::models::cart::{CartLineItem, ProductId};
use darna_api::services::CartService;
use darna_api::storage::{InMemorySessionStore, SessionStore, CART_DOCUMENT};

fn event_sender() -> Arc<EventSender> {
    let (tx, _rx) = mpsc::channel(64);
    Arc::new(EventSender::new(tx))
}

fn sofa(quantity: i32) -> CartLineItem {
    CartLineItem {
        id: ProductId::new("1"),
        name: "Modern Sofa".to_string(),
        price: dec!(129.99),
        quantity,
        seller: "FurniturePro".to_string(),
        category: "Home".to_string(),
        image: None,
    }
}

fn table(quantity: i32) -> CartLineItem {
    CartLineItem {
        id: ProductId::new("2"),
        name: "Wooden Dining Table".to_string(),
        price: dec!(299.99),
        quantity,
        seller: "WoodWorks".to_string(),
        category: "Home".to_string(),
        image: None,
    }
}

#[tokio::test]
async fn distinct_products_get_distinct_line_items() {
    let cart = CartService::load(Arc::new(InMemorySessionStore::new()), event_sender()).await;

    cart.add_item(sofa(2)).await.expect("add");
    let items = cart.add_item(table(1)).await.expect("add");

    assert_eq!(items.len(), 2);
    assert_eq!(cart.total_price().await, dec!(559.97));
    assert_eq!(cart.total_items().await, 3);
}

#[tokio::test]
async fn re_adding_a_product_merges_into_one_line() {
    let cart = CartService::load(Arc::new(InMemorySessionStore::new()), event_sender()).await;

    cart.add_item(sofa(1)).await.expect("add");
    let items = cart.add_item(sofa(2)).await.expect("add");

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 3);
    assert_eq!(cart.total_price().await, dec!(389.97));
}

#[tokio::test]
async fn cart_state_survives_a_restart() {
    let kv = Arc::new(InMemorySessionStore::new());

    {
        let cart = CartService::load(kv.clone(), event_sender()).await;
        cart.add_item(sofa(2)).await.expect("add");
        cart.add_item(table(1)).await.expect("add");
    }

    let reloaded = CartService::load(kv, event_sender()).await;
    assert_eq!(reloaded.items().await.len(), 2);
    assert_eq!(reloaded.total_price().await, dec!(559.97));
}

#[tokio::test]
async fn corrupt_cart_document_resets_to_empty_and_is_discarded() {
    let kv = Arc::new(InMemorySessionStore::new());
    kv.put(CART_DOCUMENT, "{definitely not json".to_string())
        .await
        .expect("put");

    let cart = CartService::load(kv.clone(), event_sender()).await;
    assert!(cart.items().await.is_empty());

    // The bad record is gone, so the next load starts clean too.
    assert!(kv.get(CART_DOCUMENT).await.expect("get").is_none());
}

#[tokio::test]
async fn string_and_numeric_wire_ids_address_the_same_line() {
    let cart = CartService::load(Arc::new(InMemorySessionStore::new()), event_sender()).await;

    let from_string: CartLineItem = serde_json::from_value(serde_json::json!({
        "id": "7",
        "name": "Lamp",
        "price": "19.99",
        "quantity": 1,
        "seller": "LightCo",
        "category": "Home"
    }))
    .expect("deserialize");
    let from_number: CartLineItem = serde_json::from_value(serde_json::json!({
        "id": 7,
        "name": "Lamp",
        "price": "19.99",
        "quantity": 2,
        "seller": "LightCo",
        "category": "Home"
    }))
    .expect("deserialize");

    cart.add_item(from_string).await.expect("add");
    let items = cart.add_item(from_number).await.expect("add");

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 3);
}

#[tokio::test]
async fn update_and_remove_keep_other_lines_untouched() {
    let cart = CartService::load(Arc::new(InMemorySessionStore::new()), event_sender()).await;
    cart.add_item(sofa(2)).await.expect("add");
    cart.add_item(table(1)).await.expect("add");

    let items = cart
        .update_quantity(&ProductId::new("1"), 5)
        .await
        .expect("update");
    assert_eq!(items.iter().find(|i| i.id == ProductId::new("1")).unwrap().quantity, 5);
    assert_eq!(items.iter().find(|i| i.id == ProductId::new("2")).unwrap().quantity, 1);

    let items = cart.remove_item(&ProductId::new("1")).await.expect("remove");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, ProductId::new("2"));
}
