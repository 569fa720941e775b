use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal::Decimal;
use tokio::sync::mpsc;

use darna_api::events::EventSender;
use darna_api::models::cart::{CartLineItem, ProductId};
use darna_api::models::order::PaymentMethod;
use darna_api::services::{validate_checkout_form, CartService, CheckoutField, CheckoutForm};
use darna_api::storage::InMemorySessionStore;

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime")
        .block_on(future)
}

fn event_sender() -> Arc<EventSender> {
    let (tx, _rx) = mpsc::channel(256);
    Arc::new(EventSender::new(tx))
}

fn line_item(id: u32, price_cents: u32, quantity: i32) -> CartLineItem {
    CartLineItem {
        id: ProductId::new(id.to_string()),
        name: format!("Product {}", id),
        price: Decimal::new(i64::from(price_cents), 2),
        quantity,
        seller: "Seller".to_string(),
        category: "Home".to_string(),
        image: None,
    }
}

proptest! {
    /// However items arrive, each product id ends up on exactly one line and
    /// its quantity is the sum of everything added under that id.
    #[test]
    fn merge_keeps_one_line_per_product(
        adds in prop::collection::vec((0u32..5, 1u32..10_000, 1i32..20), 1..30)
    ) {
        let expected: std::collections::HashMap<u32, i64> =
            adds.iter().fold(Default::default(), |mut acc, (id, _, qty)| {
                *acc.entry(*id).or_insert(0) += i64::from(*qty);
                acc
            });

        let items = block_on(async {
            let cart = CartService::load(
                Arc::new(InMemorySessionStore::new()),
                event_sender(),
            )
            .await;
            for (id, price, qty) in &adds {
                // First price for an id wins; the merge only touches quantity.
                cart.add_item(line_item(*id, *price, *qty)).await.expect("add");
            }
            cart.items().await
        });

        let mut seen = std::collections::HashSet::new();
        for item in &items {
            prop_assert!(seen.insert(item.id.clone()), "duplicate line for {}", item.id);
            let id: u32 = item.id.as_str().parse().expect("numeric id");
            prop_assert_eq!(i64::from(item.quantity), expected[&id]);
        }
        prop_assert_eq!(items.len(), expected.len());
    }

    /// The cart total always equals the sum recomputed from the line items.
    #[test]
    fn total_price_matches_recomputation(
        adds in prop::collection::vec((0u32..8, 1u32..10_000, 1i32..20), 1..30)
    ) {
        let (total, items) = block_on(async {
            let cart = CartService::load(
                Arc::new(InMemorySessionStore::new()),
                event_sender(),
            )
            .await;
            for (id, price, qty) in &adds {
                cart.add_item(line_item(*id, *price, *qty)).await.expect("add");
            }
            (cart.total_price().await, cart.items().await)
        });

        let recomputed: Decimal = items
            .iter()
            .map(|item| item.price * Decimal::from(item.quantity))
            .sum();
        prop_assert_eq!(total, recomputed);
    }

    /// Updating to any nonpositive quantity removes the line item.
    #[test]
    fn nonpositive_update_removes_the_line(quantity in -100i32..=0) {
        let items = block_on(async {
            let cart = CartService::load(
                Arc::new(InMemorySessionStore::new()),
                event_sender(),
            )
            .await;
            cart.add_item(line_item(1, 999, 3)).await.expect("add");
            cart.update_quantity(&ProductId::new("1"), quantity)
                .await
                .expect("update")
        });
        prop_assert!(items.is_empty());
    }

    /// Phone numbers with fewer than nine digits never validate, regardless
    /// of the separators wrapped around them.
    #[test]
    fn short_phone_numbers_always_fail(
        digits in prop::collection::vec(0u8..10, 0..9),
        separator in "[ ()+-]{0,2}",
    ) {
        let phone: String = digits
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(&separator);

        let form = CheckoutForm {
            customer_name: "Amina K".to_string(),
            customer_email: "amina@example.com".to_string(),
            customer_phone: phone,
            address: "12 Rue Didouche".to_string(),
            city: "Algiers".to_string(),
            postal_code: "16000".to_string(),
            payment_method: PaymentMethod::CashOnDelivery,
            card_number: None,
            expiry_date: None,
            cvv: None,
        };

        prop_assert_eq!(
            validate_checkout_form(&form),
            Err(CheckoutField::CustomerPhone)
        );
    }
}
