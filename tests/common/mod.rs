use std::sync::Arc;

use estoque_server::events::{process_events, EventSender};
use estoque_server::models::{CategoryPackaging, CategorySize, Product};
use estoque_server::services::AppServices;
use estoque_server::store::MemoryStore;
use rust_decimal_macros::dec;
use tokio::sync::mpsc;

/// Memory-backed service bundle with a live event consumer.
pub fn memory_services() -> AppServices {
    let (tx, rx) = mpsc::channel(256);
    tokio::spawn(process_events(rx));
    AppServices::new(Arc::new(MemoryStore::new()), EventSender::new(tx))
}

/// Seeds the Limpeza category and a Detergente product with 100 units in
/// stock, minimum 20 and capacity 200.
#[allow(dead_code)]
pub async fn seed_cleaning_stock(services: &AppServices) {
    services
        .categories
        .create("Limpeza", CategorySize::Large, CategoryPackaging::Plastic)
        .await
        .expect("seed category");
    services
        .products
        .create(Product {
            name: "Detergente".into(),
            unit_price: dec!(5.50),
            unit: "Liter".into(),
            current_stock: 100,
            min_stock: 20,
            max_stock: 200,
            category: "Limpeza".into(),
        })
        .await
        .expect("seed product");
}
