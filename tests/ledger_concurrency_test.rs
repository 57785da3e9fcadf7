mod common;

use common::{memory_services, seed_cleaning_stock};
use estoque_server::models::MovementKind;

// Two withdrawals that individually fit but jointly overdraw: the
// per-product critical section must let exactly one through.
#[tokio::test]
async fn concurrent_overdraw_admits_exactly_one() {
    let services = memory_services();
    seed_cleaning_stock(&services).await;

    let mut tasks = Vec::new();
    for _ in 0..2 {
        let ledger = services.ledger.clone();
        tasks.push(tokio::spawn(async move {
            ledger
                .apply("Detergente", MovementKind::Outbound, 60)
                .await
                .is_ok()
        }));
    }

    let mut successes = 0;
    for task in tasks {
        if task.await.unwrap() {
            successes += 1;
        }
    }
    assert_eq!(successes, 1, "exactly one withdrawal of 60 fits in 100");
    assert_eq!(
        services.products.get("Detergente").await.unwrap().current_stock,
        40
    );
}

#[tokio::test]
async fn concurrent_drain_stops_at_zero() {
    let services = memory_services();
    seed_cleaning_stock(&services).await;

    // 25 attempts of 5 units against 100 in stock: exactly 20 can land.
    let mut tasks = Vec::new();
    for _ in 0..25 {
        let ledger = services.ledger.clone();
        tasks.push(tokio::spawn(async move {
            ledger
                .apply("Detergente", MovementKind::Outbound, 5)
                .await
                .is_ok()
        }));
    }

    let mut successes = 0;
    for task in tasks {
        if task.await.unwrap() {
            successes += 1;
        }
    }
    assert_eq!(successes, 20);

    let product = services.products.get("Detergente").await.unwrap();
    assert_eq!(product.current_stock, 0);
    assert_eq!(services.ledger.history(None).await.unwrap().len(), 20);
}

#[tokio::test]
async fn concurrent_inbound_respects_the_ceiling() {
    let services = memory_services();
    seed_cleaning_stock(&services).await;

    // 100 in stock, capacity 200: at most 4 of these 10 deliveries fit.
    let mut tasks = Vec::new();
    for _ in 0..10 {
        let ledger = services.ledger.clone();
        tasks.push(tokio::spawn(async move {
            ledger
                .apply("Detergente", MovementKind::Inbound, 25)
                .await
                .is_ok()
        }));
    }

    let mut successes = 0;
    for task in tasks {
        if task.await.unwrap() {
            successes += 1;
        }
    }
    assert_eq!(successes, 4);
    assert_eq!(
        services.products.get("Detergente").await.unwrap().current_stock,
        200
    );
}
