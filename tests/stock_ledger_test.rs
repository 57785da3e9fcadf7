mod common;

use common::{memory_services, seed_cleaning_stock};
use estoque_server::errors::ServiceError;
use estoque_server::models::MovementKind;

#[tokio::test]
async fn ledger_walks_the_full_scenario() {
    let services = memory_services();
    seed_cleaning_stock(&services).await;

    // 100 + 50 fits under the 200 ceiling.
    let applied = services
        .ledger
        .apply("Detergente", MovementKind::Inbound, 50)
        .await
        .unwrap();
    assert_eq!(applied.new_stock, 150);

    // 150 + 60 would exceed capacity; the balance must not move.
    let err = services
        .ledger
        .apply("Detergente", MovementKind::Inbound, 60)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::CapacityExceeded(_)));
    assert_eq!(
        services.products.get("Detergente").await.unwrap().current_stock,
        150
    );

    // 150 - 200 would go negative; rejected as well.
    let err = services
        .ledger
        .apply("Detergente", MovementKind::Outbound, 200)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InsufficientStock(_)));
    assert_eq!(
        services.products.get("Detergente").await.unwrap().current_stock,
        150
    );

    // Draining to exactly zero is allowed.
    let applied = services
        .ledger
        .apply("Detergente", MovementKind::Outbound, 150)
        .await
        .unwrap();
    assert_eq!(applied.new_stock, 0);

    // Only the two accepted movements made it into the log.
    let history = services.ledger.history(None).await.unwrap();
    assert_eq!(history.len(), 2);

    // Zero is below the minimum of 20, so the product shows up in the
    // below-minimum report.
    let report = services.reports.below_minimum().await.unwrap();
    assert!(report.contains("Detergente"));
}

#[tokio::test]
async fn rejected_movements_leave_no_trace_in_history() {
    let services = memory_services();
    seed_cleaning_stock(&services).await;

    let _ = services
        .ledger
        .apply("Detergente", MovementKind::Outbound, 500)
        .await
        .unwrap_err();
    let _ = services
        .ledger
        .apply("Detergente", MovementKind::Inbound, 500)
        .await
        .unwrap_err();

    assert!(services.ledger.history(None).await.unwrap().is_empty());
    assert!(services
        .ledger
        .history(Some("Detergente"))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn history_can_be_scoped_to_one_product() {
    let services = memory_services();
    seed_cleaning_stock(&services).await;
    services
        .products
        .create(estoque_server::models::Product {
            name: "Sabao".into(),
            unit_price: rust_decimal_macros::dec!(2.00),
            unit: "Bar".into(),
            current_stock: 50,
            min_stock: 5,
            max_stock: 100,
            category: "Limpeza".into(),
        })
        .await
        .unwrap();

    services
        .ledger
        .apply("Detergente", MovementKind::Outbound, 10)
        .await
        .unwrap();
    services
        .ledger
        .apply("Sabao", MovementKind::Inbound, 10)
        .await
        .unwrap();

    assert_eq!(services.ledger.history(None).await.unwrap().len(), 2);
    let scoped = services.ledger.history(Some("sabao")).await.unwrap();
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].product_name, "Sabao");
}

#[tokio::test]
async fn product_with_history_cannot_be_deleted() {
    let services = memory_services();
    seed_cleaning_stock(&services).await;
    services
        .ledger
        .apply("Detergente", MovementKind::Outbound, 10)
        .await
        .unwrap();

    let err = services.products.delete("Detergente").await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}
