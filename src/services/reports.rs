//! Read-only report rendering. Reports are plain text bodies sent as-is
//! on the wire; layouts are fixed-width columns with `|` separators.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::errors::ServiceError;
use crate::models::MovementKind;
use crate::store::InventoryStore;

#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn InventoryStore>,
}

impl ReportService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Every product with price, unit and category.
    pub async fn price_list(&self) -> Result<String, ServiceError> {
        let products = self.store.list_products().await?;
        let mut out = String::new();
        out.push_str("=== PRICE LIST ===\n");
        let _ = writeln!(
            out,
            "{:<25} | {:<10} | {:<10} | {:<15}",
            "PRODUCT", "PRICE", "UNIT", "CATEGORY"
        );
        out.push_str(&"-".repeat(66));
        out.push('\n');
        for p in &products {
            let _ = writeln!(
                out,
                "{:<25} | R$ {:>7.2} | {:<10} | {:<15}",
                p.name, p.unit_price, p.unit, p.category
            );
        }
        Ok(out)
    }

    /// Physical quantity and financial value of the whole stock.
    pub async fn physical_financial_balance(&self) -> Result<String, ServiceError> {
        let products = self.store.list_products().await?;
        let mut out = String::new();
        out.push_str("=== PHYSICAL AND FINANCIAL BALANCE ===\n");
        let _ = writeln!(
            out,
            "{:<25} | {:<10} | {:<15} | {:<15}",
            "PRODUCT", "QTY", "UNIT VALUE", "TOTAL VALUE"
        );
        out.push_str(&"-".repeat(80));
        out.push('\n');

        let mut grand_total = Decimal::ZERO;
        for p in &products {
            let total = p.unit_price * Decimal::from(p.current_stock);
            grand_total += total;
            let _ = writeln!(
                out,
                "{:<25} | {:>8} | R$ {:>11.2} | R$ {:>11.2}",
                p.name, p.current_stock, p.unit_price, total
            );
        }
        out.push_str(&"-".repeat(80));
        out.push('\n');
        let _ = writeln!(
            out,
            "{:<25} | {:>8} | {:>15} | R$ {:>11.2}",
            "GRAND TOTAL", "", "", grand_total
        );
        Ok(out)
    }

    /// Products whose balance has fallen below their minimum threshold.
    pub async fn below_minimum(&self) -> Result<String, ServiceError> {
        let products = self.store.list_products().await?;
        let mut out = String::new();
        out.push_str("=== PRODUCTS BELOW MINIMUM ===\n");
        let _ = writeln!(out, "{:<25} | {:<12} | {:<12}", "PRODUCT", "STOCK", "MINIMUM");
        out.push_str(&"-".repeat(60));
        out.push('\n');

        let mut any = false;
        for p in products.iter().filter(|p| p.is_below_minimum()) {
            let _ = writeln!(
                out,
                "{:<25} | {:>10} | {:>10}",
                p.name, p.current_stock, p.min_stock
            );
            any = true;
        }
        if !any {
            out.push_str("No products below minimum stock\n");
        }
        Ok(out)
    }

    /// Product count and total units held, per category.
    pub async fn quantity_per_category(&self) -> Result<String, ServiceError> {
        let categories = self.store.list_categories().await?;
        let mut out = String::new();
        out.push_str("=== QUANTITY PER CATEGORY ===\n");
        let _ = writeln!(
            out,
            "{:<25} | {:<15} | {:<15}",
            "CATEGORY", "PRODUCTS", "TOTAL UNITS"
        );
        out.push_str(&"-".repeat(70));
        out.push('\n');

        for category in &categories {
            let products = self.store.products_in_category(&category.name).await?;
            let units: i64 = products.iter().map(|p| i64::from(p.current_stock)).sum();
            let _ = writeln!(
                out,
                "{:<25} | {:>12} | {:>15}",
                category.name,
                products.len(),
                units
            );
        }
        Ok(out)
    }

    /// The products with the largest inbound and outbound totals.
    pub async fn most_movements(&self) -> Result<String, ServiceError> {
        let products = self.store.list_products().await?;
        let mut out = String::new();
        out.push_str("=== PRODUCT WITH MOST MOVEMENTS ===\n");

        if products.is_empty() {
            out.push_str("No products registered.\n");
            return Ok(out);
        }

        let mut inbound_totals: HashMap<String, i64> = HashMap::new();
        for m in self.store.movements_by_kind(MovementKind::Inbound).await? {
            *inbound_totals.entry(m.product_name.to_lowercase()).or_default() +=
                i64::from(m.quantity);
        }
        let mut outbound_totals: HashMap<String, i64> = HashMap::new();
        for m in self.store.movements_by_kind(MovementKind::Outbound).await? {
            *outbound_totals.entry(m.product_name.to_lowercase()).or_default() +=
                i64::from(m.quantity);
        }

        let mut top_inbound: Option<(String, i64)> = None;
        let mut top_outbound: Option<(String, i64)> = None;
        // First product in name order wins ties.
        for p in &products {
            let key = p.name.to_lowercase();
            let inbound = inbound_totals.get(&key).copied().unwrap_or(0);
            let outbound = outbound_totals.get(&key).copied().unwrap_or(0);
            if top_inbound.as_ref().map_or(true, |(_, best)| inbound > *best) {
                top_inbound = Some((p.name.clone(), inbound));
            }
            if top_outbound.as_ref().map_or(true, |(_, best)| outbound > *best) {
                top_outbound = Some((p.name.clone(), outbound));
            }
        }

        let _ = writeln!(out, "{:<25} | {:<15}", "TYPE", "PRODUCT");
        out.push_str(&"-".repeat(50));
        out.push('\n');
        let (inbound_name, inbound_total) = top_inbound.unwrap_or(("N/A".into(), 0));
        let (outbound_name, outbound_total) = top_outbound.unwrap_or(("N/A".into(), 0));
        let _ = writeln!(out, "{:<25} | {:<15}", "Most Inbound", inbound_name);
        let _ = writeln!(out, "{:<25} | {:<15}", "Most Outbound", outbound_name);
        let _ = writeln!(out, "\nTotal Inbound ({}): {}", inbound_name, inbound_total);
        let _ = writeln!(out, "Total Outbound ({}): {}", outbound_name, outbound_total);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, CategoryPackaging, CategorySize, Movement, Product};
    use crate::store::MemoryStore;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    async fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_category(Category {
                name: "Limpeza".into(),
                size: CategorySize::Large,
                packaging: CategoryPackaging::Plastic,
            })
            .await
            .unwrap();
        store
            .insert_product(Product {
                name: "Detergente".into(),
                unit_price: dec!(5.50),
                unit: "Liter".into(),
                current_stock: 10,
                min_stock: 20,
                max_stock: 200,
                category: "Limpeza".into(),
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn price_list_contains_header_and_product() {
        let reports = ReportService::new(seeded_store().await);
        let body = reports.price_list().await.unwrap();
        assert!(body.starts_with("=== PRICE LIST ==="));
        assert!(body.contains("Detergente"));
        assert!(body.contains("5.50"));
    }

    #[tokio::test]
    async fn balance_totals_price_times_quantity() {
        let reports = ReportService::new(seeded_store().await);
        let body = reports.physical_financial_balance().await.unwrap();
        // 10 units at 5.50
        assert!(body.contains("55.00"));
        assert!(body.contains("GRAND TOTAL"));
    }

    #[tokio::test]
    async fn below_minimum_lists_the_short_product() {
        let reports = ReportService::new(seeded_store().await);
        let body = reports.below_minimum().await.unwrap();
        assert!(body.contains("Detergente"));
        assert!(!body.contains("No products below minimum stock"));
    }

    #[tokio::test]
    async fn below_minimum_reports_nothing_when_stocked() {
        let store = seeded_store().await;
        let mut product = store.find_product("Detergente").await.unwrap().unwrap();
        product.current_stock = 50;
        store.update_product(product).await.unwrap();

        let reports = ReportService::new(store);
        let body = reports.below_minimum().await.unwrap();
        assert!(body.contains("No products below minimum stock"));
    }

    #[tokio::test]
    async fn quantity_per_category_sums_units() {
        let reports = ReportService::new(seeded_store().await);
        let body = reports.quantity_per_category().await.unwrap();
        assert!(body.contains("Limpeza"));
        assert!(body.contains("10"));
    }

    #[tokio::test]
    async fn most_movements_names_the_busiest_product() {
        let store = seeded_store().await;
        let mut product = store.find_product("Detergente").await.unwrap().unwrap();
        product.current_stock = 40;
        store
            .apply_movement(
                product,
                Movement {
                    id: Uuid::new_v4(),
                    product_name: "Detergente".into(),
                    occurred_at: Utc::now(),
                    quantity: 30,
                    kind: MovementKind::Inbound,
                },
            )
            .await
            .unwrap();

        let reports = ReportService::new(store);
        let body = reports.most_movements().await.unwrap();
        assert!(body.contains("Most Inbound"));
        assert!(body.contains("Total Inbound (Detergente): 30"));
    }

    #[tokio::test]
    async fn most_movements_handles_an_empty_catalog() {
        let reports = ReportService::new(Arc::new(MemoryStore::new()));
        let body = reports.most_movements().await.unwrap();
        assert!(body.contains("No products registered."));
    }
}
