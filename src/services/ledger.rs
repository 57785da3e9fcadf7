use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{Movement, MovementKind, Product};
use crate::store::InventoryStore;

/// Outcome of a successfully applied movement.
#[derive(Debug, Clone)]
pub struct AppliedMovement {
    pub movement: Movement,
    pub new_stock: i32,
}

/// Transactional stock ledger.
///
/// Validation and the write are performed while holding a per-product
/// mutex, so two concurrent movements on the same product cannot both
/// read the same balance and both pass the check. Movements on distinct
/// products proceed in parallel.
#[derive(Clone)]
pub struct StockLedger {
    store: Arc<dyn InventoryStore>,
    events: EventSender,
    product_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl StockLedger {
    pub fn new(store: Arc<dyn InventoryStore>, events: EventSender) -> Self {
        Self {
            store,
            events,
            product_locks: Arc::new(DashMap::new()),
        }
    }

    fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        self.product_locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Applies one movement: validates the quantity against the product's
    /// balance and capacity, persists the movement together with the new
    /// balance, and reports the resulting stock.
    #[instrument(skip(self))]
    pub async fn apply(
        &self,
        product_name: &str,
        kind: MovementKind,
        quantity: i32,
    ) -> Result<AppliedMovement, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::validation(
                "Quantity must be a positive number",
            ));
        }

        let key = product_name.trim().to_lowercase();
        let lock = self.lock_for(&key);
        let _serial = lock.lock().await;

        let mut product = self.find_product(product_name).await?;
        let new_stock = self.checked_balance(&product, kind, quantity)?;
        product.current_stock = new_stock;

        let movement = Movement {
            id: Uuid::new_v4(),
            product_name: product.name.clone(),
            occurred_at: Utc::now(),
            quantity,
            kind,
        };
        self.store
            .apply_movement(product, movement.clone())
            .await?;

        self.events
            .notify(Event::MovementApplied {
                movement_id: movement.id,
                product: movement.product_name.clone(),
                kind,
                quantity,
                new_stock,
                occurred_at: movement.occurred_at,
            })
            .await;

        Ok(AppliedMovement { movement, new_stock })
    }

    /// Movement history, most recent first. With a product name, only
    /// that product's movements are returned.
    pub async fn history(&self, product: Option<&str>) -> Result<Vec<Movement>, ServiceError> {
        match product {
            Some(name) => self.store.movements_for_product(name).await,
            None => self.store.list_movements().await,
        }
    }

    async fn find_product(&self, name: &str) -> Result<Product, ServiceError> {
        self.store
            .find_product(name)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Product not found: {}", name.trim())))
    }

    fn checked_balance(
        &self,
        product: &Product,
        kind: MovementKind,
        quantity: i32,
    ) -> Result<i32, ServiceError> {
        match kind {
            MovementKind::Inbound => {
                // An overflowing add already exceeds any valid max_stock.
                match product.current_stock.checked_add(quantity) {
                    Some(balance) if balance <= product.max_stock => Ok(balance),
                    _ => Err(ServiceError::CapacityExceeded(format!(
                        "Movement exceeds maximum stock capacity. Maximum allowed: {}",
                        product.max_stock
                    ))),
                }
            }
            MovementKind::Outbound => {
                match product.current_stock.checked_sub(quantity) {
                    Some(balance) if balance >= 0 => Ok(balance),
                    _ => Err(ServiceError::InsufficientStock(format!(
                        "Insufficient stock. Current stock: {}",
                        product.current_stock
                    ))),
                }
            }
        }
    }
}
