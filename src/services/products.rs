use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::instrument;

use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::Product;
use crate::store::InventoryStore;

#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn InventoryStore>,
    events: EventSender,
}

fn validate(product: &Product) -> Result<(), ServiceError> {
    if product.name.trim().is_empty() {
        return Err(ServiceError::validation("Product name is required"));
    }
    if product.category.trim().is_empty() {
        return Err(ServiceError::validation("Category name is required"));
    }
    if product.unit_price < Decimal::ZERO {
        return Err(ServiceError::validation("Price cannot be negative"));
    }
    if product.min_stock < 0 {
        return Err(ServiceError::validation("Minimum stock cannot be negative"));
    }
    if product.max_stock < product.min_stock {
        return Err(ServiceError::validation(
            "Maximum stock cannot be below minimum stock",
        ));
    }
    if product.current_stock < 0 {
        return Err(ServiceError::validation("Stock cannot be negative"));
    }
    if product.current_stock > product.max_stock {
        return Err(ServiceError::validation(
            "Stock exceeds maximum stock capacity",
        ));
    }
    Ok(())
}

impl ProductService {
    pub fn new(store: Arc<dyn InventoryStore>, events: EventSender) -> Self {
        Self { store, events }
    }

    #[instrument(skip(self, product), fields(product = %product.name))]
    pub async fn create(&self, mut product: Product) -> Result<Product, ServiceError> {
        product.name = product.name.trim().to_string();
        product.category = product.category.trim().to_string();
        validate(&product)?;
        self.store.insert_product(product.clone()).await?;
        self.events
            .notify(Event::ProductCreated {
                name: product.name.clone(),
            })
            .await;
        Ok(product)
    }

    pub async fn get(&self, name: &str) -> Result<Product, ServiceError> {
        self.store
            .find_product(name)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Product not found: {}", name.trim())))
    }

    pub async fn list(&self) -> Result<Vec<Product>, ServiceError> {
        self.store.list_products().await
    }

    #[instrument(skip(self, product), fields(product = %product.name))]
    pub async fn update(&self, mut product: Product) -> Result<Product, ServiceError> {
        product.name = product.name.trim().to_string();
        product.category = product.category.trim().to_string();
        validate(&product)?;
        self.store.update_product(product.clone()).await?;
        self.events
            .notify(Event::ProductUpdated {
                name: product.name.clone(),
            })
            .await;
        Ok(product)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, name: &str) -> Result<(), ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::validation("Product name is required"));
        }
        self.store.delete_product(name).await?;
        self.events
            .notify(Event::ProductDeleted {
                name: name.to_string(),
            })
            .await;
        Ok(())
    }
}
