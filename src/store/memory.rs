use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::errors::ServiceError;
use crate::models::{Category, Movement, MovementKind, Product};
use crate::store::InventoryStore;

#[derive(Debug, Default)]
struct DataSet {
    /// Keyed by lower-cased name; values keep the original casing.
    categories: HashMap<String, Category>,
    products: HashMap<String, Product>,
    movements: Vec<Movement>,
}

/// In-process backend. One mutex guards the whole dataset, so every store
/// call (including cross-entity referential checks and the two-write
/// movement apply) is a single critical section.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<DataSet>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn insert_category(&self, category: Category) -> Result<(), ServiceError> {
        let mut data = self.inner.lock().await;
        let k = key(&category.name);
        if data.categories.contains_key(&k) {
            return Err(ServiceError::conflict(format!(
                "Category already exists: {}",
                category.name
            )));
        }
        data.categories.insert(k, category);
        Ok(())
    }

    async fn find_category(&self, name: &str) -> Result<Option<Category>, ServiceError> {
        let data = self.inner.lock().await;
        Ok(data.categories.get(&key(name)).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ServiceError> {
        let data = self.inner.lock().await;
        let mut categories: Vec<Category> = data.categories.values().cloned().collect();
        categories.sort_by(|a, b| key(&a.name).cmp(&key(&b.name)));
        Ok(categories)
    }

    async fn update_category(&self, category: Category) -> Result<(), ServiceError> {
        let mut data = self.inner.lock().await;
        let k = key(&category.name);
        match data.categories.get_mut(&k) {
            Some(existing) => {
                existing.size = category.size;
                existing.packaging = category.packaging;
                Ok(())
            }
            None => Err(ServiceError::not_found(format!(
                "Category not found: {}",
                category.name
            ))),
        }
    }

    async fn delete_category(&self, name: &str) -> Result<(), ServiceError> {
        let mut data = self.inner.lock().await;
        let k = key(name);
        if !data.categories.contains_key(&k) {
            return Err(ServiceError::not_found(format!(
                "Category not found: {}",
                name
            )));
        }
        if data.products.values().any(|p| key(&p.category) == k) {
            return Err(ServiceError::conflict(format!(
                "Category has products and cannot be deleted: {}",
                name
            )));
        }
        data.categories.remove(&k);
        Ok(())
    }

    async fn insert_product(&self, product: Product) -> Result<(), ServiceError> {
        let mut data = self.inner.lock().await;
        let k = key(&product.name);
        if data.products.contains_key(&k) {
            return Err(ServiceError::conflict(format!(
                "Product already exists: {}",
                product.name
            )));
        }
        if !data.categories.contains_key(&key(&product.category)) {
            return Err(ServiceError::not_found(format!(
                "Category not found: {}",
                product.category
            )));
        }
        data.products.insert(k, product);
        Ok(())
    }

    async fn find_product(&self, name: &str) -> Result<Option<Product>, ServiceError> {
        let data = self.inner.lock().await;
        Ok(data.products.get(&key(name)).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>, ServiceError> {
        let data = self.inner.lock().await;
        let mut products: Vec<Product> = data.products.values().cloned().collect();
        products.sort_by(|a, b| key(&a.name).cmp(&key(&b.name)));
        Ok(products)
    }

    async fn update_product(&self, product: Product) -> Result<(), ServiceError> {
        let mut data = self.inner.lock().await;
        if !data.categories.contains_key(&key(&product.category)) {
            return Err(ServiceError::not_found(format!(
                "Category not found: {}",
                product.category
            )));
        }
        let k = key(&product.name);
        match data.products.get_mut(&k) {
            Some(existing) => {
                existing.unit_price = product.unit_price;
                existing.unit = product.unit;
                existing.current_stock = product.current_stock;
                existing.min_stock = product.min_stock;
                existing.max_stock = product.max_stock;
                existing.category = product.category;
                Ok(())
            }
            None => Err(ServiceError::not_found(format!(
                "Product not found: {}",
                product.name
            ))),
        }
    }

    async fn delete_product(&self, name: &str) -> Result<(), ServiceError> {
        let mut data = self.inner.lock().await;
        let k = key(name);
        if !data.products.contains_key(&k) {
            return Err(ServiceError::not_found(format!(
                "Product not found: {}",
                name
            )));
        }
        if data.movements.iter().any(|m| key(&m.product_name) == k) {
            return Err(ServiceError::conflict(format!(
                "Product has movements and cannot be deleted: {}",
                name
            )));
        }
        data.products.remove(&k);
        Ok(())
    }

    async fn products_in_category(&self, category: &str) -> Result<Vec<Product>, ServiceError> {
        let data = self.inner.lock().await;
        let k = key(category);
        let mut products: Vec<Product> = data
            .products
            .values()
            .filter(|p| key(&p.category) == k)
            .cloned()
            .collect();
        products.sort_by(|a, b| key(&a.name).cmp(&key(&b.name)));
        Ok(products)
    }

    async fn apply_movement(
        &self,
        product: Product,
        movement: Movement,
    ) -> Result<(), ServiceError> {
        let mut data = self.inner.lock().await;
        let k = key(&product.name);
        let entry = data.products.get_mut(&k).ok_or_else(|| {
            ServiceError::not_found(format!("Product not found: {}", product.name))
        })?;
        entry.current_stock = product.current_stock;
        data.movements.push(movement);
        Ok(())
    }

    async fn list_movements(&self) -> Result<Vec<Movement>, ServiceError> {
        let data = self.inner.lock().await;
        let mut movements = data.movements.clone();
        movements.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        Ok(movements)
    }

    async fn movements_for_product(&self, product: &str) -> Result<Vec<Movement>, ServiceError> {
        let data = self.inner.lock().await;
        let k = key(product);
        let mut movements: Vec<Movement> = data
            .movements
            .iter()
            .filter(|m| key(&m.product_name) == k)
            .cloned()
            .collect();
        movements.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        Ok(movements)
    }

    async fn movements_by_kind(&self, kind: MovementKind) -> Result<Vec<Movement>, ServiceError> {
        let data = self.inner.lock().await;
        let mut movements: Vec<Movement> = data
            .movements
            .iter()
            .filter(|m| m.kind == kind)
            .cloned()
            .collect();
        movements.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        Ok(movements)
    }

    async fn clear_all(&self) -> Result<(), ServiceError> {
        let mut data = self.inner.lock().await;
        data.movements.clear();
        data.products.clear();
        data.categories.clear();
        Ok(())
    }
}
