//! Repository contract shared by the in-memory and relational backends.
//!
//! The services depend only on [`InventoryStore`]; which implementation
//! backs it is a startup decision driven by `store_backend` in the config.

use async_trait::async_trait;

use crate::errors::ServiceError;
use crate::models::{Category, Movement, MovementKind, Product};

pub mod memory;
pub mod sql;

pub use memory::MemoryStore;
pub use sql::SqlStore;

/// Persistence contract for categories, products and the movement log.
///
/// Name matching is case-insensitive for both categories and products.
/// Each method is atomic with respect to its own records; referential
/// guards (duplicate names, category-in-use, product-has-movements) are
/// evaluated inside the implementation's own critical section: a lock
/// for the memory backend, a transaction for the SQL backend.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Inserts a category. Fails with Conflict when the name is taken.
    async fn insert_category(&self, category: Category) -> Result<(), ServiceError>;
    async fn find_category(&self, name: &str) -> Result<Option<Category>, ServiceError>;
    /// Lists categories ordered by name.
    async fn list_categories(&self) -> Result<Vec<Category>, ServiceError>;
    /// Replaces size/packaging of an existing category; identity is immutable.
    async fn update_category(&self, category: Category) -> Result<(), ServiceError>;
    /// Deletes a category. Fails with Conflict while products reference it.
    async fn delete_category(&self, name: &str) -> Result<(), ServiceError>;

    /// Inserts a product. Fails with Conflict on a duplicate name and with
    /// NotFound when the referenced category does not exist.
    async fn insert_product(&self, product: Product) -> Result<(), ServiceError>;
    async fn find_product(&self, name: &str) -> Result<Option<Product>, ServiceError>;
    /// Lists products ordered by name.
    async fn list_products(&self) -> Result<Vec<Product>, ServiceError>;
    /// Replaces every mutable field of an existing product.
    async fn update_product(&self, product: Product) -> Result<(), ServiceError>;
    /// Deletes a product. Fails with Conflict while movements reference it.
    async fn delete_product(&self, name: &str) -> Result<(), ServiceError>;
    async fn products_in_category(&self, category: &str) -> Result<Vec<Product>, ServiceError>;

    /// Persists the movement and the product's new stock as one atomic
    /// unit: both writes happen or neither does. `product` carries the
    /// already-validated new balance.
    async fn apply_movement(&self, product: Product, movement: Movement)
        -> Result<(), ServiceError>;
    /// Lists movements, most recent first.
    async fn list_movements(&self) -> Result<Vec<Movement>, ServiceError>;
    async fn movements_for_product(&self, product: &str) -> Result<Vec<Movement>, ServiceError>;
    async fn movements_by_kind(&self, kind: MovementKind) -> Result<Vec<Movement>, ServiceError>;

    /// Administrative reset: removes every movement, product and category.
    async fn clear_all(&self) -> Result<(), ServiceError>;
}
