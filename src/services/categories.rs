use std::sync::Arc;
use tracing::instrument;

use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{Category, CategoryPackaging, CategorySize};
use crate::store::InventoryStore;

#[derive(Clone)]
pub struct CategoryService {
    store: Arc<dyn InventoryStore>,
    events: EventSender,
}

impl CategoryService {
    pub fn new(store: Arc<dyn InventoryStore>, events: EventSender) -> Self {
        Self { store, events }
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        name: &str,
        size: CategorySize,
        packaging: CategoryPackaging,
    ) -> Result<Category, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::validation("Category name is required"));
        }
        let category = Category {
            name: name.to_string(),
            size,
            packaging,
        };
        self.store.insert_category(category.clone()).await?;
        self.events
            .notify(Event::CategoryCreated {
                name: category.name.clone(),
            })
            .await;
        Ok(category)
    }

    pub async fn get(&self, name: &str) -> Result<Category, ServiceError> {
        self.store
            .find_category(name)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Category not found: {}", name.trim())))
    }

    pub async fn list(&self) -> Result<Vec<Category>, ServiceError> {
        self.store.list_categories().await
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        name: &str,
        size: CategorySize,
        packaging: CategoryPackaging,
    ) -> Result<Category, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::validation("Category name is required"));
        }
        let category = Category {
            name: name.to_string(),
            size,
            packaging,
        };
        self.store.update_category(category.clone()).await?;
        self.events
            .notify(Event::CategoryUpdated {
                name: category.name.clone(),
            })
            .await;
        Ok(category)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, name: &str) -> Result<(), ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::validation("Category name is required"));
        }
        self.store.delete_category(name).await?;
        self.events
            .notify(Event::CategoryDeleted {
                name: name.to_string(),
            })
            .await;
        Ok(())
    }
}
