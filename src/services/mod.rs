//! Domain services. Each service owns one slice of the domain and talks
//! to persistence only through the [`InventoryStore`] trait.

use std::sync::Arc;

use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::store::InventoryStore;

pub mod categories;
pub mod dispatch;
pub mod ledger;
pub mod products;
pub mod reports;

pub use categories::CategoryService;
pub use dispatch::dispatch;
pub use ledger::StockLedger;
pub use products::ProductService;
pub use reports::ReportService;

/// Bundle of every service, shared across client connections.
#[derive(Clone)]
pub struct AppServices {
    pub categories: CategoryService,
    pub products: ProductService,
    pub ledger: StockLedger,
    pub reports: ReportService,
    store: Arc<dyn InventoryStore>,
    events: EventSender,
}

impl AppServices {
    pub fn new(store: Arc<dyn InventoryStore>, events: EventSender) -> Self {
        Self {
            categories: CategoryService::new(store.clone(), events.clone()),
            products: ProductService::new(store.clone(), events.clone()),
            ledger: StockLedger::new(store.clone(), events.clone()),
            reports: ReportService::new(store.clone()),
            store,
            events,
        }
    }

    /// Administrative reset: drops every movement, product and category.
    pub async fn clear_all(&self) -> Result<(), ServiceError> {
        self.store.clear_all().await?;
        self.events.notify(Event::DataCleared).await;
        Ok(())
    }
}
