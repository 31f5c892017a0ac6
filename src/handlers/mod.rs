pub mod fields;
pub mod racks;
pub mod storage;
pub mod warehouses;

use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::DbPool,
    events::EventSender,
    services::{LayoutService, StorageService, WarehouseService},
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub warehouses: Arc<WarehouseService>,
    pub layout: Arc<LayoutService>,
    pub storage: Arc<StorageService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, config: &AppConfig) -> Self {
        Self {
            warehouses: Arc::new(WarehouseService::new(
                db_pool.clone(),
                event_sender.clone(),
                config.default_field_capacity,
            )),
            layout: Arc::new(LayoutService::new(db_pool.clone(), event_sender.clone())),
            storage: Arc::new(StorageService::new(db_pool, event_sender)),
        }
    }
}
