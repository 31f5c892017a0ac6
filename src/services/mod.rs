pub mod layout;
pub mod storage;
pub mod warehouses;

pub use layout::LayoutService;
pub use storage::StorageService;
pub use warehouses::WarehouseService;
