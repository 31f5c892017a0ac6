use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::metrics;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Publishes an event for a change that has already been committed.
    ///
    /// Failures are logged rather than returned: the caller's mutation is
    /// durable either way.
    pub async fn publish(&self, event: Event) {
        let name = event.name();
        if let Err(e) = self.send(event).await {
            warn!(event = name, error = %e, "dropping layout event");
        }
    }
}

/// Layout changes observed by the rest of the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    WarehouseCreated {
        warehouse_id: i32,
        fields: usize,
    },
    WarehouseDeleted(i32),
    FieldCapacityChanged {
        warehouse_id: i32,
        capacity: i32,
    },
    FieldGridMoved {
        warehouse_id: i32,
        x: f64,
        y: f64,
    },
    GridResized {
        warehouse_id: i32,
        edge: String,
        operation: String,
        count: u32,
        rows: u32,
        cols: u32,
    },
    RackPlaced {
        warehouse_id: i32,
        rack_id: i32,
        shelves: usize,
    },
    RackMoved {
        warehouse_id: i32,
        rack_id: i32,
    },
    RackRemoved {
        warehouse_id: i32,
        rack_id: i32,
    },
    ShelfAdded {
        rack_id: i32,
        shelf_id: i32,
    },
    FieldTypeChanged {
        warehouse_id: i32,
        top_field_id: i32,
        bottom_field_id: i32,
        field_type: String,
    },
    FieldFullnessChanged {
        field_id: i32,
        full: bool,
    },
    PalletAdded {
        shelf_id: i32,
        pallet_id: i32,
    },
    PalletUpdated(i32),
    PalletRemoved {
        shelf_id: i32,
        pallet_id: i32,
    },
    VaultPlaced {
        field_id: i32,
        vault_id: i32,
    },
    VaultStaged {
        vault_id: i32,
        old_field_id: Option<i32>,
    },
    VaultMoved {
        vault_id: i32,
        from_field_id: Option<i32>,
        to_field_id: i32,
    },
    VaultUpdated(i32),
    VaultRemoved(i32),
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::WarehouseCreated { .. } => "warehouse_created",
            Event::WarehouseDeleted(_) => "warehouse_deleted",
            Event::FieldCapacityChanged { .. } => "field_capacity_changed",
            Event::FieldGridMoved { .. } => "field_grid_moved",
            Event::GridResized { .. } => "grid_resized",
            Event::RackPlaced { .. } => "rack_placed",
            Event::RackMoved { .. } => "rack_moved",
            Event::RackRemoved { .. } => "rack_removed",
            Event::ShelfAdded { .. } => "shelf_added",
            Event::FieldTypeChanged { .. } => "field_type_changed",
            Event::FieldFullnessChanged { .. } => "field_fullness_changed",
            Event::PalletAdded { .. } => "pallet_added",
            Event::PalletUpdated(_) => "pallet_updated",
            Event::PalletRemoved { .. } => "pallet_removed",
            Event::VaultPlaced { .. } => "vault_placed",
            Event::VaultStaged { .. } => "vault_staged",
            Event::VaultMoved { .. } => "vault_moved",
            Event::VaultUpdated(_) => "vault_updated",
            Event::VaultRemoved(_) => "vault_removed",
        }
    }
}

/// Drains the event channel until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        metrics::EVENTS_PROCESSED
            .with_label_values(&[event.name()])
            .inc();

        match &event {
            Event::GridResized {
                warehouse_id,
                edge,
                operation,
                count,
                rows,
                cols,
            } => info!(
                warehouse_id,
                edge = %edge,
                operation = %operation,
                count,
                rows,
                cols,
                "field grid resized"
            ),
            Event::RackPlaced {
                warehouse_id,
                rack_id,
                shelves,
            } => info!(warehouse_id, rack_id, shelves, "rack placed"),
            Event::FieldTypeChanged {
                warehouse_id,
                top_field_id,
                bottom_field_id,
                field_type,
            } => info!(
                warehouse_id,
                top_field_id,
                bottom_field_id,
                field_type = %field_type,
                "field pair retyped"
            ),
            other => info!(event = other.name(), payload = ?other, "layout event"),
        }
    }

    info!("Event processing loop stopped");
}
