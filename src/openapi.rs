use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vaultyard API",
        version = "1.0.0",
        description = r#"
# Vaultyard Warehouse Layout API

Models the floor of a storage warehouse: a lettered grid of vault fields,
free-standing racks with shelves and pallets, and couchbox pairs that join
two vertically adjacent fields.

## Concurrency

Every layout mutation bumps the warehouse `version`. Requests that carry
`expectedVersion` are rejected with `409 Conflict` when the warehouse has
moved on in the meantime.
"#
    ),
    paths(
        // Warehouses
        crate::handlers::warehouses::list_warehouses,
        crate::handlers::warehouses::create_warehouse,
        crate::handlers::warehouses::get_warehouse,
        crate::handlers::warehouses::delete_warehouse,
        crate::handlers::warehouses::update_field_capacity,
        crate::handlers::warehouses::set_field_grid_position,
        crate::handlers::warehouses::resize_grid,

        // Racks
        crate::handlers::racks::list_racks,
        crate::handlers::racks::add_rack,
        crate::handlers::racks::move_rack,
        crate::handlers::racks::delete_rack,
        crate::handlers::racks::add_shelf,

        // Fields
        crate::handlers::fields::get_field,
        crate::handlers::fields::set_field_type,
        crate::handlers::fields::set_field_full,
        crate::handlers::fields::toggle_field_full,

        // Pallets and vaults
        crate::handlers::storage::list_pallets,
        crate::handlers::storage::add_pallet,
        crate::handlers::storage::update_pallet,
        crate::handlers::storage::delete_pallet,
        crate::handlers::storage::add_vault,
        crate::handlers::storage::stage_vault,
        crate::handlers::storage::list_staged_vaults,
        crate::handlers::storage::list_vaults,
        crate::handlers::storage::get_vault,
        crate::handlers::storage::update_vault,
        crate::handlers::storage::move_vault,
        crate::handlers::storage::delete_vault,
    ),
    components(
        schemas(
            crate::entities::warehouse::Model,
            crate::entities::field::Model,
            crate::entities::rack::Model,
            crate::entities::shelf::Model,
            crate::entities::pallet::Model,
            crate::entities::vault::Model,
            crate::entities::position::Position,
            crate::entities::field::FieldType,
            crate::entities::rack::RackOrientation,

            crate::commands::warehouses::CreateWarehouseCommand,
            crate::commands::warehouses::UpdateFieldCapacityCommand,
            crate::commands::warehouses::SetFieldGridPositionCommand,
            crate::commands::grid::ResizeGridCommand,
            crate::commands::racks::AddRackCommand,
            crate::commands::racks::MoveRackCommand,
            crate::commands::racks::AddShelfCommand,
            crate::commands::fields::ToggleFieldTypeCommand,
            crate::handlers::fields::SetFieldFullRequest,
            crate::commands::pallets::AddPalletCommand,
            crate::commands::pallets::UpdatePalletCommand,
            crate::commands::vaults::AddVaultCommand,
            crate::commands::vaults::MoveVaultCommand,
            crate::commands::vaults::UpdateVaultCommand,

            crate::dto::WarehouseSummary,
            crate::dto::WarehouseLayout,
            crate::dto::FieldView,
            crate::dto::RackView,
            crate::dto::ShelfView,
            crate::dto::ResizeGridResult,
            crate::dto::FieldTypeToggleResult,
            crate::dto::PlacedVaultResult,
            crate::dto::StagedVaultResult,
            crate::dto::MovedVaultResult,
            crate::dto::VaultListing,
            crate::dto::DeletedVaultResult,

            crate::errors::ErrorResponse
        )
    ),
    tags(
        (name = "warehouses", description = "Warehouses and their field grid settings"),
        (name = "fields", description = "Grid resizing, couchbox pairs and field fullness"),
        (name = "racks", description = "Rack placement and shelves"),
        (name = "storage", description = "Pallets on shelves and vaults in fields")
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_layout_paths() {
        let json = serde_json::to_string(&ApiDocV1::openapi()).unwrap();
        assert!(json.contains("Vaultyard API"));
        assert!(json.contains("/api/v1/warehouses/{id}/grid/resize"));
        assert!(json.contains("/api/v1/fields/{id}/type"));
        assert!(json.contains("/api/v1/vaults/staged"));
        assert!(json.contains("/api/v1/vaults/{id}/move"));
    }

    #[test]
    fn entity_schemas_are_named_after_the_domain() {
        let openapi = ApiDocV1::openapi();
        let schemas = &openapi.components.as_ref().unwrap().schemas;
        for name in ["Warehouse", "Field", "Rack", "Shelf", "Pallet", "Vault"] {
            assert!(schemas.contains_key(name), "missing schema {name}");
        }
    }
}
