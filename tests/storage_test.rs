mod common;

use axum::http::{Method, StatusCode};
use common::{field_id, TestApp};
use serde_json::{json, Value};

/// Warehouse with one rack holding a single shelf of `capacity` spots.
async fn shelf(app: &TestApp, capacity: i32) -> i64 {
    let id = app.floor("Pallets", 1, 1).await["id"].as_i64().unwrap();
    let placed = app
        .ok(
            Method::POST,
            &format!("/api/v1/warehouses/{id}/racks"),
            Some(json!({
                "position": { "x": 5.0, "y": 5.0 },
                "width": 2.0,
                "length": 2.0,
                "capacity": capacity,
                "numShelves": 1
            })),
            StatusCode::CREATED,
        )
        .await;
    placed["shelves"][0]["id"].as_i64().unwrap()
}

async fn add_pallet(app: &TestApp, shelf: i64, body: Value) -> (StatusCode, Value) {
    app.call(
        Method::POST,
        &format!("/api/v1/shelves/{shelf}/pallets"),
        Some(body),
    )
    .await
}

#[tokio::test]
async fn pallets_fill_shelf_spots() {
    let app = TestApp::new().await;
    let shelf = shelf(&app, 3).await;

    let (status, body) = add_pallet(
        &app,
        shelf,
        json!({ "customerName": "ACME", "palletNumber": "P-1", "weight": 120.5, "shelfSpots": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let view = &body["data"];
    assert_eq!(view["id"], shelf);
    assert_eq!(view["occupiedSpots"], 2);
    assert_eq!(view["pallets"][0]["name"], format!("Pallet-{shelf}-P-1"));
    assert_eq!(view["pallets"][0]["weight"], 120.5);

    let (status, body) = add_pallet(
        &app,
        shelf,
        json!({ "customerName": "ACME", "palletNumber": "P-2", "shelfSpots": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Shelf capacity exceeded");

    let (status, body) = add_pallet(
        &app,
        shelf,
        json!({ "customerName": "ACME", "palletNumber": "P-2", "name": "Last one" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["occupiedSpots"], 3);

    let pallets = app
        .ok(
            Method::GET,
            &format!("/api/v1/shelves/{shelf}/pallets"),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(pallets.as_array().unwrap().len(), 2);
    assert_eq!(pallets[1]["name"], "Last one");
}

#[tokio::test]
async fn pallet_requests_need_customer_and_number() {
    let app = TestApp::new().await;
    let shelf = shelf(&app, 2).await;

    for body in [
        json!({ "palletNumber": "P-1" }),
        json!({ "customerName": "ACME" }),
        json!({ "customerName": " ", "palletNumber": "P-1" }),
    ] {
        let (status, response) = add_pallet(&app, shelf, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            response["message"],
            "Customer name and pallet number are required"
        );
    }

    let (status, response) = add_pallet(
        &app,
        shelf,
        json!({ "customerName": "ACME", "palletNumber": "P-1", "weight": -3.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "Invalid weight");

    let (status, _) = add_pallet(
        &app,
        9_999,
        json!({ "customerName": "ACME", "palletNumber": "P-1" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pallets_are_updated_and_deleted() {
    let app = TestApp::new().await;
    let shelf = shelf(&app, 2).await;
    let (_, body) = add_pallet(
        &app,
        shelf,
        json!({ "customerName": "ACME", "palletNumber": "P-1" }),
    )
    .await;
    let pallet = body["data"]["pallets"][0]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/pallets/{pallet}");

    let updated = app
        .ok(
            Method::PATCH,
            &uri,
            Some(json!({ "notes": "fragile", "weight": 80.0, "shelfSpots": 2 })),
            StatusCode::OK,
        )
        .await;
    assert_eq!(updated["notes"], "fragile");
    assert_eq!(updated["weight"], 80.0);
    assert_eq!(updated["customerName"], "ACME");

    let message = app
        .err(
            Method::PATCH,
            &uri,
            Some(json!({ "shelfSpots": 3 })),
            StatusCode::BAD_REQUEST,
        )
        .await;
    assert_eq!(message, "Shelf capacity exceeded");

    app.ok(Method::DELETE, &uri, None, StatusCode::OK).await;
    app.err(Method::DELETE, &uri, None, StatusCode::NOT_FOUND)
        .await;
}

#[tokio::test]
async fn vaults_fill_fields_and_staging_frees_them() {
    let app = TestApp::new().await;
    let created = app
        .create_warehouse(json!({ "name": "Vaults", "rows": 1, "cols": 1, "fieldCapacity": 2 }))
        .await;
    let field = created["fields"][0]["id"].as_i64().unwrap();

    let first = app
        .ok(
            Method::POST,
            "/api/v1/vaults",
            Some(json!({ "fieldId": field, "name": "V-1", "customerName": "ACME" })),
            StatusCode::CREATED,
        )
        .await;
    assert_eq!(first["field"]["full"], false);
    assert_eq!(first["vault"]["fieldId"], field);

    let second = app
        .ok(
            Method::POST,
            "/api/v1/vaults",
            Some(json!({ "fieldId": field, "name": "V-2" })),
            StatusCode::CREATED,
        )
        .await;
    assert_eq!(second["field"]["full"], true);

    let message = app
        .err(
            Method::POST,
            "/api/v1/vaults",
            Some(json!({ "fieldId": field, "name": "V-3" })),
            StatusCode::BAD_REQUEST,
        )
        .await;
    assert_eq!(message, "Field is full");

    let vault = first["vault"]["id"].as_i64().unwrap();
    let staged = app
        .ok(
            Method::POST,
            &format!("/api/v1/vaults/{vault}/stage"),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(staged["oldFieldId"], field);
    assert_eq!(staged["fieldId"], Value::Null);

    let field_view = app
        .ok(Method::GET, &format!("/api/v1/fields/{field}"), None, StatusCode::OK)
        .await;
    assert_eq!(field_view["full"], false);
    assert_eq!(field_view["vaultCount"], 1);

    let staged_list = app
        .ok(Method::GET, "/api/v1/vaults/staged", None, StatusCode::OK)
        .await;
    let staged_list = staged_list.as_array().unwrap();
    assert_eq!(staged_list.len(), 1);
    assert_eq!(staged_list[0]["name"], "V-1");
}

#[tokio::test]
async fn deleting_a_vault_reports_its_field() {
    let app = TestApp::new().await;
    let created = app.floor("Delete", 1, 1).await;
    let field = created["fields"][0]["id"].as_i64().unwrap();
    let vault = app
        .ok(
            Method::POST,
            "/api/v1/vaults",
            Some(json!({ "fieldId": field, "name": "V-1" })),
            StatusCode::CREATED,
        )
        .await["vault"]["id"]
        .as_i64()
        .unwrap();

    let deleted = app
        .ok(
            Method::DELETE,
            &format!("/api/v1/vaults/{vault}"),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(deleted["vaultId"], vault);
    assert_eq!(deleted["fieldId"], field);

    let message = app
        .err(
            Method::POST,
            &format!("/api/v1/vaults/{vault}/stage"),
            None,
            StatusCode::NOT_FOUND,
        )
        .await;
    assert_eq!(message, "Vault not found");
}

#[tokio::test]
async fn vaults_need_an_existing_field() {
    let app = TestApp::new().await;

    let message = app
        .err(
            Method::POST,
            "/api/v1/vaults",
            Some(json!({ "fieldId": 77, "name": "V-1" })),
            StatusCode::NOT_FOUND,
        )
        .await;
    assert_eq!(message, "Field not found");
}

async fn place(app: &TestApp, field: i64, name: &str) -> i64 {
    app.ok(
        Method::POST,
        "/api/v1/vaults",
        Some(json!({ "fieldId": field, "name": name })),
        StatusCode::CREATED,
    )
    .await["vault"]["id"]
        .as_i64()
        .unwrap()
}

async fn move_vault(app: &TestApp, vault: i64, field: i64) -> (StatusCode, Value) {
    app.call(
        Method::POST,
        &format!("/api/v1/vaults/{vault}/move"),
        Some(json!({ "fieldId": field, "position": "T" })),
    )
    .await
}

async fn is_full(app: &TestApp, field: i64) -> bool {
    app.ok(Method::GET, &format!("/api/v1/fields/{field}"), None, StatusCode::OK)
        .await["full"]
        .as_bool()
        .unwrap()
}

#[tokio::test]
async fn staged_vaults_go_back_into_fields() {
    let app = TestApp::new().await;
    let created = app
        .create_warehouse(json!({ "name": "Return", "rows": 2, "cols": 1, "fieldCapacity": 1 }))
        .await;
    let id = created["id"].as_i64().unwrap();
    let a1 = field_id(&created["fields"], "A1");
    let a2 = field_id(&created["fields"], "A2");

    let vault = place(&app, a1, "V-1").await;
    app.ok(
        Method::POST,
        &format!("/api/v1/vaults/{vault}/stage"),
        None,
        StatusCode::OK,
    )
    .await;
    let version = app.layout(id).await["version"].as_i64().unwrap();

    let (status, body) = move_vault(&app, vault, a2).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let moved = &body["data"];
    assert_eq!(moved["oldFieldId"], Value::Null);
    assert_eq!(moved["vault"]["fieldId"], a2);
    assert_eq!(moved["vault"]["position"], "T");
    assert_eq!(moved["field"]["full"], true);
    assert_eq!(app.layout(id).await["version"], version + 1);

    let staged = app
        .ok(Method::GET, "/api/v1/vaults/staged", None, StatusCode::OK)
        .await;
    assert_eq!(staged, json!([]));
}

#[tokio::test]
async fn moving_between_fields_updates_both_full_flags() {
    let app = TestApp::new().await;
    let created = app
        .create_warehouse(json!({ "name": "Shuffle", "rows": 2, "cols": 1, "fieldCapacity": 1 }))
        .await;
    let id = created["id"].as_i64().unwrap();
    let a1 = field_id(&created["fields"], "A1");
    let a2 = field_id(&created["fields"], "A2");

    let vault = place(&app, a1, "V-1").await;
    assert!(is_full(&app, a1).await);
    let version = app.layout(id).await["version"].as_i64().unwrap();

    let (status, body) = move_vault(&app, vault, a2).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["oldFieldId"], a1);
    assert!(!is_full(&app, a1).await);
    assert!(is_full(&app, a2).await);
    assert_eq!(app.layout(id).await["version"], version + 1);

    place(&app, a1, "V-2").await;
}

#[tokio::test]
async fn moves_obey_capacity_and_couchbox_rules() {
    let app = TestApp::new().await;
    let created = app
        .create_warehouse(json!({ "name": "Strict", "rows": 3, "cols": 1, "fieldCapacity": 1 }))
        .await;
    let id = created["id"].as_i64().unwrap();
    let a1 = field_id(&created["fields"], "A1");
    let a2 = field_id(&created["fields"], "A2");
    let a3 = field_id(&created["fields"], "A3");

    let vault = place(&app, a1, "V-1").await;
    app.ok(
        Method::PATCH,
        &format!("/api/v1/fields/{a2}/type"),
        Some(json!({ "field2": "A3", "warehouseId": id })),
        StatusCode::OK,
    )
    .await;
    place(&app, a2, "V-2").await;
    let version = app.layout(id).await["version"].as_i64().unwrap();

    let (status, body) = move_vault(&app, vault, a3).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Cannot place vault in the lower half of a couchbox"
    );

    let (status, body) = move_vault(&app, vault, a2).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Field is full");

    let (status, body) = move_vault(&app, vault, 9_999).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Field not found");

    let (status, body) = move_vault(&app, 9_999, a1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Vault not found");

    // rejected moves leave the vault and its field untouched
    assert!(is_full(&app, a1).await);
    let stored = app
        .ok(Method::GET, &format!("/api/v1/vaults/{vault}"), None, StatusCode::OK)
        .await;
    assert_eq!(stored["fieldId"], a1);
    assert_eq!(app.layout(id).await["version"], version);
}

#[tokio::test]
async fn vaults_can_be_read_and_edited_in_place() {
    let app = TestApp::new().await;
    let created = app.floor("Edit", 1, 1).await;
    let field = created["fields"][0]["id"].as_i64().unwrap();
    let vault = place(&app, field, "V-1").await;
    let uri = format!("/api/v1/vaults/{vault}");

    let fetched = app.ok(Method::GET, &uri, None, StatusCode::OK).await;
    assert_eq!(fetched["name"], "V-1");

    let updated = app
        .ok(
            Method::PATCH,
            &uri,
            Some(json!({ "name": " V-1b ", "note": "fragile", "customerName": "ACME" })),
            StatusCode::OK,
        )
        .await;
    assert_eq!(updated["name"], "V-1b");
    assert_eq!(updated["note"], "fragile");
    assert_eq!(updated["customerName"], "ACME");
    assert_eq!(updated["fieldId"], field);

    let message = app
        .err(
            Method::PATCH,
            &uri,
            Some(json!({ "name": "  " })),
            StatusCode::BAD_REQUEST,
        )
        .await;
    assert_eq!(message, "Vault name is required");

    let message = app
        .err(Method::GET, "/api/v1/vaults/9999", None, StatusCode::NOT_FOUND)
        .await;
    assert_eq!(message, "Vault not found");
}

#[tokio::test]
async fn all_vaults_list_their_location() {
    let app = TestApp::new().await;
    let created = app.floor("Listing", 1, 1).await;
    let field = created["fields"][0]["id"].as_i64().unwrap();
    let placed = place(&app, field, "V-1").await;
    let staged = place(&app, field, "V-2").await;
    app.ok(
        Method::POST,
        &format!("/api/v1/vaults/{staged}/stage"),
        None,
        StatusCode::OK,
    )
    .await;

    let all = app.ok(Method::GET, "/api/v1/vaults", None, StatusCode::OK).await;
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 2);

    assert_eq!(all[0]["id"], placed);
    assert_eq!(all[0]["fieldName"], "A1");
    assert_eq!(all[0]["warehouseId"], created["id"]);
    assert_eq!(all[0]["warehouseName"], "Listing");

    assert_eq!(all[1]["id"], staged);
    assert_eq!(all[1]["fieldId"], Value::Null);
    assert_eq!(all[1]["fieldName"], Value::Null);
    assert_eq!(all[1]["warehouseName"], Value::Null);
}
