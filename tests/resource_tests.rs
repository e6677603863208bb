mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use common::{assert_hours, spawn_app};

fn contractor(email: &str, tin: &str, license: &str) -> Value {
    json!({
        "name": "Mwangi Builders",
        "phone": "0733000000",
        "email": email,
        "specialization": "masonry",
        "tin": tin,
        "license": license,
        "rate": 2500.0,
    })
}

fn supplier(name: &str) -> Value {
    json!({
        "name": name,
        "phone": "0744000000",
        "email": "sales@example.com",
        "address": "Industrial Area",
        "category": "building_materials",
        "products": "Cement, ballast",
        "tin": "P051234567X",
    })
}

#[tokio::test]
async fn test_contractor_defaults_and_lookup() {
    let app = spawn_app("2024-01-10").await;
    let token = app.signup("Kamau", "0700002000", "user").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/contractors",
            Some(&token),
            Some(contractor("mwangi@example.com", "TIN-1", "LIC-1")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let created = &body["data"];
    assert_eq!(created["specialization"], "masonry");
    assert_eq!(created["status"], "active");
    assert_eq!(created["availability"], "available");
    assert_hours(&created["rate"], 2500.0);
    let id = created["id"].as_i64().unwrap();

    let (status, body) = app
        .request("GET", &format!("/api/contractors/{id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["license"], "LIC-1");

    let (_, body) = app.request("GET", "/api/contractors", Some(&token), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = app
        .request("GET", "/api/contractors/99", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_contractor_unique_fields_conflict() {
    let app = spawn_app("2024-01-10").await;
    let token = app.signup("Njeri", "0700002100", "user").await;
    app.request(
        "POST",
        "/api/contractors",
        Some(&token),
        Some(contractor("first@example.com", "TIN-1", "LIC-1")),
    )
    .await;

    for (body, message) in [
        (
            contractor("first@example.com", "TIN-2", "LIC-2"),
            "Contractor email already registered",
        ),
        (
            contractor("second@example.com", "TIN-1", "LIC-2"),
            "Contractor TIN already registered",
        ),
        (
            contractor("second@example.com", "TIN-2", "LIC-1"),
            "Contractor license already registered",
        ),
    ] {
        let (status, response) = app
            .request("POST", "/api/contractors", Some(&token), Some(body))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(response["message"], message);
    }
}

#[tokio::test]
async fn test_contractor_validation() {
    let app = spawn_app("2024-01-10").await;
    let token = app.signup("Otieno", "0700002200", "user").await;

    let mut negative_rate = contractor("rate@example.com", "TIN-3", "LIC-3");
    negative_rate["rate"] = json!(-1.0);
    let mut unknown_trade = contractor("trade@example.com", "TIN-4", "LIC-4");
    unknown_trade["specialization"] = json!("welding");
    let mut bad_email = contractor("not-an-email", "TIN-5", "LIC-5");
    bad_email["availability"] = json!("engaged");

    for body in [negative_rate, unknown_trade, bad_email] {
        let (status, _) = app
            .request("POST", "/api/contractors", Some(&token), Some(body))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let mut orphan = contractor("orphan@example.com", "TIN-6", "LIC-6");
    orphan["activeProjectId"] = json!(42);
    let (status, _) = app
        .request("POST", "/api/contractors", Some(&token), Some(orphan))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_supplier_crud() {
    let app = spawn_app("2024-01-10").await;
    let token = app.signup("Akinyi", "0700002300", "user").await;

    let (status, body) = app
        .request("POST", "/api/suppliers", Some(&token), Some(supplier("Bamburi")))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["status"], "active");
    let id = body["data"]["id"].as_i64().unwrap();

    let mut changed = supplier("Bamburi Cement");
    changed["status"] = json!("inactive");
    changed["website"] = json!("https://bamburi.example.com");
    let (status, body) = app
        .request("PUT", &format!("/api/suppliers/{id}"), Some(&token), Some(changed))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Bamburi Cement");
    assert_eq!(body["data"]["status"], "inactive");
    assert_eq!(body["data"]["website"], "https://bamburi.example.com");

    let (status, body) = app
        .request("GET", &format!("/api/suppliers/{id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["category"], "building_materials");

    let (status, _) = app
        .request("DELETE", &format!("/api/suppliers/{id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request("GET", &format!("/api/suppliers/{id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], format!("Supplier {id} not found"));

    let (status, _) = app
        .request("DELETE", &format!("/api/suppliers/{id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_supplier_requires_known_category() {
    let app = spawn_app("2024-01-10").await;
    let token = app.signup("Wafula", "0700002400", "user").await;

    let mut body = supplier("Mystery Co");
    body["category"] = json!("food");
    let (status, _) = app
        .request("POST", "/api/suppliers", Some(&token), Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            "PUT",
            "/api/suppliers/77",
            Some(&token),
            Some(supplier("Ghost")),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, listed) = app.request("GET", "/api/suppliers", Some(&token), None).await;
    assert!(listed["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_site_update_replaces_fields() {
    let app = spawn_app("2024-01-10").await;
    let admin = app.admin_token().await;
    let project_id = app.create_project(&admin).await;
    let site_id = app.create_site(&admin, project_id).await;

    let (status, body) = app
        .request(
            "PUT",
            &format!("/api/sites/{site_id}"),
            Some(&admin),
            Some(json!({
                "name": "Block A (east)",
                "location": "North plot",
                "projectId": project_id,
                "status": "on_hold",
                "progress": 40,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["name"], "Block A (east)");
    assert_eq!(body["data"]["status"], "on_hold");
    assert_eq!(body["data"]["progress"], 40);

    let (status, _) = app
        .request(
            "PUT",
            &format!("/api/sites/{site_id}"),
            Some(&admin),
            Some(json!({
                "name": "Block A",
                "location": "North plot",
                "projectId": project_id,
                "progress": 120,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            "PUT",
            "/api/sites/999",
            Some(&admin),
            Some(json!({
                "name": "Nowhere",
                "location": "None",
                "projectId": project_id,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_project_scoped_sites() {
    let app = spawn_app("2024-01-10").await;
    let admin = app.admin_token().await;
    let project_id = app.create_project(&admin).await;

    let (status, body) = app
        .request(
            "POST",
            &format!("/api/projects/{project_id}/sites"),
            Some(&admin),
            Some(json!({ "name": "Annex", "location": "South plot", "projectId": 999 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["projectId"].as_i64(), Some(project_id));

    let (status, body) = app
        .request(
            "GET",
            &format!("/api/projects/{project_id}/sites"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let sites = body["data"].as_array().unwrap();
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0]["name"], "Annex");

    let (status, _) = app
        .request(
            "POST",
            "/api/projects/999/sites",
            Some(&admin),
            Some(json!({ "name": "Lost", "location": "Nowhere" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request("GET", "/api/projects/999/sites", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
