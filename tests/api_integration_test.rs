use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use biblioteca::infrastructure::AppState;
use biblioteca::{db, server};
use serde_json::{Value, json};
use tower::util::ServiceExt; // for `oneshot`

async fn setup_app() -> Router {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    server::build_router(AppState::new(db), &[])
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn send_raw(app: &Router, method: &str, uri: &str, raw: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let request = builder.body(Body::from(raw.to_string())).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn new_book(title: &str) -> Value {
    json!({
        "title": title,
        "author": "Isabel Allende",
        "cost": "25.00",
        "condition": "new",
        "coverType": "hard",
        "categories": ["novel"],
        "company": "acme",
    })
}

async fn token_for(app: &Router, username: &str, company: &str) -> String {
    let (status, _) = send(
        app,
        "POST",
        "/api/auth/signup",
        Some(json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "hunter22",
            "company": company,
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": format!("{}@example.com", username), "password": "hunter22" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup_app().await;
    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_group_lifecycle_over_http() {
    let app = setup_app().await;

    let (status, created) = send(&app, "POST", "/api/books", Some(new_book("La casa de los espíritus")), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["copiesCount"], 1);
    assert_eq!(created["cost"], 25.0);
    let id = created["id"].as_i64().unwrap();
    let group_id = created["groupId"].as_str().unwrap().to_string();

    for _ in 0..2 {
        let (status, _) = send(&app, "POST", &format!("/api/books/{}/copy", id), None, None).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, view) = send(&app, "GET", &format!("/api/books/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["copiesCount"], 3);
    assert_eq!(view["copies"].as_array().unwrap().len(), 3);

    let (status, listing) = send(&app, "GET", "/api/books?company=acme", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["totalBooks"], 1);
    assert_eq!(listing["currentPage"], 1);
    assert_eq!(listing["books"][0]["copiesCount"], 3);

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/books/{}/general", group_id),
        Some(json!({ "title": "La casa de los espíritus (ed. 2)" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["updated"], 3);

    let (status, group) = send(&app, "GET", &format!("/api/books/group/{}", group_id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        group["copies"]
            .as_array()
            .unwrap()
            .iter()
            .all(|c| c["title"] == "La casa de los espíritus (ed. 2)")
    );

    let (status, hits) = send(&app, "GET", "/api/books/search?q=casa%20de", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits["books"][0]["availableCopies"].as_array().unwrap().len(), 3);

    let (status, empty) = send(&app, "GET", "/api/books/search?q=", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(empty["books"], json!([]));
}

#[tokio::test]
async fn test_decrease_copy_cascade_response() {
    let app = setup_app().await;

    let (_, created) = send(&app, "POST", "/api/books", Some(new_book("Paula")), None).await;
    let id = created["id"].as_i64().unwrap();
    let (_, second) = send(&app, "POST", &format!("/api/books/{}/copy", id), None, None).await;

    let (status, view) = send(
        &app,
        "POST",
        &format!("/api/books/{}/decrease-copy", id),
        Some(json!({ "copyId": second["id"] })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["copiesCount"], 1);

    let (status, gone) = send(&app, "POST", &format!("/api/books/{}/decrease-copy", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(gone["deleted"], true);
    assert_eq!(gone["message"], "Last copy removed, book deleted");

    let (status, body) = send(&app, "GET", &format!("/api/books/{}", id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Book not found");
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn test_inventory_error_envelopes() {
    let app = setup_app().await;

    let (status, body) = send(&app, "GET", "/api/books", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
    assert!(body.get("success").is_none());

    let mut bad = new_book("Eva Luna");
    bad["cost"] = json!("cheap");
    let (status, body) = send(&app, "POST", "/api/books", Some(bad), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "cost must be numeric");

    let (status, _) = send(&app, "DELETE", "/api/books/12345", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_lending_flow_over_http() {
    let app = setup_app().await;
    let token = token_for(&app, "librarian", "acme").await;

    let (_, created) = send(&app, "POST", "/api/books", Some(new_book("Paula")), None).await;
    let copy_id = created["id"].as_i64().unwrap();
    let borrow = json!({
        "copyId": copy_id,
        "borrowerName": "Ana",
        "expectedReturnDate": "2999-01-01",
    });

    let (status, body) = send(&app, "POST", "/api/borrow", Some(borrow.clone()), Some(&token)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    let record_id = body["borrowRecord"]["id"].as_i64().unwrap();
    assert_eq!(body["borrowRecord"]["status"], "borrowed");

    let (status, body) = send(&app, "POST", "/api/borrow", Some(borrow), Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["kind"], "conflict");

    let (status, body) = send(&app, "GET", "/api/active", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["records"].as_array().unwrap().len(), 1);
    assert_eq!(body["records"][0]["bookDetails"]["title"], "Paula");
    assert_eq!(body["records"][0]["borrowedByName"], "librarian");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/return/{}", record_id),
        Some(json!({ "comments": "fine" })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["borrowRecord"]["status"], "returned");

    let (status, body) = send(&app, "GET", "/api/history?status=returned", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["records"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, "GET", "/api/borrower-names", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["borrowerNames"], json!(["Ana"]));

    let (status, body) = send(&app, "POST", "/api/return/999", None, Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_equipment_crud() {
    let app = setup_app().await;

    let (status, created) = send(
        &app,
        "POST",
        "/api/equipment",
        Some(json!({ "description": "Projector" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["code"].as_str().unwrap().starts_with("EQ-"));
    assert_eq!(created["status"], "available");
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(&app, "POST", "/api/equipment", Some(json!({ "code": "X1" })), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/equipment/{}", id),
        Some(json!({ "status": "maintenance" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "maintenance");
    assert_eq!(updated["description"], "Projector");

    let (status, list) = send(&app, "GET", "/api/equipment", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "DELETE", &format!("/api/equipment/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, "GET", &format!("/api/equipment/{}", id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Equipment not found");
}

#[tokio::test]
async fn test_malformed_copy_bodies_are_rejected() {
    let app = setup_app().await;

    let (_, created) = send(&app, "POST", "/api/books", Some(new_book("Paula")), None).await;
    let id = created["id"].as_i64().unwrap();
    let (_, second) = send(&app, "POST", &format!("/api/books/{}/copy", id), None, None).await;
    let second_id = second["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/books/{}/decrease-copy", id),
        Some(json!({ "copyId": second_id.to_string() })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");

    // Neither copy was removed
    let (status, view) = send(&app, "GET", &format!("/api/books/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["copiesCount"], 2);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/books/{}/copy", id),
        Some(json!({ "condition": 5, "location": "Shelf Z" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");

    let (_, view) = send(&app, "GET", &format!("/api/books/{}", id), None, None).await;
    assert_eq!(view["copiesCount"], 2);

    let (status, _) = send_raw(&app, "POST", &format!("/api/books/{}/copy", id), "{oops", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_json_rejections_use_the_error_envelopes() {
    let app = setup_app().await;
    let token = token_for(&app, "librarian", "acme").await;

    let (status, body) = send_raw(&app, "POST", "/api/books", "{not json", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
    assert!(body["message"].as_str().unwrap().starts_with("Invalid request body"));
    assert!(body.get("success").is_none());

    let (status, body) = send(
        &app,
        "POST",
        "/api/borrow",
        Some(json!({ "copyId": "1", "borrowerName": "Ana", "expectedReturnDate": "2999-01-01" })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["kind"], "validation");

    let (status, body) = send(&app, "POST", "/api/auth/login", Some(json!({ "email": "x" })), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = send_raw(&app, "POST", "/api/return/1", "[", Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_page_far_past_the_end_is_empty() {
    let app = setup_app().await;
    send(&app, "POST", "/api/books", Some(new_book("Paula")), None).await;

    let (status, body) = send(
        &app,
        "GET",
        "/api/books?company=acme&page=9223372036854775807",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["books"], json!([]));
    assert_eq!(body["totalBooks"], 1);

    let (status, _) = send(&app, "GET", "/api/books?company=acme&page=18446744073709551615", None, None).await;
    assert_eq!(status, StatusCode::OK);
}
