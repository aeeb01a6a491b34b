//! API integration tests
//!
//! Drive the full router in-process; every test starts from an empty store.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use bibliotheca_server::{
    api,
    clock::SystemClock,
    config::{AppConfig, LendingConfig},
    repository::Repository,
    services::{notifications::LogNotifier, Services},
    AppState,
};

fn app_with(lending: LendingConfig) -> Router {
    let config = AppConfig {
        lending: lending.clone(),
        ..AppConfig::default()
    };
    let services = Services::new(
        Repository::new(),
        lending,
        Arc::new(SystemClock),
        Arc::new(LogNotifier),
    );
    api::router(AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    })
}

fn app() -> Router {
    app_with(LendingConfig::default())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(format!("/api/v1{}", uri));
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        tokio_test::assert_ok!(serde_json::from_slice::<Value>(&bytes))
    };
    (status, body)
}

async fn create_user(app: &Router, username: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/users",
        Some(json!({ "username": username, "email": format!("{}@example.org", username) })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_i64().unwrap()
}

async fn create_book(app: &Router, title: &str, copies: u32) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/books",
        Some(json!({ "title": title, "available_copies": copies })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_i64().unwrap()
}

async fn borrow(app: &Router, user: i64, book: i64) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/borrows",
        Some(json!({ "user_id": user, "book_id": book })),
    )
    .await
}

async fn join(app: &Router, user: i64, book: i64) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        &format!("/books/{}/queue", book),
        Some(json!({ "user_id": user })),
    )
    .await
}

#[tokio::test]
async fn test_health_check() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_borrow_and_return_flow() {
    let app = app();
    let alice = create_user(&app, "alice").await;
    let book = create_book(&app, "Dune", 2).await;

    let (status, borrowed) = borrow(&app, alice, book).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(borrowed["origin"], "direct");
    assert_eq!(borrowed["duration_days"], 14);
    assert!(borrowed["returned_at"].is_null());

    let (_, details) = send(&app, Method::GET, &format!("/books/{}", book), None).await;
    assert_eq!(details["available_copies"], 1);
    assert_eq!(details["borrowed_copies"], 1);

    let borrow_id = borrowed["id"].as_i64().unwrap();
    let (status, returned) = send(
        &app,
        Method::POST,
        &format!("/borrows/{}/return", borrow_id),
        Some(json!({ "user_id": alice })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(returned["returned_at"].is_string());

    let (_, details) = send(&app, Method::GET, &format!("/books/{}", book), None).await;
    assert_eq!(details["available_copies"], 2);

    let (status, body) = send(&app, Method::POST, &format!("/borrows/{}/return", borrow_id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Conflict");
}

#[tokio::test]
async fn test_return_hands_copy_to_first_in_queue() {
    let app = app();
    let holder = create_user(&app, "holder").await;
    let x = create_user(&app, "xavier").await;
    let y = create_user(&app, "yvonne").await;
    let book = create_book(&app, "Solaris", 1).await;

    let (_, held) = borrow(&app, holder, book).await;
    let (status, _) = join(&app, x, book).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, membership) = join(&app, y, book).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(membership["position"], 2);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/borrows/{}/return", held["id"]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, borrows) = send(&app, Method::GET, &format!("/users/{}/borrows?active=true", x), None).await;
    let borrows = borrows.as_array().unwrap();
    assert_eq!(borrows.len(), 1);
    assert_eq!(borrows[0]["book_id"], book);
    assert_eq!(borrows[0]["origin"], "queue");

    let (_, queue) = send(&app, Method::GET, &format!("/books/{}/queue", book), None).await;
    let queue = queue.as_array().unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0]["user_id"], y);
    assert_eq!(queue[0]["position"], 1);

    let (_, notes) = send(&app, Method::GET, &format!("/users/{}/notifications", x), None).await;
    assert_eq!(notes.as_array().unwrap().len(), 1);
    let (_, notes) = send(&app, Method::GET, &format!("/users/{}/notifications", y), None).await;
    assert!(notes.as_array().unwrap().is_empty());

    let (_, details) = send(&app, Method::GET, &format!("/books/{}", book), None).await;
    assert_eq!(details["available_copies"], 0);
    assert_eq!(details["queue_length"], 1);
}

#[tokio::test]
async fn test_borrow_limit_is_enforced() {
    let app = app();
    let alice = create_user(&app, "alice").await;
    for title in ["A", "B", "C"] {
        let book = create_book(&app, title, 1).await;
        let (status, _) = borrow(&app, alice, book).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let fourth = create_book(&app, "D", 1).await;

    let (status, body) = borrow(&app, alice, fourth).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("already has 3 books"));
    let (_, details) = send(&app, Method::GET, &format!("/books/{}", fourth), None).await;
    assert_eq!(details["available_copies"], 1);
}

#[tokio::test]
async fn test_queue_rules_over_http() {
    let app = app();
    let alice = create_user(&app, "alice").await;
    let bob = create_user(&app, "bob").await;
    let book = create_book(&app, "Dune", 1).await;

    // A copy is on the shelf: nothing to wait for
    let (status, _) = join(&app, alice, book).await;
    assert_eq!(status, StatusCode::CONFLICT);

    borrow(&app, bob, book).await;
    let (status, entry) = join(&app, alice, book).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = join(&app, alice, book).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Only the owner may drop an entry
    let entry_id = entry["id"].as_i64().unwrap();
    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/queue/{}?user_id={}", entry_id, bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "NotOwner");

    let (status, _) = send(&app, Method::DELETE, &format!("/queue/{}", entry_id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/books/{}/queue/{}", book, alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/books/{}/queue/{}", book, alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_queued_users_claim_spare_copies_first() {
    let app = app_with(LendingConfig {
        queue_when_available: true,
        ..LendingConfig::default()
    });
    let alice = create_user(&app, "alice").await;
    let carol = create_user(&app, "carol").await;
    let book = create_book(&app, "Dune", 1).await;

    let (status, _) = join(&app, alice, book).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = borrow(&app, carol, book).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("reserved"));

    let (status, _) = borrow(&app, alice, book).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, queue) = send(&app, Method::GET, &format!("/users/{}/queue", alice), None).await;
    assert!(queue.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_restock_serves_the_queue() {
    let app = app();
    let alice = create_user(&app, "alice").await;
    let bob = create_user(&app, "bob").await;
    let book = create_book(&app, "Dune", 0).await;
    join(&app, alice, book).await;
    join(&app, bob, book).await;

    let (status, details) = send(
        &app,
        Method::POST,
        &format!("/books/{}/copies", book),
        Some(json!({ "count": 1 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["available_copies"], 0);
    assert_eq!(details["borrowed_copies"], 1);
    assert_eq!(details["queue_length"], 1);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/books/{}/copies/withdraw", book),
        Some(json!({ "count": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/books/{}/copies", book),
        Some(json!({ "count": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reviews_require_a_borrow() {
    let app = app();
    let alice = create_user(&app, "alice").await;
    let bob = create_user(&app, "bob").await;
    let book = create_book(&app, "Dune", 1).await;

    let review = json!({ "user_id": alice, "book_id": book, "rating": 4, "comment": "Sandy" });
    let (status, _) = send(&app, Method::POST, "/reviews", Some(review.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);

    borrow(&app, alice, book).await;
    let (status, created) = send(&app, Method::POST, "/reviews", Some(review.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&app, Method::POST, "/reviews", Some(review)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        Method::POST,
        "/reviews",
        Some(json!({ "user_id": alice, "book_id": book, "rating": 9 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let review_id = created["id"].as_i64().unwrap();
    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/reviews/{}", review_id),
        Some(json!({ "user_id": alice, "rating": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["rating"], 5);
    assert_eq!(updated["comment"], "Sandy");

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/reviews/{}?user_id={}", review_id, bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, details) = send(&app, Method::GET, &format!("/books/{}", book), None).await;
    assert_eq!(details["review_count"], 1);
    assert_eq!(details["average_rating"], 5.0);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/reviews/{}?user_id={}", review_id, alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &format!("/reviews/{}", review_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_ids_and_duplicates() {
    let app = app();
    create_user(&app, "alice").await;

    let (status, body) = send(&app, Method::GET, "/users/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 2);

    let (status, _) = send(&app, Method::GET, "/borrows/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = borrow(&app, 42, 42).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        "/users",
        Some(json!({ "username": "alice", "email": "other@example.org" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        Method::POST,
        "/users",
        Some(json!({ "username": "zed", "email": "not-an-email" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_authors_and_categories_link_to_books() {
    let app = app();

    let (status, author) = send(&app, Method::POST, "/authors", Some(json!({ "name": "Frank Herbert" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let author_id = author["id"].as_i64().unwrap();

    let (status, category) = send(&app, Method::POST, "/categories", Some(json!({ "name": "Science fiction" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = category["id"].as_i64().unwrap();

    let (status, body) = send(&app, Method::POST, "/categories", Some(json!({ "name": "Science fiction" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Conflict");

    let (status, book) = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({
            "title": "Dune",
            "author_id": author_id,
            "category_ids": [category_id, category_id],
            "available_copies": 1
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", book);
    assert_eq!(book["author"]["name"], "Frank Herbert");
    assert_eq!(book["categories"].as_array().unwrap().len(), 1);
    let book_id = book["id"].as_i64().unwrap();

    let (_, author) = send(&app, Method::GET, &format!("/authors/{}", author_id), None).await;
    assert_eq!(author["books"], json!([book_id]));

    let (status, renamed) = send(
        &app,
        Method::PUT,
        &format!("/authors/{}", author_id),
        Some(json!({ "name": "F. Herbert" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["name"], "F. Herbert");

    let (status, _) = send(&app, Method::DELETE, &format!("/categories/{}", category_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &format!("/authors/{}", author_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, book) = send(&app, Method::GET, &format!("/books/{}", book_id), None).await;
    assert!(book["author"].is_null());
    assert_eq!(book["categories"], json!([]));

    let (status, _) = send(&app, Method::GET, &format!("/authors/{}", author_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({ "title": "Emma", "author_id": 99 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_book_update_raises_copies_through_the_queue() {
    let app = app();
    let alice = create_user(&app, "alice").await;
    let book = create_book(&app, "Dune", 0).await;
    join(&app, alice, book).await;

    let (status, details) = send(
        &app,
        Method::PUT,
        &format!("/books/{}", book),
        Some(json!({ "title": "Dune Messiah", "available_copies": 2 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", details);
    assert_eq!(details["title"], "Dune Messiah");
    assert_eq!(details["available_copies"], 1);
    assert_eq!(details["borrowed_copies"], 1);
    assert_eq!(details["queue_length"], 0);

    let (_, borrows) = send(&app, Method::GET, &format!("/users/{}/borrows", alice), None).await;
    assert_eq!(borrows[0]["origin"], "queue");

    // Only the shelf copy can be withdrawn
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/books/{}", book),
        Some(json!({ "available_copies": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let other = create_book(&app, "Emma", 1).await;
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/books/{}", other),
        Some(json!({ "title": "Dune Messiah" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_book_delete_waits_for_returns_and_clears_the_queue() {
    let app = app_with(LendingConfig {
        queue_when_available: true,
        ..LendingConfig::default()
    });
    let alice = create_user(&app, "alice").await;
    let bob = create_user(&app, "bob").await;
    let book = create_book(&app, "Dune", 1).await;

    let (_, borrowed) = borrow(&app, alice, book).await;
    let (status, _) = join(&app, bob, book).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, Method::DELETE, &format!("/books/{}", book), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Conflict");

    // The return hands the copy to bob, so the book is still lent out
    let borrow_id = borrowed["id"].as_i64().unwrap();
    send(&app, Method::POST, &format!("/borrows/{}/return", borrow_id), None).await;
    let (status, _) = send(&app, Method::DELETE, &format!("/books/{}", book), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, bob_borrows) = send(&app, Method::GET, &format!("/users/{}/borrows?active=true", bob), None).await;
    let bob_borrow = bob_borrows[0]["id"].as_i64().unwrap();
    send(&app, Method::POST, &format!("/borrows/{}/return", bob_borrow), None).await;

    // Alice queues again while the copy sits on the shelf
    let (status, _) = join(&app, alice, book).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(&app, Method::DELETE, &format!("/books/{}", book), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &format!("/books/{}", book), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, queue) = send(&app, Method::GET, &format!("/users/{}/queue", alice), None).await;
    assert_eq!(queue, json!([]));
    let (_, user) = send(&app, Method::GET, &format!("/users/{}", alice), None).await;
    assert_eq!(user["queue_memberships"], 0);
    assert_eq!(user["total_borrows"], 0);

    let (_, notes) = send(&app, Method::GET, &format!("/users/{}/notifications", alice), None).await;
    assert_eq!(notes.as_array().unwrap().last().unwrap()["subject"], "Reservation cancelled");
}

#[tokio::test]
async fn test_user_update_and_delete() {
    let app = app();
    let alice = create_user(&app, "alice").await;
    create_user(&app, "bob").await;
    let book = create_book(&app, "Dune", 1).await;

    let (status, user) = send(
        &app,
        Method::PUT,
        &format!("/users/{}", alice),
        Some(json!({ "firstname": "Alice", "email": "alice@library.org" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["firstname"], "Alice");
    assert_eq!(user["email"], "alice@library.org");
    assert_eq!(user["username"], "alice");

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/users/{}", alice),
        Some(json!({ "username": "bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, borrowed) = borrow(&app, alice, book).await;
    let (status, _) = send(&app, Method::DELETE, &format!("/users/{}", alice), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let borrow_id = borrowed["id"].as_i64().unwrap();
    send(&app, Method::POST, &format!("/borrows/{}/return", borrow_id), None).await;
    let (status, _) = send(&app, Method::DELETE, &format!("/users/{}", alice), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &format!("/users/{}", alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, details) = send(&app, Method::GET, &format!("/books/{}", book), None).await;
    assert_eq!(details["available_copies"], 1);
    assert_eq!(details["borrowed_copies"], 0);
}
