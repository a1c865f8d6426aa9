//! API integration tests
//!
//! These run against a live server with a seeded admin account.
//! Run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to get an authenticated client
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@libris.local",
            "password": "admin-password"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Create a member and an item with the given stock, returning their ids
async fn seed_member_and_item(client: &Client, token: &str, copies: i64) -> (String, String) {
    let response = client
        .post(format!("{}/members", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "name": "Test Member",
            "email": format!("member-{}@example.com", uuid::Uuid::new_v4())
        }))
        .send()
        .await
        .expect("Failed to create member");
    assert_eq!(response.status(), 201);
    let member: Value = response.json().await.expect("Failed to parse member");
    let member_id = member["id"].as_str().unwrap().to_string();

    let response = client
        .post(format!("{}/items", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "title": "Test Book" }))
        .send()
        .await
        .expect("Failed to create item");
    assert_eq!(response.status(), 201);
    let item: Value = response.json().await.expect("Failed to parse item");
    let item_id = item["id"].as_str().unwrap().to_string();

    if copies > 0 {
        let response = client
            .post(format!("{}/stock-entries", BASE_URL))
            .header("Authorization", format!("Bearer {}", token))
            .json(&json!({ "item_id": item_id, "quantity": copies }))
            .send()
            .await
            .expect("Failed to add stock");
        assert_eq!(response.status(), 201);
    }

    (member_id, item_id)
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@libris.local",
            "password": "admin-password"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@libris.local",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/items", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_loan_lifecycle_moves_quantity() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let (member_id, item_id) = seed_member_and_item(&client, &token, 2).await;

    // Issue a loan: quantity 2 -> 1
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "item_id": item_id,
            "member_id": member_id,
            "due_date": "2099-01-01T00:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to issue loan");
    assert_eq!(response.status(), 201);
    let loan: Value = response.json().await.expect("Failed to parse loan");
    let loan_id = loan["id"].as_str().unwrap().to_string();

    let response = client
        .get(format!("{}/items/{}", BASE_URL, item_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to fetch item");
    let item: Value = response.json().await.unwrap();
    assert_eq!(item["quantity"], 1);

    // Return it: quantity back to 2
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to return loan");
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "returned");

    // A replayed return is a no-op, not a second credit
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to replay return");
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "already_returned");

    let response = client
        .get(format!("{}/items/{}", BASE_URL, item_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to fetch item");
    let item: Value = response.json().await.unwrap();
    assert_eq!(item["quantity"], 2);
}

#[tokio::test]
#[ignore]
async fn test_issue_rejected_when_no_copies() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let (member_id, item_id) = seed_member_and_item(&client, &token, 0).await;

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "item_id": item_id,
            "member_id": member_id,
            "due_date": "2099-01-01T00:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_reservation_lifecycle() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let (member_id, item_id) = seed_member_and_item(&client, &token, 1).await;

    // Reserve: no effect on quantity
    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "item_id": item_id, "member_id": member_id }))
        .send()
        .await
        .expect("Failed to reserve");
    assert_eq!(response.status(), 201);
    let reservation: Value = response.json().await.unwrap();
    assert_eq!(reservation["status"], "pending");
    let reservation_id = reservation["id"].as_str().unwrap().to_string();

    let response = client
        .get(format!("{}/items/{}", BASE_URL, item_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    let item: Value = response.json().await.unwrap();
    assert_eq!(item["quantity"], 1);

    // Fulfill: converts to a loan and claims the copy
    let response = client
        .post(format!("{}/reservations/{}/fulfill", BASE_URL, reservation_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "due_date": "2099-01-01T00:00:00Z" }))
        .send()
        .await
        .expect("Failed to fulfill");
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["reservation"]["status"], "fulfilled");

    // Terminal state: cancelling now conflicts
    let response = client
        .post(format!("{}/reservations/{}/cancel", BASE_URL, reservation_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send cancel");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_member_role_cannot_issue_loans() {
    let client = Client::new();

    // Fresh registrations start as plain members
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "username": "plainmember",
            "email": format!("user-{}@example.com", uuid::Uuid::new_v4()),
            "password": "long-enough-password"
        }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    let member_token = body["token"].as_str().unwrap().to_string();

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", member_token))
        .json(&json!({
            "item_id": uuid::Uuid::new_v4().to_string(),
            "member_id": uuid::Uuid::new_v4().to_string(),
            "due_date": "2099-01-01T00:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}
