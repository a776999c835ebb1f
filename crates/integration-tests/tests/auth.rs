//! Account registration, login and access control.
//!
//! Requires a migrated database and a running storefront.

#![allow(clippy::unwrap_used)]

use luxe_jewel_integration_tests::{TEST_PASSWORD, client, register, unique_email, url};
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_register_login_logout() {
    let client = client();
    let user = register(&client).await;
    let email = user["email"].as_str().unwrap().to_owned();
    assert_eq!(user["role"], "customer");

    let resp = client.get(url("/profile")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let profile: Value = resp.json().await.unwrap();
    assert_eq!(profile["email"], email.as_str());

    let resp = client.post(url("/logout")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client.get(url("/profile")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = client
        .post(url("/login"))
        .json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_login_rejects_wrong_password() {
    let client = client();
    let user = register(&client).await;
    client.post(url("/logout")).send().await.unwrap();

    let resp = client
        .post(url("/login"))
        .json(&json!({ "email": user["email"], "password": "not-the-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_register_validation() {
    let client = client();

    let resp = client
        .post(url("/register"))
        .json(&json!({
            "email": unique_email(),
            "password": "abc",
            "confirmPassword": "abc",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .post(url("/register"))
        .json(&json!({
            "email": unique_email(),
            "password": TEST_PASSWORD,
            "confirmPassword": "something-else",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_duplicate_registration_conflicts() {
    let first = client();
    let user = register(&first).await;

    let resp = client()
        .post(url("/register"))
        .json(&json!({
            "email": user["email"],
            "password": TEST_PASSWORD,
            "confirmPassword": TEST_PASSWORD,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_customers_cannot_reach_admin() {
    let client = client();
    register(&client).await;

    let resp = client.get(url("/admin")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/");

    // Logged-in users are sent home from auth pages
    let resp = client.get(url("/login")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}
