//! Carts, wishlists, orders, reviews and checkout.
//!
//! Requires a seeded database (`lj-cli seed`) and a running storefront,
//! ideally with `PAYMENT_MOCK_DELAY_SCALE=0`.

#![allow(clippy::unwrap_used)]

use luxe_jewel_integration_tests::{any_product, client, register, url};
use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_anonymous_server_cart() {
    let client = client();
    let product = any_product(&client).await;
    let session_id = Uuid::new_v4().to_string();

    let resp = client.get(url("/api/cart")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Adding twice merges into one line
    for _ in 0..2 {
        let resp = client
            .post(url("/api/cart"))
            .json(&json!({ "productId": product["id"], "quantity": 2, "sessionId": session_id }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let lines: Vec<Value> = client
        .get(url("/api/cart"))
        .header("x-session-id", &session_id)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"], 4);

    let resp = client
        .put(url("/api/cart"))
        .json(&json!({ "id": lines[0]["id"], "quantity": 0 }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Item removed");

    let resp = client
        .delete(url(&format!("/api/cart?sessionId={session_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_server_cart_lists_newest_first() {
    let client = client();
    let products: Vec<Value> = client
        .get(url("/api/products"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(products.len() >= 2, "seed the catalog first");
    let session_id = Uuid::new_v4().to_string();

    for product in &products[..2] {
        let resp = client
            .post(url("/api/cart"))
            .json(&json!({ "productId": product["id"], "sessionId": session_id }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let lines: Vec<Value> = client
        .get(url("/api/cart"))
        .header("x-session-id", &session_id)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["product_id"], products[1]["id"]);
    assert_eq!(lines[1]["product_id"], products[0]["id"]);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_wishlist_duplicate_conflicts() {
    let client = client();
    let user = register(&client).await;
    let product = any_product(&client).await;
    let body = json!({ "userId": user["id"], "productId": product["id"] });

    let resp = client.post(url("/api/wishlist")).json(&body).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client.post(url("/api/wishlist")).json(&body).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let error: Value = resp.json().await.unwrap();
    assert_eq!(error["error"], "Item already in wishlist");

    let membership: Value = client
        .get(url(&format!(
            "/api/wishlist?userId={}&productId={}",
            user["id"], product["id"]
        )))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(membership["inWishlist"], true);

    let resp = client
        .delete(url(&format!(
            "/api/wishlist?userId={}&productId={}",
            user["id"], product["id"]
        )))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_review_lifecycle_updates_rating() {
    let client = client();
    let user = register(&client).await;
    let product = any_product(&client).await;

    let resp = client
        .post(url("/api/reviews"))
        .json(&json!({ "productId": product["id"], "rating": 6 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .post(url("/api/reviews"))
        .json(&json!({
            "productId": product["id"],
            "userId": user["id"],
            "rating": 5,
            "comment": "Stunning in person.",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let review: Value = resp.json().await.unwrap();

    let resp = client
        .put(url("/api/reviews"))
        .json(&json!({ "id": review["id"], "rating": 4 }))
        .send()
        .await
        .unwrap();
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["rating"], 4);

    let resp = client
        .delete(url(&format!("/api/reviews?id={}", review["id"])))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Review deleted successfully");
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_order_api() {
    let client = client();
    let user = register(&client).await;
    let product = any_product(&client).await;

    let resp = client
        .post(url("/api/orders"))
        .json(&json!({ "userId": user["id"], "items": [], "totalAmount": "10.00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .post(url("/api/orders"))
        .json(&json!({
            "userId": user["id"],
            "items": [{ "productId": product["id"], "quantity": 1, "price": product["price"] }],
            "subtotal": product["price"],
            "totalAmount": product["price"],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = resp.json().await.unwrap();
    assert!(order["order_number"].as_str().unwrap().starts_with("ORD-"));
    assert_eq!(order["payment_status"], "paid");
    assert_eq!(order["payment_method"], "mock");

    let resp = client
        .put(url("/api/orders"))
        .json(&json!({ "id": order["id"], "status": "teleported" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .put(url("/api/orders"))
        .json(&json!({ "id": order["id"], "status": "shipped" }))
        .send()
        .await
        .unwrap();
    let shipped: Value = resp.json().await.unwrap();
    assert_eq!(shipped["status"], "shipped");

    let detail: Value = client
        .get(url(&format!("/api/orders?orderId={}", order["id"])))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_checkout_flow() {
    let client = client();

    // Checkout needs a login
    let resp = client.get(url("/checkout")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let user = register(&client).await;
    let product = any_product(&client).await;

    // An empty cart sends the shopper back to the cart
    let resp = client.get(url("/checkout")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/cart");

    let resp = client
        .post(url("/cart/add"))
        .json(&json!({ "productId": product["id"], "quantity": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .post(url("/checkout/payment"))
        .json(&json!({
            "cardNumber": "4242424242424242",
            "cardName": "Test Customer",
            "expiry": "12/30",
            "cvv": "123",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = client
        .post(url("/checkout/shipping"))
        .json(&json!({
            "firstName": "Test",
            "lastName": "Customer",
            "email": user["email"],
            "address": "1 Diamond Way",
            "city": "New York",
            "state": "NY",
            "zip": "10001",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let view: Value = resp.json().await.unwrap();
    assert_eq!(view["step"], "payment");

    let resp = client
        .post(url("/checkout/payment"))
        .json(&json!({
            "cardNumber": "4242424242424242",
            "cardName": "Test Customer",
            "expiry": "12/30",
            "cvv": "123",
        }))
        .send()
        .await
        .unwrap();

    // The mock gateway declines a share of charges at random
    match resp.status() {
        StatusCode::OK => {
            let view: Value = resp.json().await.unwrap();
            assert_eq!(view["step"], "complete");
            assert!(view["order"]["order_number"].as_str().unwrap().starts_with("ORD-"));

            let cart: Value = client.get(url("/cart")).send().await.unwrap().json().await.unwrap();
            assert_eq!(cart["itemCount"], 0);
        }
        StatusCode::PAYMENT_REQUIRED => {
            let body: Value = resp.json().await.unwrap();
            assert!(body["error"].as_str().is_some());
        }
        other => panic!("unexpected checkout status {other}"),
    }
}
