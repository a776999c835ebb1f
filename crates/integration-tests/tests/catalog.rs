//! Catalog, search and recommendations.
//!
//! Requires a seeded database (`lj-cli seed`) and a running storefront.

#![allow(clippy::unwrap_used)]

use luxe_jewel_integration_tests::{any_product, client, url};
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_health() {
    let resp = client().get(url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let resp = client().get(url("/health/ready")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_home_payload() {
    let home: Value = client().get(url("/")).send().await.unwrap().json().await.unwrap();

    let featured = home["featured"].as_array().unwrap();
    assert!(featured.len() <= 8);
    assert!(featured.iter().all(|p| p["is_featured"] == true));
    assert!(home["new_arrivals"].as_array().unwrap().len() <= 4);
    assert!(!home["categories"].as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_listing_sorted_by_price() {
    let listing: Value = client()
        .get(url("/products?sort=price-low"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let prices: Vec<f64> = listing["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["price"].as_str().unwrap().parse().unwrap())
        .collect();
    assert!(prices.windows(2).all(|w| w[0] <= w[1]), "{prices:?}");
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_product_detail_and_missing_product() {
    let client = client();
    let product = any_product(&client).await;
    let slug = product["slug"].as_str().unwrap();

    let resp = client.get(url(&format!("/products/{slug}"))).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let detail: Value = resp.json().await.unwrap();
    assert_eq!(detail["slug"], slug);
    assert!(detail["reviews"].is_array());

    let resp = client
        .get(url("/api/products/no-such-product"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Product not found");
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_keyword_search() {
    let client = client();

    let resp = client.get(url("/api/search")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .get(url("/api/search?minPrice=0&maxPrice=100&sortBy=price-high"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    let results = body["results"].as_array().unwrap();
    assert_eq!(body["count"], results.len());
    assert!(
        results
            .iter()
            .all(|p| p["price"].as_str().unwrap().parse::<f64>().unwrap() <= 100.0)
    );
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_recommendations_are_a_bare_array() {
    let client = client();
    let product = any_product(&client).await;

    let recs: Vec<Value> = client
        .get(url(&format!("/api/recommendations?productId={}&count=3", product["id"])))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(recs.len() <= 3);
    assert!(recs.iter().all(|p| p["id"] != product["id"]));
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_ai_search_requires_input() {
    let resp = client()
        .post(url("/api/search/ai"))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Image or query text is required");
}
