use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use tripnest_api::{app, state::AuthConfig, AppState};
use tripnest_catalog::{NewProduct, Product, ProductCategory};
use tripnest_store::app_config::BusinessRules;
use tripnest_store::Repositories;

struct TestApp {
    router: Router,
    repos: Repositories,
}

impl TestApp {
    fn new() -> Self {
        Self::with_payment_delay(0)
    }

    fn with_payment_delay(payment_delay_ms: u64) -> Self {
        let repos = Repositories::in_memory();
        let state = AppState::new(
            repos.clone(),
            AuthConfig {
                secret: "integration-secret".to_string(),
                expiration: 3600,
            },
            BusinessRules {
                cart_ttl_seconds: 60,
                payment_delay_ms,
                currency: "USD".to_string(),
            },
        );
        Self {
            router: app(state),
            repos,
        }
    }

    async fn seeded() -> Self {
        let test_app = Self::new();
        tripnest_store::seed::seed_demo_data(&test_app.repos).await.unwrap();
        test_app
    }

    async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn guest_token(&self) -> String {
        self.guest_session().await.0
    }

    async fn guest_session(&self) -> (String, Uuid) {
        let (status, body) = self.send(Method::POST, "/api/auth/guest", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let user_id = body["userId"].as_str().unwrap().parse().unwrap();
        (body["token"].as_str().unwrap().to_string(), user_id)
    }

    async fn product_with_stock(&self, quantity: i32) -> Uuid {
        self.priced_product(299.0, quantity).await
    }

    async fn priced_product(&self, price: f64, quantity: i32) -> Uuid {
        let product = Product::new(NewProduct {
            name: "Luxury Beach Resort".to_string(),
            description: "Beachfront rooms".to_string(),
            price,
            quantity: Some(quantity),
            category: ProductCategory::Hotel,
            image: "/images/resort.jpeg".to_string(),
            location: "Bali, Indonesia".to_string(),
            rating: Some(4.8),
        });
        self.repos.products.create_product(&product).await.unwrap();
        product.id
    }

    async fn quantity(&self, product_id: Uuid) -> i32 {
        self.repos.products.get_product(product_id).await.unwrap().unwrap().quantity
    }
}

fn days_from_now(days: i64) -> String {
    (Utc::now().date_naive() + Duration::days(days)).to_string()
}

fn hotel_booking(product_id: Option<Uuid>) -> Value {
    json!({
        "firstName": "Grace",
        "lastName": "Hopper",
        "email": "grace@example.com",
        "phone": "555-0199",
        "guests": "2",
        "checkIn": days_from_now(30),
        "checkOut": days_from_now(33),
        "roomType": "Deluxe",
        "hotelName": "Luxury Beach Resort",
        "hotelLocation": "Bali, Indonesia",
        "totalPrice": 897.0,
        "productId": product_id.map(|id| id.to_string()),
    })
}

// ============================================================================
// Sessions and routing
// ============================================================================

#[tokio::test]
async fn test_protected_routes_require_a_session() {
    let test_app = TestApp::new();

    let (status, body) = test_app.send(Method::GET, "/api/bookings/my-bookings", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Authentication required");

    let (status, _) = test_app
        .send(Method::GET, "/api/cart", Some("not-a-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_cookie_is_accepted() {
    let test_app = TestApp::new();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/guest")
        .body(Body::empty())
        .unwrap();
    let response = test_app.router.clone().oneshot(request).await.unwrap();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("tripnest_session="));

    let request = Request::builder()
        .uri("/api/cart")
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    let response = test_app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_and_welcome() {
    let test_app = TestApp::new();

    let (status, body) = test_app.send(Method::GET, "/api/nothing-here", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Route not found");

    let (status, body) = test_app.send(Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("TripNest"));
}

// ============================================================================
// Bookings and inventory
// ============================================================================

#[tokio::test]
async fn test_each_booking_takes_one_unit() {
    let test_app = TestApp::new();
    let token = test_app.guest_token().await;
    let product_id = test_app.product_with_stock(5).await;

    for _ in 0..3 {
        let (status, body) = test_app
            .send(Method::POST, "/api/bookings/hotel", Some(&token), Some(hotel_booking(Some(product_id))))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Hotel booking created successfully");
        assert_eq!(body["quantityReduced"], true);
        assert_eq!(body["booking"]["status"], "pending");
    }
    assert_eq!(test_app.quantity(product_id).await, 2);

    let (status, body) = test_app
        .send(Method::GET, &format!("/api/products/{}/ledger", product_id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["netChange"], -3);
    assert_eq!(body["movements"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_sold_out_product_rejects_booking() {
    let test_app = TestApp::new();
    let token = test_app.guest_token().await;
    let product_id = test_app.product_with_stock(0).await;

    let (status, body) = test_app
        .send(Method::POST, "/api/bookings/hotel", Some(&token), Some(hotel_booking(Some(product_id))))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Sorry, this hotel is currently fully booked");

    let (_, bookings) = test_app
        .send(Method::GET, "/api/bookings/my-bookings", Some(&token), None)
        .await;
    assert!(bookings.as_array().unwrap().is_empty());
    assert_eq!(test_app.quantity(product_id).await, 0);
}

#[tokio::test]
async fn test_booking_without_product_and_unknown_product() {
    let test_app = TestApp::new();
    let token = test_app.guest_token().await;

    let (status, body) = test_app
        .send(Method::POST, "/api/bookings/hotel", Some(&token), Some(hotel_booking(None)))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["quantityReduced"], false);

    let (status, body) = test_app
        .send(Method::POST, "/api/bookings/hotel", Some(&token), Some(hotel_booking(Some(Uuid::new_v4()))))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");
}

#[tokio::test]
async fn test_booking_validation_errors() {
    let test_app = TestApp::new();
    let token = test_app.guest_token().await;

    let mut reversed = hotel_booking(None);
    reversed["checkIn"] = json!(days_from_now(40));
    reversed["checkOut"] = json!(days_from_now(38));
    let (status, body) = test_app
        .send(Method::POST, "/api/bookings/hotel", Some(&token), Some(reversed))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid checkOut: must be after the check-in date");

    let mut missing = hotel_booking(None);
    missing["hotelName"] = Value::Null;
    let (status, body) = test_app
        .send(Method::POST, "/api/bookings/hotel", Some(&token), Some(missing))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing required field: hotelName");
}

#[tokio::test]
async fn test_restaurant_and_attraction_bookings() {
    let test_app = TestApp::new();
    let token = test_app.guest_token().await;

    let (status, body) = test_app
        .send(
            Method::POST,
            "/api/bookings/restaurant",
            Some(&token),
            Some(json!({
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "ada@example.com",
                "phone": "555-0100",
                "guests": 4,
                "reservationDate": days_from_now(10),
                "reservationTime": "19:30",
                "reservationType": "Birthday/Anniversary",
                "restaurantName": "Sahara Spice Restaurant",
                "restaurantLocation": "Marrakech, Morocco"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Restaurant booking created successfully");
    assert_eq!(body["booking"]["guests"], "4");

    let (status, body) = test_app
        .send(
            Method::POST,
            "/api/bookings/attraction",
            Some(&token),
            Some(json!({
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "ada@example.com",
                "phone": "555-0100",
                "guests": "2",
                "attractionName": "Paris Art History Tour",
                "date": days_from_now(12),
                "time": "10:00",
                "attractionLocation": "Paris, France"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["booking"]["attraction"], "Paris Art History Tour");
}

#[tokio::test]
async fn test_cancel_releases_the_unit_once() {
    let test_app = TestApp::new();
    let token = test_app.guest_token().await;
    let product_id = test_app.product_with_stock(2).await;

    let (_, body) = test_app
        .send(Method::POST, "/api/bookings/hotel", Some(&token), Some(hotel_booking(Some(product_id))))
        .await;
    let booking_id = body["booking"]["id"].as_str().unwrap().to_string();
    assert_eq!(test_app.quantity(product_id).await, 1);

    let uri = format!("/api/bookings/{}", booking_id);
    let (status, body) = test_app.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["booking"]["status"], "cancelled");
    assert_eq!(test_app.quantity(product_id).await, 2);

    let (status, body) = test_app.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Only pending bookings can be cancelled");

    // Re-setting the current status is a no-op
    let (status, _) = test_app
        .send(Method::PATCH, &format!("{}/status", uri), Some(&token), Some(json!({ "status": "cancelled" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(test_app.quantity(product_id).await, 2);
}

#[tokio::test]
async fn test_status_transitions() {
    let test_app = TestApp::new();
    let token = test_app.guest_token().await;
    let product_id = test_app.product_with_stock(1).await;

    let (_, body) = test_app
        .send(Method::POST, "/api/bookings/hotel", Some(&token), Some(hotel_booking(Some(product_id))))
        .await;
    let uri = format!("/api/bookings/{}", body["booking"]["id"].as_str().unwrap());
    let status_uri = format!("{}/status", uri);

    let (status, body) = test_app
        .send(Method::PATCH, &status_uri, Some(&token), Some(json!({ "status": "archived" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid status");

    let (status, body) = test_app
        .send(Method::PATCH, &status_uri, Some(&token), Some(json!({ "status": "confirmed" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Booking status updated");
    assert_eq!(body["booking"]["status"], "confirmed");

    // Only pending bookings go through DELETE
    let (status, _) = test_app.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(test_app.quantity(product_id).await, 0);

    // confirmed -> cancelled releases the unit
    let (status, _) = test_app
        .send(Method::PATCH, &status_uri, Some(&token), Some(json!({ "status": "cancelled" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(test_app.quantity(product_id).await, 1);

    let (status, _) = test_app
        .send(Method::PATCH, &status_uri, Some(&token), Some(json!({ "status": "completed" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_concurrent_bookings_for_last_unit() {
    let test_app = TestApp::new();
    let first = test_app.guest_token().await;
    let second = test_app.guest_token().await;
    let product_id = test_app.product_with_stock(1).await;

    let (a, b) = tokio::join!(
        test_app.send(Method::POST, "/api/bookings/hotel", Some(&first), Some(hotel_booking(Some(product_id)))),
        test_app.send(Method::POST, "/api/bookings/hotel", Some(&second), Some(hotel_booking(Some(product_id)))),
    );

    let created = [a.0, b.0].iter().filter(|s| **s == StatusCode::CREATED).count();
    assert_eq!(created, 1);
    assert!([a.0, b.0].contains(&StatusCode::BAD_REQUEST));
    assert_eq!(test_app.quantity(product_id).await, 0);
}

#[tokio::test]
async fn test_bookings_are_private_and_paged() {
    let test_app = TestApp::new();
    let owner = test_app.guest_token().await;
    let stranger = test_app.guest_token().await;

    let mut ids = Vec::new();
    for _ in 0..3 {
        let (_, body) = test_app
            .send(Method::POST, "/api/bookings/hotel", Some(&owner), Some(hotel_booking(None)))
            .await;
        ids.push(body["booking"]["id"].as_str().unwrap().to_string());
    }

    let (status, _) = test_app
        .send(Method::GET, &format!("/api/bookings/{}", ids[0]), Some(&stranger), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = test_app
        .send(Method::GET, "/api/users/bookings?limit=2&page=2", Some(&owner), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["total"], 3);
    assert_eq!(body["page"], 2);
    assert_eq!(body["totalPages"], 2);

    let (_, body) = test_app
        .send(Method::GET, "/api/users/bookings?type=restaurant", Some(&owner), None)
        .await;
    assert_eq!(body["total"], 0);
}

// ============================================================================
// Cart and checkout
// ============================================================================

fn cart_entry(id: &str, item_type: &str, product_id: Uuid) -> Value {
    json!({ "id": id, "name": format!("Entry {}", id), "type": item_type, "productId": product_id })
}

#[tokio::test]
async fn test_cart_merges_and_totals() {
    let test_app = TestApp::new();
    let token = test_app.guest_token().await;
    let resort = test_app.priced_product(100.0, 5).await;
    let tour = test_app.priced_product(50.0, 5).await;

    // A client-side price is ignored
    let mut item = cart_entry("hotel-1", "hotel", resort);
    item["bookingDate"] = json!("2030-06-01");
    item["price"] = json!(1.0);
    test_app.send(Method::POST, "/api/cart/add", Some(&token), Some(item.clone())).await;
    let (status, body) = test_app.send(Method::POST, "/api/cart/add", Some(&token), Some(item)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["itemCount"], 1);
    assert_eq!(body["items"][0]["quantity"], 2);
    assert_eq!(body["items"][0]["price"], 100.0);

    let (_, body) = test_app
        .send(Method::POST, "/api/cart/add", Some(&token), Some(cart_entry("tour-9", "attraction", tour)))
        .await;
    assert_eq!(body["itemCount"], 2);
    assert_eq!(body["subtotal"], 250.0);
    assert_eq!(body["tax"], 37.5);
    assert_eq!(body["total"], 287.5);

    // Below 1 is ignored
    let (_, body) = test_app
        .send(Method::PUT, "/api/cart/update/tour-9", Some(&token), Some(json!({ "quantity": 0 })))
        .await;
    assert_eq!(body["subtotal"], 250.0);

    let (_, body) = test_app.send(Method::DELETE, "/api/cart/remove/hotel-1", Some(&token), None).await;
    assert_eq!(body["subtotal"], 50.0);

    let (_, body) = test_app.send(Method::DELETE, "/api/cart/clear", Some(&token), None).await;
    assert_eq!(body["itemCount"], 0);
}

#[tokio::test]
async fn test_cart_slot_narrowing() {
    let test_app = TestApp::new();
    let token = test_app.guest_token().await;
    let resort = test_app.priced_product(100.0, 5).await;

    for date in ["2030-06-01", "2030-06-02"] {
        let mut item = cart_entry("hotel-1", "hotel", resort);
        item["bookingDate"] = json!(date);
        test_app.send(Method::POST, "/api/cart/add", Some(&token), Some(item)).await;
    }

    let (status, body) = test_app
        .send(
            Method::PUT,
            "/api/cart/update/hotel-1?type=hotel&bookingDate=2030-06-02",
            Some(&token),
            Some(json!({ "quantity": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["quantity"], 1);
    assert_eq!(body["items"][1]["quantity"], 3);
    assert_eq!(body["subtotal"], 400.0);

    let (_, body) = test_app
        .send(Method::DELETE, "/api/cart/remove/hotel-1?bookingDate=2030-06-01", Some(&token), None)
        .await;
    assert_eq!(body["itemCount"], 1);
    assert_eq!(body["items"][0]["bookingDate"], "2030-06-02");

    // Huge quantities are capped
    let (_, body) = test_app
        .send(Method::PUT, "/api/cart/update/hotel-1", Some(&token), Some(json!({ "quantity": 9_999_999_999i64 })))
        .await;
    assert_eq!(body["items"][0]["quantity"], 99);
}

#[tokio::test]
async fn test_cart_prices_come_from_storage() {
    let test_app = TestApp::new();
    let token = test_app.guest_token().await;

    let (status, body) = test_app
        .send(Method::POST, "/api/cart/add", Some(&token), Some(cart_entry("x", "hotel", Uuid::new_v4())))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");

    let sold_out = test_app.priced_product(80.0, 0).await;
    let (status, body) = test_app
        .send(Method::POST, "/api/cart/add", Some(&token), Some(cart_entry("x", "hotel", sold_out)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Insufficient quantity available");

    let free_form = json!({ "id": "x", "name": "X", "type": "hotel", "price": 5.0 });
    let (status, _) = test_app.send(Method::POST, "/api/cart/add", Some(&token), Some(free_form)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // A booking without its own total is priced from its product
    let resort = test_app.priced_product(180.0, 3).await;
    let mut booking = hotel_booking(Some(resort));
    booking["totalPrice"] = Value::Null;
    let (_, body) = test_app.send(Method::POST, "/api/bookings/hotel", Some(&token), Some(booking)).await;
    let item = json!({
        "id": "hotel-1",
        "name": "Luxury Beach Resort",
        "type": "hotel",
        "price": 0.01,
        "bookingId": body["booking"]["id"]
    });
    let (status, body) = test_app.send(Method::POST, "/api/cart/add", Some(&token), Some(item.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subtotal"], 180.0);

    // One booking is one unit
    let (_, body) = test_app.send(Method::POST, "/api/cart/add", Some(&token), Some(item)).await;
    assert_eq!(body["items"][0]["quantity"], 1);
    assert_eq!(body["subtotal"], 180.0);
}

#[tokio::test]
async fn test_cart_rejects_foreign_cancelled_and_unknown_bookings() {
    let test_app = TestApp::new();
    let owner = test_app.guest_token().await;
    let stranger = test_app.guest_token().await;

    let (_, body) = test_app
        .send(Method::POST, "/api/bookings/hotel", Some(&owner), Some(hotel_booking(None)))
        .await;
    let booking_id = body["booking"]["id"].as_str().unwrap().to_string();
    let item = |booking_id: &str| {
        json!({ "id": "hotel-1", "name": "Resort", "type": "hotel", "price": 0.01, "bookingId": booking_id })
    };

    for (token, booking) in [(&stranger, booking_id.clone()), (&owner, Uuid::new_v4().to_string())] {
        let (status, body) = test_app.send(Method::POST, "/api/cart/add", Some(token.as_str()), Some(item(&booking))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Booking not found");
    }

    // Cancelled after it went into the cart: checkout refuses it and keeps the cart
    let (status, _) = test_app.send(Method::POST, "/api/cart/add", Some(&owner), Some(item(&booking_id))).await;
    assert_eq!(status, StatusCode::OK);
    test_app
        .send(Method::DELETE, &format!("/api/bookings/{}", booking_id), Some(&owner), None)
        .await;

    let (status, body) = test_app
        .send(Method::POST, "/api/cart/checkout", Some(&owner), Some(json!({ "paymentMethod": "card" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Booking has been cancelled");

    let (_, cart) = test_app.send(Method::GET, "/api/cart", Some(&owner), None).await;
    assert_eq!(cart["itemCount"], 1);
    let (_, orders) = test_app.send(Method::GET, "/api/orders/my-orders", Some(&owner), None).await;
    assert!(orders.as_array().unwrap().is_empty());

    let (status, body) = test_app.send(Method::POST, "/api/cart/add", Some(&owner), Some(item(&booking_id))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Booking has been cancelled");
}

#[tokio::test]
async fn test_checkout_pays_for_booked_items() {
    let test_app = TestApp::new();
    let token = test_app.guest_token().await;

    let mut booking = hotel_booking(None);
    booking["totalPrice"] = json!(200.0);
    let (_, body) = test_app
        .send(Method::POST, "/api/bookings/hotel", Some(&token), Some(booking))
        .await;
    let booking_id = body["booking"]["id"].as_str().unwrap().to_string();

    let item = json!({
        "id": "hotel-1",
        "name": "Luxury Beach Resort",
        "type": "hotel",
        "price": 0.01,
        "bookingId": booking_id
    });
    test_app.send(Method::POST, "/api/cart/add", Some(&token), Some(item)).await;

    let (status, body) = test_app
        .send(Method::POST, "/api/cart/checkout", Some(&token), Some(json!({ "paymentMethod": "bogus" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid payment method");

    let (status, body) = test_app
        .send(Method::POST, "/api/cart/checkout", Some(&token), Some(json!({ "paymentMethod": "paypal" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["order"]["subtotal"], 200.0);
    assert_eq!(body["order"]["tax"], 30.0);
    assert_eq!(body["order"]["total"], 230.0);
    assert_eq!(body["order"]["status"], "paid");
    assert_eq!(body["bookingIds"], json!([booking_id]));
    let order_id = body["order"]["id"].as_str().unwrap().to_string();

    let (_, cart) = test_app.send(Method::GET, "/api/cart", Some(&token), None).await;
    assert_eq!(cart["itemCount"], 0);

    let (_, orders) = test_app.send(Method::GET, "/api/orders/my-orders", Some(&token), None).await;
    assert_eq!(orders.as_array().unwrap().len(), 1);

    let (status, order) = test_app
        .send(Method::GET, &format!("/api/orders/{}", order_id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["items"][0]["bookingId"], json!(booking_id));

    let (status, body) = test_app
        .send(Method::POST, "/api/cart/checkout", Some(&token), Some(json!({ "paymentMethod": "card" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cart is empty");
}

#[tokio::test]
async fn test_concurrent_checkouts_charge_once() {
    let test_app = TestApp::with_payment_delay(50);
    let token = test_app.guest_token().await;
    let tour = test_app.priced_product(100.0, 5).await;
    test_app
        .send(Method::POST, "/api/cart/add", Some(&token), Some(cart_entry("tour-1", "attraction", tour)))
        .await;

    let pay = json!({ "paymentMethod": "card" });
    let ((first, _), (second, _)) = tokio::join!(
        test_app.send(Method::POST, "/api/cart/checkout", Some(&token), Some(pay.clone())),
        test_app.send(Method::POST, "/api/cart/checkout", Some(&token), Some(pay.clone())),
    );
    let mut statuses = [first, second];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::BAD_REQUEST]);

    let (_, orders) = test_app.send(Method::GET, "/api/orders/my-orders", Some(&token), None).await;
    assert_eq!(orders.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_item_added_during_checkout_is_not_lost() {
    let test_app = TestApp::with_payment_delay(50);
    let token = test_app.guest_token().await;
    let tour = test_app.priced_product(100.0, 5).await;
    test_app
        .send(Method::POST, "/api/cart/add", Some(&token), Some(cart_entry("tour-1", "attraction", tour)))
        .await;

    let ((status, body), _) = tokio::join!(
        test_app.send(Method::POST, "/api/cart/checkout", Some(&token), Some(json!({ "paymentMethod": "card" }))),
        test_app.send(Method::POST, "/api/cart/add", Some(&token), Some(cart_entry("tour-2", "attraction", tour))),
    );
    assert_eq!(status, StatusCode::CREATED);

    // Every entry is either paid for or still in the cart
    let paid = body["order"]["items"].as_array().unwrap().len();
    let (_, cart) = test_app.send(Method::GET, "/api/cart", Some(&token), None).await;
    assert_eq!(paid + cart["itemCount"].as_u64().unwrap() as usize, 2);
}

// ============================================================================
// Orders
// ============================================================================

#[tokio::test]
async fn test_order_status_and_cancel() {
    use tripnest_booking::{Cart, Order, PaymentMethod};

    let test_app = TestApp::new();
    let (token, user_id) = test_app.guest_session().await;
    let tour = test_app.priced_product(40.0, 5).await;
    test_app
        .send(Method::POST, "/api/cart/add", Some(&token), Some(cart_entry("tour-1", "attraction", tour)))
        .await;
    let (_, body) = test_app
        .send(Method::POST, "/api/cart/checkout", Some(&token), Some(json!({ "paymentMethod": "card" })))
        .await;
    let paid_uri = format!("/api/orders/{}", body["order"]["id"].as_str().unwrap());

    let (status, body) = test_app.send(Method::DELETE, &paid_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Only pending orders can be cancelled");

    let status_uri = format!("{}/status", paid_uri);
    let (status, body) = test_app
        .send(Method::PATCH, &status_uri, Some(&token), Some(json!({ "status": "Refunded" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid status");

    let (status, body) = test_app
        .send(Method::PATCH, &status_uri, Some(&token), Some(json!({ "status": "Processing" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Order status updated successfully");
    assert_eq!(body["order"]["status"], "processing");

    let (status, _) = test_app
        .send(Method::PATCH, &status_uri, Some(&token), Some(json!({ "status": "paid" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let stranger = test_app.guest_token().await;
    let (status, body) = test_app
        .send(Method::PATCH, &status_uri, Some(&stranger), Some(json!({ "status": "Shipped" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Order not found");
    let (status, _) = test_app
        .send(Method::DELETE, &format!("/api/orders/{}", Uuid::new_v4()), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // A pending order can still be cancelled
    let mut cart = Cart::new();
    cart.items = vec![serde_json::from_value(json!({
        "id": "tour-2", "name": "Tour", "type": "attraction", "price": 40.0, "image": null,
        "quantity": 1, "bookingDate": null, "bookingId": null, "productId": tour,
        "checkIn": null, "checkOut": null, "date": null, "time": null
    }))
    .unwrap()];
    let pending = Order::from_cart(user_id, &cart, PaymentMethod::Bank, "USD").unwrap();
    test_app.repos.orders.create_order(&pending).await.unwrap();

    let (status, body) = test_app
        .send(Method::DELETE, &format!("/api/orders/{}", pending.id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Order cancelled successfully");
    assert_eq!(body["order"]["status"], "cancelled");
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn test_listing_filters() {
    let test_app = TestApp::seeded().await;

    let (status, body) = test_app.send(Method::GET, "/api/hotels", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 3);

    let (_, body) = test_app.send(Method::GET, "/api/hotels?city=bali", None, None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["name"], "Nest Resort & Spa");

    let (_, body) = test_app.send(Method::GET, "/api/hotels?minPrice=180", None, None).await;
    assert_eq!(body["count"], 2);

    let (_, body) = test_app
        .send(Method::GET, "/api/hotels?amenities=Traditional%20Spa", None, None)
        .await;
    assert_eq!(body["count"], 1);

    let (status, body) = test_app.send(Method::GET, "/api/hotels?minPrice=abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid minPrice");

    let (status, body) = test_app.send(Method::GET, "/api/hotels/search/by-location", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "City or country parameter is required");

    let (status, body) = test_app.send(Method::GET, "/api/restaurants/not-an-id", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Restaurant not found");
}

#[tokio::test]
async fn test_hotel_availability_quotes() {
    let test_app = TestApp::seeded().await;

    let (_, body) = test_app.send(Method::GET, "/api/hotels?city=zermatt", None, None).await;
    let hotel_id = body["data"][0]["id"].as_str().unwrap().to_string();

    let uri = format!(
        "/api/hotels/{}/availability?checkIn={}&checkOut={}&guests=3&rooms=1",
        hotel_id,
        days_from_now(20),
        days_from_now(22)
    );
    let (status, body) = test_app.send(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hotelName"], "Mountain View Lodge");

    let rooms = body["availability"].as_array().unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0]["roomType"], "Family Room");
    assert_eq!(rooms[0]["totalPrice"], 189.0);
    assert_eq!(rooms[0]["finalPrice"], 226.8);

    let (status, _) = test_app
        .send(Method::GET, &format!("/api/hotels/{}/availability?guests=2", hotel_id), None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_products_listing_and_admin() {
    let test_app = TestApp::seeded().await;
    let token = test_app.guest_token().await;

    let (status, body) = test_app.send(Method::GET, "/api/products?category=attraction", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().iter().all(|p| p["category"] == "attraction"));

    let (status, _) = test_app.send(Method::GET, "/api/products?category=cruise", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let new_product = json!({
        "name": "Island Hopping Package",
        "description": "Five islands in five days",
        "price": 1200.0,
        "quantity": 10,
        "category": "package",
        "image": "/images/islands.jpeg",
        "location": "Cyclades, Greece",
        "rating": 4.5
    });
    let (status, _) = test_app
        .send(Method::POST, "/api/products", None, Some(new_product.clone()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = test_app
        .send(Method::POST, "/api/products", Some(&token), Some(new_product))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/products/{}", body["product"]["id"].as_str().unwrap());

    let (status, body) = test_app
        .send(Method::POST, &format!("{}/reduce-quantity", uri), Some(&token), Some(json!({ "amount": 11 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("quantity"));

    let (status, body) = test_app
        .send(Method::POST, &format!("{}/reduce-quantity", uri), Some(&token), Some(json!({ "amount": 4 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["newQuantity"], 6);

    let (status, _) = test_app.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = test_app.send(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
