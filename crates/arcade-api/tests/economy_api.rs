//! Economy API tests
//!
//! Drives the full router against an in-memory database: register users,
//! fund them, and exercise purchase, trade, battle-pass, and vote flows.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use arcade_api::cache::TtlCache;
use arcade_api::{AppStateInner, router};
use arcade_db::Database;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

fn test_router() -> Router {
    let state = Arc::new(AppStateInner {
        db: Database::open_in_memory().expect("in-memory db"),
        jwt_secret: "test-secret".into(),
        cache: TtlCache::new(Duration::from_secs(30)),
        premium_pass_price: 500,
        admin_usernames: HashSet::from(["admin".to_string()]),
    });
    router(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Register `username` and return (token, user id).
async fn register(app: &Router, username: &str) -> (String, String) {
    let (status, body) = send(
        app,
        "POST",
        "/auth/register",
        None,
        Some(json!({"username": username, "password": "correct horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register {}: {}", username, body);
    (
        body["token"].as_str().unwrap().to_string(),
        body["userId"].as_str().unwrap().to_string(),
    )
}

async fn fund(app: &Router, token: &str, amount: i64) -> Value {
    let (status, body) = send(app, "POST", "/coins/add", Some(token), Some(json!({"amount": amount}))).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body
}

async fn create_cosmetic(app: &Router, admin: &str, name: &str, price: i64) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/admin/cosmetics",
        Some(admin),
        Some(json!({"name": name, "type": "badge", "price": price, "value": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_i64().unwrap()
}

async fn create_game(app: &Router, admin: &str, name: &str, price: i64) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/admin/games",
        Some(admin),
        Some(json!({"name": name, "price": price})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_i64().unwrap()
}

// ============================================================================
// Ledger & purchases
// ============================================================================

#[tokio::test]
async fn test_purchase_flow() {
    let app = test_router();
    let (admin, _) = register(&app, "admin").await;
    let (alice, _) = register(&app, "alice").await;
    let hat = create_cosmetic(&app, &admin, "Hat", 60).await;
    let crown = create_cosmetic(&app, &admin, "Crown", 50).await;

    let user = fund(&app, &alice, 100).await;
    assert_eq!(user["coins"], 100);
    assert_eq!(user["username"], "alice");

    let (status, body) = send(
        &app,
        "POST",
        "/cosmetics/purchase",
        Some(alice.as_str()),
        Some(json!({"username": "alice", "cosmeticId": hat})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["coins"], 40);
    assert_eq!(body["ownership"]["cosmeticId"], hat);

    let (status, body) = send(
        &app,
        "POST",
        "/cosmetics/purchase",
        Some(alice.as_str()),
        Some(json!({"cosmeticId": crown})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "insufficient_funds");

    let (status, body) = send(
        &app,
        "POST",
        "/cosmetics/purchase",
        Some(alice.as_str()),
        Some(json!({"cosmeticId": hat})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "conflict");

    let (_, profile) = send(&app, "GET", "/users/alice", None, None).await;
    assert_eq!(profile["coins"], 40);

    let (_, owned) = send(&app, "GET", "/cosmetics/owned", Some(alice.as_str()), None).await;
    assert_eq!(owned.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_catalog_listing_and_activation() {
    let app = test_router();
    let (admin, _) = register(&app, "admin").await;
    let (bob, _) = register(&app, "bob").await;

    let (status, catalog) = send(&app, "GET", "/cosmetics", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(catalog.as_array().unwrap().is_empty());

    // Creating an item invalidates the cached empty catalog.
    let frame = create_cosmetic(&app, &admin, "Frame", 20).await;
    let (_, catalog) = send(&app, "GET", "/cosmetics", None, None).await;
    assert_eq!(catalog.as_array().unwrap().len(), 1);
    assert_eq!(catalog[0]["type"], "badge");

    let (status, body) = send(
        &app,
        "POST",
        "/cosmetics/activate",
        Some(bob.as_str()),
        Some(json!({"cosmeticId": frame})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "conflict");

    fund(&app, &bob, 20).await;
    send(&app, "POST", "/cosmetics/purchase", Some(bob.as_str()), Some(json!({"cosmeticId": frame}))).await;
    let (status, body) = send(
        &app,
        "POST",
        "/cosmetics/activate",
        Some(bob.as_str()),
        Some(json!({"cosmeticId": frame})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["activeCosmeticId"], frame);

    send(&app, "POST", "/cosmetics/activate", Some(bob.as_str()), Some(json!({"cosmeticId": null}))).await;
    let (_, active) = send(&app, "GET", "/cosmetics/active", Some(bob.as_str()), None).await;
    assert_eq!(active["activeCosmeticId"], Value::Null);
}

// ============================================================================
// Trades
// ============================================================================

#[tokio::test]
async fn test_trade_accept_then_terminal() {
    let app = test_router();
    let (admin, _) = register(&app, "admin").await;
    let (alice, _) = register(&app, "alice").await;
    let (bob, bob_id) = register(&app, "bob").await;
    let x = create_cosmetic(&app, &admin, "X", 10).await;
    let y = create_cosmetic(&app, &admin, "Y", 10).await;

    fund(&app, &alice, 10).await;
    fund(&app, &bob, 10).await;
    send(&app, "POST", "/cosmetics/purchase", Some(alice.as_str()), Some(json!({"cosmeticId": x}))).await;
    send(&app, "POST", "/cosmetics/purchase", Some(bob.as_str()), Some(json!({"cosmeticId": y}))).await;

    let (status, trade) = send(
        &app,
        "POST",
        "/trades/propose",
        Some(alice.as_str()),
        Some(json!({
            "username": "alice",
            "receiverId": bob_id,
            "groupId": 3,
            "senderCosmeticIds": [x],
            "receiverCosmeticIds": [y],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", trade);
    assert_eq!(trade["status"], "pending");
    let trade_id = trade["id"].as_i64().unwrap();

    let (_, inbox) = send(&app, "GET", "/trades", Some(bob.as_str()), None).await;
    assert_eq!(inbox.as_array().unwrap().len(), 1);

    // The sender cannot resolve their own proposal.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/trades/{}/accept", trade_id),
        Some(alice.as_str()),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "not_authorized");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/trades/{}/accept", trade_id),
        Some(bob.as_str()),
        Some(json!({"username": "bob"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "accepted");

    let (_, alice_owned) = send(&app, "GET", "/cosmetics/owned", Some(alice.as_str()), None).await;
    assert_eq!(alice_owned[0]["id"], y);
    let (_, bob_owned) = send(&app, "GET", "/cosmetics/owned", Some(bob.as_str()), None).await;
    assert_eq!(bob_owned[0]["id"], x);

    for action in ["accept", "reject"] {
        let (status, body) = send(
            &app,
            "POST",
            &format!("/trades/{}/{}", trade_id, action),
            Some(bob.as_str()),
            Some(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "conflict");
    }

    let (status, _) = send(&app, "POST", "/trades/9999/reject", Some(bob.as_str()), Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_trade_propose_requires_both_sides() {
    let app = test_router();
    let (admin, _) = register(&app, "admin").await;
    let (alice, _) = register(&app, "alice").await;
    let (_, bob_id) = register(&app, "bob").await;
    let x = create_cosmetic(&app, &admin, "X", 10).await;

    let (status, body) = send(
        &app,
        "POST",
        "/trades/propose",
        Some(alice.as_str()),
        Some(json!({
            "receiverId": bob_id,
            "groupId": 1,
            "senderCosmeticIds": [x],
            "receiverCosmeticIds": [],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_input");
}

// ============================================================================
// Battle pass
// ============================================================================

#[tokio::test]
async fn test_battle_pass_progression_and_premium() {
    let app = test_router();
    let (admin, _) = register(&app, "admin").await;
    let (carol, _) = register(&app, "carol").await;
    let badge = create_cosmetic(&app, &admin, "Season Badge", 5).await;

    let (status, _) = send(
        &app,
        "POST",
        "/admin/battlepass/tiers",
        Some(admin.as_str()),
        Some(json!({"season": 1, "tier": 1, "freeCosmeticId": badge})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/battlepass/carol", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["progress"]["currentSeason"], 1);
    assert_eq!(body["progress"]["currentTier"], 0);
    assert_eq!(body["progress"]["experience"], 0);
    assert_eq!(body["progress"]["hasPremiumPass"], false);
    assert_eq!(body["tiers"][0]["freeCosmeticId"], badge);

    // 49 tiers and 400 XP, then 150 more crosses into the cap.
    let (_, p) = send(
        &app,
        "POST",
        "/battlepass/carol/experience",
        Some(carol.as_str()),
        Some(json!({"amount": 49 * 500 + 400})),
    )
    .await;
    assert_eq!((p["currentTier"].as_i64(), p["experience"].as_i64()), (Some(49), Some(400)));
    let (_, p) = send(
        &app,
        "POST",
        "/battlepass/carol/experience",
        Some(carol.as_str()),
        Some(json!({"amount": 150})),
    )
    .await;
    assert_eq!((p["currentTier"].as_i64(), p["experience"].as_i64()), (Some(50), Some(50)));

    let (status, body) = send(&app, "POST", "/battlepass/carol/purchase-premium", Some(carol.as_str()), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "insufficient_funds");

    fund(&app, &carol, 650).await;
    let (status, body) = send(&app, "POST", "/battlepass/carol/purchase-premium", Some(carol.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hasPremiumPass"], true);

    let (_, profile) = send(&app, "GET", "/users/carol", None, None).await;
    assert_eq!(profile["coins"], 150);

    let (status, _) = send(&app, "GET", "/battlepass/nobody", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Difficulty votes
// ============================================================================

#[tokio::test]
async fn test_difficulty_votes() {
    let app = test_router();
    let (admin, _) = register(&app, "admin").await;
    let game = create_game(&app, &admin, "Maze", 0).await;
    let uri = format!("/games/{}/difficulty", game);

    let (status, body) = send(&app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["average"], 0.0);
    assert_eq!(body["totalVotes"], 0);

    for (name, difficulty) in [("voter1", 1), ("voter2", 3), ("voter3", 5)] {
        let (token, _) = register(&app, name).await;
        let (status, _) = send(
            &app,
            "POST",
            &format!("/games/{}/difficulty-vote", game),
            Some(token.as_str()),
            Some(json!({"username": name, "difficulty": difficulty})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    // Votes invalidate the cached summary.
    let (_, body) = send(&app, "GET", &uri, None, None).await;
    assert_eq!(body["average"], 3.0);
    assert_eq!(body["totalVotes"], 3);

    let (token, _) = register(&app, "voter4").await;
    let (status, body) = send(
        &app,
        "POST",
        &format!("/games/{}/difficulty-vote", game),
        Some(token.as_str()),
        Some(json!({"difficulty": 6})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_input");

    let (status, _) = send(&app, "GET", "/games/999/difficulty", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_premium_game_purchase() {
    let app = test_router();
    let (admin, _) = register(&app, "admin").await;
    let (dave, _) = register(&app, "dave").await;
    let game = create_game(&app, &admin, "Galaxy", 75).await;

    fund(&app, &dave, 100).await;
    let (status, body) = send(&app, "POST", &format!("/games/{}/purchase", game), Some(dave.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["coins"], 25);

    let (_, owned) = send(&app, "GET", "/games/owned", Some(dave.as_str()), None).await;
    assert_eq!(owned[0]["id"], game);
}

// ============================================================================
// Auth boundaries
// ============================================================================

#[tokio::test]
async fn test_auth_boundaries() {
    let app = test_router();
    let (admin, _) = register(&app, "admin").await;
    let (eve, _) = register(&app, "eve").await;

    let (status, _) = send(&app, "POST", "/coins/add", None, Some(json!({"amount": 5}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/coins/add",
        Some(eve.as_str()),
        Some(json!({"username": "admin", "amount": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "POST", "/battlepass/admin/experience", Some(eve.as_str()), Some(json!({"amount": 5}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "POST",
        "/admin/games",
        Some(eve.as_str()),
        Some(json!({"name": "Nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "POST",
        "/admin/users/eve/ban",
        Some(admin.as_str()),
        Some(json!({"banned": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isBanned"], true);

    let (status, _) = send(&app, "POST", "/coins/add", Some(eve.as_str()), Some(json!({"amount": 5}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({"username": "eve", "password": "correct horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_router();
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
