use axum::http::StatusCode;
use futures_journal::api;
use futures_journal::config::Config;
use futures_journal::db::init_db;
use futures_journal::domain::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

struct TestApp {
    app: axum::Router,
    _temp: TempDir,
}

async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path, 2).await.expect("init_db failed");
    let repo = Arc::new(futures_journal::Repository::new(pool));

    let config = Config {
        port: 0,
        bind_addr: "127.0.0.1".parse().unwrap(),
        database_path: db_path,
        db_max_connections: 2,
        cors_allowed_origin: None,
    };

    TestApp {
        app: api::create_router(api::AppState::new(repo, config)),
        _temp: temp_dir,
    }
}

async fn request(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = axum::http::Request::builder().method(method).uri(uri);
    let req = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(axum::body::Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn dec(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("decimal should be a JSON string")).unwrap()
}

fn wallet(name: &str, balance: &str) -> Value {
    json!({"exchangeName": name, "totalBalance": balance, "notes": "main account"})
}

fn open_trade_on(exchange: &str, entry: &str, quantity: &str) -> Value {
    json!({
        "coin": "BTC",
        "tradeType": "LONG",
        "entryPrice": entry,
        "quantity": quantity,
        "leverage": 3,
        "exchange": exchange,
        "tradeDate": "2024-05-01T12:00:00"
    })
}

#[tokio::test]
async fn test_wallet_crud() {
    let test_app = setup_test_app().await;
    let app = &test_app.app;

    let (status, created) = request(app, "POST", "/api/wallets", Some(wallet("Binance", "10000"))).await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/wallets/{}", created["id"]);

    let (status, body) = request(app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exchangeName"], "Binance");
    assert_eq!(body["notes"], "main account");

    let (status, body) = request(app, "PUT", &uri, Some(wallet("Binance", "12500.50"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec(&body["totalBalance"]), Decimal::from_str("12500.5").unwrap());

    let (status, body) = request(app, "GET", "/api/wallets/exchange/binance", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], created["id"]);

    let (status, body) = request(app, "GET", "/api/wallets", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = request(app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = request(app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wallet_validation() {
    let test_app = setup_test_app().await;
    let app = &test_app.app;
    request(app, "POST", "/api/wallets", Some(wallet("Bybit", "10"))).await;

    let (status, body) = request(app, "POST", "/api/wallets", Some(wallet("BYBIT", "5"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "exchangeName");

    let (status, body) = request(app, "POST", "/api/wallets", Some(wallet("OKX", "-1"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "totalBalance");

    let long_name = "x".repeat(51);
    let (status, body) = request(app, "POST", "/api/wallets", Some(wallet(&long_name, "1"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "exchangeName");

    let (_, okx) = request(app, "POST", "/api/wallets", Some(wallet("OKX", "1"))).await;
    let (status, _) = request(
        app,
        "PUT",
        &format!("/api/wallets/{}", okx["id"]),
        Some(wallet("bybit", "1")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_wallet_exposure() {
    let test_app = setup_test_app().await;
    let app = &test_app.app;
    let (_, created) = request(app, "POST", "/api/wallets", Some(wallet("Binance", "10000"))).await;

    request(app, "POST", "/api/trades", Some(open_trade_on("binance", "3000", "1"))).await;
    request(app, "POST", "/api/trades", Some(open_trade_on("BINANCE", "750", "2"))).await;
    request(app, "POST", "/api/trades", Some(open_trade_on("Bybit", "999", "1"))).await;

    let (_, closed) = request(app, "POST", "/api/trades", Some(open_trade_on("Binance", "100", "1"))).await;
    request(
        app,
        "PATCH",
        &format!("/api/trades/{}/close", closed["id"]),
        Some(json!({"exitPrice": "101", "closeReason": "MANUAL"})),
    )
    .await;

    let (status, summary) = request(
        app,
        "GET",
        &format!("/api/wallets/{}/summary", created["id"]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec(&summary["usedBalance"]), Decimal::from(4500u32));
    assert_eq!(dec(&summary["availableBalance"]), Decimal::from(5500u32));
    assert_eq!(summary["openTradesCount"], 2);

    let (status, all) = request(app, "GET", "/api/wallets/summaries", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 1);
    assert_eq!(all[0], summary);
}

#[tokio::test]
async fn test_total_balance() {
    let test_app = setup_test_app().await;
    let app = &test_app.app;

    let (status, body) = request(app, "GET", "/api/wallets/total-balance", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec(&body["totalBalance"]), Decimal::zero());

    request(app, "POST", "/api/wallets", Some(wallet("Binance", "100.25"))).await;
    request(app, "POST", "/api/wallets", Some(wallet("Bybit", "50"))).await;

    let (_, body) = request(app, "GET", "/api/wallets/total-balance", None).await;
    assert_eq!(dec(&body["totalBalance"]), Decimal::from_str("150.25").unwrap());
}

#[tokio::test]
async fn test_rename_does_not_move_trades() {
    let test_app = setup_test_app().await;
    let app = &test_app.app;
    let (_, created) = request(app, "POST", "/api/wallets", Some(wallet("Binance", "1000"))).await;
    request(app, "POST", "/api/trades", Some(open_trade_on("Binance", "100", "1"))).await;

    let uri = format!("/api/wallets/{}", created["id"]);
    let (status, _) = request(app, "PUT", &uri, Some(wallet("Binance Futures", "1000"))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, summary) = request(app, "GET", &format!("{}/summary", uri), None).await;
    assert_eq!(summary["openTradesCount"], 0);
    assert_eq!(dec(&summary["availableBalance"]), Decimal::from(1000u32));

    let (_, trades) = request(app, "GET", "/api/trades", None).await;
    assert_eq!(trades[0]["exchange"], "Binance");
}

#[tokio::test]
async fn test_missing_wallet_routes() {
    let test_app = setup_test_app().await;
    let app = &test_app.app;

    for (method, uri) in [
        ("GET", "/api/wallets/5"),
        ("DELETE", "/api/wallets/5"),
        ("GET", "/api/wallets/5/summary"),
        ("GET", "/api/wallets/exchange/kraken"),
    ] {
        let (status, body) = request(app, method, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{} {}", method, uri);
        assert!(body["error"].is_string());
    }
}
