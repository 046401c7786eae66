//! Redis session store example
//!
//! Sessions are stored in Redis under `demo:Sessions:<id>` keys; the browser
//! only receives a signed cookie referencing that key.
//!
//! Run with a local Redis:
//!
//! ```sh
//! cargo run --example with_redis
//! redis-cli --scan --pattern 'demo:Sessions:*'
//! ```

use salvo::prelude::*;
use salvo_redis_session::{
    create_redis_session_storage, CookieOptions, RedisConfig, RedisSessionArgs, SessionDepotExt,
    SessionHandler, StoreOptions,
};
use serde::Serialize;
use std::time::Duration;

#[derive(Serialize)]
struct JsonResponse {
    server: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    counter: Option<i32>,
    #[serde(rename = "sessionId")]
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
}

impl Default for JsonResponse {
    fn default() -> Self {
        Self {
            server: "rust",
            action: None,
            key: None,
            value: None,
            counter: None,
            session_id: None,
        }
    }
}

#[handler]
async fn index(depot: &mut Depot) -> String {
    let session = depot.session_mut().expect("Session not found");

    let views: i32 = session.get("views").unwrap_or(0);
    session.set("views", views + 1);

    format!(
        "Hello from Rust + Redis!\nViews: {}\nSession key: {}",
        views + 1,
        session.id().unwrap_or("(new, assigned on commit)")
    )
}

#[handler]
async fn set_data(req: &mut Request, depot: &mut Depot) -> Json<JsonResponse> {
    let session = depot.session_mut().expect("Session not found");

    let key = req
        .query::<String>("key")
        .unwrap_or_else(|| "testKey".to_string());
    let value = req
        .query::<String>("value")
        .unwrap_or_else(|| "testValue".to_string());

    session.set(&key, &value);
    session.flash("notice", format!("stored {}", key));

    Json(JsonResponse {
        action: Some("set"),
        key: Some(key),
        value: Some(serde_json::Value::String(value)),
        session_id: session.id().map(str::to_string),
        ..Default::default()
    })
}

#[handler]
async fn get_data(req: &mut Request, depot: &mut Depot) -> Json<JsonResponse> {
    let session = depot.session_mut().expect("Session not found");

    let key = req
        .query::<String>("key")
        .unwrap_or_else(|| "testKey".to_string());
    let value: Option<serde_json::Value> = session.get(&key);

    Json(JsonResponse {
        action: Some("get"),
        key: Some(key),
        value,
        session_id: session.id().map(str::to_string),
        ..Default::default()
    })
}

#[handler]
async fn notice(depot: &mut Depot) -> String {
    let session = depot.session_mut().expect("Session not found");
    session
        .get::<String>("notice")
        .unwrap_or_else(|| "no notice".to_string())
}

#[handler]
async fn counter(depot: &mut Depot) -> Json<JsonResponse> {
    let session = depot.session_mut().expect("Session not found");

    let count: i32 = session.get("counter").unwrap_or(0);
    session.set("counter", count + 1);

    Json(JsonResponse {
        counter: Some(count + 1),
        session_id: session.id().map(str::to_string),
        ..Default::default()
    })
}

#[handler]
async fn login(depot: &mut Depot) -> &'static str {
    let session = depot.session_mut().expect("Session not found");

    // Fresh key after a privilege change
    session.regenerate();
    session.set("user", "alice");

    "Logged in as alice"
}

#[handler]
async fn logout(depot: &mut Depot) -> &'static str {
    let session = depot.session_mut().expect("Session not found");
    session.destroy();
    "Session destroyed"
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let redis_config = RedisConfig::default()
        .with_connection_timeout(Duration::from_secs(2))
        .with_response_timeout(Duration::from_secs(1));

    let args = RedisSessionArgs::new("demo", StoreOptions::from_config(redis_config)).with_cookie(
        CookieOptions::with_secrets(["keyboard cat", "previous secret"]).with_max_age(86400),
    );

    let storage = create_redis_session_storage(args)
        .await
        .expect("Failed to connect to Redis");

    let router = Router::new()
        .hoop(SessionHandler::new(storage))
        .get(index)
        .push(Router::with_path("set").get(set_data))
        .push(Router::with_path("get").get(get_data))
        .push(Router::with_path("notice").get(notice))
        .push(Router::with_path("counter").get(counter))
        .push(Router::with_path("login").get(login))
        .push(Router::with_path("logout").get(logout));

    println!("Server running at http://127.0.0.1:5800");

    let acceptor = TcpListener::new("127.0.0.1:5800").bind().await;
    Server::new(acceptor).serve(router).await;
}
