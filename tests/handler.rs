use salvo::http::header::{COOKIE, SET_COOKIE};
use salvo::prelude::*;
use salvo::test::{ResponseExt, TestClient};
use salvo_redis_session::{
    CookieOptions, KvSessionStore, MemoryClient, SessionDepotExt, SessionHandler, SessionStorage,
};

const BASE: &str = "http://127.0.0.1:5800";

#[handler]
async fn login(depot: &mut Depot) -> &'static str {
    let session = depot.session_mut().expect("Session not found");
    session.set("userId", 42);
    session.flash("notice", "welcome back");
    "ok"
}

#[handler]
async fn whoami(depot: &mut Depot) -> String {
    let session = depot.session().expect("Session not found");
    match session.get::<i64>("userId") {
        Some(id) => id.to_string(),
        None => "anonymous".to_string(),
    }
}

#[handler]
async fn notice(depot: &mut Depot) -> String {
    let session = depot.session().expect("Session not found");
    session.get::<String>("notice").unwrap_or_default()
}

#[handler]
async fn rotate(depot: &mut Depot) -> &'static str {
    depot.session().expect("Session not found").regenerate();
    "rotated"
}

#[handler]
async fn logout(depot: &mut Depot) -> &'static str {
    depot.session().expect("Session not found").destroy();
    "bye"
}

fn service(client: MemoryClient) -> Service {
    let store: KvSessionStore<MemoryClient> = KvSessionStore::new(client, "app1");
    let storage = SessionStorage::new(store, CookieOptions::new("s3cret").with_max_age(3600));

    let router = Router::new()
        .hoop(SessionHandler::new(storage))
        .push(Router::with_path("login").get(login))
        .push(Router::with_path("whoami").get(whoami))
        .push(Router::with_path("notice").get(notice))
        .push(Router::with_path("rotate").get(rotate))
        .push(Router::with_path("logout").get(logout));
    Service::new(router)
}

/// Value of the `__session` cookie set on a response, if any
fn session_cookie(res: &Response) -> Option<String> {
    if let Some(cookie) = res.cookie("__session") {
        return Some(cookie.value().to_string());
    }
    res.headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| v.strip_prefix("__session="))
        .map(|v| v.split(';').next().unwrap_or_default().to_string())
}

async fn get(service: &Service, path: &str, cookie: Option<&str>) -> Response {
    let mut builder = TestClient::get(format!("{}/{}", BASE, path));
    if let Some(value) = cookie {
        builder = builder.add_header(COOKIE, format!("__session={}", value), true);
    }
    builder.send(service).await
}

#[tokio::test]
async fn test_untouched_session_sets_no_cookie() {
    let client = MemoryClient::new();
    let service = service(client.clone());

    let mut res = get(&service, "whoami", None).await;
    assert_eq!(res.take_string().await.unwrap(), "anonymous");
    assert!(session_cookie(&res).is_none());
    assert!(client.is_empty());
}

#[tokio::test]
async fn test_login_round_trip() {
    let client = MemoryClient::new();
    let service = service(client.clone());

    let res = get(&service, "login", None).await;
    let cookie = session_cookie(&res).expect("login should set a session cookie");

    let keys = client.keys();
    assert_eq!(keys.len(), 1);
    assert!(keys[0].starts_with("app1:Sessions:"));

    let mut res = get(&service, "whoami", Some(&cookie)).await;
    assert_eq!(res.take_string().await.unwrap(), "42");
}

#[tokio::test]
async fn test_flash_survives_one_read() {
    let client = MemoryClient::new();
    let service = service(client.clone());

    let res = get(&service, "login", None).await;
    let cookie = session_cookie(&res).unwrap();

    let mut res = get(&service, "notice", Some(&cookie)).await;
    assert_eq!(res.take_string().await.unwrap(), "welcome back");

    let mut res = get(&service, "notice", Some(&cookie)).await;
    assert_eq!(res.take_string().await.unwrap(), "");
}

#[tokio::test]
async fn test_regenerate_issues_new_key() {
    let client = MemoryClient::new();
    let service = service(client.clone());

    let res = get(&service, "login", None).await;
    let cookie = session_cookie(&res).unwrap();
    let old_keys = client.keys();

    let res = get(&service, "rotate", Some(&cookie)).await;
    let rotated = session_cookie(&res).expect("rotation should set a new cookie");
    assert_ne!(rotated, cookie);

    let new_keys = client.keys();
    assert_eq!(new_keys.len(), 1);
    assert_ne!(new_keys, old_keys);

    let mut res = get(&service, "whoami", Some(&rotated)).await;
    assert_eq!(res.take_string().await.unwrap(), "42");

    let mut res = get(&service, "whoami", Some(&cookie)).await;
    assert_eq!(res.take_string().await.unwrap(), "anonymous");
}

#[tokio::test]
async fn test_logout_removes_session() {
    let client = MemoryClient::new();
    let service = service(client.clone());

    let res = get(&service, "login", None).await;
    let cookie = session_cookie(&res).unwrap();

    let res = get(&service, "logout", Some(&cookie)).await;
    assert_eq!(session_cookie(&res).as_deref(), Some(""));
    assert!(client.is_empty());

    let mut res = get(&service, "whoami", Some(&cookie)).await;
    assert_eq!(res.take_string().await.unwrap(), "anonymous");
}

#[tokio::test]
async fn test_forged_cookie_is_ignored() {
    let client = MemoryClient::new();
    let service = service(client.clone());

    let mut res = get(&service, "whoami", Some("forged.value")).await;
    assert_eq!(res.take_string().await.unwrap(), "anonymous");
}
