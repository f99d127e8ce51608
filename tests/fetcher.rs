use axum::extract::Form;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::Local;
use std::collections::HashMap;
use tokio::net::TcpListener;

use essstat::config::Config;
use essstat::fetcher::{SwitchClient, SwitchPage};
use essstat::{port_snapshot, system_snapshot, EssStatError};

const STANDARD: &str = include_str!("fixtures/standard.htm");
const SYSTEM_INFO: &str = include_str!("fixtures/system_info.htm");
const SESSION: &str = "H_P_SSID=mock-session";

async fn logon(Form(form): Form<HashMap<String, String>>) -> Response {
    let field = |name: &str| form.get(name).map(String::as_str);
    if field("logon") == Some("Login")
        && field("username") == Some("admin")
        && field("password") == Some("secret")
    {
        (
            [(header::SET_COOKIE, format!("{}; Path=/", SESSION))],
            "<html><body>ok</body></html>",
        )
            .into_response()
    } else {
        "<html><body>login</body></html>".into_response()
    }
}

fn page(headers: &HeaderMap, body: &'static str) -> Response {
    let authed = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|c| c.contains(SESSION));
    if !authed {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if headers.get(header::UPGRADE_INSECURE_REQUESTS).is_none() {
        return StatusCode::BAD_REQUEST.into_response();
    }
    body.into_response()
}

async fn spawn_switch() -> String {
    let app = Router::new()
        .route("/logon.cgi", post(logon))
        .route(
            "/PortStatisticsRpm.htm",
            get(|headers: HeaderMap| async move { page(&headers, STANDARD) }),
        )
        .route(
            "/SystemInfoRpm.htm",
            get(|headers: HeaderMap| async move { page(&headers, SYSTEM_INFO) }),
        )
        .route("/Logout.htm", get(|| async { "<html><body>bye</body></html>" }));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr.to_string()
}

#[tokio::test]
async fn login_then_fetch_port_statistics() {
    let target = spawn_switch().await;
    let client = SwitchClient::new(&target, Config::default()).unwrap();
    assert_eq!(client.base_url(), format!("http://{}", target));

    client.login("admin", "secret").await.unwrap();
    let html = client.fetch(SwitchPage::PortStatistics).await.unwrap();
    client.logout().await;

    let snap = port_snapshot(&html, Local::now().naive_local()).unwrap();
    assert_eq!(snap.max_port_num, 8);
    assert_eq!(snap.ports[0].tx_good_pkt, 1234567);
}

#[tokio::test]
async fn fetch_system_info() {
    let target = spawn_switch().await;
    let client = SwitchClient::new(&target, Config::default()).unwrap();

    client.login("admin", "secret").await.unwrap();
    let html = client.fetch(SwitchPage::SystemInfo).await.unwrap();

    let snap = system_snapshot(&html, Local::now().naive_local()).unwrap();
    assert_eq!(snap.info.ip, "192.168.0.1");
}

#[tokio::test]
async fn bad_credentials_are_rejected() {
    let target = spawn_switch().await;
    let client = SwitchClient::new(&target, Config::default()).unwrap();

    client.login("admin", "wrong").await.unwrap();
    let err = client.fetch(SwitchPage::PortStatistics).await.unwrap_err();
    assert!(matches!(
        err,
        EssStatError::LoginRejected(status) if status.as_u16() == 401
    ));
}

#[tokio::test]
async fn fetch_without_login_is_rejected() {
    let target = spawn_switch().await;
    let client = SwitchClient::new(&target, Config::default()).unwrap();

    let err = client.fetch(SwitchPage::SystemInfo).await.unwrap_err();
    assert!(matches!(err, EssStatError::LoginRejected(_)));
}
