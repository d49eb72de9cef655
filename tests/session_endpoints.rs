//! Login, logout and health endpoints.

use axum::http::{header, Method, StatusCode};
use serde_json::{json, Value};

mod common;

fn set_cookies(res: &reqwest::Response) -> Vec<String> {
    res.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn login_sets_session_cookies_and_relays_reply() {
    let upstream = common::start_upstream(|_| {
        (
            StatusCode::OK,
            r#"{"success":true,"token":"tok-abc","role":"printer","name":"Print desk"}"#.into(),
        )
    })
    .await;
    let (proxy, shutdown) = common::start_gateway(common::gateway_config(&upstream.base_url())).await;

    let res = common::client()
        .post(format!("http://{}/api/auth/login", proxy))
        .json(&json!({"username": "desk", "password": "hunter2"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let cookies = set_cookies(&res);
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().any(|c| c.starts_with("authToken=tok-abc;")));
    assert!(cookies.iter().any(|c| c.starts_with("userRole=printer;")));
    assert!(cookies.iter().all(|c| c.contains("Max-Age=28800")));

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["name"], "Print desk");

    let seen = upstream.last();
    assert_eq!(seen.method, Method::POST);
    assert_eq!(seen.uri, "/login.php");
    assert_eq!(seen.headers.get(header::CONTENT_TYPE).unwrap(), "application/json");
    let sent: Value = serde_json::from_slice(&seen.body).unwrap();
    assert_eq!(sent["username"], "desk");

    shutdown.trigger();
}

#[tokio::test]
async fn issued_cookies_pass_the_gate() {
    let upstream = common::start_upstream(|_| {
        (StatusCode::OK, r#"{"token":"tok-xyz","role":"printer"}"#.into())
    })
    .await;
    let (proxy, shutdown) = common::start_gateway(common::gateway_config(&upstream.base_url())).await;
    let client = common::client();

    let res = client
        .post(format!("http://{}/api/auth/login", proxy))
        .body("{}")
        .send()
        .await
        .unwrap();
    let cookie = set_cookies(&res)
        .iter()
        .filter_map(|c| c.split(';').next().map(str::to_string))
        .collect::<Vec<_>>()
        .join("; ");

    let res = client
        .get(format!("http://{}/users", proxy))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/unauthorized");

    let res = client
        .get(format!("http://{}/print", proxy))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    shutdown.trigger();
}

#[tokio::test]
async fn failed_login_relayed_without_cookies() {
    let upstream = common::start_upstream(|_| {
        (
            StatusCode::OK,
            r#"{"success":false,"message":"Invalid credentials"}"#.into(),
        )
    })
    .await;
    let (proxy, shutdown) = common::start_gateway(common::gateway_config(&upstream.base_url())).await;

    let res = common::client()
        .post(format!("http://{}/api/auth/login", proxy))
        .body(r#"{"username":"desk","password":"nope"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(set_cookies(&res).is_empty());
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"success":false,"message":"Invalid credentials"}));

    shutdown.trigger();
}

#[tokio::test]
async fn unknown_role_refused() {
    let upstream = common::start_upstream(|_| {
        (StatusCode::OK, r#"{"token":"tok","role":"student"}"#.into())
    })
    .await;
    let (proxy, shutdown) = common::start_gateway(common::gateway_config(&upstream.base_url())).await;

    let res = common::client()
        .post(format!("http://{}/api/auth/login", proxy))
        .body("{}")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert!(set_cookies(&res).is_empty());
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Unsupported role");

    shutdown.trigger();
}

#[tokio::test]
async fn upstream_rejection_becomes_500_envelope() {
    let upstream = common::start_upstream(|_| {
        (StatusCode::UNAUTHORIZED, r#"{"error":"bad password"}"#.into())
    })
    .await;
    let (proxy, shutdown) = common::start_gateway(common::gateway_config(&upstream.base_url())).await;

    let res = common::client()
        .post(format!("http://{}/api/auth/login", proxy))
        .body("{}")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Server request failed");
    assert_eq!(body["message"], "bad password");
    assert_eq!(body["status"], 401);

    shutdown.trigger();
}

#[tokio::test]
async fn login_ignores_resource_allow_list() {
    let upstream = common::start_upstream(|_| {
        (StatusCode::OK, r#"{"token":"t","role":"admin"}"#.into())
    })
    .await;
    let mut config = common::gateway_config(&upstream.base_url());
    config.upstream.allowed_resources = vec!["users.php".into()];
    let (proxy, shutdown) = common::start_gateway(config).await;

    let res = common::client()
        .post(format!("http://{}/api/auth/login", proxy))
        .body("{}")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(upstream.last().uri, "/login.php");

    shutdown.trigger();
}

#[tokio::test]
async fn logout_expires_both_cookies() {
    let (proxy, shutdown) = common::start_gateway(common::gateway_config("http://127.0.0.1:9")).await;

    let res = common::client()
        .post(format!("http://{}/api/auth/logout", proxy))
        .header(header::COOKIE, "authToken=tok; userRole=admin")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let cookies = set_cookies(&res);
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"success": true}));

    shutdown.trigger();
}

#[tokio::test]
async fn health_reports_version() {
    let (proxy, shutdown) = common::start_gateway(common::gateway_config("http://127.0.0.1:9")).await;

    let res = common::client()
        .get(format!("http://{}/api/health", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    shutdown.trigger();
}
