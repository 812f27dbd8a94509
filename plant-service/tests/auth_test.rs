mod common;

use common::{new_client, session_cookie, TestApp, TEST_PASSWORD};
use serde_json::json;

#[tokio::test]
async fn register_returns_user_without_password_hash() {
    let app = TestApp::spawn().await;

    let body = app.register("fern").await;

    assert_eq!(body["username"], "fern");
    assert_eq!(body["email"], "fern@example.com");
    assert!(body["id"].as_i64().unwrap() >= 1);
    assert!(body.get("password_hash").is_none());

    app.cleanup().await;
}

#[tokio::test]
async fn register_opens_a_session() {
    let app = TestApp::spawn().await;
    app.register("moss").await;

    let response = app
        .client
        .get(app.url("/api/auth/user"))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["username"], "moss");

    app.cleanup().await;
}

#[tokio::test]
async fn session_cookie_is_http_only() {
    let app = TestApp::spawn().await;

    let response = reqwest::Client::new()
        .post(app.url("/api/auth/register"))
        .json(&json!({ "username": "ivy", "password": TEST_PASSWORD }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), 201);
    let cookie = response
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .expect("Missing session cookie")
        .to_string();
    assert!(cookie.starts_with("plant_sid="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));

    app.cleanup().await;
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let app = TestApp::spawn().await;
    app.register("basil").await;

    let response = new_client()
        .post(app.url("/api/auth/register"))
        .json(&json!({ "username": "basil", "password": TEST_PASSWORD }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), 409);

    app.cleanup().await;
}

#[tokio::test]
async fn register_rejects_invalid_input() {
    let app = TestApp::spawn().await;

    let cases = [
        json!({ "username": "ab", "password": TEST_PASSWORD }),
        json!({ "username": "sage", "password": "123" }),
        json!({ "username": "sage", "password": TEST_PASSWORD, "email": "not-an-email" }),
    ];

    for case in cases {
        let response = app
            .client
            .post(app.url("/api/auth/register"))
            .json(&case)
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(response.status(), 422, "payload {} should be rejected", case);

        let body: serde_json::Value = response.json().await.unwrap();
        assert!(body["error"].is_string());
    }

    app.cleanup().await;
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/api/auth/register"))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), 400);

    app.cleanup().await;
}

#[tokio::test]
async fn login_with_correct_password_succeeds() {
    let app = TestApp::spawn().await;
    app.register("thyme").await;

    let client = new_client();
    let response = client
        .post(app.url("/api/auth/login"))
        .json(&json!({ "username": "thyme", "password": TEST_PASSWORD }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["username"], "thyme");

    let me = client.get(app.url("/api/auth/user")).send().await.unwrap();
    assert_eq!(me.status(), 200);

    app.cleanup().await;
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let app = TestApp::spawn().await;
    app.register("rosemary").await;

    let client = new_client();
    for (username, password) in [("rosemary", "wrong-password"), ("nobody", TEST_PASSWORD)] {
        let response = client
            .post(app.url("/api/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(response.status(), 401);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Invalid username or password");
    }

    app.cleanup().await;
}

#[tokio::test]
async fn logout_ends_the_session() {
    let app = TestApp::spawn().await;
    app.register("mint").await;

    let response = app
        .client
        .post(app.url("/api/auth/logout"))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status(), 200);

    let me = app
        .client
        .get(app.url("/api/auth/user"))
        .send()
        .await
        .unwrap();
    assert_eq!(me.status(), 401);

    app.cleanup().await;
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    for path in ["/api/auth/user", "/api/analyses", "/api/reports", "/api/analyses/1"] {
        let response = client.get(app.url(path)).send().await.unwrap();
        assert_eq!(response.status(), 401, "{} should require a session", path);
    }

    let response = client
        .get(app.url("/api/auth/user"))
        .header("cookie", "plant_sid=forged-session-id")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    app.cleanup().await;
}

#[tokio::test]
async fn login_replaces_the_previous_session() {
    let app = TestApp::spawn().await;
    app.register("sorrel").await;

    // Manage cookies by hand so the old one can be replayed
    let client = reqwest::Client::new();
    let login = || {
        client
            .post(app.url("/api/auth/login"))
            .json(&json!({ "username": "sorrel", "password": TEST_PASSWORD }))
    };

    let first = login().send().await.expect("Failed to execute request.");
    assert_eq!(first.status(), 200);
    let old_cookie = session_cookie(&first).expect("Missing session cookie");

    let second = login()
        .header("cookie", &old_cookie)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(second.status(), 200);
    let new_cookie = session_cookie(&second).expect("Missing session cookie");
    assert_ne!(old_cookie, new_cookie);

    let me = |cookie: String| {
        client
            .get(app.url("/api/auth/user"))
            .header("cookie", cookie)
            .send()
    };
    assert_eq!(me(old_cookie).await.unwrap().status(), 401);
    assert_eq!(me(new_cookie).await.unwrap().status(), 200);

    app.cleanup().await;
}

#[tokio::test]
async fn logout_invalidates_the_cookie_server_side() {
    let app = TestApp::spawn().await;

    let client = reqwest::Client::new();
    let response = client
        .post(app.url("/api/auth/register"))
        .json(&json!({ "username": "chive", "password": TEST_PASSWORD }))
        .send()
        .await
        .expect("Failed to execute request.");
    let cookie = session_cookie(&response).expect("Missing session cookie");

    let response = client
        .post(app.url("/api/auth/logout"))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // Replaying the old cookie no longer works
    let response = client
        .get(app.url("/api/auth/user"))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    app.cleanup().await;
}
