//! Integration tests — temp-file SQLite, full router, requests via `oneshot`.

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderValue, Request, Response, StatusCode, header};
use jsonwebtoken::{EncodingKey, Header};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;
use verdict_api::AppState;
use verdict_api::config::{ApiConfig, ConfigError};
use verdict_core::auth::password::MIN_COST;

const SECRET: &str = "integration-secret";
const ALLOWED: &str = "http://localhost:4200";

struct TestApp {
    app: Router,
    pool: sqlx::SqlitePool,
    _dir: TempDir,
}

async fn spawn_app() -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("verdict.db");
    let pool = verdict_core::db::connect(&format!("sqlite://{}", path.display()), 5)
        .await
        .expect("connect");

    let mut config = ApiConfig::new(SECRET, format!("{ALLOWED}, https://app.example"));
    config.bcrypt_cost = MIN_COST;
    let state = AppState::new(pool.clone(), config).expect("state");

    TestApp {
        app: verdict_api::router(state),
        pool,
        _dir: dir,
    }
}

impl TestApp {
    async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(req).await.expect("request")
    }

    async fn json(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let resp = self
            .send(builder.body(Body::from(body.to_string())).unwrap())
            .await;
        read_json(resp).await
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        read_json(self.send(builder.body(Body::empty()).unwrap()).await).await
    }

    /// Sign up and log in; returns (user id, token).
    async fn user(&self, email: &str) -> (i64, String) {
        let (status, body) = self
            .json(
                "POST",
                "/api/signup",
                None,
                json!({ "email": email, "password": "hunter22" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup {email}: {body}");
        let id = body["id"].as_i64().expect("id");

        let (status, body) = self
            .json(
                "POST",
                "/api/login",
                None,
                json!({ "email": email, "password": "hunter22" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login {email}: {body}");
        (id, body["token"].as_str().expect("token").to_string())
    }

    async fn workspace(&self, token: &str, name: &str) -> i64 {
        let (status, body) = self
            .json("POST", "/api/workspaces", Some(token), json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().expect("workspace id")
    }

    async fn decision(&self, token: &str, ws: i64) -> Value {
        let (status, body) = self
            .json(
                "POST",
                &format!("/api/workspaces/{ws}/decisions"),
                Some(token),
                json!({ "title": "Use SQLite", "description": "Single node", "status": "proposed" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }
}

async fn read_json(resp: Response<Body>) -> (StatusCode, Value) {
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}

async fn decision_row(pool: &sqlx::SqlitePool, id: i64) -> (String, String, String, i64) {
    sqlx::query_as("SELECT title, description, status, updated_at FROM decisions WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("decision row")
}

fn sign(claims: &Value, secret: &str) -> String {
    jsonwebtoken::encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("encode")
}

#[tokio::test]
async fn state_rejects_blank_secret_and_unusable_origins() {
    let pool = verdict_core::db::in_memory().await.expect("pool");

    let blank_secret = ApiConfig::new("   ", ALLOWED);
    assert!(matches!(
        AppState::new(pool.clone(), blank_secret),
        Err(ConfigError::MissingSecret)
    ));

    for origins in ["", " , ", "http://localhost:4200/app"] {
        let config = ApiConfig::new(SECRET, origins);
        assert!(
            matches!(AppState::new(pool.clone(), config), Err(ConfigError::Origins(_))),
            "origins {origins:?}"
        );
    }
}

// ---------------------------------------------------------------------------
// Health / CORS
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_is_public() {
    let t = spawn_app().await;
    let (status, body) = t.get("/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], verdict_core::version());
}

#[tokio::test]
async fn allowed_origin_is_echoed_with_credentials() {
    let t = spawn_app().await;
    let req = Request::builder()
        .uri("/api/health")
        .header(header::ORIGIN, ALLOWED)
        .body(Body::empty())
        .unwrap();
    let resp = t.send(req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let headers = resp.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], ALLOWED);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    let vary: Vec<_> = headers
        .get_all(header::VARY)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert!(vary.iter().any(|v| v == "Origin"));
}

#[tokio::test]
async fn disallowed_origin_gets_no_cors_headers() {
    let t = spawn_app().await;
    let req = Request::builder()
        .uri("/api/health")
        .header(header::ORIGIN, "https://evil.example")
        .body(Body::empty())
        .unwrap();
    let resp = t.send(req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

#[tokio::test]
async fn preflight_from_allowed_origin_is_no_content() {
    let t = spawn_app().await;
    let req = Request::builder()
        .method("OPTIONS")
        .uri("/api/workspaces")
        .header(header::ORIGIN, "HTTPS://APP.example:443")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let resp = t.send(req).await;

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://app.example"
    );
    assert_eq!(
        resp.headers()[header::ACCESS_CONTROL_ALLOW_METHODS],
        "GET, POST, PUT, DELETE, OPTIONS"
    );
}

#[tokio::test]
async fn preflight_from_disallowed_origin_is_forbidden() {
    let t = spawn_app().await;
    let req = Request::builder()
        .method("OPTIONS")
        .uri("/api/workspaces")
        .header(header::ORIGIN, "https://evil.example")
        .body(Body::empty())
        .unwrap();
    let resp = t.send(req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

#[tokio::test]
async fn preflight_with_non_ascii_origin_is_forbidden() {
    let t = spawn_app().await;
    let req = Request::builder()
        .method("OPTIONS")
        .uri("/api/workspaces")
        .header(
            header::ORIGIN,
            HeaderValue::from_bytes(b"http://ev\xe9l.example").unwrap(),
        )
        .body(Body::empty())
        .unwrap();
    let resp = t.send(req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

#[tokio::test]
async fn options_without_origin_is_no_content() {
    let t = spawn_app().await;
    let req = Request::builder()
        .method("OPTIONS")
        .uri("/api/decisions/1")
        .body(Body::empty())
        .unwrap();
    assert_eq!(t.send(req).await.status(), StatusCode::NO_CONTENT);
}

// ---------------------------------------------------------------------------
// Signup / login / tokens
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_sets_http_only_session_cookie() {
    let t = spawn_app().await;
    t.json(
        "POST",
        "/api/signup",
        None,
        json!({ "email": "Ada@Example.com", "password": "hunter22" }),
    )
    .await;

    let req = Request::builder()
        .method("POST")
        .uri("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "email": "ada@example.com", "password": "hunter22" }).to_string(),
        ))
        .unwrap();
    let resp = t.send(req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(cookie.starts_with("token="), "{cookie}");
    assert!(cookie.contains("HttpOnly"), "{cookie}");
    assert!(cookie.contains("SameSite=Lax"), "{cookie}");
    assert!(!cookie.contains("Secure"), "{cookie}");

    // The cookie alone authenticates.
    let token = cookie
        .trim_start_matches("token=")
        .split(';')
        .next()
        .unwrap()
        .to_string();
    let req = Request::builder()
        .uri("/api/protected")
        .header(header::COOKIE, format!("token={token}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = read_json(t.send(req).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("Hello, ada@example.com".into()));
}

#[tokio::test]
async fn duplicate_signup_conflicts() {
    let t = spawn_app().await;
    t.user("dup@example.com").await;
    let (status, body) = t
        .json(
            "POST",
            "/api/signup",
            None,
            json!({ "email": " DUP@example.com ", "password": "other" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn signup_rejects_invalid_email_and_bad_body() {
    let t = spawn_app().await;
    let (status, _) = t
        .json(
            "POST",
            "/api/signup",
            None,
            json!({ "email": "not-an-email", "password": "x" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = Request::builder()
        .method("POST")
        .uri("/api/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = read_json(t.send(req).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid request body");
}

#[tokio::test]
async fn wrong_password_and_unknown_email_are_indistinguishable() {
    let t = spawn_app().await;
    t.user("known@example.com").await;

    let wrong = t
        .json(
            "POST",
            "/api/login",
            None,
            json!({ "email": "known@example.com", "password": "nope" }),
        )
        .await;
    let unknown = t
        .json(
            "POST",
            "/api/login",
            None,
            json!({ "email": "ghost@example.com", "password": "nope" }),
        )
        .await;

    assert_eq!(wrong.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong, unknown);
}

#[tokio::test]
async fn protected_route_without_token_is_unauthorized() {
    let t = spawn_app().await;
    let (status, body) = t.get("/api/workspaces", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn token_with_wrong_claim_shape_is_bad_request() {
    let t = spawn_app().await;
    let exp = chrono::Utc::now().timestamp() + 3600;
    let token = sign(&json!({ "sub": 7, "exp": exp }), SECRET);
    let (status, _) = t.get("/api/protected", Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn expired_or_foreign_tokens_are_unauthorized() {
    let t = spawn_app().await;
    let now = chrono::Utc::now().timestamp();
    let claims = |exp: i64| {
        json!({ "sub": "1", "userId": 1, "email": "a@example.com", "iat": now - 10, "exp": exp })
    };

    let expired = sign(&claims(now - 1), SECRET);
    assert_eq!(
        t.get("/api/protected", Some(&expired)).await.0,
        StatusCode::UNAUTHORIZED
    );

    let foreign = sign(&claims(now + 3600), "some-other-secret");
    assert_eq!(
        t.get("/api/protected", Some(&foreign)).await.0,
        StatusCode::UNAUTHORIZED
    );

    assert_eq!(
        t.get("/api/protected", Some("garbage")).await.0,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn token_for_deleted_user_is_unauthorized_on_resource_routes() {
    let t = spawn_app().await;
    let (id, token) = t.user("gone@example.com").await;
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(&t.pool)
        .await
        .unwrap();

    let (status, _) = t
        .json("POST", "/api/workspaces", Some(&token), json!({ "name": "x" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Workspaces / membership
// ---------------------------------------------------------------------------

#[tokio::test]
async fn owner_lists_both_workspaces_with_owner_role() {
    let t = spawn_app().await;
    let (_, token) = t.user("owner@example.com").await;
    let a = t.workspace(&token, "Alpha").await;
    let b = t.workspace(&token, "Beta").await;

    let (status, body) = t.get("/api/workspaces", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let list = body["workspaces"].as_array().expect("array");
    assert_eq!(list.len(), 2);
    let mut ids: Vec<i64> = list.iter().map(|w| w["id"].as_i64().unwrap()).collect();
    ids.sort();
    assert_eq!(ids, vec![a.min(b), a.max(b)]);
    assert!(list.iter().all(|w| w["role"] == "owner"));
}

#[tokio::test]
async fn workspace_name_is_required() {
    let t = spawn_app().await;
    let (_, token) = t.user("owner@example.com").await;
    let (status, _) = t
        .json("POST", "/api/workspaces", Some(&token), json!({ "name": "   " }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn member_added_to_two_workspaces_has_two_rows() {
    let t = spawn_app().await;
    let (_, owner) = t.user("owner@example.com").await;
    let (member_id, member) = t.user("member@example.com").await;
    let a = t.workspace(&owner, "Alpha").await;
    let b = t.workspace(&owner, "Beta").await;

    for ws in [a, b] {
        let (status, body) = t
            .json(
                "POST",
                &format!("/api/workspaces/{ws}/members"),
                Some(&owner),
                json!({ "email": "Member@Example.com" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["role"], "member");
        assert_eq!(body["workspaceId"], ws);
    }

    let (rows,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM workspace_members WHERE user_id = ?")
            .bind(member_id)
            .fetch_one(&t.pool)
            .await
            .unwrap();
    assert_eq!(rows, 2);

    let (_, body) = t.get("/api/workspaces", Some(&member)).await;
    assert_eq!(body["workspaces"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn only_owner_adds_members() {
    let t = spawn_app().await;
    let (_, owner) = t.user("owner@example.com").await;
    let (_, other) = t.user("other@example.com").await;
    t.user("third@example.com").await;
    let ws = t.workspace(&owner, "Alpha").await;

    let (status, body) = t
        .json(
            "POST",
            &format!("/api/workspaces/{ws}/members"),
            Some(&other),
            json!({ "email": "third@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Only workspace owner can add members");
}

#[tokio::test]
async fn add_member_unknown_user_or_workspace_is_not_found() {
    let t = spawn_app().await;
    let (_, owner) = t.user("owner@example.com").await;
    let ws = t.workspace(&owner, "Alpha").await;

    let (status, _) = t
        .json(
            "POST",
            &format!("/api/workspaces/{ws}/members"),
            Some(&owner),
            json!({ "email": "nobody@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = t
        .json(
            "POST",
            "/api/workspaces/9999/members",
            Some(&owner),
            json!({ "email": "owner@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_numeric_path_id_is_bad_request() {
    let t = spawn_app().await;
    let (_, token) = t.user("owner@example.com").await;
    let (status, _) = t
        .json(
            "POST",
            "/api/workspaces/abc/decisions",
            Some(&token),
            json!({ "title": "t", "description": "d", "status": "s" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = t
        .json("PUT", "/api/decisions/-3", Some(&token), json!({ "title": "t" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn member_creates_decision_in_workspace() {
    let t = spawn_app().await;
    let (owner_id, owner) = t.user("owner@example.com").await;
    let ws = t.workspace(&owner, "Alpha").await;

    let body = t.decision(&owner, ws).await;
    assert_eq!(body["workspaceId"], ws);
    assert_eq!(body["ownerId"], owner_id);
    assert_eq!(body["title"], "Use SQLite");
    assert_eq!(body["createdAt"], body["updatedAt"]);
}

#[tokio::test]
async fn non_member_cannot_create_decision() {
    let t = spawn_app().await;
    let (_, owner) = t.user("owner@example.com").await;
    let (_, outsider) = t.user("outsider@example.com").await;
    let ws = t.workspace(&owner, "Alpha").await;

    let (status, body) = t
        .json(
            "POST",
            &format!("/api/workspaces/{ws}/decisions"),
            Some(&outsider),
            json!({ "title": "t", "description": "d", "status": "s" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "User is not a member of workspace");

    let (status, _) = t
        .json(
            "POST",
            "/api/workspaces/4242/decisions",
            Some(&outsider),
            json!({ "title": "t", "description": "d", "status": "s" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_update_is_rejected() {
    let t = spawn_app().await;
    let (_, owner) = t.user("owner@example.com").await;
    let ws = t.workspace(&owner, "Alpha").await;
    let id = t.decision(&owner, ws).await["id"].as_i64().unwrap();

    let (status, body) = t
        .json("PUT", &format!("/api/decisions/{id}"), Some(&owner), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "At least one field is required");
}

#[tokio::test]
async fn single_field_update_preserves_the_rest() {
    let t = spawn_app().await;
    let (_, owner) = t.user("owner@example.com").await;
    let ws = t.workspace(&owner, "Alpha").await;
    let before = t.decision(&owner, ws).await;
    let id = before["id"].as_i64().unwrap();

    let (status, after) = t
        .json(
            "PATCH",
            &format!("/api/decisions/{id}"),
            Some(&owner),
            json!({ "status": "accepted" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{after}");
    assert_eq!(after["status"], "accepted");
    assert_eq!(after["title"], before["title"]);
    assert_eq!(after["description"], before["description"]);
    assert_eq!(after["createdAt"], before["createdAt"]);

    let (before_ts,): (i64,) = sqlx::query_as("SELECT created_at FROM decisions WHERE id = ?")
        .bind(id)
        .fetch_one(&t.pool)
        .await
        .unwrap();
    let (after_ts,): (i64,) = sqlx::query_as("SELECT updated_at FROM decisions WHERE id = ?")
        .bind(id)
        .fetch_one(&t.pool)
        .await
        .unwrap();
    assert!(after_ts > before_ts);
}

#[tokio::test]
async fn non_owner_update_is_not_found_and_row_untouched() {
    let t = spawn_app().await;
    let (_, owner) = t.user("owner@example.com").await;
    let (_, member) = t.user("member@example.com").await;
    let ws = t.workspace(&owner, "Alpha").await;
    t.json(
        "POST",
        &format!("/api/workspaces/{ws}/members"),
        Some(&owner),
        json!({ "email": "member@example.com" }),
    )
    .await;
    let id = t.decision(&owner, ws).await["id"].as_i64().unwrap();

    let before = decision_row(&t.pool, id).await;

    let (status, body) = t
        .json(
            "PUT",
            &format!("/api/decisions/{id}"),
            Some(&member),
            json!({ "title": "hijacked" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Decision not found");
    assert_eq!(decision_row(&t.pool, id).await, before);

    let (status, _) = t
        .json(
            "PUT",
            "/api/decisions/987654",
            Some(&owner),
            json!({ "title": "x" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
