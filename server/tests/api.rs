use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Json, Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    routing::get,
};
use http_body_util::BodyExt;
use hr_server::{
    AppState, build_router,
    config::{AppConfig, MailConfig},
    positions::PositionsGateway,
};
use migration::{Migrator, MigratorTrait};
use platform_authn::AuthConfig;
use platform_mail::{Email, MailError, Mailer};
use sea_orm::{ConnectOptions, Database};
use serde_json::{Value, json};
use tower::ServiceExt;

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<Email>>,
}

impl RecordingMailer {
    fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _email: &Email) -> Result<(), MailError> {
        Err(MailError::Send("smtp relay offline".into()))
    }
}

/// Serves a canned positions document on `/api/positions` and a failing
/// endpoint on `/down`.
async fn positions_stub() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new()
        .route(
            "/api/positions",
            get(|| async { Json(json!({"positions": ["Engineer", "Lead"]})) }),
        )
        .route(
            "/down",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        );
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn app_with(mailer: Arc<dyn Mailer>, positions_url: String) -> Router {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    let pool = Database::connect(options).await.unwrap();
    Migrator::up(&pool, None).await.unwrap();

    let config = AppConfig {
        auth: AuthConfig {
            jwt_secret: b"test-secret-test-secret-test-secret!".to_vec(),
            token_ttl_minutes: 60,
        },
        cors_allowed_origins: vec!["http://localhost:5173".into()],
        positions_url: positions_url.clone(),
        mail: MailConfig::default(),
    };
    build_router(AppState {
        pool,
        config: Arc::new(config),
        mailer,
        positions: PositionsGateway::new(positions_url).unwrap(),
    })
}

async fn app(mailer: Arc<dyn Mailer>) -> Router {
    app_with(mailer, "http://127.0.0.1:9/api/positions".into()).await
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register_and_login(app: &Router, email: &str, password: &str) -> String {
    let (status, _) = call(
        app,
        Method::POST,
        "/api/register",
        None,
        Some(json!({"email": email, "password": password})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    login(app, email, password).await
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({"email": email, "password": password})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

fn employee_body(first: &str, last: &str, email: &str) -> Value {
    json!({
        "firstName": first,
        "lastName": last,
        "position": "Engineer",
        "birthDate": "1990-05-17",
        "email": email,
        "password": "welcome1",
    })
}

async fn create_employee(app: &Router, token: &str, first: &str, last: &str, email: &str) -> i64 {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/employees/",
        Some(token),
        Some(employee_body(first, last, email)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn registration_login_and_profile() {
    let app = app(Arc::new(RecordingMailer::default())).await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/register",
        None,
        Some(json!({"email": " Boss@Example.com ", "password": "s3cret"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"message": "User registered successfully"}));

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/register",
        None,
        Some(json!({"email": "boss@example.com", "password": "other"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({"error": "Email already registered"}));

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/register",
        None,
        Some(json!({"email": "new@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/register",
        None,
        Some(json!({"email": "not-an-email", "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for attempt in [
        json!({"email": "boss@example.com", "password": "wrong"}),
        json!({"email": "ghost@example.com", "password": "s3cret"}),
        json!({"email": "boss@example.com"}),
    ] {
        let (status, body) = call(&app, Method::POST, "/api/login", None, Some(attempt)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"error": "Invalid credentials"}));
    }

    let token = login(&app, "BOSS@example.com", "s3cret").await;
    let (status, body) = call(&app, Method::GET, "/api/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"email": "boss@example.com", "roles": ["ROLE_ADMIN"]})
    );

    let (status, _) = call(&app, Method::GET, "/api/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = call(&app, Method::GET, "/api/profile", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = app(Arc::new(RecordingMailer::default())).await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\":"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn employee_creation_listing_and_search() {
    let mailer = Arc::new(RecordingMailer::default());
    let app = app(mailer.clone()).await;
    let admin = register_and_login(&app, "boss@example.com", "s3cret").await;

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/employees/",
        None,
        Some(employee_body("Ann", "Lee", "ann@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let ann = create_employee(&app, &admin, "Ann", "Lee", "ann@example.com").await;
    create_employee(&app, &admin, "Bob", "Hannigan", "bob@example.com").await;
    create_employee(&app, &admin, "Carl", "Anderson", "carl@example.com").await;

    let sent = mailer.sent();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0].to, "ann@example.com");
    assert_eq!(sent[0].subject, "Welcome to the company");
    assert!(sent[0].text.contains("Ann Lee"));
    assert!(sent[0].text.contains("Engineer"));

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/employees",
        Some(&admin),
        Some(employee_body("Ann", "Again", "ANN@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    let mut incomplete = employee_body("Dan", "Doe", "dan@example.com");
    incomplete["birthDate"] = json!("17/05/1990");
    let (status, _) = call(&app, Method::POST, "/api/employees/", Some(&admin), Some(incomplete)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(mailer.sent().len(), 3);

    let (status, body) = call(&app, Method::GET, "/api/employees/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows[0],
        json!({
            "id": ann,
            "firstName": "Ann",
            "lastName": "Lee",
            "email": "ann@example.com",
            "position": "Engineer",
            "birthDate": "1990-05-17",
        })
    );

    let (_, body) = call(&app, Method::GET, "/api/employees?search=ANN", None, None).await;
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["firstName"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Ann", "Bob"]);
    assert!(!names.contains(&"Carl".to_string()));

    let (_, body) = call(&app, Method::GET, "/api/employees/?search=%20%20", None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn update_and_delete_follow_the_ownership_policy() {
    let app = app(Arc::new(RecordingMailer::default())).await;
    let admin = register_and_login(&app, "boss@example.com", "s3cret").await;
    let ann_id = create_employee(&app, &admin, "Ann", "Lee", "ann@example.com").await;
    create_employee(&app, &admin, "Bob", "Anderson", "bob@example.com").await;
    let ann = login(&app, "ann@example.com", "welcome1").await;
    let bob = login(&app, "bob@example.com", "welcome1").await;
    let ann_uri = format!("/api/employees/{ann_id}");

    let (status, body) = call(
        &app,
        Method::PUT,
        &ann_uri,
        Some(&admin),
        Some(json!({"position": "Lead"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Employee updated successfully"}));

    let (status, _) = call(
        &app,
        Method::PUT,
        &ann_uri,
        Some(&admin),
        Some(json!({"position": "  "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &app,
        Method::PUT,
        &ann_uri,
        Some(&ann),
        Some(json!({"firstName": "Annie"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body,
        json!({"error": "You can only change your own position."})
    );

    let (status, _) = call(
        &app,
        Method::PUT,
        &ann_uri,
        Some(&ann),
        Some(json!({"firstName": "Annie", "position": "Staff"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = call(&app, Method::GET, "/api/employees/", None, None).await;
    let row = &body.as_array().unwrap()[0];
    assert_eq!(row["firstName"], "Ann");
    assert_eq!(row["position"], "Staff");

    let (status, body) = call(
        &app,
        Method::PUT,
        &ann_uri,
        Some(&bob),
        Some(json!({"position": "CEO"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body,
        json!({"error": "You are not permitted to edit this employee."})
    );

    let (status, _) = call(&app, Method::PUT, &ann_uri, None, Some(json!({"position": "X"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Access is decided before the body is read.
    let (status, body) = call(
        &app,
        Method::PUT,
        &ann_uri,
        Some(&bob),
        Some(json!({"position": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");
    let (status, body) = call(&app, Method::PUT, &ann_uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");
    let (status, _) = call(
        &app,
        Method::PUT,
        &ann_uri,
        Some(&ann),
        Some(json!({"position": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for missing in ["/api/employees/999", "/api/employees/abc"] {
        let (status, _) = call(
            &app,
            Method::PUT,
            missing,
            Some(&admin),
            Some(json!({"position": "X"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    let (status, _) = call(&app, Method::DELETE, &ann_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call(&app, Method::DELETE, &ann_uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(&app, Method::DELETE, &ann_uri, Some(&ann), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Employee deleted successfully"}));

    let (status, _) = call(&app, Method::DELETE, &ann_uri, Some(&ann), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The identity outlives its record.
    let (status, _) = call(&app, Method::GET, "/api/profile", Some(&ann), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn positions_path_only_answers_get() {
    let app = app(Arc::new(RecordingMailer::default())).await;
    let admin = register_and_login(&app, "boss@example.com", "s3cret").await;
    for method in [Method::PUT, Method::DELETE] {
        let (status, _) = call(&app, method, "/api/employees/positions", Some(&admin), None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}

#[tokio::test]
async fn welcome_email_failure_does_not_fail_creation() {
    let app = app(Arc::new(FailingMailer)).await;
    let admin = register_and_login(&app, "boss@example.com", "s3cret").await;
    create_employee(&app, &admin, "Ann", "Lee", "ann@example.com").await;

    let (_, body) = call(&app, Method::GET, "/api/employees/", None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn positions_are_proxied_verbatim() {
    let upstream = positions_stub().await;
    let app = app_with(
        Arc::new(RecordingMailer::default()),
        format!("{upstream}/api/positions"),
    )
    .await;
    let (status, body) = call(&app, Method::GET, "/api/employees/positions", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"positions": ["Engineer", "Lead"]}));

    let failing = app_with(
        Arc::new(RecordingMailer::default()),
        format!("{upstream}/down"),
    )
    .await;
    let (status, body) = call(&failing, Method::GET, "/api/employees/positions", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn health_reports_database_state() {
    let app = app(Arc::new(RecordingMailer::default())).await;
    let (status, body) = call(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["dbOk"], true);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
