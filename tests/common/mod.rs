#![allow(dead_code)]

use reqwest::Client;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Once,
};

static INIT: Once = Once::new();
static MIGRATIONS_RAN: AtomicBool = AtomicBool::new(false);
static USER_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn init_env() {
    INIT.call_once(|| {
        dotenv::dotenv().ok();
        std::env::set_var(
            "JWT_SECRET",
            "integration_test_secret_that_is_at_least_32_characters_long",
        );
        // Governor limits off so assertion loops don't trip 429s; the
        // OTP cooldown under test is data-driven, not governor-driven.
        std::env::set_var("RATE_LIMIT_ENABLED", "0");
        let config = ideaconnect::config::jwt::JwtConfig::from_env().unwrap();
        let _ = ideaconnect::utils::jwt::init_jwt_config(config);
    });
}

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.addr, path)
    }
}

/// Spawn the full router on an ephemeral port against the configured
/// test database. Returns None when no database is configured so
/// DB-bound tests can skip themselves instead of failing the suite.
pub async fn try_spawn_app() -> Option<TestApp> {
    init_env();

    let database_url = std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()?;

    let db = sea_orm::Database::connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    if !MIGRATIONS_RAN.swap(true, Ordering::SeqCst) {
        ideaconnect::migration::Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");
    }

    // Unconfigured by default in tests: emails are skipped and the
    // moderation gate approves everything (fail-open).
    let email_service = ideaconnect::services::email::EmailService::from_env();
    let ai_service = ideaconnect::services::ai::AiService::new(None);

    let app = axum::Router::new()
        .merge(ideaconnect::routes::create_routes())
        .layer(axum::middleware::from_fn(
            ideaconnect::middleware::security::security_headers_middleware,
        ))
        .layer(axum::extract::Extension(db.clone()))
        .layer(axum::extract::Extension(email_service))
        .layer(axum::extract::Extension(ai_service));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    Some(TestApp {
        addr: format!("http://{}", addr),
        db,
        client: Client::new(),
    })
}

/// Process-unique email so tests never collide without truncating tables.
pub fn unique_email(prefix: &str) -> String {
    let counter = USER_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}_{}_{}@test.com", prefix, std::process::id(), counter)
}

pub const TEST_PASSWORD: &str = "test_password_123";

/// Register a personal member account; returns (user_id, token, email).
pub async fn register_member(app: &TestApp, prefix: &str) -> (i32, String, String) {
    let email = unique_email(prefix);

    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&serde_json::json!({
            "profile_type": "personal",
            "name": format!("Test User {}", prefix),
            "email": email,
            "password": TEST_PASSWORD,
        }))
        .send()
        .await
        .expect("Failed to register user");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.expect("register response not JSON");
    assert!(
        body["success"].as_bool().unwrap_or(false),
        "register failed: status={status}, body={body}"
    );

    let user_id = body["data"]["user_id"].as_i64().expect("missing user_id") as i32;
    let token = body["data"]["token"]
        .as_str()
        .expect("missing token")
        .to_string();
    (user_id, token, email)
}

/// Flip a profile's role column directly; admin promotion has no
/// self-service route.
pub async fn promote_to_admin(app: &TestApp, user_id: i32) {
    use sea_orm::{ConnectionTrait, Statement};

    app.db
        .execute(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            "UPDATE profiles SET role = 'admin' WHERE id = $1",
            vec![user_id.into()],
        ))
        .await
        .expect("failed to promote user to admin");
}

/// Create an idea and return its id.
pub async fn create_idea(app: &TestApp, token: &str, title: &str, category: &str) -> i32 {
    let resp = app
        .client
        .post(app.url("/ideas"))
        .bearer_auth(token)
        .json(&serde_json::json!({
            "title": title,
            "description": "A long enough description of the idea under test.",
            "category": category,
            "stage": "idea",
            "tags": ["test"],
            "seeking_investment": false,
        }))
        .send()
        .await
        .expect("Failed to create idea");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.expect("idea response not JSON");
    assert!(
        body["success"].as_bool().unwrap_or(false),
        "create idea failed: status={status}, body={body}"
    );
    body["data"]["id"].as_i64().expect("missing idea id") as i32
}

/// Cast a vote and return the reported score.
pub async fn cast_vote(app: &TestApp, token: &str, idea_id: i32, vote: &str) -> i64 {
    let resp = app
        .client
        .post(app.url(&format!("/ideas/{idea_id}/vote")))
        .bearer_auth(token)
        .json(&serde_json::json!({ "vote": vote }))
        .send()
        .await
        .expect("Failed to cast vote");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.expect("vote response not JSON");
    assert!(
        body["success"].as_bool().unwrap_or(false),
        "vote failed: status={status}, body={body}"
    );
    body["data"]["score"].as_i64().expect("missing score")
}
