//! Axum-based HTTP gateway for the student roster. Config-driven via RosterConfig.

mod handlers;

use axum::http::{HeaderValue, Method};
use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use handlers::students;
use roster_core::{KeywordQueryAgent, RecordManager, RosterConfig};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) config: Arc<RosterConfig>,
    pub(crate) manager: Arc<RwLock<RecordManager>>,
}

/// Pre-flight check: config loads, storage opens and loads, port is free.
fn run_verify() -> Result<(), String> {
    let config = RosterConfig::load().map_err(|e| format!("Config load failed: {}", e))?;

    print!("Checking storage ({})... ", config.storage_backend.as_str());
    let storage = config
        .open_storage()
        .map_err(|e| {
            format!(
                "storage at {} inaccessible: {}",
                config.data_location().display(),
                e
            )
        })?;
    let records = storage
        .load()
        .map_err(|e| format!("{} could not be loaded: {}", storage.describe(), e))?;
    drop(storage);
    println!("OK ({} records)", records.len());

    print!("Checking {}... ", config.bind_address());
    match std::net::TcpListener::bind(config.bind_address()) {
        Ok(listener) => {
            drop(listener);
            println!("OK (available)");
        }
        Err(e) => {
            return Err(format!("{} BLOCKED: {}", config.bind_address(), e));
        }
    }

    println!("\nSUCCESS: ready to start {}.", config.app_name);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[roster-gateway] .env not loaded: {} (using system environment)", e);
    }

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--verify") {
        match run_verify() {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("PRE-FLIGHT FAILED: {}", e);
                std::process::exit(1);
            }
        }
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(RosterConfig::load()?);
    let storage = config.open_storage()?;
    let manager = Arc::new(RwLock::new(RecordManager::open(
        storage,
        Arc::new(KeywordQueryAgent::new()),
    )));

    let app = build_app(AppState {
        config: Arc::clone(&config),
        manager: Arc::clone(&manager),
    });

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(addr.as_str()).await?;
    tracing::info!(target: "roster::gateway", "{} listening on http://{}", config.app_name, addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!(target: "roster::gateway", "Shutting down: saving student data...");
    if let Err(e) = manager.read().await.save() {
        tracing::error!(target: "roster::gateway", error = %e, "Error during shutdown data save");
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(target: "roster::gateway", error = %e, "Ctrl-C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn build_app(state: AppState) -> Router {
    let cors_enabled = state.config.cors_enabled;

    let app = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/status", get(status))
        .route(
            "/students",
            get(students::list_students).post(students::create_student),
        )
        .route(
            "/students/:id",
            get(students::get_student)
                .put(students::update_student)
                .delete(students::delete_student),
        )
        .route("/query", get(students::query_students))
        .route("/save", post(students::save_students))
        .with_state(state);

    if !cors_enabled {
        return app;
    }

    // Local frontends only: any port on localhost / 127.0.0.1.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
            let s = origin.to_str().unwrap_or("");
            s.starts_with("http://localhost") || s.starts_with("http://127.0.0.1")
        }))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any);
    app.layer(cors)
}

/// GET /api/v1/health – liveness check.
async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

/// GET /api/v1/status – app identity, storage backend and record count.
async fn status(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    let manager = state.manager.read().await;
    axum::Json(serde_json::json!({
        "app_name": state.config.app_name,
        "storage_backend": state.config.storage_backend.as_str(),
        "storage": manager.storage_description(),
        "record_count": manager.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use roster_core::{MemoryStorage, RecordDraft, RecordMap};
    use tower::ServiceExt;

    fn test_config() -> RosterConfig {
        RosterConfig {
            app_name: "Test Roster".to_string(),
            ..RosterConfig::default()
        }
    }

    fn test_app(storage: Arc<MemoryStorage>) -> Router {
        let mut manager = RecordManager::open(storage, Arc::new(KeywordQueryAgent::new()));
        manager
            .add(RecordDraft::new("S1", "Alice", 25, "Female", "Finance"))
            .unwrap();
        manager
            .add(RecordDraft::new("S2", "Bob", 17, "Male", "Computer Science"))
            .unwrap();
        build_app(AppState {
            config: Arc::new(test_config()),
            manager: Arc::new(RwLock::new(manager)),
        })
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_health_and_status() {
        let app = test_app(Arc::new(MemoryStorage::new()));
        let (status, json) = send(&app, "GET", "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");

        let (status, json) = send(&app, "GET", "/api/v1/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["app_name"], "Test Roster");
        assert_eq!(json["storage"], "memory");
        assert_eq!(json["record_count"], 2);
    }

    #[tokio::test]
    async fn test_list_is_sorted_and_filters_by_name() {
        let app = test_app(Arc::new(MemoryStorage::new()));
        let (status, json) = send(&app, "GET", "/students", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json[0]["id"], "S1");
        assert_eq!(json[1]["id"], "S2");

        let (_, json) = send(&app, "GET", "/students?name=BO", None).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["name"], "Bob");
    }

    #[tokio::test]
    async fn test_get_unknown_student_is_404() {
        let app = test_app(Arc::new(MemoryStorage::new()));
        let (status, json) = send(&app, "GET", "/students/S9", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "not_found");
        assert_eq!(json["detail"], "No student found with ID S9.");
    }

    #[tokio::test]
    async fn test_create_student() {
        let app = test_app(Arc::new(MemoryStorage::new()));
        let body = serde_json::json!({
            "id": "S3", "name": "Carol", "age": 21, "gender": "Female", "major": "Physics"
        });
        let (status, json) = send(&app, "POST", "/students", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["id"], "S3");
        assert_eq!(json["gender"], "Female");

        let (status, json) = send(&app, "GET", "/students/S3", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "Carol");
    }

    #[tokio::test]
    async fn test_create_without_id_generates_one() {
        let app = test_app(Arc::new(MemoryStorage::new()));
        let body = serde_json::json!({
            "name": "Dan", "age": 30, "gender": "Male", "major": "History"
        });
        let (status, json) = send(&app, "POST", "/students", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = json["id"].as_str().unwrap();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[tokio::test]
    async fn test_create_duplicate_and_invalid_are_400() {
        let app = test_app(Arc::new(MemoryStorage::new()));
        let dup = serde_json::json!({
            "id": "S1", "name": "Again", "age": 30, "gender": "Male", "major": "History"
        });
        let (status, json) = send(&app, "POST", "/students", Some(dup)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "already_exists");

        let invalid = serde_json::json!({
            "id": "S4", "name": "Eve", "age": 30, "gender": "other", "major": "History"
        });
        let (status, json) = send(&app, "POST", "/students", Some(invalid)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "validation");
        assert_eq!(json["detail"], "Gender must be 'Male' or 'Female'.");

        let long_name = serde_json::json!({
            "id": "S5", "name": "x".repeat(51), "age": 30, "gender": "Male", "major": "History"
        });
        let (status, json) = send(&app, "POST", "/students", Some(long_name)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_malformed_input_gets_json_400() {
        let app = test_app(Arc::new(MemoryStorage::new()));
        let wrong_type = serde_json::json!({
            "id": "S6", "name": "Finn", "age": "twenty", "gender": "Male", "major": "History"
        });
        let (status, json) = send(&app, "POST", "/students", Some(wrong_type)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "bad_request");
        assert!(json["detail"].as_str().unwrap().contains("age"));

        let bad_patch = serde_json::json!({ "age": "old" });
        let (status, json) = send(&app, "PUT", "/students/S1", Some(bad_patch)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "bad_request");

        let (status, json) = send(&app, "GET", "/query", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "bad_request");
        assert!(json["detail"].as_str().unwrap().contains("text"));

        let (_, json) = send(&app, "GET", "/students/S1", None).await;
        assert_eq!(json["age"], 25);
    }

    #[tokio::test]
    async fn test_partial_update() {
        let app = test_app(Arc::new(MemoryStorage::new()));
        let adult = serde_json::json!({ "age": 18 });
        let (status, json) = send(&app, "PUT", "/students/S2", Some(adult.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["age"], 18);
        assert_eq!(json["name"], "Bob");
        assert_eq!(json["major"], "Computer Science");

        let (status, _) = send(&app, "PUT", "/students/S9", Some(adult)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let infant = serde_json::json!({ "age": 0 });
        let (status, json) = send(&app, "PUT", "/students/S2", Some(infant)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["detail"], "Age must be an integer between 1-150.");
    }

    #[tokio::test]
    async fn test_delete_student() {
        let app = test_app(Arc::new(MemoryStorage::new()));
        let (status, _) = send(&app, "DELETE", "/students/S1", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, "DELETE", "/students/S1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, json) = send(&app, "GET", "/students", None).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_natural_language_query() {
        let app = test_app(Arc::new(MemoryStorage::new()));
        let (status, json) = send(&app, "GET", "/query?text=all%20females%20over%2020", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["students"].as_array().unwrap().len(), 1);
        assert_eq!(json["students"][0]["id"], "S1");
        assert_eq!(
            json["query_params"],
            serde_json::json!({ "gender": "Female", "age_min": 20 })
        );

        let (status, json) = send(&app, "GET", "/query?query_text=who%20is%20tall", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "query_parse");
    }

    #[tokio::test]
    async fn test_save_writes_through_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let app = test_app(Arc::clone(&storage));
        let (status, json) = send(&app, "POST", "/save", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["record_count"], 2);
        let saved: RecordMap = storage.snapshot();
        assert_eq!(saved.keys().cloned().collect::<Vec<_>>(), vec!["S1", "S2"]);
    }
}
