use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use farmdesk_api::config;
use farmdesk_api::database::manager::DatabaseManager;
use farmdesk_api::handlers::{auth, batches, clients, dashboard, expenses, receipts, reports, sales, users};
use farmdesk_api::middleware::auth::jwt_auth_middleware;
use farmdesk_api::middleware::permissions::permission_middleware;
use farmdesk_api::middleware::validate_user::{
    require_auditor, require_manager, require_owner, require_staff,
};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting Farmdesk API in {:?} mode", config.environment);

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("FARMDESK_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Farmdesk API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth/login", post(auth::login))
        // Protected API
        .merge(api_routes())
        // Global middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// Everything under /api sits behind the token verifier; each group then
/// attaches its own role or permission gate.
fn api_routes() -> Router {
    Router::new()
        .route("/api/auth/whoami", get(auth::whoami))
        .merge(user_routes())
        .merge(client_routes())
        .merge(sale_routes())
        .merge(batch_routes())
        .merge(expense_routes())
        .merge(report_routes())
        .merge(dashboard_routes())
        .merge(receipt_routes())
        .layer(middleware::from_fn(jwt_auth_middleware))
}

fn user_routes() -> Router {
    Router::new()
        .route("/api/users", get(users::list).post(users::create))
        .route(
            "/api/users/:id",
            get(users::get).put(users::update).delete(users::delete),
        )
        .route_layer(middleware::from_fn(require_owner))
}

fn client_routes() -> Router {
    Router::new()
        .route("/api/clients", get(clients::list).post(clients::create))
        .route(
            "/api/clients/:id",
            get(clients::get).put(clients::update).delete(clients::delete),
        )
        .route_layer(middleware::from_fn(require_manager))
}

fn sale_routes() -> Router {
    Router::new()
        .route("/api/sales", get(sales::list).post(sales::create))
        .route(
            "/api/sales/:id",
            get(sales::get).put(sales::update).delete(sales::delete),
        )
        .route_layer(middleware::from_fn(require_staff))
}

fn batch_routes() -> Router {
    Router::new()
        .route("/api/batches", get(batches::list).post(batches::create))
        .route(
            "/api/batches/:id",
            get(batches::get).put(batches::update).delete(batches::delete),
        )
        .route_layer(middleware::from_fn(require_staff))
}

fn expense_routes() -> Router {
    Router::new()
        .route("/api/expenses", get(expenses::list).post(expenses::create))
        .route(
            "/api/expenses/:id",
            get(expenses::get).put(expenses::update).delete(expenses::delete),
        )
        .route_layer(middleware::from_fn(require_staff))
}

fn report_routes() -> Router {
    Router::new()
        .route("/api/reports/summary", get(reports::summary))
        .route_layer(middleware::from_fn(require_auditor))
}

fn dashboard_routes() -> Router {
    Router::new()
        .route("/api/dashboard", get(dashboard::summary))
        .route_layer(middleware::from_fn(|request: Request, next: Next| {
            permission_middleware(request, next, "view_dashboard")
        }))
}

fn receipt_routes() -> Router {
    Router::new()
        .route("/api/receipts/parse", post(receipts::parse))
        .route_layer(middleware::from_fn(|request: Request, next: Next| {
            permission_middleware(request, next, "record_sales")
        }))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Farmdesk API",
            "version": version,
            "description": "Farm management backend - clients, sales, batches and expenses",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "login": "/auth/login (public - token acquisition)",
                "whoami": "/api/auth/whoami (protected)",
                "users": "/api/users[/:id] (owner)",
                "clients": "/api/clients[/:id] (owner, manager)",
                "sales": "/api/sales[/:id] (owner, manager, staff)",
                "batches": "/api/batches[/:id] (owner, manager, staff)",
                "expenses": "/api/expenses[/:id] (owner, manager, staff)",
                "reports": "/api/reports/summary (owner, auditor)",
                "dashboard": "/api/dashboard (permission: view_dashboard)",
                "receipts": "/api/receipts/parse (permission: record_sales)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
