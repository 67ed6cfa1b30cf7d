pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{delete, get, post};
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use typeb_core::dispatch::NotificationSink;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(root: PathBuf) -> Router {
    router_with_state(state::AppState::new(root))
}

/// Same, with an injected notification sink (tests capture deliveries).
pub fn build_router_with_sink(root: PathBuf, sink: Arc<dyn NotificationSink>) -> Router {
    router_with_state(state::AppState::with_sink(root, sink))
}

fn router_with_state(app_state: state::AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(routes::health))
        // Families
        .route("/api/families", get(routes::families::list_families))
        .route("/api/families", post(routes::families::create_family))
        .route("/api/families/join", post(routes::families::join_family))
        .route("/api/families/{id}", get(routes::families::get_family))
        .route(
            "/api/families/{id}/promote",
            post(routes::families::promote_member),
        )
        .route(
            "/api/families/{id}/remove",
            post(routes::families::remove_member),
        )
        // Tasks
        .route("/api/families/{id}/tasks", get(routes::tasks::list_tasks))
        .route("/api/families/{id}/tasks", post(routes::tasks::add_task))
        .route(
            "/api/families/{id}/tasks/{task_id}/complete",
            post(routes::tasks::complete_task),
        )
        .route(
            "/api/families/{id}/tasks/{task_id}",
            delete(routes::tasks::delete_task),
        )
        // Reminders
        .route("/api/reminders", get(routes::reminders::list_reminders))
        .route("/api/reminders/tick", post(routes::reminders::tick))
        // Billing
        .route(
            "/api/billing/webhook",
            post(routes::webhook::billing_webhook),
        )
        .layer(cors)
        .with_state(app_state)
}

/// Start the TypeB API server.
pub async fn serve(root: PathBuf, port: u16) -> anyhow::Result<()> {
    let app = build_router(root);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("TypeB API server listening on http://localhost:{port}");

    axum::serve(listener, app).await?;
    Ok(())
}
