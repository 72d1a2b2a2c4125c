use axum::{
    extract::{DefaultBodyLimit, Extension},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::future::Future;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::collections::Collection;
use crate::config::{AppConfig, SecurityConfig};
use crate::database::manager::DatabaseManager;
use crate::handlers;
use crate::state::AppState;

/// Full router: root, health, every collection, aggregates and provider routes
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(complete_routes())
        .merge(insurance_routes());

    for collection in Collection::ALL {
        router = router.merge(collection_routes(collection));
    }

    let mut router = router.layer(
        ServiceBuilder::new()
            .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
            .layer(Extension(state)),
    );

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

/// Bind the configured port and serve until `shutdown` resolves
pub async fn serve(
    state: AppState,
    config: &AppConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("TrustChain API listening on http://{}", bind_addr);

    axum::serve(listener, app(state, config))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("TrustChain API stopped");
    Ok(())
}

/// Resolves once `signal` fires. If the signal handler cannot be installed the
/// error is logged and this never resolves, so the server keeps running.
pub async fn until_ctrl_c<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::error!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Generic CRUD for one collection; handlers learn which through an extension
fn collection_routes(collection: Collection) -> Router {
    use handlers::data;

    let base = format!("/api/{}", collection.route());
    Router::new()
        .route(
            &base,
            get(data::collection_get)
                .post(data::collection_post)
                .put(data::collection_put)
                .delete(data::collection_delete),
        )
        .route(
            &format!("{}/:id", base),
            get(data::document_get)
                .put(data::document_put)
                .delete(data::document_delete),
        )
        .layer(Extension(collection))
}

fn complete_routes() -> Router {
    use handlers::complete;

    Router::new()
        .route(
            "/api/company-complete",
            get(complete::company_get)
                .post(complete::company_post)
                .put(complete::company_put),
        )
        .route(
            "/api/project-complete",
            get(complete::project_get)
                .post(complete::project_post)
                .put(complete::project_put),
        )
}

fn insurance_routes() -> Router {
    use handlers::insurance;

    Router::new().route(
        "/api/insurance/provider",
        get(insurance::provider_get)
            .post(insurance::provider_post)
            .delete(insurance::provider_delete),
    )
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if security.cors_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");
    let collections: Vec<String> = Collection::ALL
        .iter()
        .map(|c| format!("/api/{}[/:id]", c.route()))
        .collect();

    Json(json!({
        "success": true,
        "data": {
            "name": "TrustChain API",
            "version": version,
            "description": "Green-hydrogen subsidy applications, project registry and insurance directory",
            "endpoints": {
                "home": "/",
                "health": "/health",
                "collections": collections,
                "company_complete": "/api/company-complete?companyId=|userId=",
                "project_complete": "/api/project-complete?projectId=|companyId=",
                "insurance_provider": "/api/insurance/provider?providerId=",
            }
        }
    }))
}

async fn health(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let store = state.store.kind();

    match DatabaseManager::health_check(state.store.as_ref()).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "store": store,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "message": e.to_string(),
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "store": store
                    }
                })),
            )
        }
    }
}
