//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{UserIngestionService, UserService};
use crate::domain::UserRepositoryInterface;
use crate::interfaces::http::common::{ApiResponse, FieldViolation, PaginatedResponse};
use crate::interfaces::http::modules::{health, metrics, request_id, users};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        users::delete_multiple_users,
        users::add_users,
        users::user_stats,
    ),
    components(
        schemas(
            ApiResponse<String>,
            FieldViolation,
            PaginatedResponse<users::UserDto>,
            health::HealthResponse,
            health::ComponentHealth,
            users::UserDto,
            users::UserRequest,
            users::AddUsersResponse,
            users::DeleteUsersResponse,
            users::UserStatsDto,
        )
    ),
    tags(
        (name = "Health", description = "Service and database liveness"),
        (name = "Users", description = "User directory: CRUD, bulk delete, random-user ingestion"),
    ),
    info(
        title = "User Directory API",
        version = "1.0.0",
        description = "REST API for a user directory populated from randomuser.me",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Everything the router needs to serve requests.
#[derive(Clone)]
pub struct ApiDependencies {
    pub user_service: Arc<UserService<dyn UserRepositoryInterface>>,
    pub ingestion: Arc<UserIngestionService>,
    pub db: DatabaseConnection,
    pub prometheus: PrometheusHandle,
}

/// Create the API router with all routes
pub fn create_api_router(deps: ApiDependencies) -> Router {
    let user_routes = users::router(users::UserHandlerState {
        user_service: deps.user_service,
        ingestion: deps.ingestion,
    });

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health::HealthState {
            db: deps.db,
            started_at: Arc::new(Instant::now()),
        });

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics::prometheus_metrics))
        .with_state(metrics::MetricsState {
            handle: deps.prometheus,
        });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    // Layers run bottom-up: request id outermost so trace and metrics see it.
    Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .nest("/api/v1/users", user_routes)
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id::request_id_middleware))
}
