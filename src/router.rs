use crate::handlers::{
    clients::{create_client, delete_client, get_client, get_clients, update_client},
    dashboard::get_dashboard_summary,
    goals::{create_goal, delete_goal, get_goals, update_goal},
    health::health_check,
    prospecting::{
        create_prospecting, create_prospecting_action, finalize_prospecting, get_funnel_board,
        get_funnel_dashboard, get_prospecting, get_prospecting_actions, start_prospecting,
        update_prospecting,
    },
    prospects::{
        create_prospect, delete_prospect, get_prospect, get_prospects, promote_prospect,
        update_prospect,
    },
    registry::lookup_company,
    reports::get_report,
    service_kinds::{create_service_kind, get_service_kinds},
    services::{create_service, delete_service, get_service, get_services, update_service},
    tasks::{
        create_task, create_task_action, finish_task, get_task, get_task_actions, get_task_board,
        start_task,
    },
    users::{create_user, delete_user, get_user, get_users, update_user},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // User CRUD routes
        .route("/api/v1/users", post(create_user))
        .route("/api/v1/users", get(get_users))
        .route("/api/v1/users/:user_id", get(get_user))
        .route("/api/v1/users/:user_id", put(update_user))
        .route("/api/v1/users/:user_id", delete(delete_user))
        // Client CRUD routes
        .route("/api/v1/clients", post(create_client))
        .route("/api/v1/clients", get(get_clients))
        .route("/api/v1/clients/:client_id", get(get_client))
        .route("/api/v1/clients/:client_id", put(update_client))
        .route("/api/v1/clients/:client_id", delete(delete_client))
        // Prospect CRUD and promotion routes
        .route("/api/v1/prospects", post(create_prospect))
        .route("/api/v1/prospects", get(get_prospects))
        .route("/api/v1/prospects/:prospect_id", get(get_prospect))
        .route("/api/v1/prospects/:prospect_id", put(update_prospect))
        .route("/api/v1/prospects/:prospect_id", delete(delete_prospect))
        .route("/api/v1/prospects/:prospect_id/promote", post(promote_prospect))
        // Service kind routes
        .route("/api/v1/service-kinds", get(get_service_kinds))
        .route("/api/v1/service-kinds", post(create_service_kind))
        // Service CRUD routes
        .route("/api/v1/services", post(create_service))
        .route("/api/v1/services", get(get_services))
        .route("/api/v1/services/:service_id", get(get_service))
        .route("/api/v1/services/:service_id", put(update_service))
        .route("/api/v1/services/:service_id", delete(delete_service))
        // Goal CRUD routes
        .route("/api/v1/goals", post(create_goal))
        .route("/api/v1/goals", get(get_goals))
        .route("/api/v1/goals/:goal_id", put(update_goal))
        .route("/api/v1/goals/:goal_id", delete(delete_goal))
        // Task board routes
        .route("/api/v1/tasks", get(get_task_board))
        .route("/api/v1/tasks", post(create_task))
        .route("/api/v1/tasks/:task_id", get(get_task))
        .route("/api/v1/tasks/:task_id/start", post(start_task))
        .route("/api/v1/tasks/:task_id/finish", post(finish_task))
        .route("/api/v1/tasks/:task_id/actions", post(create_task_action))
        .route("/api/v1/tasks/:task_id/actions", get(get_task_actions))
        // Prospecting funnel routes
        .route("/api/v1/prospecting", get(get_funnel_board))
        .route("/api/v1/prospecting", post(create_prospecting))
        .route("/api/v1/prospecting/dashboard", get(get_funnel_dashboard))
        .route("/api/v1/prospecting/:case_id", get(get_prospecting))
        .route("/api/v1/prospecting/:case_id", put(update_prospecting))
        .route("/api/v1/prospecting/:case_id/start", post(start_prospecting))
        .route(
            "/api/v1/prospecting/:case_id/finalize",
            post(finalize_prospecting),
        )
        .route(
            "/api/v1/prospecting/:case_id/actions",
            post(create_prospecting_action),
        )
        .route(
            "/api/v1/prospecting/:case_id/actions",
            get(get_prospecting_actions),
        )
        // Dashboard and report routes
        .route("/api/v1/dashboard/summary", get(get_dashboard_summary))
        .route("/api/v1/reports", get(get_report))
        // External registry lookup
        .route("/api/v1/registry/:tax_id", get(lookup_company))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
