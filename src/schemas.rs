use common::{
    ClientPerformance, ConversionStats, FunnelSnapshot, KindRevenue, MonthlyBreakdownEntry,
    PeriodSummary, RepresentativePerformance,
};
use moka::future::Cache;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::handlers::dashboard::DashboardSummaryResponse;
use crate::lookup::RegistryClient;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Cache for expensive aggregations
    pub cache: Cache<String, CachedData>,
    /// External company registry client
    pub registry: RegistryClient,
}

/// Cached data types
#[derive(Clone, Debug)]
pub enum CachedData {
    DashboardSummary(DashboardSummaryResponse),
}

/// API response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Dependent record count for protected deletions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependents: Option<u64>,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::users::create_user,
        crate::handlers::users::get_users,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::clients::create_client,
        crate::handlers::clients::get_clients,
        crate::handlers::clients::get_client,
        crate::handlers::clients::update_client,
        crate::handlers::clients::delete_client,
        crate::handlers::prospects::create_prospect,
        crate::handlers::prospects::get_prospects,
        crate::handlers::prospects::get_prospect,
        crate::handlers::prospects::update_prospect,
        crate::handlers::prospects::delete_prospect,
        crate::handlers::prospects::promote_prospect,
        crate::handlers::service_kinds::get_service_kinds,
        crate::handlers::service_kinds::create_service_kind,
        crate::handlers::services::create_service,
        crate::handlers::services::get_services,
        crate::handlers::services::get_service,
        crate::handlers::services::update_service,
        crate::handlers::services::delete_service,
        crate::handlers::goals::create_goal,
        crate::handlers::goals::get_goals,
        crate::handlers::goals::update_goal,
        crate::handlers::goals::delete_goal,
        crate::handlers::tasks::get_task_board,
        crate::handlers::tasks::create_task,
        crate::handlers::tasks::get_task,
        crate::handlers::tasks::start_task,
        crate::handlers::tasks::finish_task,
        crate::handlers::tasks::create_task_action,
        crate::handlers::tasks::get_task_actions,
        crate::handlers::prospecting::get_funnel_board,
        crate::handlers::prospecting::create_prospecting,
        crate::handlers::prospecting::get_prospecting,
        crate::handlers::prospecting::update_prospecting,
        crate::handlers::prospecting::start_prospecting,
        crate::handlers::prospecting::finalize_prospecting,
        crate::handlers::prospecting::create_prospecting_action,
        crate::handlers::prospecting::get_prospecting_actions,
        crate::handlers::prospecting::get_funnel_dashboard,
        crate::handlers::dashboard::get_dashboard_summary,
        crate::handlers::reports::get_report,
        crate::handlers::registry::lookup_company,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            PeriodSummary,
            ClientPerformance,
            RepresentativePerformance,
            MonthlyBreakdownEntry,
            KindRevenue,
            FunnelSnapshot,
            ConversionStats,
            common::FunnelOutcome,
            common::ReportPeriod,
            crate::lookup::CompanyRecord,
            crate::lookup::LookupOutcome,
            crate::handlers::users::CreateUserRequest,
            crate::handlers::users::UpdateUserRequest,
            crate::handlers::users::UserResponse,
            crate::handlers::clients::CreateClientRequest,
            crate::handlers::clients::UpdateClientRequest,
            crate::handlers::clients::ClientResponse,
            crate::handlers::prospects::CreateProspectRequest,
            crate::handlers::prospects::UpdateProspectRequest,
            crate::handlers::prospects::PromoteProspectRequest,
            crate::handlers::prospects::ProspectResponse,
            crate::handlers::service_kinds::CreateServiceKindRequest,
            crate::handlers::service_kinds::ServiceKindResponse,
            crate::handlers::services::CreateServiceRequest,
            crate::handlers::services::UpdateServiceRequest,
            crate::handlers::services::ServiceResponse,
            crate::handlers::goals::CreateGoalRequest,
            crate::handlers::goals::UpdateGoalRequest,
            crate::handlers::goals::GoalResponse,
            crate::handlers::tasks::CreateTaskRequest,
            crate::handlers::tasks::RecordActionRequest,
            crate::handlers::tasks::TaskResponse,
            crate::handlers::tasks::TaskActionResponse,
            crate::handlers::tasks::TaskBoardResponse,
            crate::handlers::prospecting::CreateProspectingRequest,
            crate::handlers::prospecting::UpdateProspectingRequest,
            crate::handlers::prospecting::FinalizeRequest,
            crate::handlers::prospecting::ProspectingResponse,
            crate::handlers::prospecting::ProspectingActionResponse,
            crate::handlers::prospecting::FunnelBoardResponse,
            crate::handlers::prospecting::FunnelDashboardResponse,
            crate::handlers::dashboard::DashboardSummaryResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "User and profile management"),
        (name = "clients", description = "Client portfolio"),
        (name = "prospects", description = "Prospect registry and promotion"),
        (name = "services", description = "Rendered services and kinds"),
        (name = "goals", description = "Monthly revenue goals"),
        (name = "tasks", description = "Internal task board"),
        (name = "prospecting", description = "Prospecting funnel"),
        (name = "dashboard", description = "Revenue dashboards and reports"),
        (name = "registry", description = "External company registry lookup"),
    ),
    info(
        title = "CrmRust API",
        description = "Commercial CRM backend for a corporate travel agency: clients, prospects, goals, services, tasks and the prospecting funnel",
        version = "0.1.0",
    )
)]
pub struct ApiDoc;
