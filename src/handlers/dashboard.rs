use axum::extract::{Query, State};
use axum::response::Json;
use chrono::{Datelike, Utc};
use common::{ClientPerformance, PeriodSummary, ReportPeriod, RepresentativePerformance};
use compute::revenue;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::identity::Identity;
use crate::schemas::{ApiResponse, AppState, CachedData, ErrorResponse};

/// Query parameters selecting the reporting period. Defaults to the
/// current month.
#[derive(Debug, Deserialize, IntoParams)]
pub struct PeriodQuery {
    /// month, quarter or year
    pub granularity: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub quarter: Option<u32>,
}

impl PeriodQuery {
    pub fn resolve(&self) -> Result<ReportPeriod, ApiError> {
        let today = Utc::now().date_naive();
        let year = self.year.unwrap_or_else(|| today.year());
        let period = match self.granularity.as_deref().unwrap_or("month") {
            "month" => ReportPeriod::Month {
                year,
                month: self.month.unwrap_or_else(|| today.month()),
            },
            "quarter" => {
                let quarter = self
                    .quarter
                    .unwrap_or_else(|| (today.month() - 1) / 3 + 1);
                ReportPeriod::Quarter { year, quarter }
            }
            "year" => ReportPeriod::Year { year },
            other => {
                return Err(ApiError::bad_request(format!(
                    "unknown granularity: {other}"
                )))
            }
        };
        if period.date_range().is_none() {
            return Err(ApiError::bad_request("invalid period"));
        }
        Ok(period)
    }
}

/// Dashboard summary response model
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardSummaryResponse {
    /// Aggregate revenue and goal attainment for the period
    pub summary: PeriodSummary,
    /// Per-client performance, sorted by legal name
    pub clients: Vec<ClientPerformance>,
    /// Representative ranking, management only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub representatives: Option<Vec<RepresentativePerformance>>,
}

/// Get the revenue dashboard for a period
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/summary",
    tag = "dashboard",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Dashboard retrieved successfully", body = ApiResponse<DashboardSummaryResponse>),
        (status = 400, description = "Invalid period", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity))]
pub async fn get_dashboard_summary(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<ApiResponse<DashboardSummaryResponse>>, ApiError> {
    let period = query.resolve()?;
    let scope = identity.scope(None);

    let cache_key = format!("dashboard:{:?}:{period}", scope);
    if let Some(CachedData::DashboardSummary(cached)) = state.cache.get(&cache_key).await {
        debug!(key = %cache_key, "dashboard cache hit");
        return Ok(Json(ApiResponse::new(
            cached,
            "Dashboard retrieved successfully",
        )));
    }

    let today = Utc::now().date_naive();
    let summary = revenue::period_summary(&state.db, &scope, period, today).await?;
    let clients = revenue::client_performance(&state.db, &scope, period).await?;
    let representatives = if scope.is_management() {
        Some(revenue::representative_performance(&state.db, &scope, period).await?)
    } else {
        None
    };

    let response = DashboardSummaryResponse {
        summary,
        clients,
        representatives,
    };
    state
        .cache
        .insert(cache_key, CachedData::DashboardSummary(response.clone()))
        .await;

    Ok(Json(ApiResponse::new(
        response,
        "Dashboard retrieved successfully",
    )))
}
