use axum::extract::{Query, State};
use axum::response::Json;
use chrono::{Datelike, Utc};
use compute::revenue;
use model::entities::client;
use model::entities::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use utoipa::IntoParams;

use crate::error::ApiError;
use crate::handlers::clients::ClientResponse;
use crate::handlers::dashboard::PeriodQuery;
use crate::identity::Identity;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Query parameters for report generation
#[derive(Debug, Deserialize, IntoParams)]
pub struct ReportQuery {
    /// revenue_by_client, client_registry or client_history
    pub report_type: String,
    pub granularity: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub quarter: Option<u32>,
}

/// Generate a report as a JSON aggregation. Rendering to PDF or any
/// other document format happens downstream.
#[utoipa::path(
    get,
    path = "/api/v1/reports",
    tag = "dashboard",
    params(ReportQuery),
    responses(
        (status = 200, description = "Report generated successfully", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Unknown report type", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity))]
pub async fn get_report(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let scope = identity.scope(None);

    let data = match query.report_type.as_str() {
        "revenue_by_client" => {
            let period = PeriodQuery {
                granularity: query.granularity.clone(),
                year: query.year,
                month: query.month,
                quarter: query.quarter,
            }
            .resolve()?;
            let clients = revenue::client_performance(&state.db, &scope, period).await?;
            let by_kind = revenue::revenue_by_kind(&state.db, &scope, period).await?;
            json!({
                "period": period,
                "clients": clients,
                "by_kind": by_kind,
            })
        }
        "client_registry" => {
            let mut finder = Client::find().order_by_asc(client::Column::LegalName);
            if let Some(rep) = scope.owner_filter() {
                finder = finder.filter(client::Column::RegisteredBy.eq(rep));
            }
            let clients: Vec<ClientResponse> = finder
                .all(&state.db)
                .await?
                .into_iter()
                .map(ClientResponse::from)
                .collect();
            json!({ "clients": clients })
        }
        "client_history" => {
            let year = query.year.unwrap_or_else(|| Utc::now().year());
            let months = revenue::monthly_breakdown(&state.db, &scope, year).await?;
            json!({
                "year": year,
                "months": months,
            })
        }
        other => {
            return Err(ApiError::bad_request(format!(
                "unknown report type: {other}"
            )))
        }
    };

    Ok(Json(ApiResponse::new(data, "Report generated successfully")))
}
