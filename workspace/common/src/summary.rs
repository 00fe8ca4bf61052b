use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::period::ReportPeriod;

/// Scope-wide totals for one reporting period.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PeriodSummary {
    pub period: ReportPeriod,
    pub revenue: Decimal,
    /// Sum of service quantities in the period.
    pub service_count: i64,
    /// Sum of in-scope client goals, `None` when no goal exists.
    pub goal: Option<Decimal>,
    /// revenue / goal * 100, `None` when `goal` is `None`.
    pub attainment_pct: Option<f64>,
    /// goal - revenue, floored at zero. `None` when `goal` is `None`.
    pub remaining: Option<Decimal>,
    pub days_remaining: i64,
}

/// Revenue and goal attainment for a single client in a period.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClientPerformance {
    pub client_id: i32,
    pub legal_name: String,
    pub revenue: Decimal,
    pub trip_count: i64,
    pub goal: Option<Decimal>,
    pub attainment_pct: Option<f64>,
    pub remaining: Option<Decimal>,
    /// Business days of the goal row, default 22.
    pub business_days: i32,
    /// Remaining goal spread over the business days, `None` without a goal.
    pub daily_target: Option<Decimal>,
}

/// Revenue and goal attainment for one representative. The goal is the sum
/// over the clients that representative registered.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RepresentativePerformance {
    pub user_id: i32,
    pub name: String,
    pub client_count: i64,
    pub revenue: Decimal,
    pub goal: Option<Decimal>,
    pub attainment_pct: Option<f64>,
}

/// One month of the year-at-a-glance breakdown.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MonthlyBreakdownEntry {
    pub year: i32,
    pub month: u32,
    pub revenue: Decimal,
    pub goal: Option<Decimal>,
    pub attainment_pct: Option<f64>,
    pub attained: bool,
}

/// Revenue grouped by service kind.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KindRevenue {
    pub kind_id: Option<i32>,
    pub kind_name: String,
    pub service_count: i64,
    pub revenue: Decimal,
}
