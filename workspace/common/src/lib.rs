//! Common transport-layer types shared between the backend binary and the
//! compute crate. These structs carry aggregation results and funnel
//! summaries in a serde-friendly shape so the handlers can return them
//! without duplicating field lists.

mod funnel;
mod period;
mod summary;

pub use funnel::{ConversionStats, FunnelOutcome, FunnelSnapshot, RepresentativeClosedTotal};
pub use period::{last_day_of_month, ReportPeriod};
pub use summary::{
    ClientPerformance, KindRevenue, MonthlyBreakdownEntry, PeriodSummary,
    RepresentativePerformance,
};
