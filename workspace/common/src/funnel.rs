use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Terminal outcome requested when finalizing a prospecting case.
/// Deserialization rejects anything outside the three closed stages, so an
/// invalid outcome never reaches the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum FunnelOutcome {
    Closed,
    Abandoned,
    Lost,
}

impl FunnelOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            FunnelOutcome::Closed => "CLOSED",
            FunnelOutcome::Abandoned => "ABANDONED",
            FunnelOutcome::Lost => "LOST",
        }
    }
}

/// Per-status counts and values for the funnel dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FunnelSnapshot {
    pub new_count: u64,
    pub negotiating_count: u64,
    pub closed_count: u64,
    pub abandoned_count: u64,
    pub lost_count: u64,
    /// Combined potential value of NEW and NEGOTIATING cases.
    pub open_value: Decimal,
    /// Combined value of CLOSED cases.
    pub closed_value: Decimal,
    pub closed_by_representative: Vec<RepresentativeClosedTotal>,
}

/// Closed-case totals for one representative.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RepresentativeClosedTotal {
    pub user_id: i32,
    pub name: String,
    pub closed_count: u64,
    pub closed_value: Decimal,
}

/// Conversion statistics over finalized cases.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConversionStats {
    pub finalized_count: u64,
    pub closed_count: u64,
    /// closed / finalized, `None` when nothing has been finalized.
    pub conversion_rate: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_round_trips_uppercase() {
        let outcome: FunnelOutcome = serde_json::from_str("\"ABANDONED\"").unwrap();
        assert_eq!(outcome, FunnelOutcome::Abandoned);
        assert_eq!(serde_json::to_string(&outcome).unwrap(), "\"ABANDONED\"");
    }

    #[test]
    fn open_stage_is_not_a_valid_outcome() {
        assert!(serde_json::from_str::<FunnelOutcome>("\"NEGOTIATING\"").is_err());
        assert!(serde_json::from_str::<FunnelOutcome>("\"closed\"").is_err());
    }
}
