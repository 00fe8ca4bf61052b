use sea_orm::entity::prelude::*;
use rust_decimal::Decimal;

/// Lifecycle of a prospecting case. NEW and NEGOTIATING are open stages;
/// the other three are terminal outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum FunnelStatus {
    #[sea_orm(string_value = "NEW")]
    New,
    #[sea_orm(string_value = "NEGOTIATING")]
    Negotiating,
    #[sea_orm(string_value = "CLOSED")]
    Closed,
    #[sea_orm(string_value = "ABANDONED")]
    Abandoned,
    #[sea_orm(string_value = "LOST")]
    Lost,
}

impl FunnelStatus {
    /// Open cases may still be edited and acted upon.
    pub fn is_open(self) -> bool {
        matches!(self, FunnelStatus::New | FunnelStatus::Negotiating)
    }

    pub fn is_final(self) -> bool {
        !self.is_open()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FunnelStatus::New => "NEW",
            FunnelStatus::Negotiating => "NEGOTIATING",
            FunnelStatus::Closed => "CLOSED",
            FunnelStatus::Abandoned => "ABANDONED",
            FunnelStatus::Lost => "LOST",
        }
    }
}

/// A prospecting case: one negotiation tracked from lead to outcome.
/// References the prospect, not the client; promoting the prospect leaves
/// funnel history attached to the deleted prospect's id.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "prospectings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub prospect_id: i32,
    /// `PROSPEC-{year}/{seq:05}`, assigned lazily on first save.
    #[sea_orm(unique)]
    pub control_number: Option<String>,
    pub status: FunnelStatus,
    pub kind_id: Option<i32>,
    /// Approximate contract duration.
    pub duration_months: i32,
    /// Estimated number of trips.
    pub trips: i32,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub avg_trip_value: Decimal,
    /// Always trips * avg_trip_value; recomputed on every edit.
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total_value: Decimal,
    pub created_by: i32,
    pub created_at: DateTimeUtc,
    pub started_by: Option<i32>,
    pub negotiation_started_at: Option<DateTimeUtc>,
    pub finalized_by: Option<i32>,
    pub finalized_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::prospect::Entity",
        from = "Column::ProspectId",
        to = "super::prospect::Column::Id"
    )]
    Prospect,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::service_kind::Entity",
        from = "Column::KindId",
        to = "super::service_kind::Column::Id"
    )]
    ServiceKind,
    #[sea_orm(has_many = "super::prospecting_action::Entity")]
    ProspectingAction,
}

impl Related<super::prospect::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Prospect.def()
    }
}

impl Related<super::service_kind::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceKind.def()
    }
}

impl Related<super::prospecting_action::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProspectingAction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
