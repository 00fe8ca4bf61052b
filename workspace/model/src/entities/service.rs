use sea_orm::entity::prelude::*;
use rust_decimal::Decimal;

/// A closed sale: services rendered to a client on a given date.
/// Services are the source records of the revenue aggregation engine.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "services")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub client_id: i32,
    /// User who closed the sale. Nullable so deleting a user keeps history.
    pub closed_by: Option<i32>,
    pub service_date: Date,
    /// Number of trips rendered.
    pub quantity: i32,
    /// Total monetary value of the service.
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub value: Decimal,
    pub kind_id: Option<i32>,
    pub recorded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id"
    )]
    Client,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ClosedBy",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::service_kind::Entity",
        from = "Column::KindId",
        to = "super::service_kind::Column::Id"
    )]
    ServiceKind,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::service_kind::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceKind.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
