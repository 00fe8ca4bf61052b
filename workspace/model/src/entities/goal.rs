use sea_orm::entity::prelude::*;
use rust_decimal::Decimal;

/// Monthly revenue target for one client. Unique per (client, month, year);
/// representative-level goals are derived sums over owned clients, never
/// stored records.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "goals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub client_id: i32,
    /// 1-12.
    pub month: i32,
    pub year: i32,
    /// Business days in the period; used for the daily run-rate target.
    #[sea_orm(default_value = "22")]
    pub business_days: i32,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub value: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id"
    )]
    Client,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
