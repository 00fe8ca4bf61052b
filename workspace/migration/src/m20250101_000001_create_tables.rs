use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Username).unique_key())
                    .col(string(Users::FirstName).default(""))
                    .col(string(Users::LastName).default(""))
                    .col(string_null(Users::Email))
                    .col(boolean(Users::IsActive).default(true))
                    .col(boolean(Users::IsStaff).default(false))
                    .to_owned(),
            )
            .await?;

        // Create profiles table (one per user)
        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(pk_auto(Profiles::Id))
                    .col(integer(Profiles::UserId).unique_key())
                    .col(string_null(Profiles::Phone))
                    .col(string(Profiles::Sector).default("REPRESENTATIVE"))
                    .col(string(Profiles::Status).default("ACTIVE"))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profile_user")
                            .from(Profiles::Table, Profiles::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create service_kinds table
        manager
            .create_table(
                Table::create()
                    .table(ServiceKinds::Table)
                    .if_not_exists()
                    .col(pk_auto(ServiceKinds::Id))
                    .col(string(ServiceKinds::Name).unique_key())
                    .to_owned(),
            )
            .await?;

        // Create clients table
        manager
            .create_table(
                Table::create()
                    .table(Clients::Table)
                    .if_not_exists()
                    .col(pk_auto(Clients::Id))
                    .col(string(Clients::TaxId))
                    .col(string(Clients::LegalName))
                    .col(string(Clients::Address))
                    .col(string(Clients::ContactName))
                    .col(string(Clients::ContactPhone))
                    .col(integer_null(Clients::RegisteredBy))
                    .col(timestamp_with_time_zone(Clients::RegisteredAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_client_registered_by")
                            .from(Clients::Table, Clients::RegisteredBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create prospects table
        manager
            .create_table(
                Table::create()
                    .table(Prospects::Table)
                    .if_not_exists()
                    .col(pk_auto(Prospects::Id))
                    .col(string_null(Prospects::TaxId))
                    .col(string(Prospects::LegalName))
                    .col(string(Prospects::ContactName))
                    .col(string(Prospects::ContactPhone))
                    .col(string_null(Prospects::ContactEmail))
                    .col(integer(Prospects::RegisteredBy))
                    .col(timestamp_with_time_zone(Prospects::RegisteredAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_prospect_registered_by")
                            .from(Prospects::Table, Prospects::RegisteredBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create services table. Client FK is RESTRICT: services protect
        // their client from deletion.
        manager
            .create_table(
                Table::create()
                    .table(Services::Table)
                    .if_not_exists()
                    .col(pk_auto(Services::Id))
                    .col(integer(Services::ClientId))
                    .col(integer_null(Services::ClosedBy))
                    .col(date(Services::ServiceDate))
                    .col(integer(Services::Quantity).default(1))
                    .col(decimal_len(Services::Value, 10, 2))
                    .col(integer_null(Services::KindId))
                    .col(timestamp_with_time_zone(Services::RecordedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_client")
                            .from(Services::Table, Services::ClientId)
                            .to(Clients::Table, Clients::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_closed_by")
                            .from(Services::Table, Services::ClosedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_kind")
                            .from(Services::Table, Services::KindId)
                            .to(ServiceKinds::Table, ServiceKinds::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create goals table, unique per (client, month, year)
        manager
            .create_table(
                Table::create()
                    .table(Goals::Table)
                    .if_not_exists()
                    .col(pk_auto(Goals::Id))
                    .col(integer(Goals::ClientId))
                    .col(integer(Goals::Month))
                    .col(integer(Goals::Year))
                    .col(integer(Goals::BusinessDays).default(22))
                    .col(decimal_len(Goals::Value, 12, 2))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_goal_client")
                            .from(Goals::Table, Goals::ClientId)
                            .to(Clients::Table, Clients::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .index(
                        Index::create()
                            .name("uq_goal_client_month_year")
                            .col(Goals::ClientId)
                            .col(Goals::Month)
                            .col(Goals::Year)
                            .unique(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create tasks table
        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(pk_auto(Tasks::Id))
                    .col(string(Tasks::Title))
                    .col(text(Tasks::Description))
                    .col(string(Tasks::Status).default("NOT_STARTED"))
                    .col(integer(Tasks::CreatedBy))
                    .col(timestamp_with_time_zone(Tasks::CreatedAt))
                    .col(integer_null(Tasks::StartedBy))
                    .col(timestamp_with_time_zone_null(Tasks::StartedAt))
                    .col(integer_null(Tasks::FinishedBy))
                    .col(timestamp_with_time_zone_null(Tasks::FinishedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_created_by")
                            .from(Tasks::Table, Tasks::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create task_actions table
        manager
            .create_table(
                Table::create()
                    .table(TaskActions::Table)
                    .if_not_exists()
                    .col(pk_auto(TaskActions::Id))
                    .col(integer(TaskActions::TaskId))
                    .col(text(TaskActions::Description))
                    .col(string_null(TaskActions::Attachment))
                    .col(integer(TaskActions::RecordedBy))
                    .col(timestamp_with_time_zone(TaskActions::RecordedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_action_task")
                            .from(TaskActions::Table, TaskActions::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_action_recorded_by")
                            .from(TaskActions::Table, TaskActions::RecordedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create prospectings table
        manager
            .create_table(
                Table::create()
                    .table(Prospectings::Table)
                    .if_not_exists()
                    .col(pk_auto(Prospectings::Id))
                    .col(integer(Prospectings::ProspectId))
                    .col(string_null(Prospectings::ControlNumber).unique_key())
                    .col(string(Prospectings::Status).default("NEW"))
                    .col(integer_null(Prospectings::KindId))
                    .col(integer(Prospectings::DurationMonths))
                    .col(integer(Prospectings::Trips))
                    .col(decimal_len(Prospectings::AvgTripValue, 10, 2))
                    .col(decimal_len(Prospectings::TotalValue, 12, 2))
                    .col(integer(Prospectings::CreatedBy))
                    .col(timestamp_with_time_zone(Prospectings::CreatedAt))
                    .col(integer_null(Prospectings::StartedBy))
                    .col(timestamp_with_time_zone_null(Prospectings::NegotiationStartedAt))
                    .col(integer_null(Prospectings::FinalizedBy))
                    .col(timestamp_with_time_zone_null(Prospectings::FinalizedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_prospecting_prospect")
                            .from(Prospectings::Table, Prospectings::ProspectId)
                            .to(Prospects::Table, Prospects::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_prospecting_created_by")
                            .from(Prospectings::Table, Prospectings::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_prospecting_kind")
                            .from(Prospectings::Table, Prospectings::KindId)
                            .to(ServiceKinds::Table, ServiceKinds::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create prospecting_actions table
        manager
            .create_table(
                Table::create()
                    .table(ProspectingActions::Table)
                    .if_not_exists()
                    .col(pk_auto(ProspectingActions::Id))
                    .col(integer(ProspectingActions::ProspectingId))
                    .col(text(ProspectingActions::Description))
                    .col(string_null(ProspectingActions::Attachment))
                    .col(integer(ProspectingActions::RecordedBy))
                    .col(timestamp_with_time_zone(ProspectingActions::RecordedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_prospecting_action_case")
                            .from(ProspectingActions::Table, ProspectingActions::ProspectingId)
                            .to(Prospectings::Table, Prospectings::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_prospecting_action_recorded_by")
                            .from(ProspectingActions::Table, ProspectingActions::RecordedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProspectingActions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Prospectings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TaskActions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Goals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Services::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Prospects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Clients::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ServiceKinds::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Profiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

// Define identifiers for all tables

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    FirstName,
    LastName,
    Email,
    IsActive,
    IsStaff,
}

#[derive(DeriveIden)]
enum Profiles {
    Table,
    Id,
    UserId,
    Phone,
    Sector,
    Status,
}

#[derive(DeriveIden)]
enum ServiceKinds {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Clients {
    Table,
    Id,
    TaxId,
    LegalName,
    Address,
    ContactName,
    ContactPhone,
    RegisteredBy,
    RegisteredAt,
}

#[derive(DeriveIden)]
enum Prospects {
    Table,
    Id,
    TaxId,
    LegalName,
    ContactName,
    ContactPhone,
    ContactEmail,
    RegisteredBy,
    RegisteredAt,
}

#[derive(DeriveIden)]
enum Services {
    Table,
    Id,
    ClientId,
    ClosedBy,
    ServiceDate,
    Quantity,
    Value,
    KindId,
    RecordedAt,
}

#[derive(DeriveIden)]
enum Goals {
    Table,
    Id,
    ClientId,
    Month,
    Year,
    BusinessDays,
    Value,
}

#[derive(DeriveIden)]
enum Tasks {
    Table,
    Id,
    Title,
    Description,
    Status,
    CreatedBy,
    CreatedAt,
    StartedBy,
    StartedAt,
    FinishedBy,
    FinishedAt,
}

#[derive(DeriveIden)]
enum TaskActions {
    Table,
    Id,
    TaskId,
    Description,
    Attachment,
    RecordedBy,
    RecordedAt,
}

#[derive(DeriveIden)]
enum Prospectings {
    Table,
    Id,
    ProspectId,
    ControlNumber,
    Status,
    KindId,
    DurationMonths,
    Trips,
    AvgTripValue,
    TotalValue,
    CreatedBy,
    CreatedAt,
    StartedBy,
    NegotiationStartedAt,
    FinalizedBy,
    FinalizedAt,
}

#[derive(DeriveIden)]
enum ProspectingActions {
    Table,
    Id,
    ProspectingId,
    Description,
    Attachment,
    RecordedBy,
    RecordedAt,
}
