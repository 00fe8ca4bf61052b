//! Shared fixtures for the compute test modules. Each test gets a fresh
//! in-memory SQLite database with the full schema applied.

use chrono::{NaiveDate, TimeZone, Utc};
use migration::{Migrator, MigratorTrait};
use model::entities::{
    client, goal, profile,
    profile::{ProfileStatus, Sector},
    prospect, service, service_kind, user,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, Set};

pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("connect to in-memory database");
    db.execute_unprepared("PRAGMA foreign_keys = ON;")
        .await
        .expect("enable foreign keys");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

pub async fn seed_user(
    db: &DatabaseConnection,
    username: &str,
    sector: Sector,
    is_staff: bool,
) -> (user::Model, profile::Model) {
    let user = user::ActiveModel {
        username: Set(username.to_string()),
        first_name: Set(username.to_string()),
        last_name: Set("Test".to_string()),
        email: Set(Some(format!("{username}@example.com"))),
        is_active: Set(true),
        is_staff: Set(is_staff),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert user");

    let profile = profile::ActiveModel {
        user_id: Set(user.id),
        phone: Set(None),
        sector: Set(sector),
        status: Set(ProfileStatus::Active),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert profile");

    (user, profile)
}

pub async fn seed_client(
    db: &DatabaseConnection,
    legal_name: &str,
    registered_by: Option<i32>,
) -> client::Model {
    client::ActiveModel {
        tax_id: Set("12345678000195".to_string()),
        legal_name: Set(legal_name.to_string()),
        address: Set("1 Test Street".to_string()),
        contact_name: Set("Contact".to_string()),
        contact_phone: Set("+55 11 99999-0000".to_string()),
        registered_by: Set(registered_by),
        registered_at: Set(Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert client")
}

pub async fn seed_service(
    db: &DatabaseConnection,
    client_id: i32,
    date: NaiveDate,
    quantity: i32,
    value: &str,
    kind_id: Option<i32>,
) -> service::Model {
    service::ActiveModel {
        client_id: Set(client_id),
        closed_by: Set(None),
        service_date: Set(date),
        quantity: Set(quantity),
        value: Set(value.parse::<Decimal>().expect("parse decimal")),
        kind_id: Set(kind_id),
        recorded_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert service")
}

pub async fn seed_goal(
    db: &DatabaseConnection,
    client_id: i32,
    month: i32,
    year: i32,
    value: &str,
) -> goal::Model {
    goal::ActiveModel {
        client_id: Set(client_id),
        month: Set(month),
        year: Set(year),
        business_days: Set(22),
        value: Set(value.parse::<Decimal>().expect("parse decimal")),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert goal")
}

pub async fn seed_kind(db: &DatabaseConnection, name: &str) -> service_kind::Model {
    service_kind::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert service kind")
}

pub async fn seed_prospect(
    db: &DatabaseConnection,
    legal_name: &str,
    registered_by: i32,
) -> prospect::Model {
    prospect::ActiveModel {
        tax_id: Set(Some("98765432000110".to_string())),
        legal_name: Set(legal_name.to_string()),
        contact_name: Set("Prospect Contact".to_string()),
        contact_phone: Set("+55 11 98888-0000".to_string()),
        contact_email: Set(None),
        registered_by: Set(registered_by),
        registered_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert prospect")
}
