//! Client deletion guard. Clients with recorded services are protected;
//! the dependent count travels in the error so the API can report it.

use model::entities::prelude::*;
use model::entities::{client, service};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter};
use tracing::instrument;

use crate::error::{CoreError, Result};
use crate::scope::VisibilityScope;

pub async fn load_visible(
    db: &DatabaseConnection,
    scope: &VisibilityScope,
    id: i32,
) -> Result<client::Model> {
    let client = Client::find_by_id(id)
        .one(db)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "client",
            id,
        })?;
    if !scope.can_view(client.registered_by) {
        return Err(CoreError::AccessDenied(format!(
            "client {id} belongs to another representative"
        )));
    }
    Ok(client)
}

/// Deletes a client unless services reference it.
#[instrument(skip(db, scope))]
pub async fn delete_client(
    db: &DatabaseConnection,
    scope: &VisibilityScope,
    id: i32,
) -> Result<()> {
    let client = load_visible(db, scope, id).await?;
    let dependents = Service::find()
        .filter(service::Column::ClientId.eq(client.id))
        .count(db)
        .await?;
    if dependents > 0 {
        return Err(CoreError::Protected {
            entity: "client",
            dependents,
        });
    }
    client.delete(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use chrono::NaiveDate;
    use model::entities::profile::Sector;

    fn full_scope() -> VisibilityScope {
        VisibilityScope::Full {
            representative: None,
        }
    }

    #[tokio::test]
    async fn client_with_services_is_protected() {
        let db = setup_db().await;
        let (rep, _) = seed_user(&db, "rep", Sector::Representative, false).await;
        let client = seed_client(&db, "Busy Co", Some(rep.id)).await;
        seed_service(
            &db,
            client.id,
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            1,
            "100.00",
            None,
        )
        .await;

        let err = delete_client(&db, &full_scope(), client.id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Protected {
                entity: "client",
                dependents: 1
            }
        ));
        assert!(Client::find_by_id(client.id).one(&db).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn client_without_services_deletes() {
        let db = setup_db().await;
        let (rep, _) = seed_user(&db, "rep", Sector::Representative, false).await;
        let client = seed_client(&db, "Quiet Co", Some(rep.id)).await;

        delete_client(&db, &full_scope(), client.id).await.unwrap();
        assert!(Client::find_by_id(client.id).one(&db).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn representative_cannot_delete_foreign_client() {
        let db = setup_db().await;
        let (rep_a, _) = seed_user(&db, "rep_a", Sector::Representative, false).await;
        let (rep_b, _) = seed_user(&db, "rep_b", Sector::Representative, false).await;
        let client = seed_client(&db, "Foreign Co", Some(rep_a.id)).await;

        let err = delete_client(&db, &VisibilityScope::Representative(rep_b.id), client.id)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::AccessDenied(_)));
    }
}
