//! Prospect promotion: a won prospect becomes a client in one transaction.
//! The client row is created from the prospect's data and the prospect row
//! deleted; if anything fails the prospect is left untouched. Funnel
//! history deliberately stays keyed to the deleted prospect's id.

use chrono::Utc;
use model::entities::prelude::*;
use model::entities::{client, prospect};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, ModelTrait, Set, TransactionTrait};
use tracing::{info, instrument};

use crate::error::{CoreError, Result};
use crate::scope::VisibilityScope;

/// Extra client fields collected at promotion time. The prospect record
/// never carries an address, so one must be supplied here.
#[derive(Debug, Clone)]
pub struct PromotionDetails {
    pub address: String,
    /// Overrides the prospect's tax id; required when the prospect has none.
    pub tax_id: Option<String>,
}

#[instrument(skip(db, scope, details))]
pub async fn promote(
    db: &DatabaseConnection,
    scope: &VisibilityScope,
    prospect_id: i32,
    details: PromotionDetails,
) -> Result<client::Model> {
    let prospect = Prospect::find_by_id(prospect_id)
        .one(db)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "prospect",
            id: prospect_id,
        })?;
    if !scope.can_view(Some(prospect.registered_by)) {
        return Err(CoreError::AccessDenied(format!(
            "prospect {prospect_id} belongs to another representative"
        )));
    }

    let tax_id = details
        .tax_id
        .or_else(|| prospect.tax_id.clone())
        .ok_or_else(|| {
            CoreError::Validation("a tax id is required to promote a prospect".to_string())
        })?;

    let txn = db.begin().await?;
    let client = client::ActiveModel {
        tax_id: Set(tax_id),
        legal_name: Set(prospect.legal_name.clone()),
        address: Set(details.address),
        contact_name: Set(prospect.contact_name.clone()),
        contact_phone: Set(prospect.contact_phone.clone()),
        registered_by: Set(Some(prospect.registered_by)),
        registered_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    let prospect_id = prospect.id;
    prospect.delete(&txn).await?;
    txn.commit().await?;

    info!(prospect_id, client_id = client.id, "promoted prospect to client");
    Ok(client)
}
