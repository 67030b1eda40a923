//! Anomaly event upserts.

use crate::decode::AnomalyMessage;
use crate::error::{PipelineError, PipelineResult};
use fieldline_client::{EventWrite, Platform};

/// Resolve asset external ids to internal ids, failing on the first
/// miss so the caller writes nothing for this message.
pub(crate) async fn resolve_assets(
    platform: &dyn Platform,
    external_ids: &[String],
) -> PipelineResult<Vec<i64>> {
    let mut ids = Vec::with_capacity(external_ids.len());
    for external_id in external_ids {
        match platform.retrieve_asset(external_id).await? {
            Some(asset) => ids.push(asset.id),
            None => {
                return Err(PipelineError::UnresolvedAssetReference(
                    external_id.clone(),
                ))
            }
        }
    }
    Ok(ids)
}

/// Create or replace the event carried by an anomaly message.
///
/// All asset references must resolve before anything is written.
pub async fn upsert_event(
    platform: &dyn Platform,
    message: &AnomalyMessage,
) -> PipelineResult<()> {
    let asset_ids = resolve_assets(platform, &message.asset_external_ids).await?;

    let event = EventWrite {
        external_id: message.external_id.clone(),
        event_type: message.kind.clone(),
        subtype: message.subtype.clone(),
        description: message.description.clone(),
        start_time: message.start_time,
        end_time: message.end_time,
        asset_ids,
    };

    match platform.retrieve_event(&message.external_id).await? {
        Some(existing) => {
            platform.update_event(&event).await?;
            tracing::info!(external_id = %event.external_id, id = existing.id, "Updated anomaly event");
        }
        None => {
            platform.create_event(&event).await?;
            tracing::info!(external_id = %event.external_id, "Created anomaly event");
        }
    }

    Ok(())
}
