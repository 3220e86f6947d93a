use serde_json::Value;
use uuid::Uuid;

use crate::domain::AuditEntry;
use crate::repository::MarketplaceStore;

/// Append an audit row for a create or state transition. Fire-and-forget:
/// a failed audit write is logged, never propagated into the operation it
/// describes.
pub async fn record(
    store: &dyn MarketplaceStore,
    actor_id: Uuid,
    action: &str,
    entity: &str,
    entity_id: Uuid,
    detail: Value,
) {
    let entry = AuditEntry::new(actor_id, action, entity, entity_id, detail);
    if let Err(error) = store.append_audit(&entry).await {
        tracing::warn!(error = %error, action, entity, %entity_id, "audit write failed");
    }
}
