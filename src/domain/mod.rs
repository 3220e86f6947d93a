pub mod booking;
pub mod payment;
pub mod property;

pub use booking::{Booking, BookingStatus};
pub use payment::{Payment, PaymentStatus};
pub use property::Property;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One row of the append-only audit trail written on every create and
/// state transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub action: String,
    pub entity: String,
    pub entity_id: Uuid,
    pub detail: Value,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(actor_id: Uuid, action: &str, entity: &str, entity_id: Uuid, detail: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor_id,
            action: action.to_string(),
            entity: entity.to_string(),
            entity_id,
            detail,
            created_at: Utc::now(),
        }
    }
}
