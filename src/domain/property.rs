use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog entry the core reads but never writes. Listing CRUD, search and
/// media live in the excluded catalog service; the core only needs the
/// owner and the nightly rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    /// Minor currency units (paise) per night, strictly positive.
    pub price_per_night_minor: i64,
    pub capacity: i32,
    pub created_at: DateTime<Utc>,
}

impl Property {
    pub fn new(owner_id: Uuid, name: &str, price_per_night_minor: i64, capacity: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: name.to_string(),
            price_per_night_minor,
            capacity,
            created_at: Utc::now(),
        }
    }
}
