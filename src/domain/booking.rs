use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
            Self::Completed => "COMPLETED",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "PENDING" => Some(Self::Pending),
            "CONFIRMED" => Some(Self::Confirmed),
            "CANCELLED" => Some(Self::Cancelled),
            "COMPLETED" => Some(Self::Completed),
            _ => None,
        }
    }

    /// The booking state machine. CONFIRMED is reachable only through a
    /// verified payment; COMPLETED only once the stay has ended.
    pub fn allows_transition_to(self, next: BookingStatus) -> bool {
        match self {
            Self::Pending => matches!(next, Self::Confirmed | Self::Cancelled),
            Self::Confirmed => matches!(next, Self::Completed | Self::Cancelled),
            Self::Cancelled | Self::Completed => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub property_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub status: BookingStatus,
    pub cancel_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(tenant_id: Uuid, property_id: Uuid, check_in: NaiveDate, check_out: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            property_id,
            check_in,
            check_out,
            status: BookingStatus::Pending,
            cancel_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Status as it should be displayed today, without mutating the stored
    /// record: a confirmed booking whose check-out has passed reads as
    /// COMPLETED. The background sweep persists the same transition.
    pub fn effective_status(&self, today: NaiveDate) -> BookingStatus {
        if self.status == BookingStatus::Confirmed && today > self.check_out {
            BookingStatus::Completed
        } else {
            self.status
        }
    }
}
