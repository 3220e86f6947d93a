use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    AwaitingPayment,
    AwaitingOwnerVerification,
    Verified,
    Rejected,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingPayment => "AWAITING_PAYMENT",
            Self::AwaitingOwnerVerification => "AWAITING_OWNER_VERIFICATION",
            Self::Verified => "VERIFIED",
            Self::Rejected => "REJECTED",
            Self::Refunded => "REFUNDED",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "AWAITING_PAYMENT" => Some(Self::AwaitingPayment),
            "AWAITING_OWNER_VERIFICATION" => Some(Self::AwaitingOwnerVerification),
            "VERIFIED" => Some(Self::Verified),
            "REJECTED" => Some(Self::Rejected),
            "REFUNDED" => Some(Self::Refunded),
            _ => None,
        }
    }

    pub fn allows_transition_to(self, next: PaymentStatus) -> bool {
        match self {
            Self::AwaitingPayment => {
                matches!(next, Self::AwaitingOwnerVerification | Self::Rejected)
            }
            Self::AwaitingOwnerVerification => matches!(next, Self::Verified | Self::Rejected),
            Self::Verified => next == Self::Refunded,
            Self::Rejected | Self::Refunded => false,
        }
    }

    /// A payment in a non-terminal state blocks creation of a second
    /// payment for the same booking.
    pub fn is_open(self) -> bool {
        matches!(self, Self::AwaitingPayment | Self::AwaitingOwnerVerification)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub tenant_id: Uuid,
    pub owner_id: Uuid,
    /// Minor currency units (paise). Converted to rupees only when the UPI
    /// URI is built.
    pub amount_minor: i64,
    pub currency: String,
    /// Tenant-supplied free text; never validated against any registry.
    pub upi_reference: Option<String>,
    pub status: PaymentStatus,
    pub verified_by: Option<Uuid>,
    pub verified_at: Option<DateTime<Utc>>,
    pub rejection_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        booking_id: Uuid,
        tenant_id: Uuid,
        owner_id: Uuid,
        amount_minor: i64,
        currency: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            booking_id,
            tenant_id,
            owner_id,
            amount_minor,
            currency: currency.to_string(),
            upi_reference: None,
            status: PaymentStatus::AwaitingPayment,
            verified_by: None,
            verified_at: None,
            rejection_note: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table() {
        use PaymentStatus::*;
        assert!(AwaitingPayment.allows_transition_to(AwaitingOwnerVerification));
        assert!(AwaitingPayment.allows_transition_to(Rejected));
        assert!(!AwaitingPayment.allows_transition_to(Verified));
        assert!(AwaitingOwnerVerification.allows_transition_to(Verified));
        assert!(AwaitingOwnerVerification.allows_transition_to(Rejected));
        assert!(!AwaitingOwnerVerification.allows_transition_to(Refunded));
        assert!(Verified.allows_transition_to(Refunded));
        assert!(!Verified.allows_transition_to(Rejected));
        assert!(!Rejected.allows_transition_to(AwaitingPayment));
        assert!(!Refunded.allows_transition_to(Verified));
    }

    #[test]
    fn open_statuses() {
        assert!(PaymentStatus::AwaitingPayment.is_open());
        assert!(PaymentStatus::AwaitingOwnerVerification.is_open());
        assert!(!PaymentStatus::Verified.is_open());
        assert!(!PaymentStatus::Rejected.is_open());
        assert!(!PaymentStatus::Refunded.is_open());
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            PaymentStatus::AwaitingPayment,
            PaymentStatus::AwaitingOwnerVerification,
            PaymentStatus::Verified,
            PaymentStatus::Rejected,
            PaymentStatus::Refunded,
        ] {
            assert_eq!(PaymentStatus::parse(status.as_str()), Some(status));
        }
    }
}
