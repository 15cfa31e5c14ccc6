use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Invitation code record.
///
/// One table covers both variants: single-use codes track consumption via
/// `is_used`/`used_at` (with `max_guardians = 1`), group codes track capacity
/// via `current_guardians`/`max_guardians` and deactivation via `is_active`.
/// The lifecycle state is always derived, never stored.
#[derive(Debug, Clone, FromRow)]
pub struct Invitation {
    pub id: i64,
    pub code: String,
    pub inviter_id: i64,
    pub invitee_email: Option<String>,
    pub relationship_type_id: Option<i64>,
    pub is_used: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub is_group_code: bool,
    pub max_guardians: i32,
    pub current_guardians: i32,
    pub is_active: bool,
}

/// Derived lifecycle state of an invitation code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeStatus {
    /// Consumable: not expired, not used up
    Pending,
    /// Single-use code that has been redeemed or superseded
    Consumed,
    /// Group code at capacity or deactivated
    Exhausted,
    /// Past its expiry timestamp
    Expired,
}

impl CodeStatus {
    /// Terminal states can never be accepted again
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CodeStatus::Pending)
    }
}

impl Invitation {
    /// Derive the lifecycle state at the given instant.
    ///
    /// Action-derived terminal states (consumed, exhausted) take precedence
    /// over the time-derived expired state, matching the acceptance
    /// validation order.
    pub fn status(&self, now: DateTime<Utc>) -> CodeStatus {
        if self.is_group_code {
            if !self.is_active || self.current_guardians >= self.max_guardians {
                return CodeStatus::Exhausted;
            }
        } else if self.is_used {
            return CodeStatus::Consumed;
        }

        if self.expires_at <= now {
            return CodeStatus::Expired;
        }

        CodeStatus::Pending
    }

    /// Whether the code can still be accepted at the given instant
    pub fn is_consumable(&self, now: DateTime<Utc>) -> bool {
        self.status(now) == CodeStatus::Pending
    }
}

/// Invitation view for API responses
#[derive(Debug, Clone, Serialize)]
pub struct InvitationResponse {
    pub id: i64,
    pub code: String,
    pub inviter_id: i64,
    pub invitee_email: Option<String>,
    pub relationship_type_id: Option<i64>,
    pub is_used: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub is_group_code: bool,
    pub max_guardians: i32,
    pub current_guardians: i32,
    pub is_active: bool,
    pub status: CodeStatus,
}

impl From<Invitation> for InvitationResponse {
    fn from(inv: Invitation) -> Self {
        let status = inv.status(Utc::now());
        InvitationResponse {
            id: inv.id,
            code: inv.code,
            inviter_id: inv.inviter_id,
            invitee_email: inv.invitee_email,
            relationship_type_id: inv.relationship_type_id,
            is_used: inv.is_used,
            expires_at: inv.expires_at,
            created_at: inv.created_at,
            used_at: inv.used_at,
            is_group_code: inv.is_group_code,
            max_guardians: inv.max_guardians,
            current_guardians: inv.current_guardians,
            is_active: inv.is_active,
            status,
        }
    }
}
