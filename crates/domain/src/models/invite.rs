//! Invite domain models for shareable group invite codes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::group::{GroupMember, GroupSummary, GroupWithMembers};

/// A redeemable invite bound to a group.
///
/// Lifecycle: created active, redeemed up to `max_uses` times
/// (`max_uses = None` means unlimited), then unusable once deactivated,
/// expired, or exhausted. Deactivation is one-way.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupInvite {
    pub id: Uuid,
    pub group_id: Uuid,
    pub invite_code: String,
    pub invited_by: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub max_uses: Option<i32>,
    pub current_uses: i32,
    pub created_at: DateTime<Utc>,
}

/// Request to create a new invite for a group.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateInviteRequest {
    /// Name of the person creating the invite.
    #[validate(length(min = 1, max = 255, message = "invited_by is required"))]
    pub invited_by: String,

    /// Maximum redemptions. Omitted means unlimited.
    #[validate(range(min = 1, message = "max_uses must be at least 1"))]
    pub max_uses: Option<i32>,

    /// Optional expiry timestamp.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Public invite lookup response: the invite plus a group summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct InviteLookupResponse {
    pub invite: GroupInvite,
    pub group: GroupSummary,
}

/// Request to join a group by redeeming an invite code.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct JoinGroupRequest {
    #[validate(length(min = 1, max = 255, message = "member_name is required"))]
    pub member_name: String,

    #[validate(email(message = "member_email must be a valid address"))]
    pub member_email: Option<String>,
}

/// Response after a successful redemption.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct JoinGroupResponse {
    pub group: GroupWithMembers,
    pub member: GroupMember,
}

/// Length of generated invite codes.
pub const INVITE_CODE_LEN: usize = 24;

/// Generate a random invite code.
///
/// 24 characters from a 31-character alphabet gives about 119 bits of
/// entropy, so collisions are negligible; the repository still retries
/// on the unique constraint. Confusable characters (0/o, 1/i/l) are
/// excluded.
pub fn generate_invite_code() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let chars: &[u8] = b"abcdefghjkmnpqrstuvwxyz23456789";

    (0..INVITE_CODE_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..chars.len());
            chars[idx] as char
        })
        .collect()
}

/// Reason a redemption was rejected. Surfaced to callers as a single
/// generic message; the concrete reason is only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RedemptionFailure {
    #[error("invite code does not exist")]
    NotFound,
    #[error("invite has been deactivated")]
    Inactive,
    #[error("invite has expired")]
    Expired,
    #[error("invite has reached its maximum uses")]
    Exhausted,
}

impl RedemptionFailure {
    /// The one external message for every rejection reason.
    pub const GENERIC_MESSAGE: &'static str = "Invalid or expired invite";
}
