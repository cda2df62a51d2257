//! Invite entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::GroupInvite;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the group_invites table.
#[derive(Debug, Clone, FromRow)]
pub struct GroupInviteEntity {
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

impl From<GroupInviteEntity> for GroupInvite {
    fn from(entity: GroupInviteEntity) -> Self {
        Self {
            id: entity.id,
            group_id: entity.group_id,
            invite_code: entity.invite_code,
            invited_by: entity.invited_by,
            expires_at: entity.expires_at,
            is_active: entity.is_active,
            max_uses: entity.max_uses,
            current_uses: entity.current_uses,
            created_at: entity.created_at,
        }
    }
}

/// Invite with its group's summary columns, for public lookup.
#[derive(Debug, Clone, FromRow)]
pub struct InviteWithGroupEntity {
    pub id: Uuid,
    pub group_id: Uuid,
    pub invite_code: String,
    pub invited_by: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub max_uses: Option<i32>,
    pub current_uses: i32,
    pub created_at: DateTime<Utc>,
    // Group info
    pub group_name: String,
    pub group_description: Option<String>,
}
