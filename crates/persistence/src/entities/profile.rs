//! User profile entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::UserProfile;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the user_profiles table.
#[derive(Debug, Clone, FromRow)]
pub struct UserProfileEntity {
    pub id: Uuid,
    pub public_name: String,
    pub email: Option<String>,
    pub currency: String,
    pub language: String,
    pub theme: String,
    pub notifications: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserProfileEntity> for UserProfile {
    fn from(entity: UserProfileEntity) -> Self {
        Self {
            id: entity.id,
            public_name: entity.public_name,
            email: entity.email,
            currency: entity.currency,
            language: entity.language,
            theme: entity.theme,
            notifications: entity.notifications,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
