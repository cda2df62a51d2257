//! User profile models. Profiles carry the display identity used for
//! the paid_by attribution; authentication itself is external.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A user profile with display preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UserProfile {
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

/// Request to create a profile. The public name must be unique.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateProfileRequest {
    #[validate(length(min = 1, max = 255, message = "public_name is required"))]
    pub public_name: String,

    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,

    pub currency: Option<String>,
    pub language: Option<String>,
    pub theme: Option<String>,
    pub notifications: Option<bool>,
}

/// Partial update for a profile.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 255, message = "public_name cannot be empty"))]
    pub public_name: Option<String>,

    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,

    pub currency: Option<String>,
    pub language: Option<String>,
    pub theme: Option<String>,
    pub notifications: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_profile_validation() {
        let valid = CreateProfileRequest {
            public_name: "Alice".to_string(),
            email: None,
            currency: None,
            language: None,
            theme: None,
            notifications: None,
        };
        assert!(valid.validate().is_ok());

        let empty = CreateProfileRequest {
            public_name: String::new(),
            email: None,
            currency: None,
            language: None,
            theme: None,
            notifications: None,
        };
        assert!(empty.validate().is_err());
    }
}
