//! User profile repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::UserProfileEntity;
use crate::metrics::QueryTimer;

const PROFILE_COLUMNS: &str =
    "id, public_name, email, currency, language, theme, notifications, created_at, updated_at";

/// Repository for user profile database operations.
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    /// Creates a new ProfileRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a profile. A duplicate public name violates the unique
    /// constraint, which the API layer maps to a conflict.
    pub async fn create(
        &self,
        public_name: &str,
        email: Option<&str>,
        currency: Option<&str>,
        language: Option<&str>,
        theme: Option<&str>,
        notifications: Option<bool>,
    ) -> Result<UserProfileEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_profile");
        let result = sqlx::query_as::<_, UserProfileEntity>(&format!(
            r#"
            INSERT INTO user_profiles (public_name, email, currency, language, theme, notifications)
            VALUES (
                $1, $2,
                COALESCE($3, 'PKR'),
                COALESCE($4, 'en'),
                COALESCE($5, 'light'),
                COALESCE($6, TRUE)
            )
            RETURNING {PROFILE_COLUMNS}
            "#,
        ))
        .bind(public_name)
        .bind(email)
        .bind(currency)
        .bind(language)
        .bind(theme)
        .bind(notifications)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a profile by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserProfileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_profile_by_id");
        let result = sqlx::query_as::<_, UserProfileEntity>(&format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM user_profiles
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a profile by its public name.
    pub async fn find_by_name(
        &self,
        public_name: &str,
    ) -> Result<Option<UserProfileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_profile_by_name");
        let result = sqlx::query_as::<_, UserProfileEntity>(&format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM user_profiles
            WHERE public_name = $1
            "#,
        ))
        .bind(public_name)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Apply a partial update. Returns `Ok(None)` for an unknown ID.
    pub async fn update(
        &self,
        id: Uuid,
        public_name: Option<&str>,
        email: Option<&str>,
        currency: Option<&str>,
        language: Option<&str>,
        theme: Option<&str>,
        notifications: Option<bool>,
    ) -> Result<Option<UserProfileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_profile");
        let result = sqlx::query_as::<_, UserProfileEntity>(&format!(
            r#"
            UPDATE user_profiles
            SET public_name = COALESCE($2, public_name),
                email = COALESCE($3, email),
                currency = COALESCE($4, currency),
                language = COALESCE($5, language),
                theme = COALESCE($6, theme),
                notifications = COALESCE($7, notifications),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(public_name)
        .bind(email)
        .bind(currency)
        .bind(language)
        .bind(theme)
        .bind(notifications)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}

#[cfg(test)]
mod tests {
    // ProfileRepository tests require a database connection and are
    // covered by the integration tests.
}
