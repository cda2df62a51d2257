//! Invite repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::invite::RedemptionFailure;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{GroupInviteEntity, GroupMemberEntity, InviteWithGroupEntity};
use crate::metrics::QueryTimer;

const INVITE_COLUMNS: &str =
    "id, group_id, invite_code, invited_by, expires_at, is_active, max_uses, current_uses, created_at";

/// Repository for invite-related database operations.
#[derive(Clone)]
pub struct InviteRepository {
    pool: PgPool,
}

impl InviteRepository {
    /// Creates a new InviteRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new invite.
    pub async fn create_invite(
        &self,
        group_id: Uuid,
        invite_code: &str,
        invited_by: &str,
        max_uses: Option<i32>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<GroupInviteEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_invite");
        let result = sqlx::query_as::<_, GroupInviteEntity>(&format!(
            r#"
            INSERT INTO group_invites (group_id, invite_code, invited_by, max_uses, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {INVITE_COLUMNS}
            "#,
        ))
        .bind(group_id)
        .bind(invite_code)
        .bind(invited_by)
        .bind(max_uses)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an active invite by code with its group's summary columns.
    /// Inactive invites are treated as absent for reads.
    pub async fn find_by_code_with_group(
        &self,
        code: &str,
    ) -> Result<Option<InviteWithGroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_invite_by_code_with_group");
        let result = sqlx::query_as::<_, InviteWithGroupEntity>(
            r#"
            SELECT
                i.id, i.group_id, i.invite_code, i.invited_by, i.expires_at,
                i.is_active, i.max_uses, i.current_uses, i.created_at,
                g.name AS group_name, g.description AS group_description
            FROM group_invites i
            JOIN groups g ON i.group_id = g.id
            WHERE i.invite_code = $1 AND i.is_active = TRUE
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List all invites for a group, newest first.
    pub async fn list_for_group(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<GroupInviteEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_group_invites");
        let result = sqlx::query_as::<_, GroupInviteEntity>(&format!(
            r#"
            SELECT {INVITE_COLUMNS}
            FROM group_invites
            WHERE group_id = $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(group_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Redeem an invite: atomically increment the use counter and add
    /// the new member, in one database transaction.
    ///
    /// The increment is a conditional read-modify-write: the UPDATE
    /// predicate re-checks active/expiry/max-uses, so concurrent
    /// redemptions at the max_uses boundary cannot overshoot, and a
    /// rejected redemption leaves no partial state behind.
    ///
    /// Returns `Ok(None)` when the invite is absent, inactive, expired,
    /// or exhausted; use [`failure_reason`](Self::failure_reason) to
    /// classify for logging.
    pub async fn redeem(
        &self,
        code: &str,
        member_name: &str,
        member_email: Option<&str>,
    ) -> Result<Option<(GroupInviteEntity, GroupMemberEntity)>, sqlx::Error> {
        let timer = QueryTimer::new("redeem_invite");

        let mut tx = self.pool.begin().await?;

        let invite = sqlx::query_as::<_, GroupInviteEntity>(&format!(
            r#"
            UPDATE group_invites
            SET current_uses = current_uses + 1
            WHERE invite_code = $1
              AND is_active = TRUE
              AND (expires_at IS NULL OR expires_at > NOW())
              AND (max_uses IS NULL OR current_uses < max_uses)
            RETURNING {INVITE_COLUMNS}
            "#,
        ))
        .bind(code)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(invite) = invite else {
            tx.rollback().await?;
            timer.record();
            return Ok(None);
        };

        let member = sqlx::query_as::<_, GroupMemberEntity>(
            r#"
            INSERT INTO group_members (group_id, name, email)
            VALUES ($1, $2, $3)
            RETURNING id, group_id, name, email, joined_at
            "#,
        )
        .bind(invite.group_id)
        .bind(member_name)
        .bind(member_email)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(Some((invite, member)))
    }

    /// Classify why a redemption was rejected, for internal logging.
    /// The caller still surfaces the generic message externally.
    pub async fn failure_reason(&self, code: &str) -> Result<RedemptionFailure, sqlx::Error> {
        let timer = QueryTimer::new("invite_failure_reason");
        let invite = sqlx::query_as::<_, GroupInviteEntity>(&format!(
            r#"
            SELECT {INVITE_COLUMNS}
            FROM group_invites
            WHERE invite_code = $1
            "#,
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        let reason = match invite? {
            None => RedemptionFailure::NotFound,
            Some(invite) if !invite.is_active => RedemptionFailure::Inactive,
            Some(invite) if invite.expires_at.is_some_and(|at| at <= Utc::now()) => {
                RedemptionFailure::Expired
            }
            // Also covers losing a race at the max_uses boundary.
            Some(_) => RedemptionFailure::Exhausted,
        };
        Ok(reason)
    }

    /// Deactivate an invite. Idempotent: deactivating an already
    /// inactive invite still matches its row and succeeds.
    pub async fn deactivate(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("deactivate_invite");
        let result = sqlx::query(
            r#"
            UPDATE group_invites
            SET is_active = FALSE
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Check if an invite code already exists.
    pub async fn code_exists(&self, code: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("check_invite_code_exists");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM group_invites WHERE invite_code = $1)
            "#,
        )
        .bind(code)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Generate a unique invite code, retrying on collision.
    pub async fn generate_unique_code<F>(&self, generator: F) -> Result<String, sqlx::Error>
    where
        F: Fn() -> String,
    {
        let mut code = generator();
        let mut attempts = 0;

        while self.code_exists(&code).await? {
            tracing::debug!(attempts, "invite code collision, regenerating");
            code = generator();
            attempts += 1;
            if attempts > 100 {
                return Err(sqlx::Error::Protocol(
                    "Could not generate unique invite code".to_string(),
                ));
            }
        }

        Ok(code)
    }
}
