//! Group repository for database operations.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{GroupEntity, GroupMemberEntity, MemberBalanceRow};
use crate::metrics::QueryTimer;

/// Repository for group-related database operations.
#[derive(Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    /// Creates a new GroupRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new group.
    pub async fn create_group(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<GroupEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_group");
        let result = sqlx::query_as::<_, GroupEntity>(
            r#"
            INSERT INTO groups (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a group by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<GroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_group_by_id");
        let result = sqlx::query_as::<_, GroupEntity>(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM groups
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List all groups, newest first.
    pub async fn list_groups(&self) -> Result<Vec<GroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_groups");
        let result = sqlx::query_as::<_, GroupEntity>(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM groups
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List the members of a group.
    pub async fn list_members(&self, group_id: Uuid) -> Result<Vec<GroupMemberEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_group_members");
        let result = sqlx::query_as::<_, GroupMemberEntity>(
            r#"
            SELECT id, group_id, name, email, joined_at
            FROM group_members
            WHERE group_id = $1
            ORDER BY joined_at
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Fetch members for many groups at once, keyed by group ID.
    pub async fn members_by_group(
        &self,
        group_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<GroupMemberEntity>>, sqlx::Error> {
        let timer = QueryTimer::new("members_by_group");
        let rows = sqlx::query_as::<_, GroupMemberEntity>(
            r#"
            SELECT id, group_id, name, email, joined_at
            FROM group_members
            WHERE group_id = ANY($1)
            ORDER BY joined_at
            "#,
        )
        .bind(group_ids)
        .fetch_all(&self.pool)
        .await;
        timer.record();

        let rows = rows?;
        let mut by_group: HashMap<Uuid, Vec<GroupMemberEntity>> = HashMap::new();
        for row in rows {
            by_group.entry(row.group_id).or_default().push(row);
        }
        Ok(by_group)
    }

    /// Add a member to a group. Duplicate names are allowed.
    pub async fn add_member(
        &self,
        group_id: Uuid,
        name: &str,
        email: Option<&str>,
    ) -> Result<GroupMemberEntity, sqlx::Error> {
        let timer = QueryTimer::new("add_group_member");
        let result = sqlx::query_as::<_, GroupMemberEntity>(
            r#"
            INSERT INTO group_members (group_id, name, email)
            VALUES ($1, $2, $3)
            RETURNING id, group_id, name, email, joined_at
            "#,
        )
        .bind(group_id)
        .bind(name)
        .bind(email)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Total shared expense amount for a group.
    pub async fn total_shared(&self, group_id: Uuid) -> Result<Decimal, sqlx::Error> {
        let timer = QueryTimer::new("group_total_shared");
        let result = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM transactions
            WHERE group_id = $1 AND is_shared = TRUE AND type = 'expense'
            "#,
        )
        .bind(group_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Unpaid split totals per member for a group.
    pub async fn member_balances(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<MemberBalanceRow>, sqlx::Error> {
        let timer = QueryTimer::new("group_member_balances");
        let result = sqlx::query_as::<_, MemberBalanceRow>(
            r#"
            SELECT s.member_name, COALESCE(SUM(s.amount), 0) AS total_owed
            FROM transaction_splits s
            INNER JOIN transactions t ON s.transaction_id = t.id
            WHERE t.group_id = $1 AND s.is_paid = FALSE
            GROUP BY s.member_name
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
