//! Transaction repository for database operations.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use domain::services::{equal_share, SplitDraft};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{TransactionEntity, TransactionSplitEntity, TransactionTypeDb};
use crate::metrics::QueryTimer;

const TRANSACTION_COLUMNS: &str =
    "id, group_id, type, amount, description, category, date, is_shared, paid_by, created_at, updated_at";

const SPLIT_COLUMNS: &str = "id, transaction_id, member_name, amount, is_paid, created_at";

/// Filter parameters for listing transactions. Mirrors the typed
/// query surface; every condition is independently optional.
#[derive(Debug, Clone, Default)]
pub struct TransactionQuery {
    pub group_id: Option<Uuid>,
    pub transaction_type: Option<TransactionTypeDb>,
    pub category: Option<String>,
    pub paid_by: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub search: Option<String>,
    /// Restrict to transactions paid by a registered profile name.
    pub only_user: bool,
    /// Restrict to transactions paid by any group member.
    pub only_group_members: bool,
}

/// Repository for transaction and split database operations.
#[derive(Clone)]
pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new transaction row.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        group_id: Option<Uuid>,
        transaction_type: TransactionTypeDb,
        amount: Decimal,
        description: &str,
        category: Option<&str>,
        date: DateTime<Utc>,
        is_shared: bool,
        paid_by: &str,
    ) -> Result<TransactionEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_transaction");
        let result = sqlx::query_as::<_, TransactionEntity>(&format!(
            r#"
            INSERT INTO transactions (group_id, type, amount, description, category, date, is_shared, paid_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {TRANSACTION_COLUMNS}
            "#,
        ))
        .bind(group_id)
        .bind(transaction_type)
        .bind(amount)
        .bind(description)
        .bind(category)
        .bind(date)
        .bind(is_shared)
        .bind(paid_by)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a transaction by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<TransactionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_transaction_by_id");
        let result = sqlx::query_as::<_, TransactionEntity>(&format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM transactions
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List transactions matching the filter, newest date first.
    pub async fn list(
        &self,
        query: &TransactionQuery,
    ) -> Result<Vec<TransactionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_transactions");
        let result = sqlx::query_as::<_, TransactionEntity>(&format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM transactions
            WHERE ($1::uuid IS NULL OR group_id = $1)
              AND ($2::transaction_type IS NULL OR type = $2)
              AND ($3::varchar IS NULL OR category = $3)
              AND ($4::varchar IS NULL OR paid_by = $4)
              AND ($5::timestamptz IS NULL OR date >= $5)
              AND ($6::timestamptz IS NULL OR date <= $6)
              AND ($7::text IS NULL
                   OR description ILIKE '%' || $7 || '%'
                   OR paid_by ILIKE '%' || $7 || '%')
              AND (NOT $8 OR paid_by IN (SELECT public_name FROM user_profiles))
              AND (NOT $9 OR paid_by IN (SELECT name FROM group_members))
            ORDER BY date DESC
            "#,
        ))
        .bind(query.group_id)
        .bind(query.transaction_type)
        .bind(query.category.as_deref())
        .bind(query.paid_by.as_deref())
        .bind(query.start_date)
        .bind(query.end_date)
        .bind(query.search.as_deref())
        .bind(query.only_user)
        .bind(query.only_group_members)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Insert split rows for a transaction. One row per draft, inside
    /// a single database transaction.
    pub async fn insert_splits(
        &self,
        transaction_id: Uuid,
        drafts: &[SplitDraft],
    ) -> Result<Vec<TransactionSplitEntity>, sqlx::Error> {
        let timer = QueryTimer::new("insert_transaction_splits");

        let mut tx = self.pool.begin().await?;
        let mut splits = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let split = sqlx::query_as::<_, TransactionSplitEntity>(&format!(
                r#"
                INSERT INTO transaction_splits (transaction_id, member_name, amount, is_paid)
                VALUES ($1, $2, $3, $4)
                RETURNING {SPLIT_COLUMNS}
                "#,
            ))
            .bind(transaction_id)
            .bind(&draft.member_name)
            .bind(draft.amount)
            .bind(draft.is_paid)
            .fetch_one(&mut *tx)
            .await?;
            splits.push(split);
        }
        tx.commit().await?;

        timer.record();
        Ok(splits)
    }

    /// Splits for many transactions at once, keyed by transaction ID.
    pub async fn splits_by_transaction(
        &self,
        transaction_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<TransactionSplitEntity>>, sqlx::Error> {
        let timer = QueryTimer::new("splits_by_transaction");
        let rows = sqlx::query_as::<_, TransactionSplitEntity>(&format!(
            r#"
            SELECT {SPLIT_COLUMNS}
            FROM transaction_splits
            WHERE transaction_id = ANY($1)
            "#,
        ))
        .bind(transaction_ids)
        .fetch_all(&self.pool)
        .await;
        timer.record();

        let rows = rows?;
        let mut by_transaction: HashMap<Uuid, Vec<TransactionSplitEntity>> = HashMap::new();
        for row in rows {
            by_transaction.entry(row.transaction_id).or_default().push(row);
        }
        Ok(by_transaction)
    }

    /// Apply a partial update. When the amount of a shared transaction
    /// changes, its splits are recomputed in the same database
    /// transaction, dividing the new amount equally and carrying each
    /// member's is_paid flag forward, so the sum of splits stays equal
    /// to the amount.
    ///
    /// Returns `Ok(None)` when the transaction does not exist.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: Uuid,
        transaction_type: Option<TransactionTypeDb>,
        amount: Option<Decimal>,
        description: Option<&str>,
        category: Option<&str>,
        date: Option<DateTime<Utc>>,
        paid_by: Option<&str>,
    ) -> Result<Option<TransactionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_transaction");

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, TransactionEntity>(&format!(
            r#"
            UPDATE transactions
            SET type = COALESCE($2, type),
                amount = COALESCE($3, amount),
                description = COALESCE($4, description),
                category = COALESCE($5, category),
                date = COALESCE($6, date),
                paid_by = COALESCE($7, paid_by),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {TRANSACTION_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(transaction_type)
        .bind(amount)
        .bind(description)
        .bind(category)
        .bind(date)
        .bind(paid_by)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(updated) = updated else {
            tx.rollback().await?;
            timer.record();
            return Ok(None);
        };

        if amount.is_some() && updated.is_shared {
            let old_splits = sqlx::query_as::<_, TransactionSplitEntity>(&format!(
                r#"
                SELECT {SPLIT_COLUMNS}
                FROM transaction_splits
                WHERE transaction_id = $1
                "#,
            ))
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;

            if !old_splits.is_empty() {
                sqlx::query("DELETE FROM transaction_splits WHERE transaction_id = $1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;

                let share = equal_share(updated.amount, old_splits.len());
                for old in &old_splits {
                    sqlx::query(
                        r#"
                        INSERT INTO transaction_splits (transaction_id, member_name, amount, is_paid)
                        VALUES ($1, $2, $3, $4)
                        "#,
                    )
                    .bind(id)
                    .bind(&old.member_name)
                    .bind(share)
                    .bind(old.is_paid)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        tx.commit().await?;
        timer.record();
        Ok(Some(updated))
    }

    /// Delete a transaction. Splits are removed by the cascade rule.
    pub async fn delete(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_transaction");
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Total amounts for a transaction type in a date window.
    pub async fn total_in_range(
        &self,
        transaction_type: TransactionTypeDb,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Decimal, sqlx::Error> {
        let timer = QueryTimer::new("transaction_total_in_range");
        let result = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM transactions
            WHERE type = $1 AND date >= $2 AND date <= $3
            "#,
        )
        .bind(transaction_type)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}

#[cfg(test)]
mod tests {
    // TransactionRepository tests require a database connection and
    // are covered by the integration tests.
}
