//! Transaction and split entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{Transaction, TransactionSplit, TransactionType};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum that maps to the PostgreSQL transaction_type enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "transaction_type", rename_all = "lowercase")]
pub enum TransactionTypeDb {
    Expense,
    Income,
}

impl From<TransactionTypeDb> for TransactionType {
    fn from(db_type: TransactionTypeDb) -> Self {
        match db_type {
            TransactionTypeDb::Expense => TransactionType::Expense,
            TransactionTypeDb::Income => TransactionType::Income,
        }
    }
}

impl From<TransactionType> for TransactionTypeDb {
    fn from(kind: TransactionType) -> Self {
        match kind {
            TransactionType::Expense => TransactionTypeDb::Expense,
            TransactionType::Income => TransactionTypeDb::Income,
        }
    }
}

/// Database row mapping for the transactions table.
#[derive(Debug, Clone, FromRow)]
pub struct TransactionEntity {
    pub id: Uuid,
    pub group_id: Option<Uuid>,
    #[sqlx(rename = "type")]
    pub transaction_type: TransactionTypeDb,
    pub amount: Decimal,
    pub description: String,
    pub category: Option<String>,
    pub date: DateTime<Utc>,
    pub is_shared: bool,
    pub paid_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TransactionEntity> for Transaction {
    fn from(entity: TransactionEntity) -> Self {
        Self {
            id: entity.id,
            group_id: entity.group_id,
            transaction_type: entity.transaction_type.into(),
            amount: entity.amount,
            description: entity.description,
            category: entity.category,
            date: entity.date,
            is_shared: entity.is_shared,
            paid_by: entity.paid_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Database row mapping for the transaction_splits table.
#[derive(Debug, Clone, FromRow)]
pub struct TransactionSplitEntity {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub member_name: String,
    pub amount: Decimal,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
}

impl From<TransactionSplitEntity> for TransactionSplit {
    fn from(entity: TransactionSplitEntity) -> Self {
        Self {
            id: entity.id,
            transaction_id: entity.transaction_id,
            member_name: entity.member_name,
            amount: entity.amount,
            is_paid: entity.is_paid,
            created_at: entity.created_at,
        }
    }
}

/// Aggregated unpaid balance per member for a group.
#[derive(Debug, Clone, FromRow)]
pub struct MemberBalanceRow {
    pub member_name: String,
    pub total_owed: Decimal,
}
