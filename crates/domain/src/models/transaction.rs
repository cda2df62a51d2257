//! Transaction and split domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Kind of ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Expense,
    Income,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Expense => "expense",
            TransactionType::Income => "income",
        }
    }
}

/// An income or expense entry, optionally shared across a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Transaction {
    pub id: Uuid,
    pub group_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub description: String,
    pub category: Option<String>,
    pub date: DateTime<Utc>,
    pub is_shared: bool,
    pub paid_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-member share of a shared transaction. Owned by its transaction
/// and cascade-deleted with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TransactionSplit {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub member_name: String,
    pub amount: Decimal,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
}

/// Transaction with its splits attached, as returned by list routes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TransactionWithSplits {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub splits: Vec<TransactionSplit>,
}

/// Request to create a transaction. Amounts arrive as decimal strings,
/// matching the wire format clients send.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateTransactionRequest {
    pub group_id: Option<Uuid>,

    #[serde(rename = "type")]
    pub transaction_type: TransactionType,

    #[validate(length(min = 1, message = "amount is required"))]
    pub amount: String,

    #[validate(length(min = 1, max = 1000, message = "description is required"))]
    pub description: String,

    #[validate(length(max = 100, message = "category must be at most 100 characters"))]
    pub category: Option<String>,

    pub date: DateTime<Utc>,

    #[serde(default)]
    pub is_shared: bool,

    #[validate(length(min = 1, max = 255, message = "paid_by is required"))]
    pub paid_by: String,
}

impl CreateTransactionRequest {
    /// Parse the amount string into a positive decimal.
    pub fn parsed_amount(&self) -> Result<Decimal, String> {
        let amount: Decimal = self
            .amount
            .trim()
            .parse()
            .map_err(|_| format!("amount is not a valid number: {}", self.amount))?;
        if amount <= Decimal::ZERO {
            return Err("amount must be positive".to_string());
        }
        Ok(amount)
    }
}

/// Partial update for an existing transaction.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateTransactionRequest {
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,

    pub amount: Option<String>,

    #[validate(length(min = 1, max = 1000, message = "description cannot be empty"))]
    pub description: Option<String>,

    #[validate(length(max = 100, message = "category must be at most 100 characters"))]
    pub category: Option<String>,

    pub date: Option<DateTime<Utc>>,

    pub paid_by: Option<String>,
}

impl UpdateTransactionRequest {
    /// Parse the new amount, if one was supplied.
    pub fn parsed_amount(&self) -> Result<Option<Decimal>, String> {
        match &self.amount {
            None => Ok(None),
            Some(raw) => {
                let amount: Decimal = raw
                    .trim()
                    .parse()
                    .map_err(|_| format!("amount is not a valid number: {}", raw))?;
                if amount <= Decimal::ZERO {
                    return Err("amount must be positive".to_string());
                }
                Ok(Some(amount))
            }
        }
    }
}

/// Typed filter for transaction listing. Every field is independently
/// optional; unrecognized query keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TransactionFilter {
    pub group_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    pub category: Option<String>,
    pub paid_by: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub search: Option<String>,
    #[serde(default)]
    pub only_user: bool,
    #[serde(default)]
    pub only_group_members: bool,
}
