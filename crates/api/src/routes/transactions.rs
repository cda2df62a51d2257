//! Transaction routes: create with equal splits, filtered listing,
//! partial update, delete.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use domain::events;
use domain::models::{Transaction, TransactionWithSplits};
use domain::models::transaction::{
    CreateTransactionRequest, TransactionFilter, UpdateTransactionRequest,
};
use domain::services::compute_splits;
use persistence::entities::TransactionTypeDb;
use persistence::repositories::{GroupRepository, TransactionQuery, TransactionRepository};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_transaction_created;

/// Create a transaction. Shared transactions get one equal split per
/// group member.
///
/// POST /api/transactions
pub async fn create_transaction(
    State(state): State<AppState>,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<Json<Transaction>, ApiError> {
    request.validate()?;
    let amount = request.parsed_amount().map_err(ApiError::Validation)?;

    let groups = GroupRepository::new(state.pool.clone());
    let members = if request.is_shared {
        let group_id = request
            .group_id
            .ok_or_else(|| ApiError::Validation("group_id is required for shared transactions".into()))?;
        if groups.find_by_id(group_id).await?.is_none() {
            return Err(ApiError::NotFound("Group not found".into()));
        }
        groups.list_members(group_id).await?
    } else {
        Vec::new()
    };

    let repo = TransactionRepository::new(state.pool.clone());
    let transaction: Transaction = repo
        .create(
            request.group_id,
            TransactionTypeDb::from(request.transaction_type),
            amount,
            request.description.trim(),
            request.category.as_deref(),
            request.date,
            request.is_shared,
            request.paid_by.trim(),
        )
        .await?
        .into();

    info!(
        transaction_id = %transaction.id,
        transaction_type = transaction.transaction_type.as_str(),
        amount = %transaction.amount,
        is_shared = transaction.is_shared,
        "Transaction created"
    );
    record_transaction_created(transaction.transaction_type.as_str());

    // Broadcast happens before split insertion; observers may see the
    // transaction while its splits are still being written.
    state
        .broadcaster
        .broadcast(events::TRANSACTION_CREATED, json!(&transaction));

    if transaction.is_shared && !members.is_empty() {
        let members: Vec<domain::models::GroupMember> =
            members.into_iter().map(Into::into).collect();
        let drafts = compute_splits(transaction.amount, &members, &transaction.paid_by);
        if let Err(err) = repo.insert_splits(transaction.id, &drafts).await {
            warn!(
                transaction_id = %transaction.id,
                error = %err,
                "Failed to insert transaction splits"
            );
            return Err(err.into());
        }
    }

    Ok(Json(transaction))
}

/// List transactions matching optional filters, splits attached.
///
/// GET /api/transactions
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(filter): Query<TransactionFilter>,
) -> Result<Json<Vec<TransactionWithSplits>>, ApiError> {
    let repo = TransactionRepository::new(state.pool.clone());

    let query = TransactionQuery {
        group_id: filter.group_id,
        transaction_type: filter.transaction_type.map(Into::into),
        category: filter.category,
        paid_by: filter.paid_by,
        start_date: filter.start_date,
        end_date: filter.end_date,
        search: filter.search,
        only_user: filter.only_user,
        only_group_members: filter.only_group_members,
    };

    let transactions = repo.list(&query).await?;
    let ids: Vec<Uuid> = transactions.iter().map(|t| t.id).collect();
    let mut splits_by_transaction = repo.splits_by_transaction(&ids).await?;

    let result = transactions
        .into_iter()
        .map(|entity| TransactionWithSplits {
            splits: splits_by_transaction
                .remove(&entity.id)
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect(),
            transaction: entity.into(),
        })
        .collect();

    Ok(Json(result))
}

/// Partially update a transaction. An amount change on a shared
/// transaction recomputes its splits in the same database transaction.
///
/// PUT /api/transactions/:id
pub async fn update_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTransactionRequest>,
) -> Result<Json<Transaction>, ApiError> {
    request.validate()?;
    let amount = request.parsed_amount().map_err(ApiError::Validation)?;

    let repo = TransactionRepository::new(state.pool.clone());
    let updated: Transaction = repo
        .update(
            id,
            request.transaction_type.map(Into::into),
            amount,
            request.description.as_deref(),
            request.category.as_deref(),
            request.date,
            request.paid_by.as_deref(),
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Transaction not found".into()))?
        .into();

    info!(transaction_id = %updated.id, "Transaction updated");

    Ok(Json(updated))
}

/// Delete a transaction. Splits are removed by cascade.
///
/// DELETE /api/transactions/:id
pub async fn delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let repo = TransactionRepository::new(state.pool.clone());

    let affected = repo.delete(id).await?;
    if affected == 0 {
        return Err(ApiError::NotFound("Transaction not found".into()));
    }

    info!(transaction_id = %id, "Transaction deleted");

    Ok(Json(json!({ "success": true })))
}
