//! Aggregate statistics routes.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use persistence::entities::TransactionTypeDb;
use persistence::repositories::TransactionRepository;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct MonthlyStatsQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct MonthlyStats {
    pub year: i32,
    pub month: u32,
    pub total_income: String,
    pub total_expenses: String,
    pub net_balance: String,
}

/// Income, expense, and net totals for one calendar month. Defaults to
/// the current month.
///
/// GET /api/stats/monthly?year=2026&month=3
pub async fn monthly_stats(
    State(state): State<AppState>,
    Query(query): Query<MonthlyStatsQuery>,
) -> Result<Json<MonthlyStats>, ApiError> {
    let now = Utc::now();
    let year = query.year.unwrap_or_else(|| now.year());
    let month = query.month.unwrap_or_else(|| now.month());

    let (start, end) = month_bounds(year, month)
        .ok_or_else(|| ApiError::Validation("Invalid year or month".into()))?;

    let repo = TransactionRepository::new(state.pool.clone());
    let total_income = repo
        .total_in_range(TransactionTypeDb::Income, start, end)
        .await?;
    let total_expenses = repo
        .total_in_range(TransactionTypeDb::Expense, start, end)
        .await?;
    let net_balance = total_income - total_expenses;

    Ok(Json(MonthlyStats {
        year,
        month,
        total_income: total_income.to_string(),
        total_expenses: total_expenses.to_string(),
        net_balance: net_balance.to_string(),
    }))
}

/// Inclusive UTC bounds of a calendar month. Returns None for an
/// invalid month.
fn month_bounds(year: i32, month: u32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).single()?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let next_start = Utc.with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0).single()?;
    let end = next_start - chrono::Duration::milliseconds(1);
    Some((start, end))
}
