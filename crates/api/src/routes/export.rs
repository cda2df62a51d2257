//! Ledger report export.

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use domain::models::transaction::TransactionFilter;
use domain::models::TransactionType;
use persistence::repositories::{TransactionQuery, TransactionRepository};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize, Default)]
pub struct ExportRequest {
    #[serde(default)]
    pub filters: TransactionFilter,
}

/// Generate a plain-text ledger report for download. The body carries
/// the same filters as the transaction listing.
///
/// POST /api/export/report
pub async fn export_report(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = TransactionRepository::new(state.pool.clone());

    let filter = request.filters;
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

    let mut total_income = Decimal::ZERO;
    let mut total_expenses = Decimal::ZERO;

    let mut report = String::new();
    report.push_str("EXPENSE REPORT\n");
    report.push_str(&format!(
        "Generated: {}\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    report.push_str(&format!("Transactions: {}\n", transactions.len()));
    report.push_str(&"=".repeat(72));
    report.push('\n');

    for entity in &transactions {
        let kind: TransactionType = entity.transaction_type.into();
        match kind {
            TransactionType::Income => total_income += entity.amount,
            TransactionType::Expense => total_expenses += entity.amount,
        }
        report.push_str(&format!(
            "{date}  {kind:<8}  {amount:>12}  {paid_by:<20}  {description}\n",
            date = entity.date.format("%Y-%m-%d"),
            kind = kind.as_str(),
            amount = entity.amount.to_string(),
            paid_by = entity.paid_by,
            description = entity.description,
        ));
        if let Some(category) = &entity.category {
            report.push_str(&format!("{:>34}  [{}]\n", "", category));
        }
    }

    report.push_str(&"=".repeat(72));
    report.push('\n');
    report.push_str(&format!("Total income:   {}\n", total_income));
    report.push_str(&format!("Total expenses: {}\n", total_expenses));
    report.push_str(&format!("Net balance:    {}\n", total_income - total_expenses));

    let filename = format!(
        "expense-report-{}.txt",
        Utc::now().format("%Y-%m-%d")
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        report,
    ))
}
