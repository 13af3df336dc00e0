//! PDF export of the balance report, for premium accounts.

use axum::{
    Router,
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;
use tracing::info;

use super::load_user;
use crate::{AppState, error::ApiResult, middleware::auth::AuthUser};
use tanzia_core::report::{build_report, render_pdf, report_filename};
use tanzia_db::LedgerRepository;
use tanzia_shared::AppError;

/// Creates the export router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/export/pdf", get(export_pdf))
}

/// `Content-Disposition` value offering `filename` as a download.
fn attachment(filename: &str) -> String {
    format!("attachment; filename={filename}")
}

/// GET /export/pdf - Download the report as a PDF.
async fn export_pdf(State(state): State<AppState>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    let user = load_user(&state, auth.user_id).await?;
    if !user.is_premium {
        return Err(
            AppError::Forbidden("PDF export requires a premium subscription".into()).into(),
        );
    }

    let ledger = LedgerRepository::new((*state.db).clone())
        .load(user.id)
        .await?;

    let now = Utc::now();
    let report = build_report(&ledger, now);
    let pdf = tokio::task::spawn_blocking(move || render_pdf(&report))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let filename = report_filename(now.date_naive());
    info!(user_id = %user.id, bytes = pdf.len(), %filename, "PDF exported");

    Ok((
        [
            (CONTENT_TYPE, "application/pdf".to_string()),
            (CONTENT_DISPOSITION, attachment(&filename)),
        ],
        pdf,
    ))
}
