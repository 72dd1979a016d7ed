// src/handlers/admin.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError, config::AppState, middleware::auth::AuthenticatedUser,
    services::reconciliation_service::ReconciliationReport,
};

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationPayload {
    /// Restringe a auditoria a um único usuário.
    pub user_id: Option<Uuid>,
}

// POST /api/admin/reconciliation
//
// Gatilho do operador: recalcula os saldos bloqueados a partir das reservas
// ativas e normaliza categorias legadas. Seguro de re-executar a qualquer
// momento; a segunda rodada sem escrita no meio devolve zero correções.
#[utoipa::path(
    post,
    path = "/api/admin/reconciliation",
    tag = "Admin",
    request_body = ReconciliationPayload,
    responses(
        (status = 200, description = "Correções aplicadas", body = ReconciliationReport)
    ),
    params(
        ("X-User-Id" = Uuid, Header, description = "Identidade do operador")
    )
)]
pub async fn run_reconciliation(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Json(payload): Json<ReconciliationPayload>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state
        .reconciliation_service
        .run(payload.user_id)
        .await?;

    Ok((StatusCode::OK, Json(report)))
}
