// src/handlers/accounts.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::account::BalanceView,
};

// GET /api/accounts/me
#[utoipa::path(
    get,
    path = "/api/accounts/me",
    tag = "Accounts",
    responses(
        (status = 200, description = "Saldo da conta do usuário", body = BalanceView)
    ),
    params(
        ("X-User-Id" = Uuid, Header, description = "Identidade do usuário")
    )
)]
pub async fn get_my_balance(user: AuthenticatedUser) -> Result<impl IntoResponse, AppError> {
    Ok((StatusCode::OK, Json(BalanceView::from(&user.0))))
}

// GET /api/accounts/me/transactions
#[utoipa::path(
    get,
    path = "/api/accounts/me/transactions",
    tag = "Accounts",
    responses(
        (status = 200, description = "Extrato do livro-razão, mais recente primeiro")
    ),
    params(
        ("X-User-Id" = Uuid, Header, description = "Identidade do usuário")
    )
)]
pub async fn get_my_transactions(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let entries = app_state
        .account_repo
        .list_transactions(&app_state.db_pool, user.0.id)
        .await?;

    Ok((StatusCode::OK, Json(entries)))
}
