use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState, models::account::User};

// Identidade autenticada por requisição. A camada de sessão/JWT fica fora
// deste serviço; aqui a identidade chega no cabeçalho `X-User-Id` (posto
// pelo gateway) e é resolvida para um usuário real do banco. Nunca existe
// um "usuário atual" global ou hardcoded: todo handler recebe a identidade
// explícita via extrator.
pub async fn identity_guard(
    State(app_state): State<AppState>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = request
        .headers()
        .get("X-User-Id")
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or(AppError::MissingIdentity)?;

    let user = app_state
        .account_repo
        .find_user_by_id(&app_state.db_pool, user_id)
        .await?;

    // Insere o usuário nos "extensions" da requisição
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::MissingIdentity)
    }
}
