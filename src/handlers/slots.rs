// src/handlers/slots.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    common::money::Cents,
    config::AppState,
    db::slot_repo::SlotFilters,
    middleware::auth::AuthenticatedUser,
    models::slot::{GenderCategory, Slot},
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListSlotsQuery {
    pub club_id: Uuid,
    /// Dia consultado (YYYY-MM-DD).
    pub date: NaiveDate,
    pub instructor_id: Option<Uuid>,
    pub gender_category: Option<GenderCategory>,
    /// Nível em décimos; devolve só horários cuja faixa o admite.
    pub level: Option<i16>,
    /// Apenas propostas (sem quadra atribuída).
    #[serde(default)]
    pub only_proposals: bool,
}

// GET /api/slots
#[utoipa::path(
    get,
    path = "/api/slots",
    tag = "Slots",
    params(
        ListSlotsQuery,
        ("X-User-Id" = Uuid, Header, description = "Identidade do usuário")
    ),
    responses(
        (status = 200, description = "Horários do dia com ocupação")
    )
)]
pub async fn list_slots(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<ListSlotsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filters = SlotFilters {
        instructor_id: query.instructor_id,
        gender_category: query.gender_category,
        level: query.level,
        only_proposals: query.only_proposals,
    };

    let slots = app_state
        .slot_service
        .list_for_day(query.club_id, query.date, &filters)
        .await?;

    Ok((StatusCode::OK, Json(slots)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSlotPayload {
    pub club_id: Uuid,
    pub instructor_id: Option<Uuid>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,

    #[schema(example = 35)]
    pub level: i16,
    pub level_min: Option<i16>,
    pub level_max: Option<i16>,

    pub gender_category: GenderCategory,

    #[validate(range(min = 1, message = "O horário precisa de pelo menos 1 lugar."))]
    #[schema(example = 4)]
    pub max_players: i32,

    /// Preço total do horário em cêntimos (8000 = 80 €).
    #[schema(example = 8000)]
    pub total_price: Cents,

    /// Lugares reciclados só resgatáveis com pontos (padrão: sim).
    #[serde(default = "default_true")]
    pub recycled_only_points: bool,
}

fn default_true() -> bool {
    true
}

impl CreateSlotPayload {
    fn validate_consistency(&self) -> Result<(), validator::ValidationError> {
        if self.end_at <= self.start_at {
            return Err(validator::ValidationError::new("EndBeforeStart"));
        }
        if let (Some(min), Some(max)) = (self.level_min, self.level_max) {
            if min > max {
                return Err(validator::ValidationError::new("LevelRangeInverted"));
            }
        }
        if self.total_price.is_negative() {
            return Err(validator::ValidationError::new("NegativePrice"));
        }
        Ok(())
    }
}

// POST /api/slots (rotina de geração)
#[utoipa::path(
    post,
    path = "/api/slots",
    tag = "Slots",
    request_body = CreateSlotPayload,
    responses(
        (status = 201, description = "Horário criado", body = Slot)
    ),
    params(
        ("X-User-Id" = Uuid, Header, description = "Identidade do usuário")
    )
)]
pub async fn create_slot(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Json(payload): Json<CreateSlotPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    payload.validate_consistency().map_err(|e| {
        let mut errors = validator::ValidationErrors::new();
        errors.add("startAt", e);
        AppError::ValidationError(errors)
    })?;

    let slot = app_state
        .slot_service
        .create_slot(
            payload.club_id,
            payload.instructor_id,
            payload.start_at,
            payload.end_at,
            payload.level,
            payload.level_min,
            payload.level_max,
            payload.gender_category,
            payload.max_players,
            payload.total_price,
            payload.recycled_only_points,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(slot)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignCourtPayload {
    pub court_id: Uuid,
}

// POST /api/slots/{id}/court
#[utoipa::path(
    post,
    path = "/api/slots/{slot_id}/court",
    tag = "Slots",
    request_body = AssignCourtPayload,
    responses(
        (status = 200, description = "Quadra atribuída; proposta virou horário confirmado", body = Slot),
        (status = 409, description = "Já confirmado em outra quadra, ou quadra ocupada")
    ),
    params(
        ("slot_id" = Uuid, Path, description = "ID do horário"),
        ("X-User-Id" = Uuid, Header, description = "Identidade do usuário")
    )
)]
pub async fn assign_court(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(slot_id): Path<Uuid>,
    Json(payload): Json<AssignCourtPayload>,
) -> Result<impl IntoResponse, AppError> {
    let slot = app_state
        .slot_service
        .assign_court(slot_id, payload.court_id)
        .await?;

    Ok((StatusCode::OK, Json(slot)))
}

// POST /api/slots/{id}/release
#[utoipa::path(
    post,
    path = "/api/slots/{slot_id}/release",
    tag = "Slots",
    responses(
        (status = 200, description = "Quadra liberada (no-op se restarem reservas)", body = Slot)
    ),
    params(
        ("slot_id" = Uuid, Path, description = "ID do horário"),
        ("X-User-Id" = Uuid, Header, description = "Identidade do usuário")
    )
)]
pub async fn release_slot(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(slot_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let slot = app_state.slot_service.release(slot_id).await?;
    Ok((StatusCode::OK, Json(slot)))
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub removed: u64,
}

// POST /api/slots/cleanup (rotina de limpeza)
#[utoipa::path(
    post,
    path = "/api/slots/cleanup",
    tag = "Slots",
    responses(
        (status = 200, description = "Horários passados sem reserva removidos", body = CleanupResponse)
    ),
    params(
        ("X-User-Id" = Uuid, Header, description = "Identidade do usuário")
    )
)]
pub async fn cleanup_slots(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let removed = app_state.slot_service.cleanup_expired().await?;
    Ok((StatusCode::OK, Json(CleanupResponse { removed })))
}
