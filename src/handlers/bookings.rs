// src/handlers/bookings.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{account::BalanceView, booking::Booking},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingPayload {
    pub slot_id: Uuid,

    #[validate(range(min = 1, message = "O grupo precisa de pelo menos 1 jogador."))]
    #[schema(example = 2)]
    pub group_size: i32,

    /// Resgatar um lugar reciclado pagando com pontos.
    #[serde(default)]
    pub redeem_points: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub booking: Booking,
    pub balance: BalanceView,
}

// POST /api/bookings
#[utoipa::path(
    post,
    path = "/api/bookings",
    tag = "Bookings",
    request_body = CreateBookingPayload,
    responses(
        (status = 201, description = "Reserva criada", body = BookingResponse),
        (status = 409, description = "Lotado, duplicada ou conflito de agenda"),
        (status = 422, description = "Categoria, fundos ou horário inválidos")
    ),
    params(
        ("X-User-Id" = Uuid, Header, description = "Identidade do usuário")
    )
)]
pub async fn create_booking(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateBookingPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (booking, balance) = app_state
        .booking_service
        .create(
            user.0.id,
            payload.slot_id,
            payload.group_size,
            payload.redeem_points,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(BookingResponse { booking, balance })))
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelResponse {
    pub booking: Booking,
    pub balance: BalanceView,
    /// Pontos de recompensa concedidos (zero se o horário era proposta).
    pub points_awarded: i64,
}

// POST /api/bookings/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/bookings/{booking_id}/cancel",
    tag = "Bookings",
    responses(
        (status = 200, description = "Reserva cancelada", body = CancelResponse),
        (status = 404, description = "Reserva não encontrada"),
        (status = 409, description = "Já cancelada")
    ),
    params(
        ("booking_id" = Uuid, Path, description = "ID da reserva"),
        ("X-User-Id" = Uuid, Header, description = "Identidade do usuário")
    )
)]
pub async fn cancel_booking(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = app_state.booking_service.cancel(&user.0, booking_id).await?;

    Ok((
        StatusCode::OK,
        Json(CancelResponse {
            booking: outcome.booking,
            balance: outcome.balance,
            points_awarded: outcome.points_awarded,
        }),
    ))
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecycleResponse {
    pub booking: Booking,
    pub available_recycled_slots: i32,
}

// POST /api/bookings/{id}/recycle
#[utoipa::path(
    post,
    path = "/api/bookings/{booking_id}/recycle",
    tag = "Bookings",
    responses(
        (status = 200, description = "Lugar liberado para resgate com pontos", body = RecycleResponse),
        (status = 409, description = "Não cancelada ou já reciclada"),
        (status = 422, description = "Reserva não elegível")
    ),
    params(
        ("booking_id" = Uuid, Path, description = "ID da reserva"),
        ("X-User-Id" = Uuid, Header, description = "Identidade do usuário")
    )
)]
pub async fn recycle_booking(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (booking, available_recycled_slots) =
        app_state.booking_service.recycle(booking_id).await?;

    Ok((
        StatusCode::OK,
        Json(RecycleResponse {
            booking,
            available_recycled_slots,
        }),
    ))
}
