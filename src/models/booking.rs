// src/models/booking.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::money::Cents;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

/// Reserva de um ou mais lugares num horário.
///
/// PENDING -> CONFIRMED quando a quadra do horário é atribuída;
/// qualquer status -> CANCELLED é terminal.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub slot_id: Uuid,

    #[schema(example = 2)]
    pub group_size: i32,

    pub status: BookingStatus,

    /// Valor bloqueado na criação (cêntimos; pontos quando
    /// `paid_with_points`). Não muda se o preço do horário mudar depois.
    pub amount_blocked: Cents,

    pub paid_with_points: bool,

    /// A criação consumiu um lugar reciclado do horário? O cancelamento
    /// devolve o lugar ao contador quando ligado.
    pub used_recycled_seat: bool,

    pub is_recycled: bool,

    /// Snapshot no cancelamento: o horário tinha quadra?
    /// Decide se o cancelamento rende pontos de recompensa.
    pub was_confirmed: bool,

    pub created_at: Option<DateTime<Utc>>,
}

impl Booking {
    pub fn is_active(&self) -> bool {
        matches!(self.status, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}
