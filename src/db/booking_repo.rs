// src/db/booking_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, FromRow, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    common::money::Cents,
    models::booking::{Booking, BookingStatus},
};

/// Janela de tempo de uma reserva ativa do usuário, com o slot que a
/// hospeda. Alimenta a checagem de sobreposição e da folga de 30 minutos.
#[derive(Debug, Clone, FromRow)]
pub struct BookingWindow {
    pub booking_id: Uuid,
    pub slot_id: Uuid,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

/// Soma real dos valores bloqueados por usuário (a "verdade", derivada das
/// reservas ativas) lado a lado com o que está gravado na conta.
#[derive(Debug, Clone, FromRow)]
pub struct BlockedTotals {
    pub user_id: Uuid,
    pub actual_credits: i64,
    pub actual_points: i64,
    pub recorded_credits: i64,
    pub recorded_points: i64,
}

#[derive(Clone)]
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Trava a linha da reserva para o cancelamento (status terminal só
    /// pode ser aplicado uma vez).
    pub async fn find_by_id_for_update<'e, E>(
        &self,
        executor: E,
        booking_id: Uuid,
    ) -> Result<Booking, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
            .bind(booking_id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::BookingNotFound)
    }

    /// Reservas ativas (PENDING/CONFIRMED) de um horário.
    pub async fn active_on_slot<'e, E>(
        &self,
        executor: E,
        slot_id: Uuid,
    ) -> Result<Vec<Booking>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE slot_id = $1 AND status IN ('PENDING', 'CONFIRMED')
            ORDER BY created_at ASC
            "#,
        )
        .bind(slot_id)
        .fetch_all(executor)
        .await?;

        Ok(bookings)
    }

    /// Janelas das reservas ativas do usuário (join com os horários).
    pub async fn active_windows_for_user<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
    ) -> Result<Vec<BookingWindow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let windows = sqlx::query_as::<_, BookingWindow>(
            r#"
            SELECT b.id AS booking_id, b.slot_id, s.start_at, s.end_at
            FROM bookings b
            JOIN slots s ON s.id = b.slot_id
            WHERE b.user_id = $1 AND b.status IN ('PENDING', 'CONFIRMED')
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;

        Ok(windows)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        slot_id: Uuid,
        group_size: i32,
        status: BookingStatus,
        amount_blocked: Cents,
        paid_with_points: bool,
        used_recycled_seat: bool,
    ) -> Result<Booking, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (user_id, slot_id, group_size, status,
                                  amount_blocked, paid_with_points,
                                  used_recycled_seat)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(slot_id)
        .bind(group_size)
        .bind(status)
        .bind(amount_blocked)
        .bind(paid_with_points)
        .bind(used_recycled_seat)
        .fetch_one(executor)
        .await?;

        Ok(booking)
    }

    /// Cancela com o snapshot `was_confirmed` do momento do cancelamento.
    pub async fn set_cancelled<'e, E>(
        &self,
        executor: E,
        booking_id: Uuid,
        was_confirmed: bool,
    ) -> Result<Booking, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = 'CANCELLED', was_confirmed = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(booking_id)
        .bind(was_confirmed)
        .fetch_one(executor)
        .await?;

        Ok(booking)
    }

    /// Promove as reservas PENDING do horário quando a quadra é atribuída.
    pub async fn confirm_pending_on_slot<'e, E>(
        &self,
        executor: E,
        slot_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE bookings SET status = 'CONFIRMED' WHERE slot_id = $1 AND status = 'PENDING'",
        )
        .bind(slot_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn set_recycled<'e, E>(
        &self,
        executor: E,
        booking_id: Uuid,
    ) -> Result<Booking, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let booking = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET is_recycled = TRUE WHERE id = $1 RETURNING *",
        )
        .bind(booking_id)
        .fetch_one(executor)
        .await?;

        Ok(booking)
    }

    // ---
    // Agregações para a reconciliação
    // ---

    /// Soma real de `amount_blocked` das reservas ativas, por usuário.
    /// Usuários sem reserva ativa também entram (soma zero) para que saldos
    /// bloqueados órfãos sejam corrigidos.
    pub async fn blocked_totals<'e, E>(
        &self,
        executor: E,
        user_scope: Option<Uuid>,
    ) -> Result<Vec<BlockedTotals>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let totals = sqlx::query_as::<_, BlockedTotals>(
            r#"
            SELECT u.id AS user_id,
                   COALESCE(SUM(b.amount_blocked)
                       FILTER (WHERE NOT b.paid_with_points), 0)::bigint AS actual_credits,
                   COALESCE(SUM(b.amount_blocked)
                       FILTER (WHERE b.paid_with_points), 0)::bigint AS actual_points,
                   u.blocked_credits AS recorded_credits,
                   u.blocked_points AS recorded_points
            FROM users u
            LEFT JOIN bookings b
                   ON b.user_id = u.id
                  AND b.status IN ('PENDING', 'CONFIRMED')
            WHERE ($1::uuid IS NULL OR u.id = $1)
            GROUP BY u.id, u.blocked_credits, u.blocked_points
            "#,
        )
        .bind(user_scope)
        .fetch_all(executor)
        .await?;

        Ok(totals)
    }
}
