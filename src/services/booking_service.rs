// src/services/booking_service.rs

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::db_utils::retry_once_on_conflict,
    common::error::AppError,
    common::money::Cents,
    db::{AccountRepository, BookingRepository, SlotRepository},
    models::{
        account::{BalanceView, TransactionAction, TransactionKind, User},
        booking::{Booking, BookingStatus},
    },
    services::validation::{self, CandidateBooking},
};

/// Resultado do cancelamento: saldo atualizado e pontos concedidos.
#[derive(Debug, Clone)]
pub struct CancelOutcome {
    pub booking: Booking,
    pub balance: BalanceView,
    pub points_awarded: i64,
}

/// O livro de reservas: cria, cancela e recicla reservas mantendo a conta
/// de créditos consistente. Cada operação é uma única transação no banco;
/// a linha da reserva e a mutação do razão entram juntas ou nenhuma entra.
#[derive(Clone)]
pub struct BookingService {
    slot_repo: SlotRepository,
    booking_repo: BookingRepository,
    account_repo: AccountRepository,
    pool: PgPool,
    /// Folga mínima entre reservas do mesmo usuário, em minutos.
    buffer_minutes: i64,
    /// Percentual do valor da reserva convertido em pontos no cancelamento
    /// de horário confirmado.
    reward_points_percent: i64,
}

impl BookingService {
    pub fn new(
        slot_repo: SlotRepository,
        booking_repo: BookingRepository,
        account_repo: AccountRepository,
        pool: PgPool,
        buffer_minutes: i64,
        reward_points_percent: i64,
    ) -> Self {
        Self {
            slot_repo,
            booking_repo,
            account_repo,
            pool,
            buffer_minutes,
            reward_points_percent,
        }
    }

    // --- CREATE ---

    /// Valida e cria a reserva. Conflito de serialização é repetido uma vez
    /// com a mesma unidade atômica (ver `db_utils`).
    pub async fn create(
        &self,
        user_id: Uuid,
        slot_id: Uuid,
        group_size: i32,
        redeem_points: bool,
    ) -> Result<(Booking, BalanceView), AppError> {
        retry_once_on_conflict(|| self.create_inner(user_id, slot_id, group_size, redeem_points))
            .await
    }

    async fn create_inner(
        &self,
        user_id: Uuid,
        slot_id: Uuid,
        group_size: i32,
        redeem_points: bool,
    ) -> Result<(Booking, BalanceView), AppError> {
        let mut tx = self.pool.begin().await?;

        // Trava o slot e o usuário: o check-then-insert da capacidade e dos
        // fundos roda inteiro sob os mesmos locks de linha. É a corrida que
        // este desenho precisa fechar (overbooking sob carga concorrente).
        let slot = self.slot_repo.find_by_id_for_update(&mut *tx, slot_id).await?;
        let user = self
            .account_repo
            .find_user_by_id_for_update(&mut *tx, user_id)
            .await?;

        let active = self.booking_repo.active_on_slot(&mut *tx, slot.id).await?;
        let windows = self
            .booking_repo
            .active_windows_for_user(&mut *tx, user_id)
            .await?;

        let candidate = CandidateBooking {
            group_size,
            redeem_points,
        };
        // A moeda do pagamento sai da validação: resgate paga com pontos,
        // ou com créditos quando a política do horário permite.
        let approved = validation::validate_booking(
            &slot,
            &user,
            candidate,
            &active,
            &windows,
            Utc::now(),
            Duration::minutes(self.buffer_minutes),
        )?;

        // Horário já confirmado entra direto como CONFIRMED.
        let status = if slot.is_confirmed() {
            BookingStatus::Confirmed
        } else {
            BookingStatus::Pending
        };

        let booking = self
            .booking_repo
            .create(
                &mut *tx,
                user_id,
                slot_id,
                group_size,
                status,
                approved.amount,
                approved.paid_with_points,
                redeem_points,
            )
            .await?;

        if redeem_points {
            // O resgate consome um lugar reciclado, seja qual for a moeda.
            self.slot_repo.adjust_recycled_slots(&mut *tx, slot.id, -1).await?;
        }

        let updated = if approved.paid_with_points {
            let updated = self
                .account_repo
                .adjust_blocked_points(&mut *tx, user_id, approved.amount.as_i64())
                .await?;
            self.account_repo
                .record_transaction(
                    &mut *tx,
                    user_id,
                    TransactionKind::Points,
                    TransactionAction::Subtract,
                    approved.amount.as_i64(),
                    updated.available_points(),
                    "Resgate de lugar reciclado com pontos",
                    Some(booking.id),
                )
                .await?;
            updated
        } else {
            let concept = if redeem_points {
                "Resgate de lugar reciclado com créditos"
            } else {
                "Bloqueio de créditos por reserva"
            };
            let updated = self
                .account_repo
                .adjust_blocked_credits(&mut *tx, user_id, approved.amount)
                .await?;
            self.account_repo
                .record_transaction(
                    &mut *tx,
                    user_id,
                    TransactionKind::Credit,
                    TransactionAction::Subtract,
                    approved.amount.as_i64(),
                    updated.available_credits().as_i64(),
                    concept,
                    Some(booking.id),
                )
                .await?;
            updated
        };

        tx.commit().await?;

        tracing::info!(
            booking_id = %booking.id,
            slot_id = %slot_id,
            user_id = %user_id,
            amount = %approved.amount,
            "Reserva criada"
        );

        Ok((booking, BalanceView::from(&updated)))
    }

    // --- CANCEL ---

    pub async fn cancel(&self, user: &User, booking_id: Uuid) -> Result<CancelOutcome, AppError> {
        retry_once_on_conflict(|| self.cancel_inner(user, booking_id)).await
    }

    async fn cancel_inner(&self, user: &User, booking_id: Uuid) -> Result<CancelOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        let booking = self
            .booking_repo
            .find_by_id_for_update(&mut *tx, booking_id)
            .await?;
        if booking.user_id != user.id {
            // Não vaza a existência de reservas alheias.
            return Err(AppError::BookingNotFound);
        }
        if booking.status == BookingStatus::Cancelled {
            return Err(AppError::AlreadyCancelled);
        }

        // Snapshot: o horário tem quadra NESTE momento? Decide os pontos.
        let slot = self.slot_repo.find_by_id(&mut *tx, booking.slot_id).await?;
        let was_confirmed = slot.is_confirmed();

        let cancelled = self
            .booking_repo
            .set_cancelled(&mut *tx, booking_id, was_confirmed)
            .await?;

        // Desbloqueia exatamente o valor congelado na criação, nunca um
        // valor rederivado do preço atual do horário.
        let mut updated = if booking.paid_with_points {
            let updated = self
                .account_repo
                .adjust_blocked_points(&mut *tx, user.id, -booking.amount_blocked.as_i64())
                .await?;
            self.account_repo
                .record_transaction(
                    &mut *tx,
                    user.id,
                    TransactionKind::Points,
                    TransactionAction::Add,
                    booking.amount_blocked.as_i64(),
                    updated.available_points(),
                    "Desbloqueio de pontos por cancelamento",
                    Some(booking_id),
                )
                .await?;
            updated
        } else {
            let updated = self
                .account_repo
                .adjust_blocked_credits(&mut *tx, user.id, Cents(-booking.amount_blocked.as_i64()))
                .await?;
            self.account_repo
                .record_transaction(
                    &mut *tx,
                    user.id,
                    TransactionKind::Credit,
                    TransactionAction::Add,
                    booking.amount_blocked.as_i64(),
                    updated.available_credits().as_i64(),
                    "Desbloqueio de créditos por cancelamento",
                    Some(booking_id),
                )
                .await?;
            updated
        };

        if booking.used_recycled_seat {
            // O lugar reciclado consumido na criação volta ao contador.
            self.slot_repo
                .adjust_recycled_slots(&mut *tx, booking.slot_id, 1)
                .await?;
        }

        let points_awarded = reward_points(
            booking.amount_blocked,
            self.reward_points_percent,
            was_confirmed,
            booking.paid_with_points,
        );
        if points_awarded > 0 {
            updated = self
                .account_repo
                .add_points(&mut *tx, user.id, points_awarded)
                .await?;
            self.account_repo
                .record_transaction(
                    &mut *tx,
                    user.id,
                    TransactionKind::Points,
                    TransactionAction::Add,
                    points_awarded,
                    updated.points,
                    "Pontos de recompensa por cancelamento de horário confirmado",
                    Some(booking_id),
                )
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            booking_id = %booking_id,
            user_id = %user.id,
            points_awarded,
            was_confirmed,
            "Reserva cancelada"
        );

        Ok(CancelOutcome {
            booking: cancelled,
            balance: BalanceView::from(&updated),
            points_awarded,
        })
    }

    // --- RECYCLE ---

    /// Marca o lugar liberado por um cancelamento como reciclável: passa a
    /// poder ser resgatado por outros usuários apenas com pontos.
    pub async fn recycle(&self, booking_id: Uuid) -> Result<(Booking, i32), AppError> {
        let mut tx = self.pool.begin().await?;

        let booking = self
            .booking_repo
            .find_by_id_for_update(&mut *tx, booking_id)
            .await?;
        if booking.status != BookingStatus::Cancelled {
            return Err(AppError::NotCancelled);
        }
        if booking.is_recycled {
            return Err(AppError::AlreadyRecycled);
        }
        // Só cancelamento de horário confirmado libera lugar reciclável.
        // Reserva que consumiu um lugar reciclado já o devolveu no
        // cancelamento; reciclar de novo contaria o lugar em dobro.
        if !booking.was_confirmed || booking.paid_with_points || booking.used_recycled_seat {
            return Err(AppError::NotEligibleForRecycling);
        }

        let recycled = self.booking_repo.set_recycled(&mut *tx, booking_id).await?;
        let slot = self
            .slot_repo
            .adjust_recycled_slots(&mut *tx, booking.slot_id, 1)
            .await?;

        tx.commit().await?;

        tracing::info!(
            booking_id = %booking_id,
            slot_id = %booking.slot_id,
            available = slot.available_recycled_slots,
            "Lugar reciclado"
        );

        Ok((recycled, slot.available_recycled_slots))
    }
}

/// Pontos concedidos no cancelamento: percentual do valor congelado na
/// criação, só quando o horário estava confirmado (tinha quadra) e a
/// reserva foi paga com créditos. Proposta cancelada não rende ponto.
fn reward_points(
    amount_blocked: Cents,
    percent: i64,
    was_confirmed: bool,
    paid_with_points: bool,
) -> i64 {
    if !was_confirmed || paid_with_points {
        return 0;
    }
    amount_blocked.percent(percent).as_i64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelamento_de_horario_confirmado_rende_pontos() {
        assert_eq!(reward_points(Cents(2000), 100, true, false), 2000);
        assert_eq!(reward_points(Cents(2000), 50, true, false), 1000);
    }

    #[test]
    fn cancelamento_de_proposta_nao_rende_pontos() {
        assert_eq!(reward_points(Cents(2000), 100, false, false), 0);
    }

    #[test]
    fn resgate_com_pontos_cancelado_nao_rende_pontos() {
        assert_eq!(reward_points(Cents(2000), 100, true, true), 0);
    }
}
