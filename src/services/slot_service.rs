// src/services/slot_service.rs

use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    common::money::Cents,
    db::{slot_repo::SlotFilters, BookingRepository, SlotRepository},
    models::slot::{GenderCategory, Slot, SlotWithOccupancy},
};

/// O armazém de horários: consultas por clube/dia e as transições
/// proposta <-> confirmado (atribuição e liberação de quadra).
#[derive(Clone)]
pub struct SlotService {
    slot_repo: SlotRepository,
    booking_repo: BookingRepository,
    pool: PgPool,
}

impl SlotService {
    pub fn new(slot_repo: SlotRepository, booking_repo: BookingRepository, pool: PgPool) -> Self {
        Self {
            slot_repo,
            booking_repo,
            pool,
        }
    }

    /// Horários do clube no dia, anotados com ocupação e lugares
    /// reciclados. Sem efeitos colaterais.
    pub async fn list_for_day(
        &self,
        club_id: Uuid,
        date: NaiveDate,
        filters: &SlotFilters,
    ) -> Result<Vec<SlotWithOccupancy>, AppError> {
        let from: DateTime<Utc> = date.and_time(chrono::NaiveTime::MIN).and_utc();
        let to = from + Duration::days(1);

        self.slot_repo
            .find_open_slots(&self.pool, club_id, from, to, filters)
            .await
    }

    /// Proposta -> confirmado: atribui a quadra e promove as reservas
    /// PENDING do horário a CONFIRMED, tudo na mesma transação.
    pub async fn assign_court(&self, slot_id: Uuid, court_id: Uuid) -> Result<Slot, AppError> {
        let mut tx = self.pool.begin().await?;

        let slot = self.slot_repo.find_by_id_for_update(&mut *tx, slot_id).await?;

        match slot.court_id {
            // Já confirmado nesta mesma quadra: idempotente.
            Some(current) if current == court_id => {
                tx.commit().await?;
                return Ok(slot);
            }
            Some(_) => return Err(AppError::AlreadyConfirmed),
            None => {}
        }

        let court = self.slot_repo.find_court(&mut *tx, court_id).await?;
        if court.club_id != slot.club_id {
            return Err(AppError::CourtNotFound);
        }

        // A quadra não pode hospedar outro horário confirmado sobreposto.
        if self
            .slot_repo
            .court_has_overlap(&mut *tx, court_id, slot_id, slot.start_at, slot.end_at)
            .await?
        {
            return Err(AppError::CourtConflict);
        }

        let confirmed = self
            .slot_repo
            .set_court(&mut *tx, slot_id, court_id, court.number)
            .await?;
        let promoted = self
            .booking_repo
            .confirm_pending_on_slot(&mut *tx, slot_id)
            .await?;

        tx.commit().await?;

        tracing::info!(
            slot_id = %slot_id,
            court = court.number,
            promoted,
            "Horário confirmado em quadra"
        );

        Ok(confirmed)
    }

    /// Confirmado -> proposta: limpa a quadra quando não restam reservas
    /// ativas e o horário ainda não passou. No-op se restarem reservas.
    pub async fn release(&self, slot_id: Uuid) -> Result<Slot, AppError> {
        let mut tx = self.pool.begin().await?;

        let slot = self.slot_repo.find_by_id_for_update(&mut *tx, slot_id).await?;
        if slot.start_at <= Utc::now() {
            return Err(AppError::SlotExpired);
        }
        if !slot.is_confirmed() {
            return Ok(slot);
        }

        let active = self.booking_repo.active_on_slot(&mut *tx, slot_id).await?;
        if !active.is_empty() {
            // Reservas ativas seguram a quadra.
            return Ok(slot);
        }

        let released = self.slot_repo.clear_court(&mut *tx, slot_id).await?;
        tx.commit().await?;

        tracing::info!(slot_id = %slot_id, "Horário liberado de volta a proposta");
        Ok(released)
    }

    /// Ponto de entrada da rotina de geração (colaborador externo).
    #[allow(clippy::too_many_arguments)]
    pub async fn create_slot(
        &self,
        club_id: Uuid,
        instructor_id: Option<Uuid>,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
        level: i16,
        level_min: Option<i16>,
        level_max: Option<i16>,
        gender_category: GenderCategory,
        max_players: i32,
        total_price: Cents,
        recycled_only_points: bool,
    ) -> Result<Slot, AppError> {
        self.slot_repo
            .create(
                &self.pool,
                club_id,
                instructor_id,
                start_at,
                end_at,
                level,
                level_min,
                level_max,
                gender_category,
                max_players,
                total_price,
                recycled_only_points,
            )
            .await
    }

    /// Rotina de limpeza: apaga horários já passados sem nenhuma reserva.
    pub async fn cleanup_expired(&self) -> Result<u64, AppError> {
        let removed = self
            .slot_repo
            .delete_expired_without_bookings(&self.pool, Utc::now())
            .await?;
        if removed > 0 {
            tracing::info!(removed, "Horários expirados removidos");
        }
        Ok(removed)
    }
}
