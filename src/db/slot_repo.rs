// src/db/slot_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    common::money::Cents,
    models::club::Court,
    models::slot::{GenderCategory, Slot, SlotWithOccupancy},
};

/// Filtros opcionais da listagem de horários.
#[derive(Debug, Default, Clone)]
pub struct SlotFilters {
    pub instructor_id: Option<Uuid>,
    pub gender_category: Option<GenderCategory>,
    /// Nível do usuário em décimos; filtra horários cuja faixa o admite.
    pub level: Option<i16>,
    /// Somente propostas (sem quadra atribuída).
    pub only_proposals: bool,
}

#[derive(Clone)]
pub struct SlotRepository {
    pool: PgPool,
}

impl SlotRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Funções de "Leitura" (Getters)
    // ---

    pub async fn find_by_id<'e, E>(&self, executor: E, slot_id: Uuid) -> Result<Slot, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Slot>("SELECT * FROM slots WHERE id = $1")
            .bind(slot_id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::SlotNotFound)
    }

    /// Trava a linha do slot (`FOR UPDATE`) para o check-then-insert da
    /// reserva: dois pedidos concorrentes não passam juntos pela checagem
    /// de capacidade.
    pub async fn find_by_id_for_update<'e, E>(
        &self,
        executor: E,
        slot_id: Uuid,
    ) -> Result<Slot, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Slot>("SELECT * FROM slots WHERE id = $1 FOR UPDATE")
            .bind(slot_id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::SlotNotFound)
    }

    pub async fn find_court<'e, E>(&self, executor: E, court_id: Uuid) -> Result<Court, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Court>("SELECT * FROM courts WHERE id = $1")
            .bind(court_id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::CourtNotFound)
    }

    /// Horários do clube no intervalo, anotados com a ocupação ativa.
    /// Filtros opcionais via padrão `$n IS NULL OR ...` (uma única query).
    pub async fn find_open_slots<'e, E>(
        &self,
        executor: E,
        club_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        filters: &SlotFilters,
    ) -> Result<Vec<SlotWithOccupancy>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let slots = sqlx::query_as::<_, SlotWithOccupancy>(
            r#"
            SELECT s.*,
                   COALESCE((
                       SELECT SUM(b.group_size)
                       FROM bookings b
                       WHERE b.slot_id = s.id
                         AND b.status IN ('PENDING', 'CONFIRMED')
                   ), 0) AS active_players
            FROM slots s
            WHERE s.club_id = $1
              AND s.start_at >= $2
              AND s.start_at < $3
              AND ($4::uuid IS NULL OR s.instructor_id = $4)
              AND ($5::text IS NULL OR s.gender_category = $5)
              AND ($6::smallint IS NULL
                   OR ((s.level_min IS NULL OR s.level_min <= $6)
                       AND (s.level_max IS NULL OR s.level_max >= $6)))
              AND (NOT $7 OR s.court_id IS NULL)
            ORDER BY s.start_at ASC
            "#,
        )
        .bind(club_id)
        .bind(from)
        .bind(to)
        .bind(filters.instructor_id)
        .bind(filters.gender_category)
        .bind(filters.level)
        .bind(filters.only_proposals)
        .fetch_all(executor)
        .await?;

        Ok(slots)
    }

    // ---
    // Funções de "Escrita" (Transacionais)
    // ---

    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
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
    ) -> Result<Slot, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let slot = sqlx::query_as::<_, Slot>(
            r#"
            INSERT INTO slots (club_id, instructor_id, start_at, end_at,
                               level, level_min, level_max, gender_category,
                               max_players, total_price, recycled_only_points)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(club_id)
        .bind(instructor_id)
        .bind(start_at)
        .bind(end_at)
        .bind(level)
        .bind(level_min)
        .bind(level_max)
        .bind(gender_category)
        .bind(max_players)
        .bind(total_price)
        .bind(recycled_only_points)
        .fetch_one(executor)
        .await?;

        Ok(slot)
    }

    /// A quadra já hospeda outro horário confirmado que se sobrepõe?
    pub async fn court_has_overlap<'e, E>(
        &self,
        executor: E,
        court_id: Uuid,
        slot_id: Uuid,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM slots
                WHERE court_id = $1
                  AND id <> $2
                  AND start_at < $4
                  AND end_at > $3
            )
            "#,
        )
        .bind(court_id)
        .bind(slot_id)
        .bind(start_at)
        .bind(end_at)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    /// Proposta -> confirmado: grava a quadra e o número denormalizado.
    pub async fn set_court<'e, E>(
        &self,
        executor: E,
        slot_id: Uuid,
        court_id: Uuid,
        court_number: i32,
    ) -> Result<Slot, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let slot = sqlx::query_as::<_, Slot>(
            r#"
            UPDATE slots
            SET court_id = $2, court_number = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(slot_id)
        .bind(court_id)
        .bind(court_number)
        .fetch_one(executor)
        .await?;

        Ok(slot)
    }

    /// Confirmado -> proposta: limpa a quadra (usado no release).
    pub async fn clear_court<'e, E>(&self, executor: E, slot_id: Uuid) -> Result<Slot, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let slot = sqlx::query_as::<_, Slot>(
            r#"
            UPDATE slots
            SET court_id = NULL, court_number = NULL
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(slot_id)
        .fetch_one(executor)
        .await?;

        Ok(slot)
    }

    /// Ajusta o contador de lugares reciclados (+1 ao reciclar, -1 ao
    /// consumir). O CHECK >= 0 do banco segura corrida de duplo consumo.
    pub async fn adjust_recycled_slots<'e, E>(
        &self,
        executor: E,
        slot_id: Uuid,
        delta: i32,
    ) -> Result<Slot, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let slot = sqlx::query_as::<_, Slot>(
            r#"
            UPDATE slots
            SET available_recycled_slots = available_recycled_slots + $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(slot_id)
        .bind(delta)
        .fetch_one(executor)
        .await?;

        Ok(slot)
    }

    /// Remove horários já passados sem nenhuma reserva (rotina de limpeza).
    pub async fn delete_expired_without_bookings<'e, E>(
        &self,
        executor: E,
        now: DateTime<Utc>,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            DELETE FROM slots s
            WHERE s.start_at < $1
              AND NOT EXISTS (SELECT 1 FROM bookings b WHERE b.slot_id = s.id)
            "#,
        )
        .bind(now)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    // ---
    // Reconciliação de categorias legadas
    // ---

    /// Slots cuja categoria não pertence à taxonomia atual.
    pub async fn find_drifted_categories<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<(Uuid, String)>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows: Vec<(Uuid, String)> = sqlx::query_as(
            r#"
            SELECT id, gender_category FROM slots
            WHERE gender_category NOT IN ('MASCULINO', 'FEMENINO', 'MIXTO', 'OPEN')
            "#,
        )
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    pub async fn set_gender_category<'e, E>(
        &self,
        executor: E,
        slot_id: Uuid,
        category: GenderCategory,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE slots SET gender_category = $2 WHERE id = $1")
            .bind(slot_id)
            .bind(category)
            .execute(executor)
            .await?;

        Ok(())
    }
}
