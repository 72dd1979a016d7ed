// src/config.rs

use crate::{
    db::{AccountRepository, BookingRepository, SlotRepository},
    services::{BookingService, ReconciliationService, SlotService},
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

/// Folga padrão entre reservas do mesmo usuário, em minutos.
const DEFAULT_BUFFER_MINUTES: i64 = 30;

/// Percentual padrão do valor da reserva convertido em pontos quando um
/// horário confirmado é cancelado.
const DEFAULT_REWARD_POINTS_PERCENT: i64 = 100;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub account_repo: AccountRepository,
    pub slot_service: SlotService,
    pub booking_service: BookingService,
    pub reconciliation_service: ReconciliationService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");

        let buffer_minutes = env_i64("BOOKING_BUFFER_MINUTES", DEFAULT_BUFFER_MINUTES);
        let reward_points_percent =
            env_i64("REWARD_POINTS_PERCENT", DEFAULT_REWARD_POINTS_PERCENT);

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let slot_repo = SlotRepository::new(db_pool.clone());
        let booking_repo = BookingRepository::new(db_pool.clone());
        let account_repo = AccountRepository::new(db_pool.clone());

        let slot_service = SlotService::new(
            slot_repo.clone(),
            booking_repo.clone(),
            db_pool.clone(),
        );
        let booking_service = BookingService::new(
            slot_repo.clone(),
            booking_repo.clone(),
            account_repo.clone(),
            db_pool.clone(),
            buffer_minutes,
            reward_points_percent,
        );
        let reconciliation_service = ReconciliationService::new(
            slot_repo,
            booking_repo,
            account_repo.clone(),
            db_pool.clone(),
        );

        Ok(Self {
            db_pool,
            account_repo,
            slot_service,
            booking_service,
            reconciliation_service,
        })
    }
}

fn env_i64(name: &str, default: i64) -> i64 {
    env::var(name)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}
