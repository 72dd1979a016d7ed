// src/models/slot.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::money::Cents;
use crate::models::account::Gender;

// --- Enums (armazenados como TEXT no Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenderCategory {
    Masculino,
    Femenino,
    Mixto,
    Open,
}

impl GenderCategory {
    /// A categoria do horário aceita um jogador deste gênero?
    /// MIXTO e OPEN aceitam todos; as demais exigem correspondência exata.
    pub fn admits(self, gender: Gender) -> bool {
        match self {
            GenderCategory::Open | GenderCategory::Mixto => true,
            GenderCategory::Masculino => gender == Gender::Masculino,
            GenderCategory::Femenino => gender == Gender::Femenino,
        }
    }

    /// Normaliza grafias legadas vindas de importações antigas.
    /// Retorna `None` quando o valor já é canônico ou é irreconhecível.
    pub fn normalize_legacy(raw: &str) -> Option<GenderCategory> {
        match raw.trim().to_uppercase().as_str() {
            "MIX" | "MIXTA" | "MIXED" | "MISTO" => Some(GenderCategory::Mixto),
            "MASC" | "HOMBRES" | "MALE" => Some(GenderCategory::Masculino),
            "FEM" | "FEMENINA" | "MUJERES" | "FEMALE" => Some(GenderCategory::Femenino),
            "ABIERTO" | "LIBRE" => Some(GenderCategory::Open),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GenderCategory::Masculino => "MASCULINO",
            GenderCategory::Femenino => "FEMENINO",
            GenderCategory::Mixto => "MIXTO",
            GenderCategory::Open => "OPEN",
        }
    }
}

// --- Structs ---

/// Uma janela reservável: aula (com professor) ou partida aberta.
/// `court_id == NULL` significa proposta; preenchido, horário confirmado.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: Uuid,
    pub club_id: Uuid,

    /// NULL = partida aberta, sem professor.
    pub instructor_id: Option<Uuid>,

    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,

    /// Nível em décimos (35 = 3.5).
    #[schema(example = 35)]
    pub level: i16,
    pub level_min: Option<i16>,
    pub level_max: Option<i16>,

    pub gender_category: GenderCategory,

    #[schema(example = 4)]
    pub max_players: i32,

    /// Preço total do horário, em cêntimos. Cada reserva bloqueia a sua
    /// fração proporcional (ver `price_for`).
    pub total_price: Cents,

    pub court_id: Option<Uuid>,
    /// Denormalizado de court_id para a listagem.
    pub court_number: Option<i32>,

    /// Lugares reciclados só podem ser resgatados com pontos?
    /// Política por horário, configurável (regra de negócio ainda aberta).
    pub recycled_only_points: bool,
    pub available_recycled_slots: i32,

    pub created_at: Option<DateTime<Utc>>,
}

impl Slot {
    pub fn is_confirmed(&self) -> bool {
        self.court_id.is_some()
    }

    /// Preço de uma reserva: fração do preço total proporcional aos lugares
    /// pedidos, truncada em cêntimos. O valor é congelado em
    /// `amount_blocked` na criação; mudanças posteriores de preço não
    /// afetam reservas existentes.
    pub fn price_for(&self, group_size: i32) -> Cents {
        Cents(self.total_price.as_i64() * i64::from(group_size) / i64::from(self.max_players))
    }

    /// Faixa de nível efetiva: quando min/max não foram definidos, o nível
    /// do próprio horário não restringe (faixa aberta daquele lado).
    pub fn level_admits(&self, user_level: i16) -> bool {
        if let Some(min) = self.level_min {
            if user_level < min {
                return false;
            }
        }
        if let Some(max) = self.level_max {
            if user_level > max {
                return false;
            }
        }
        true
    }
}

/// Slot anotado para a listagem: contagem de jogadores ativos e
/// disponibilidade de lugares reciclados, visão do usuário.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlotWithOccupancy {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub slot: Slot,

    /// Soma de group_size das reservas ativas (PENDING/CONFIRMED).
    pub active_players: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categoria_mixto_e_open_aceitam_todos() {
        for g in [Gender::Masculino, Gender::Femenino] {
            assert!(GenderCategory::Mixto.admits(g));
            assert!(GenderCategory::Open.admits(g));
        }
    }

    #[test]
    fn categoria_exclusiva_exige_correspondencia() {
        assert!(GenderCategory::Masculino.admits(Gender::Masculino));
        assert!(!GenderCategory::Masculino.admits(Gender::Femenino));
        assert!(GenderCategory::Femenino.admits(Gender::Femenino));
        assert!(!GenderCategory::Femenino.admits(Gender::Masculino));
    }

    #[test]
    fn normaliza_grafias_legadas() {
        assert_eq!(
            GenderCategory::normalize_legacy("mixta"),
            Some(GenderCategory::Mixto)
        );
        assert_eq!(
            GenderCategory::normalize_legacy(" MIX "),
            Some(GenderCategory::Mixto)
        );
        assert_eq!(
            GenderCategory::normalize_legacy("hombres"),
            Some(GenderCategory::Masculino)
        );
        // Valores canônicos não são tocados.
        assert_eq!(GenderCategory::normalize_legacy("MIXTO"), None);
        assert_eq!(GenderCategory::normalize_legacy("lixo"), None);
    }
}
