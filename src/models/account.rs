// src/models/account.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::money::Cents;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Masculino,
    Femenino,
}

/// Usuário com os campos da conta de créditos.
///
/// Invariante mantida pelas transações do serviço de reservas (e auditada
/// pela reconciliação): `blocked_credits` é sempre a soma de
/// `amount_blocked` das reservas ativas pagas com créditos.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,

    #[schema(ignore)]
    pub club_id: Uuid,

    #[schema(example = "María López")]
    pub name: String,

    #[schema(example = "maria@example.com")]
    pub email: String,

    pub gender: Gender,

    /// Nível em décimos (35 = 3.5).
    #[schema(example = 35)]
    pub level: i16,

    pub credits: Cents,
    pub blocked_credits: Cents,
    pub points: i64,
    pub blocked_points: i64,

    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Saldo disponível para novas reservas. Nunca pode ficar negativo:
    /// qualquer operação que o levaria abaixo de zero falha antes de mutar.
    pub fn available_credits(&self) -> Cents {
        self.credits - self.blocked_credits
    }

    pub fn available_points(&self) -> i64 {
        self.points - self.blocked_points
    }
}

// --- Livro-razão ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Credit,
    Points,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionAction {
    Add,
    Subtract,
}

/// Lançamento imutável do livro-razão: um por movimento de crédito/ponto.
/// Nunca é atualizado nem apagado pelo fluxo normal.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: TransactionKind,
    pub action: TransactionAction,
    pub amount: i64,
    /// Snapshot do saldo (créditos ou pontos) após o lançamento.
    pub balance_after: i64,
    #[schema(example = "Bloqueio por reserva")]
    pub concept: String,
    /// Id da reserva relacionada, quando houver.
    pub related_id: Option<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Visão de saldo devolvida junto às operações de reserva.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceView {
    pub credits: Cents,
    pub blocked_credits: Cents,
    pub available_credits: Cents,
    pub points: i64,
    pub blocked_points: i64,
    pub available_points: i64,
}

impl From<&User> for BalanceView {
    fn from(user: &User) -> Self {
        BalanceView {
            credits: user.credits,
            blocked_credits: user.blocked_credits,
            available_credits: user.available_credits(),
            points: user.points,
            blocked_points: user.blocked_points,
            available_points: user.available_points(),
        }
    }
}
