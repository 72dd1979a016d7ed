// src/db/account_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    common::money::Cents,
    models::account::{Transaction, TransactionAction, TransactionKind, User},
};

#[derive(Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_user_by_id<'e, E>(&self, executor: E, user_id: Uuid) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    /// Trava a linha do usuário antes da checagem de fundos: a checagem e a
    /// mutação do saldo bloqueado acontecem sob o mesmo lock.
    pub async fn find_user_by_id_for_update<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    /// Incrementa/decrementa `blocked_credits` num único read-modify-write.
    /// O CHECK >= 0 do banco é a última linha de defesa contra negativo.
    pub async fn adjust_blocked_credits<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        delta: Cents,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET blocked_credits = blocked_credits + $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(delta)
        .fetch_one(executor)
        .await?;

        Ok(user)
    }

    pub async fn adjust_blocked_points<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        delta: i64,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET blocked_points = blocked_points + $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(delta)
        .fetch_one(executor)
        .await?;

        Ok(user)
    }

    /// Credita pontos de recompensa (cancelamento de horário confirmado).
    pub async fn add_points<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        amount: i64,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET points = points + $2 WHERE id = $1 RETURNING *",
        )
        .bind(user_id)
        .bind(amount)
        .fetch_one(executor)
        .await?;

        Ok(user)
    }

    /// Escrita corretiva da reconciliação: substitui os saldos bloqueados
    /// pelos valores recomputados.
    pub async fn set_blocked_balances<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        blocked_credits: Cents,
        blocked_points: i64,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET blocked_credits = $2, blocked_points = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(blocked_credits)
        .bind(blocked_points)
        .fetch_one(executor)
        .await?;

        Ok(user)
    }

    // ---
    // Livro-razão (append-only)
    // ---

    #[allow(clippy::too_many_arguments)]
    pub async fn record_transaction<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        kind: TransactionKind,
        action: TransactionAction,
        amount: i64,
        balance_after: i64,
        concept: &str,
        related_id: Option<Uuid>,
    ) -> Result<Transaction, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (user_id, kind, action, amount,
                                      balance_after, concept, related_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(kind)
        .bind(action)
        .bind(amount)
        .bind(balance_after)
        .bind(concept)
        .bind(related_id)
        .fetch_one(executor)
        .await?;

        Ok(entry)
    }

    pub async fn list_transactions<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
    ) -> Result<Vec<Transaction>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entries = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;

        Ok(entries)
    }
}
