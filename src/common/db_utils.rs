use crate::common::error::AppError;

// ---
// Helper de retentativa: conflitos de serialização
// ---
// O check-then-insert da reserva roda com as linhas de slot e usuário
// travadas (FOR UPDATE) dentro de uma transação. Sob carga concorrente o
// Postgres pode abortar com falha de serialização ou deadlock; a unidade
// atômica inteira é repetida uma única vez e, se falhar de novo, vira 5xx.

/// SQLSTATE de falha de serialização (40001) e deadlock detectado (40P01).
pub(crate) fn is_serialization_failure(err: &AppError) -> bool {
    if let AppError::DatabaseError(sqlx::Error::Database(db_err)) = err {
        matches!(db_err.code().as_deref(), Some("40001") | Some("40P01"))
    } else {
        false
    }
}

/// Executa `op` e repete exatamente uma vez se a primeira tentativa abortar
/// por conflito de serialização. `op` deve ser uma unidade atômica completa
/// (abre e fecha a própria transação), então repetir nunca duplica escrita.
pub(crate) async fn retry_once_on_conflict<F, Fut, T>(op: F) -> Result<T, AppError>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, AppError>>,
{
    match op().await {
        Err(e) if is_serialization_failure(&e) => {
            tracing::warn!("Conflito de serialização, repetindo a transação uma vez");
            op().await
        }
        other => other,
    }
}
