use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
//
// Erros de validação de reserva (SlotFull, TimeConflict...) são esperados e
// viram 4xx com mensagem corretiva; erros de infraestrutura viram 500 depois
// de uma única retentativa na camada de serviço.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // --- Reservas ---
    #[error("Horário não encontrado")]
    SlotNotFound,

    #[error("Horário já começou ou terminou")]
    SlotExpired,

    #[error("Horário lotado")]
    SlotFull,

    #[error("Nível ou categoria incompatível com o horário")]
    CategoryMismatch,

    #[error("Já existe uma reserva ativa neste horário")]
    DuplicateBooking,

    #[error("Conflito de agenda: {0}")]
    TimeConflict(String),

    #[error("Créditos insuficientes")]
    InsufficientCredits,

    #[error("Pontos insuficientes")]
    InsufficientPoints,

    #[error("Nenhum lugar reciclado disponível neste horário")]
    NoRecycledSeat,

    #[error("Reserva não encontrada")]
    BookingNotFound,

    #[error("Reserva já cancelada")]
    AlreadyCancelled,

    #[error("Reserva não está cancelada")]
    NotCancelled,

    #[error("Reserva já reciclada")]
    AlreadyRecycled,

    #[error("Reserva não é elegível para reciclagem")]
    NotEligibleForRecycling,

    // --- Quadras ---
    #[error("Horário já confirmado em outra quadra")]
    AlreadyConfirmed,

    #[error("Quadra já ocupada por outro horário confirmado")]
    CourtConflict,

    #[error("Quadra não encontrada")]
    CourtNotFound,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Identidade ausente ou inválida na requisição")]
    MissingIdentity,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado.
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::SlotNotFound => {
                (StatusCode::NOT_FOUND, "Horário não encontrado.".to_string())
            }
            AppError::SlotExpired => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Este horário já começou e não aceita reservas.".to_string(),
            ),
            AppError::SlotFull => (
                StatusCode::CONFLICT,
                "Este horário já está lotado.".to_string(),
            ),
            AppError::CategoryMismatch => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Seu nível ou categoria não corresponde a este horário.".to_string(),
            ),
            AppError::DuplicateBooking => (
                StatusCode::CONFLICT,
                "Você já tem uma reserva ativa neste horário.".to_string(),
            ),
            AppError::TimeConflict(detail) => (
                StatusCode::CONFLICT,
                format!("Conflito de agenda: {detail}"),
            ),
            AppError::InsufficientCredits => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Saldo de créditos insuficiente para esta reserva.".to_string(),
            ),
            AppError::InsufficientPoints => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Saldo de pontos insuficiente para este resgate.".to_string(),
            ),
            AppError::NoRecycledSeat => (
                StatusCode::CONFLICT,
                "Nenhum lugar reciclado disponível neste horário.".to_string(),
            ),
            AppError::BookingNotFound => {
                (StatusCode::NOT_FOUND, "Reserva não encontrada.".to_string())
            }
            AppError::AlreadyCancelled => (
                StatusCode::CONFLICT,
                "Esta reserva já foi cancelada.".to_string(),
            ),
            AppError::NotCancelled => (
                StatusCode::CONFLICT,
                "Apenas reservas canceladas podem ser recicladas.".to_string(),
            ),
            AppError::AlreadyRecycled => (
                StatusCode::CONFLICT,
                "O lugar desta reserva já foi reciclado.".to_string(),
            ),
            AppError::NotEligibleForRecycling => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Só reservas de horário confirmado pagas com créditos liberam lugar reciclado."
                    .to_string(),
            ),
            AppError::AlreadyConfirmed => (
                StatusCode::CONFLICT,
                "Este horário já está confirmado em outra quadra.".to_string(),
            ),
            AppError::CourtConflict => (
                StatusCode::CONFLICT,
                "A quadra já está ocupada nesse intervalo.".to_string(),
            ),
            AppError::CourtNotFound => {
                (StatusCode::NOT_FOUND, "Quadra não encontrada.".to_string())
            }
            AppError::UserNotFound => {
                (StatusCode::NOT_FOUND, "Usuário não encontrado.".to_string())
            }
            AppError::MissingIdentity => (
                StatusCode::UNAUTHORIZED,
                "Cabeçalho de identidade ausente ou inválido.".to_string(),
            ),

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
