//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::identity_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .compact()
        .init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização (esquema sempre versionado).
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de horários (listagem, geração, quadras)
    let slot_routes = Router::new()
        .route(
            "/",
            get(handlers::slots::list_slots).post(handlers::slots::create_slot),
        )
        .route("/cleanup", post(handlers::slots::cleanup_slots))
        .route("/{slot_id}/court", post(handlers::slots::assign_court))
        .route("/{slot_id}/release", post(handlers::slots::release_slot));

    // Rotas de reservas
    let booking_routes = Router::new()
        .route("/", post(handlers::bookings::create_booking))
        .route(
            "/{booking_id}/cancel",
            post(handlers::bookings::cancel_booking),
        )
        .route(
            "/{booking_id}/recycle",
            post(handlers::bookings::recycle_booking),
        );

    // Conta de créditos do usuário autenticado
    let account_routes = Router::new()
        .route("/me", get(handlers::accounts::get_my_balance))
        .route(
            "/me/transactions",
            get(handlers::accounts::get_my_transactions),
        );

    // Rotinas de operador
    let admin_routes = Router::new().route(
        "/reconciliation",
        post(handlers::admin::run_reconciliation),
    );

    // Tudo (menos o health e a documentação) exige identidade explícita.
    let api = Router::new()
        .nest("/api/slots", slot_routes)
        .nest("/api/bookings", booking_routes)
        .nest("/api/accounts", account_routes)
        .nest("/api/admin", admin_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            identity_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .merge(api)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!(
        "🚀 Servidor escutando em {}",
        listener.local_addr().expect("endereço local do listener")
    );
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
