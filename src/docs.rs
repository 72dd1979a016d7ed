// src/docs.rs

use crate::handlers;
use crate::models;
use crate::services;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Slots ---
        handlers::slots::list_slots,
        handlers::slots::create_slot,
        handlers::slots::assign_court,
        handlers::slots::release_slot,
        handlers::slots::cleanup_slots,

        // --- Bookings ---
        handlers::bookings::create_booking,
        handlers::bookings::cancel_booking,
        handlers::bookings::recycle_booking,

        // --- Accounts ---
        handlers::accounts::get_my_balance,
        handlers::accounts::get_my_transactions,

        // --- Admin ---
        handlers::admin::run_reconciliation,
    ),
    components(
        schemas(
            // --- Catálogo ---
            models::club::Club,
            models::club::Court,
            models::club::Instructor,

            // --- Slots ---
            models::slot::GenderCategory,
            models::slot::Slot,
            models::slot::SlotWithOccupancy,
            handlers::slots::CreateSlotPayload,
            handlers::slots::AssignCourtPayload,
            handlers::slots::CleanupResponse,

            // --- Bookings ---
            models::booking::BookingStatus,
            models::booking::Booking,
            handlers::bookings::CreateBookingPayload,
            handlers::bookings::BookingResponse,
            handlers::bookings::CancelResponse,
            handlers::bookings::RecycleResponse,

            // --- Accounts ---
            models::account::Gender,
            models::account::User,
            models::account::BalanceView,
            models::account::TransactionKind,
            models::account::TransactionAction,
            models::account::Transaction,

            // --- Admin ---
            handlers::admin::ReconciliationPayload,
            services::reconciliation_service::Correction,
            services::reconciliation_service::ReconciliationReport,
        )
    ),
    tags(
        (name = "Slots", description = "Horários: listagem, geração e quadras"),
        (name = "Bookings", description = "Reservas: criação, cancelamento e reciclagem"),
        (name = "Accounts", description = "Conta de créditos e extrato"),
        (name = "Admin", description = "Rotinas de operador (reconciliação)")
    )
)]
pub struct ApiDoc;
