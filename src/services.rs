pub mod booking_service;
pub use booking_service::BookingService;
pub mod reconciliation_service;
pub use reconciliation_service::ReconciliationService;
pub mod slot_service;
pub use slot_service::SlotService;
pub mod validation;
