pub mod account_repo;
pub use account_repo::AccountRepository;
pub mod booking_repo;
pub use booking_repo::BookingRepository;
pub mod slot_repo;
pub use slot_repo::SlotRepository;
