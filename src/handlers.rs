pub mod accounts;
pub mod admin;
pub mod bookings;
pub mod slots;
