pub mod auth;
pub mod bookings;
pub mod sessions;
pub mod whatsapp;
