pub mod activities;
pub mod admin;
pub mod analytics;
pub mod auth;
pub mod bookings;
pub mod health;
pub mod reviews;
