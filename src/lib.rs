pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod observability;
pub mod reports;
pub mod state;
