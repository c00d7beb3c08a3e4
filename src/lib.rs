pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod favorites;
pub mod quotes;
pub mod state;
pub mod users;
