pub mod app;
pub mod auth;
pub mod config;
pub mod gate;
pub mod state;
pub mod test_utils;
