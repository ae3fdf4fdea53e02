// ABOUTME: Library root for deployctl - deployment dispatch, verification and history.
// ABOUTME: The main binary is in main.rs.

pub mod backend;
pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod health;
pub mod history;
pub mod hooks;
pub mod output;
pub mod settings;
pub mod types;
