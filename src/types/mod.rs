// ABOUTME: Validated domain types shared across the crate.
// ABOUTME: Application and environment names used to key deployment history.

mod name;

pub use name::{AppName, EnvName, NameError};
