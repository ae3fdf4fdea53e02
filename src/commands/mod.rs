// ABOUTME: Command module aggregator for the deployctl CLI.
// ABOUTME: Re-exports deploy, rollback, and query command handlers.

mod deploy;
mod query;
mod rollback;

pub use deploy::deploy;
pub use query::{envs, history, status};
pub use rollback::rollback;
