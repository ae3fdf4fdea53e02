// ABOUTME: Deployment history: immutable records and their persistence.
// ABOUTME: The ordered history drives status queries and rollback decisions.

mod error;
mod file;
mod record;
mod store;

pub use error::HistoryError;
pub use file::{DEFAULT_HISTORY_DIR, FileHistoryStore};
pub use record::{DeployStatus, DeploymentRecord, TIMESTAMP_FORMAT};
pub use store::HistoryStore;
