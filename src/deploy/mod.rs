// ABOUTME: Deployment orchestration: the staged dispatcher and history-driven rollback.
// ABOUTME: Exports request/outcome types and the error taxonomy for both.

mod dispatcher;
mod error;
mod rollback;

pub use dispatcher::{DeployOutcome, DeployRequest, Dispatcher};
pub use error::{DeployError, DeployErrorKind, RollbackError, Stage};
pub use rollback::{ROLLBACK_LOOKBACK, RollbackCoordinator, RollbackOutcome};
