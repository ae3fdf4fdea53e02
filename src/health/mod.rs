// ABOUTME: Post-deploy health verification.
// ABOUTME: Probe abstraction plus the bounded-retry verifier built on it.

mod probe;
mod verifier;

pub use probe::{HttpProbe, Probe, ProbeError};
pub use verifier::HealthVerifier;
