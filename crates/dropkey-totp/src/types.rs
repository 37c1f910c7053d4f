use serde::{Serialize, Deserialize};

/// Seconds since the Unix epoch.
pub type Timestamp = u64;

/// Width of the moving time window, in seconds. Fixed for this deployment.
pub const TIME_STEP: Timestamp = 30;

/// Digits in an access code. Fixed for this deployment.
pub const CODE_LEN: usize = 6;

/// SHA-1 output size.
pub const DIGEST_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodeError {
    /// The configured secret decodes to no usable key material.
    InvalidSecretFormat,
    /// No wall clock could be read. Fatal to code generation.
    ClockUnavailable,
}

/// A generated access code and the wall-clock second at which it stops
/// being valid. Reproducible from (secret, time); never the source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCode {
    pub code: String,
    pub expires_at: Timestamp,
}

impl AccessCode {
    pub fn seconds_remaining(&self, now: Timestamp) -> Timestamp {
        self.expires_at.saturating_sub(now)
    }
}
