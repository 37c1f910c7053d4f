pub mod types;
pub mod base32;
pub mod hmac;
pub mod clock;
pub mod totp;
pub mod scheduler;

// re-exports - traits
pub use clock::Clock;

// re-exports
pub use types::{AccessCode, CodeError, Timestamp, CODE_LEN, DIGEST_LEN, TIME_STEP};
pub use clock::SystemClock;
pub use totp::{generate, generate_from_base32, secret_fingerprint};
pub use scheduler::{
    refresh_scheduler_opt, run_refresh_scheduler,
    Countdown, RefreshSchedulerConfig, SchedulerEvent, SchedulerOpIn, TickObservation,
};
