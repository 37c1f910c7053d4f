pub mod code;
pub mod sms;
pub mod telemetry;
