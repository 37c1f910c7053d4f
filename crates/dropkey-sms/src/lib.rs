pub mod phone;
pub mod provider;
pub mod history;

// re-exports
pub use phone::{format_phone_number, validate_phone_number};
pub use provider::{probe, send_sms, ProviderConfig, SmsError, SmsProvider, SmsReceipt};
pub use history::{
    default_history_opt, run_history_server,
    DeliveryRecord, HistoryOpIn, HistoryOpOut, HISTORY_CAP,
};
