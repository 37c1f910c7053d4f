use dropkey_sms::provider::{ProviderConfig, SmsProvider};

pub struct EnvironmentVar {
    pub base32_secret_key: String,
    pub sms_provider: SmsProvider,
    pub provider_config: ProviderConfig,
}

impl EnvironmentVar {
    pub fn load() -> Self {
        let base32_secret_key = dotenv::var("BASE32_SECRET_KEY")
            .expect("BASE32_SECRET_KEY in env");

        let sms_provider = match dotenv::var("SMS_PROVIDER") {
            Ok(name) => SmsProvider::from_name(&name)
                .expect("SMS_PROVIDER is one of mock|textbelt|twilio|semaphore"),
            Err(_) => SmsProvider::Mock,
        };

        let provider_config = ProviderConfig {
            semaphore_api_key: dotenv::var("SEMAPHORE_API_KEY").ok(),
            textbelt_api_key: dotenv::var("TEXTBELT_API_KEY").ok(),
            twilio_account_sid: dotenv::var("TWILIO_ACCOUNT_SID").ok(),
            twilio_auth_token: dotenv::var("TWILIO_AUTH_TOKEN").ok(),
            twilio_from_number: dotenv::var("TWILIO_FROM_NUMBER").ok(),
        };

        Self {
            base32_secret_key,
            sms_provider,
            provider_config,
        }
    }
}
