use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Serialize, Deserialize};

use crate::phone;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmsProvider {
    /// Logs instead of sending. Always available.
    Mock,
    /// textbelt.com; the shared `textbelt` key allows one free message a day.
    Textbelt,
    Twilio,
    Semaphore,
}

impl SmsProvider {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "mock" => Some(Self::Mock),
            "textbelt" => Some(Self::Textbelt),
            "twilio" => Some(Self::Twilio),
            "semaphore" => Some(Self::Semaphore),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::Textbelt => "textbelt",
            Self::Twilio => "twilio",
            Self::Semaphore => "semaphore",
        }
    }
}

/// Gateway credentials, loaded from the environment by the service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub semaphore_api_key: Option<String>,
    pub textbelt_api_key: Option<String>,
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_from_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsReceipt {
    pub message_id: String,
    pub status: String,
    pub provider: SmsProvider,
    pub quota_remaining: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum SmsError {
    #[error("recipient is not a valid PH mobile number")]
    BadPhoneNumber,
    #[error("missing credential: {0}")]
    MissingCredential(String),
    #[error("transport error: {0}")]
    Http(String),
    #[error("provider rejected the message: {0}")]
    Rejected(String),
}

/// Dispatch one message through the selected gateway. The recipient is
/// normalized and validated first; transport outcome never feeds back
/// into code generation.
pub async fn send_sms(
    config: &ProviderConfig,
    provider: SmsProvider,
    phone_number: &str,
    message: &str,
) -> Result<SmsReceipt, SmsError> {
    let recipient = phone::format_phone_number(phone_number);
    if !phone::validate_phone_number(&recipient) {
        return Err(SmsError::BadPhoneNumber);
    }

    log::info!("sending sms via {} to {}", provider.name(), recipient);

    match provider {
        SmsProvider::Mock => send_mock(&recipient, message).await,
        SmsProvider::Textbelt => send_textbelt(config, &recipient, message).await,
        SmsProvider::Twilio => send_twilio(config, &recipient, message).await,
        SmsProvider::Semaphore => send_semaphore(config, &recipient, message).await,
    }
}

/// Configuration check without burning real quota where the gateway
/// offers a side channel for it.
pub async fn probe(config: &ProviderConfig, provider: SmsProvider) -> Result<String, SmsError> {
    match provider {
        SmsProvider::Mock => Ok("mock provider is always available".to_string()),

        SmsProvider::Textbelt => {
            let key = config.textbelt_api_key.as_deref().unwrap_or("textbelt");
            let res = reqwest::get(format!("https://textbelt.com/quota/{key}"))
                .await
                .map_err(|e| SmsError::Http(e.to_string()))?;
            let body: serde_json::Value =
                res.json().await.map_err(|e| SmsError::Http(e.to_string()))?;

            match body.get("quotaRemaining").and_then(|v| v.as_u64()) {
                Some(quota) => Ok(format!("valid key, quota remaining: {quota}")),
                None => Err(SmsError::Rejected("invalid textbelt key".to_string())),
            }
        },

        SmsProvider::Twilio => {
            let sid = require(&config.twilio_account_sid, "TWILIO_ACCOUNT_SID")?;
            let token = require(&config.twilio_auth_token, "TWILIO_AUTH_TOKEN")?;
            let url = format!("https://api.twilio.com/2010-04-01/Accounts/{sid}.json");
            let res = reqwest::Client::new()
                .get(url)
                .basic_auth(sid, Some(token))
                .send()
                .await
                .map_err(|e| SmsError::Http(e.to_string()))?;

            if res.status().is_success() {
                Ok("valid twilio credentials".to_string())
            } else {
                Err(SmsError::Rejected("invalid twilio credentials".to_string()))
            }
        },

        SmsProvider::Semaphore => {
            let api_key = require(&config.semaphore_api_key, "SEMAPHORE_API_KEY")?;
            let res = reqwest::Client::new()
                .get("https://api.semaphore.co/api/v4/account")
                .bearer_auth(api_key)
                .send()
                .await
                .map_err(|e| SmsError::Http(e.to_string()))?;

            if res.status().is_success() {
                Ok("valid semaphore api key".to_string())
            } else {
                Err(SmsError::Rejected("invalid semaphore api key".to_string()))
            }
        },
    }
}

fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, SmsError> {
    value
        .as_deref()
        .ok_or_else(|| SmsError::MissingCredential(name.to_string()))
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

async fn send_mock(recipient: &str, message: &str) -> Result<SmsReceipt, SmsError> {
    log::info!("=== MOCK SMS === to: {recipient} message: {message}");

    // simulated gateway latency
    async_std::task::sleep(Duration::from_millis(150)).await;

    Ok(SmsReceipt {
        message_id: format!("MOCK_{}", unix_millis()),
        status: "sent".to_string(),
        provider: SmsProvider::Mock,
        quota_remaining: None,
    })
}

#[derive(Debug, Serialize)]
struct TextbeltRequest<'a> {
    phone: &'a str,
    message: &'a str,
    key: &'a str,
}

#[derive(Debug, Deserialize)]
struct TextbeltResponse {
    success: bool,
    #[serde(rename = "textId")]
    text_id: Option<String>,
    #[serde(rename = "quotaRemaining")]
    quota_remaining: Option<u64>,
    error: Option<String>,
}

async fn send_textbelt(
    config: &ProviderConfig,
    recipient: &str,
    message: &str,
) -> Result<SmsReceipt, SmsError> {
    let key = config.textbelt_api_key.as_deref().unwrap_or("textbelt");

    let res = reqwest::Client::new()
        .post("https://textbelt.com/text")
        .json(&TextbeltRequest { phone: recipient, message, key })
        .send()
        .await
        .map_err(|e| SmsError::Http(e.to_string()))?;
    let body: TextbeltResponse = res.json().await.map_err(|e| SmsError::Http(e.to_string()))?;

    if body.success {
        Ok(SmsReceipt {
            message_id: body
                .text_id
                .unwrap_or_else(|| format!("textbelt_{}", unix_millis())),
            status: "sent".to_string(),
            provider: SmsProvider::Textbelt,
            quota_remaining: body.quota_remaining,
        })
    } else {
        Err(SmsError::Rejected(
            body.error.unwrap_or_else(|| "textbelt send failed".to_string()),
        ))
    }
}

async fn send_twilio(
    config: &ProviderConfig,
    recipient: &str,
    message: &str,
) -> Result<SmsReceipt, SmsError> {
    let sid = require(&config.twilio_account_sid, "TWILIO_ACCOUNT_SID")?;
    let token = require(&config.twilio_auth_token, "TWILIO_AUTH_TOKEN")?;
    let from = require(&config.twilio_from_number, "TWILIO_FROM_NUMBER")?;

    let url = format!("https://api.twilio.com/2010-04-01/Accounts/{sid}/Messages.json");
    let params = [("From", from), ("To", recipient), ("Body", message)];

    let res = reqwest::Client::new()
        .post(url)
        .basic_auth(sid, Some(token))
        .form(&params)
        .send()
        .await
        .map_err(|e| SmsError::Http(e.to_string()))?;

    let ok = res.status().is_success();
    let body: serde_json::Value = res.json().await.map_err(|e| SmsError::Http(e.to_string()))?;

    if ok {
        Ok(SmsReceipt {
            message_id: body
                .get("sid")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            status: body
                .get("status")
                .and_then(|v| v.as_str())
                .unwrap_or("sent")
                .to_string(),
            provider: SmsProvider::Twilio,
            quota_remaining: None,
        })
    } else {
        Err(SmsError::Rejected(
            body.get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("twilio send failed")
                .to_string(),
        ))
    }
}

async fn send_semaphore(
    config: &ProviderConfig,
    recipient: &str,
    message: &str,
) -> Result<SmsReceipt, SmsError> {
    let api_key = require(&config.semaphore_api_key, "SEMAPHORE_API_KEY")?;

    let params = [("apikey", api_key), ("number", recipient), ("message", message)];

    let res = reqwest::Client::new()
        .post("https://api.semaphore.co/api/v4/messages")
        .form(&params)
        .send()
        .await
        .map_err(|e| SmsError::Http(e.to_string()))?;

    let ok = res.status().is_success();
    let body: serde_json::Value = res.json().await.map_err(|e| SmsError::Http(e.to_string()))?;

    // the messages endpoint answers with a list of accepted messages
    let first = match &body {
        serde_json::Value::Array(items) => items.first().cloned().unwrap_or_default(),
        other => other.clone(),
    };

    let message_id = first
        .get("message_id")
        .map(|v| v.to_string().trim_matches('"').to_string());

    if ok && message_id.is_some() {
        Ok(SmsReceipt {
            message_id: message_id.unwrap_or_else(|| format!("semaphore_{}", unix_millis())),
            status: first
                .get("status")
                .and_then(|v| v.as_str())
                .unwrap_or("sent")
                .to_string(),
            provider: SmsProvider::Semaphore,
            quota_remaining: None,
        })
    } else {
        Err(SmsError::Rejected(
            first
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("semaphore send failed")
                .to_string(),
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn provider_names_round_trip() {
        for provider in [
            SmsProvider::Mock,
            SmsProvider::Textbelt,
            SmsProvider::Twilio,
            SmsProvider::Semaphore,
        ] {
            assert_eq!(SmsProvider::from_name(provider.name()), Some(provider));
        }
        assert_eq!(SmsProvider::from_name("carrier-pigeon"), None);
    }

    #[async_std::test]
    async fn mock_send_succeeds_and_yields_a_receipt() {
        let receipt = send_sms(
            &ProviderConfig::default(),
            SmsProvider::Mock,
            "09171234567",
            "SmartDrop: your parcel box unlock code is 287082.",
        )
        .await
        .unwrap();

        assert_eq!(receipt.provider, SmsProvider::Mock);
        assert_eq!(receipt.status, "sent");
        assert!(receipt.message_id.starts_with("MOCK_"));
    }

    #[async_std::test]
    async fn bad_recipient_is_rejected_before_any_transport() {
        let err = send_sms(
            &ProviderConfig::default(),
            SmsProvider::Mock,
            "12345",
            "code",
        )
        .await
        .unwrap_err();

        assert_eq!(err, SmsError::BadPhoneNumber);
    }

    #[async_std::test]
    async fn missing_credentials_fail_fast() {
        let err = send_sms(
            &ProviderConfig::default(),
            SmsProvider::Twilio,
            "09171234567",
            "code",
        )
        .await
        .unwrap_err();

        assert_eq!(
            err,
            SmsError::MissingCredential("TWILIO_ACCOUNT_SID".to_string())
        );
    }
}
