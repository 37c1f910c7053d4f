use tide::Request;
use tide::prelude::*;
use serde::Deserialize;

use dropkey_sms::history::DeliveryRecord;
use dropkey_sms::{format_phone_number, send_sms};
use dropkey_totp::{AccessCode, Clock, SystemClock, Timestamp};

use crate::state::ServerState;

// Route: /sms/send
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SmsSendRequest {
    recipient: String,
}

type SmsSendResponse = String; // serialized SmsReceipt

pub async fn sms_send(mut req: Request<ServerState>) -> tide::Result<SmsSendResponse> {
    let SmsSendRequest { recipient } = req.body_json().await?;
    let mut state = req.state().clone();

    let now = SystemClock
        .now()
        .map_err(|e| tide::Error::from_str(500, format!("SmsSend Error {:?}", e)))?;
    let access_code = dropkey_totp::generate_from_base32(&state.secret, now)
        .map_err(|e| tide::Error::from_str(500, format!("SmsSend Error {:?}", e)))?;

    let message = unlock_message(&access_code, now);
    let receipt = send_sms(&state.provider_config, state.provider, &recipient, &message)
        .await
        .map_err(|e| tide::Error::from_str(500, format!("SmsSend Error {:?}", e)))?;

    state
        .append_history(DeliveryRecord {
            code: access_code.code.clone(),
            recipient: format_phone_number(&recipient),
            message,
            timestamp: now,
            provider: receipt.provider,
            status: receipt.status.clone(),
        })
        .await;

    Ok(serde_json::to_string(&receipt).expect("receipt should serialize to json"))
}

// Route: /sms/history
type SmsHistoryResponse = String; // serialized Vec<DeliveryRecord>

pub async fn sms_history(req: Request<ServerState>) -> tide::Result<SmsHistoryResponse> {
    let mut state = req.state().clone();
    let records = state.recent_history().await;

    Ok(serde_json::to_string(&records).expect("records should serialize to json"))
}

fn unlock_message(access_code: &AccessCode, now: Timestamp) -> String {
    format!(
        "SmartDrop: your parcel box unlock code is {}. It expires in {} seconds.",
        access_code.code,
        access_code.seconds_remaining(now),
    )
}
