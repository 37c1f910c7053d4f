use tide::Request;
use tide::prelude::*;
use serde::Deserialize;

use dropkey_totp::{Clock, SystemClock};

use crate::state::ServerState;

// Route: /code/generate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CodeGenerateRequest {
    /// Explicit Unix timestamp; wall clock when absent.
    at: Option<u64>,
}

type CodeGenerateResponse = String; // serialized AccessCode

pub async fn code_generate(mut req: Request<ServerState>) -> tide::Result<CodeGenerateResponse> {
    let CodeGenerateRequest { at } = req.body_json().await.unwrap_or_default();
    let state = req.state().clone();

    let at = match at {
        Some(t) => t,
        None => SystemClock
            .now()
            .map_err(|e| tide::Error::from_str(500, format!("CodeGenerate Error {:?}", e)))?,
    };

    let access_code = dropkey_totp::generate_from_base32(&state.secret, at)
        .map_err(|e| tide::Error::from_str(500, format!("CodeGenerate Error {:?}", e)))?;

    Ok(serde_json::to_string(&access_code).expect("access code should serialize to json"))
}
