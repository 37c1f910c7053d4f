use rand::Rng;
use tide::Request;
use tide::prelude::*;

use crate::state::ServerState;

// Route: /box/status
//
// Telemetry is simulated until the box firmware reports real values; the
// shape matches what the lock hardware is expected to send.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BoxStatus {
    battery_pct: u8,
    locked: bool,
    temperature_c: i8,
}

type BoxStatusResponse = String; // serialized BoxStatus

pub async fn box_status(_req: Request<ServerState>) -> tide::Result<BoxStatusResponse> {
    let mut rng = rand::thread_rng();

    let status = BoxStatus {
        battery_pct: rng.gen_range(35..=100),
        locked: rng.gen_bool(0.8),
        temperature_c: rng.gen_range(18..=42),
    };

    Ok(serde_json::to_string(&status).expect("status should serialize to json"))
}
