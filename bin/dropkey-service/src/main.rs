mod env;
mod routes;
mod state;

use futures::{channel::oneshot, SinkExt, StreamExt};
use tide::{utils::After, Response, StatusCode, http::headers::HeaderValue};
use tide::security::{CorsMiddleware, Origin};

use dropkey_sms::history::default_history_opt;
use dropkey_sms::history::run_history_server;
use dropkey_totp::{
    refresh_scheduler_opt, run_refresh_scheduler,
    SchedulerEvent, SchedulerOpIn, SystemClock,
};

use crate::env::EnvironmentVar;
use crate::routes::code::code_generate;
use crate::routes::sms::{sms_history, sms_send};
use crate::routes::telemetry::box_status;
use crate::state::{shutdown_history, ServerState};

#[async_std::main]
async fn main() {

    // --- Initialize environmental variables and settings ---
    dotenv::dotenv().ok();
    env_logger::init();

    let env = EnvironmentVar::load();

    // Refuse to boot on a secret with no usable key material; a code from
    // an all-zero key must never be produced.
    dropkey_totp::base32::decode(&env.base32_secret_key)
        .expect("BASE32_SECRET_KEY decodes to at least one byte of key material");
    log::info!(
        "secret loaded (fingerprint {})",
        dropkey_totp::secret_fingerprint(&env.base32_secret_key)
    );

    // --- Run delivery history server ---
    let (history_config, history_in_sender) = default_history_opt();
    run_history_server(history_config);
    log::info!("Delivery history server started.");

    // --- Run code refresh scheduler ---
    let (scheduler_config, mut scheduler_in_sender, mut scheduler_events) =
        refresh_scheduler_opt(env.base32_secret_key.clone());
    run_refresh_scheduler(scheduler_config, SystemClock);
    async_std::task::spawn(async move {
        while let Some(event) = scheduler_events.next().await {
            match event {
                SchedulerEvent::CodeRefreshed { access_code } => {
                    log::info!("access code refreshed, expires at {}", access_code.expires_at);
                },
                SchedulerEvent::Failed { error } => {
                    log::error!("code refresh failed: {:?}", error);
                },
                SchedulerEvent::Tick { .. } => {},
            }
        }
    });
    log::info!("Code refresh scheduler started.");

    // --- Start web server ---
    let state = ServerState::new(
        env.base32_secret_key,
        env.sms_provider,
        env.provider_config,
        &history_in_sender,
    );
    let mut app = tide::with_state(state);

    app.with(
        CorsMiddleware::new()
            .allow_methods("GET, POST, OPTIONS".parse::<HeaderValue>().unwrap())
            .allow_origin(Origin::from("*"))
            .allow_credentials(false)
    );
    app.with(After(|mut res: Response| async {
        if let Some(err) = res.error() {
            let msg = format!("Error: {:?}", err);
            log::error!("Req Error {msg}");
            res.set_status(StatusCode::Ok);
            res.set_body(msg);
        }

        Ok(res)
    }));

    app.at("/code/generate").post(code_generate);

    app.at("/sms/send").post(sms_send);
    app.at("/sms/history").get(sms_history);

    app.at("/box/status").get(box_status);

    log::info!("Start listening web server...");
    let _ = app.listen("0.0.0.0:8080").await;

    // --- Gracefully close the web server ---
    log::info!("Web server closed.");

    let (i, o) = oneshot::channel();
    let _ = scheduler_in_sender
        .send(SchedulerOpIn::Shutdown { result_sender: i })
        .await;
    o.await.expect("scheduler should be able to close successfully");
    log::info!("Code refresh scheduler closed.");

    shutdown_history(history_in_sender)
        .await
        .expect("history server should be able to close successfully");
    log::info!("Delivery history server closed.");
}
