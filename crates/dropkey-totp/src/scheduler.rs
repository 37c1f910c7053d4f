use std::time::Duration;

use futures::{
    channel::{mpsc, oneshot},
    select, FutureExt, SinkExt, StreamExt,
};
use serde::{Serialize, Deserialize};

use crate::clock::Clock;
use crate::totp;
use crate::types::{AccessCode, CodeError, Timestamp, TIME_STEP};

/// Pure stepping core of the countdown. Owns nothing but the last seen
/// counter, so the rollover rule is testable without a timer harness.
#[derive(Debug, Clone, Copy, Default)]
pub struct Countdown {
    last_counter: Option<Timestamp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickObservation {
    pub seconds_remaining: Timestamp,
    /// True exactly when the time counter advanced since the previous
    /// observation (and on the very first observation).
    pub rollover: bool,
}

impl Countdown {
    pub fn observe(&mut self, now: Timestamp) -> TickObservation {
        let counter = now / TIME_STEP;
        let rollover = self.last_counter != Some(counter);
        self.last_counter = Some(counter);

        TickObservation {
            seconds_remaining: TIME_STEP - (now % TIME_STEP),
            rollover,
        }
    }
}

#[derive(Debug)]
pub enum SchedulerOpIn {
    /// Swap the shared secret. The old schedule is superseded before the
    /// result is sent back, so no code for the stale secret can follow.
    UpdateSecret {
        secret: String,
        result_sender: oneshot::Sender<Result<AccessCode, CodeError>>,
    },

    Shutdown {
        result_sender: oneshot::Sender<()>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulerEvent {
    /// Emitted once per second for countdown display.
    Tick { seconds_remaining: Timestamp },
    /// Emitted once per counter rollover (and once at startup or after a
    /// secret change).
    CodeRefreshed { access_code: AccessCode },
    /// Generation or clock failures are surfaced, never dropped across
    /// the timer boundary.
    Failed { error: CodeError },
}

pub struct RefreshSchedulerConfig {
    secret: String,

    op_receiver: mpsc::Receiver<SchedulerOpIn>,
    event_sender: mpsc::Sender<SchedulerEvent>,
}

pub fn refresh_scheduler_opt(
    secret: String,
) -> (
    RefreshSchedulerConfig,
    mpsc::Sender<SchedulerOpIn>,
    mpsc::Receiver<SchedulerEvent>,
) {
    let (op_sender, op_receiver) = mpsc::channel(0);
    let (event_sender, event_receiver) = mpsc::channel(64);
    (
        RefreshSchedulerConfig { secret, op_receiver, event_sender },
        op_sender,
        event_receiver,
    )
}

/// Spawn the single cooperative timer task: a 1-second tick cadence for
/// the countdown, one regeneration per counter rollover, cancellation by
/// `Shutdown`. At most one registration exists per call.
pub fn run_refresh_scheduler<C>(mut config: RefreshSchedulerConfig, clock: C)
where
    C: Clock + Send + 'static,
{
    async_std::task::spawn(async move {
        let mut countdown = Countdown::default();
        let mut graceful_terminate = false;

        while !graceful_terminate {
            let mut tick = Box::pin(async_std::task::sleep(Duration::from_secs(1))).fuse();

            select! {
                _ = tick => {
                    match clock.now() {
                        Ok(now) => {
                            let observation = countdown.observe(now);
                            let _ = config.event_sender
                                .send(SchedulerEvent::Tick {
                                    seconds_remaining: observation.seconds_remaining,
                                })
                                .await;

                            if observation.rollover {
                                match totp::generate_from_base32(&config.secret, now) {
                                    Ok(access_code) => {
                                        let _ = config.event_sender
                                            .send(SchedulerEvent::CodeRefreshed { access_code })
                                            .await;
                                    },
                                    Err(error) => {
                                        log::error!("code refresh failed: {:?}", error);
                                        let _ = config.event_sender
                                            .send(SchedulerEvent::Failed { error })
                                            .await;
                                    },
                                }
                            }
                        },
                        Err(error) => {
                            log::error!("clock read failed: {:?}", error);
                            let _ = config.event_sender
                                .send(SchedulerEvent::Failed { error })
                                .await;
                        },
                    }
                },

                op = config.op_receiver.select_next_some() => {
                    match op {
                        SchedulerOpIn::UpdateSecret { secret, result_sender } => {
                            config.secret = secret;
                            countdown = Countdown::default();

                            let status = match clock.now() {
                                Ok(now) => {
                                    let _ = countdown.observe(now);
                                    totp::generate_from_base32(&config.secret, now)
                                },
                                Err(e) => Err(e),
                            };

                            if let Ok(access_code) = &status {
                                let _ = config.event_sender
                                    .send(SchedulerEvent::CodeRefreshed {
                                        access_code: access_code.clone(),
                                    })
                                    .await;
                            }

                            result_sender
                                .send(status)
                                .expect("scheduler op receiver should not been dropped");
                        },

                        SchedulerOpIn::Shutdown { result_sender } => {
                            graceful_terminate = true;
                            result_sender
                                .send(())
                                .expect("scheduler op receiver should not been dropped");
                        },
                    }
                },
            }
        }
    });
}
