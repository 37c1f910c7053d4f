use std::collections::VecDeque;

use futures::{channel::{mpsc, oneshot}, StreamExt};
use serde::{Serialize, Deserialize};

use crate::provider::SmsProvider;

/// Upper bound on retained delivery records, newest first.
pub const HISTORY_CAP: usize = 50;

/// One successful hand-off to a gateway. Immutable once appended; purely
/// historical, since codes are reproducible from secret + time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub code: String,
    pub recipient: String,
    pub message: String,
    pub timestamp: u64,
    pub provider: SmsProvider,
    pub status: String,
}

#[derive(Debug)]
pub enum HistoryOpIn {
    Append {
        record: DeliveryRecord,

        result_sender: oneshot::Sender<HistoryOpOut>,
    },

    Recent {
        result_sender: oneshot::Sender<HistoryOpOut>,
    },

    Shutdown {
        result_sender: oneshot::Sender<HistoryOpOut>,
    },
}

#[derive(Debug, Clone)]
pub enum HistoryOpOut {
    Append,
    Recent { records: Vec<DeliveryRecord> },
    Shutdown,
}

pub struct HistoryConfig {
    cap: usize,

    op_receiver: mpsc::Receiver<HistoryOpIn>,
}

pub fn default_history_opt() -> (HistoryConfig, mpsc::Sender<HistoryOpIn>) {
    // we want the history ops to be executed as long as they are available
    let (op_sender, op_receiver) = mpsc::channel(0);
    (
        HistoryConfig { cap: HISTORY_CAP, op_receiver },
        op_sender,
    )
}

/// Spawn the in-memory history server. A single task owns the list; all
/// access goes through the op channel.
pub fn run_history_server(mut config: HistoryConfig) {
    async_std::task::spawn(async move {
        let mut records: VecDeque<DeliveryRecord> = VecDeque::with_capacity(config.cap);
        let mut graceful_terminate = false;

        loop {
            if graceful_terminate {
                break;
            }
            let op = config.op_receiver.select_next_some().await;
            match op {
                HistoryOpIn::Append { record, result_sender } => {
                    if records.len() == config.cap {
                        records.pop_back();
                    }
                    records.push_front(record);

                    result_sender
                        .send(HistoryOpOut::Append)
                        .expect("history out receiver should not been dropped")
                },
                HistoryOpIn::Recent { result_sender } => {
                    result_sender
                        .send(HistoryOpOut::Recent {
                            records: records.iter().cloned().collect(),
                        })
                        .expect("history out receiver should not been dropped")
                },
                HistoryOpIn::Shutdown { result_sender } => {
                    graceful_terminate = true;
                    result_sender
                        .send(HistoryOpOut::Shutdown)
                        .expect("history out receiver should not been dropped")
                },
            }
        }
    });
}

#[cfg(test)]
mod test {
    use super::*;
    use futures::SinkExt;

    fn record(n: u64) -> DeliveryRecord {
        DeliveryRecord {
            code: format!("{:06}", n),
            recipient: "+639171234567".to_string(),
            message: format!("code {}", n),
            timestamp: n,
            provider: SmsProvider::Mock,
            status: "sent".to_string(),
        }
    }

    async fn append(pipe: &mut mpsc::Sender<HistoryOpIn>, n: u64) {
        let (i, o) = oneshot::channel();
        pipe.send(HistoryOpIn::Append { record: record(n), result_sender: i })
            .await
            .expect("receiver not dropped");
        o.await.expect("history server must be running");
    }

    async fn recent(pipe: &mut mpsc::Sender<HistoryOpIn>) -> Vec<DeliveryRecord> {
        let (i, o) = oneshot::channel();
        pipe.send(HistoryOpIn::Recent { result_sender: i })
            .await
            .expect("receiver not dropped");
        match o.await.expect("history server must be running") {
            HistoryOpOut::Recent { records } => records,
            _ => unreachable!(),
        }
    }

    #[async_std::test]
    async fn newest_first_and_bounded() {
        let (config, mut pipe) = default_history_opt();
        run_history_server(config);

        for n in 0..(HISTORY_CAP as u64 + 10) {
            append(&mut pipe, n).await;
        }

        let records = recent(&mut pipe).await;
        assert_eq!(records.len(), HISTORY_CAP);
        assert_eq!(records.first().unwrap().timestamp, HISTORY_CAP as u64 + 9);
        assert_eq!(records.last().unwrap().timestamp, 10);

        let (i, o) = oneshot::channel();
        pipe.send(HistoryOpIn::Shutdown { result_sender: i })
            .await
            .expect("receiver not dropped");
        o.await.expect("history server must be running");
    }

    #[async_std::test]
    async fn empty_history_reads_back_empty() {
        let (config, mut pipe) = default_history_opt();
        run_history_server(config);

        assert!(recent(&mut pipe).await.is_empty());

        let (i, o) = oneshot::channel();
        pipe.send(HistoryOpIn::Shutdown { result_sender: i })
            .await
            .expect("receiver not dropped");
        o.await.expect("history server must be running");
    }
}
