use futures::{channel::{mpsc, oneshot}, SinkExt};

use dropkey_sms::history::{DeliveryRecord, HistoryOpIn, HistoryOpOut};
use dropkey_sms::provider::{ProviderConfig, SmsProvider};

#[derive(Clone)]
pub struct ServerState {
    pub secret: String,
    pub provider: SmsProvider,
    pub provider_config: ProviderConfig,

    history_in_sender: mpsc::Sender<HistoryOpIn>,
}

impl ServerState {
    pub fn new(
        secret: String,
        provider: SmsProvider,
        provider_config: ProviderConfig,
        history_in_sender: &mpsc::Sender<HistoryOpIn>,
    ) -> Self {
        Self {
            secret,
            provider,
            provider_config,
            history_in_sender: history_in_sender.clone(),
        }
    }

    pub async fn append_history(&mut self, record: DeliveryRecord) {
        let (i, o) = oneshot::channel();
        let _ = self.history_in_sender
            .send(HistoryOpIn::Append { record, result_sender: i })
            .await;
        let _ = o.await.expect("history server must be running");
    }

    pub async fn recent_history(&mut self) -> Vec<DeliveryRecord> {
        let (i, o) = oneshot::channel();
        let _ = self.history_in_sender
            .send(HistoryOpIn::Recent { result_sender: i })
            .await;
        let res = o.await.expect("history server must be running");

        if let HistoryOpOut::Recent { records } = res {
            records
        } else {
            unreachable!()
        }
    }
}

pub async fn shutdown_history(
    mut history_in_sender: mpsc::Sender<HistoryOpIn>,
) -> Result<(), oneshot::Canceled> {
    let (i, o) = oneshot::channel();
    let _ = history_in_sender
        .send(HistoryOpIn::Shutdown { result_sender: i })
        .await;
    o.await.map(|_| ())
}
