use crate::db::model::SwapDao;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

/// Out-of-band notification from the engine. The alert transport (pager,
/// chat, whatever) subscribes to the channel; the engine never blocks on it.
#[derive(Debug, Clone)]
pub struct EngineEvent {
    pub content: EngineEventContent,
    pub create_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum EngineEventContent {
    /// Urgent: a persisted swap record failed MAC verification.
    IntegrityViolation { start_tx_hash: String },
    /// Urgent: a sent fill tx stayed unresolved past the poll budget.
    FillTxMissing {
        start_tx_hash: String,
        fill_tx_hash: String,
    },
    BroadcastFailed {
        start_tx_hash: String,
        error: String,
    },
    DbWriteFailed(String),
    SwapSucceeded(SwapDao),
    SwapFailed(SwapDao),
}

pub async fn send_engine_event(
    event_sender: &Option<mpsc::Sender<EngineEvent>>,
    content: EngineEventContent,
) {
    if let Some(sender) = event_sender {
        let event = EngineEvent {
            content,
            create_date: Utc::now(),
        };
        if let Err(e) = sender.send(event).await {
            log::error!("Error sending engine event: {}", e);
        }
    }
}
