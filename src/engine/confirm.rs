use super::SwapEngine;
use crate::db::model::*;
use crate::db::ops::*;
use crate::err_from;
use crate::error::EngineError;
use crate::error::*;
use crate::events::EngineEventContent;
use std::sync::Arc;

pub async fn confirm_loop(engine: Arc<SwapEngine>) {
    log::info!("Starting swap request confirmer");
    while !engine.is_stopped() {
        match confirm_once(&engine).await {
            Ok(0) => engine.idle_sleep().await,
            Ok(count) => log::debug!("Found {} confirmed event logs", count),
            Err(e) => {
                log::error!("Confirmer pass failed: {}", e);
                engine.idle_sleep().await;
            }
        }
    }
    log::info!("Swap request confirmer stopped");
}

/// Promote swaps whose source log passed the confirmation depth. The phase
/// advances to AckRequest even when the swap already moved past
/// TokenReceived; the queue must drain regardless.
pub async fn confirm_once(engine: &SwapEngine) -> Result<usize, EngineError> {
    let event_logs =
        get_confirmed_logs_in_phase(&engine.conn, TxLogPhase::ConfirmRequest, engine.batch_size)
            .await
            .map_err(err_from!())?;

    for event_log in &event_logs {
        let write_res = async {
            let mut db_transaction = engine.conn.begin().await.map_err(err_from!())?;
            let mut swap = engine
                .load_swap_verified(&mut *db_transaction, &event_log.tx_hash)
                .await?;
            if swap.status == SwapStatus::TokenReceived {
                swap.status = SwapStatus::Confirmed;
                engine.seal_swap(&mut swap);
                update_swap(&mut *db_transaction, &swap)
                    .await
                    .map_err(err_from!())?;
            }
            advance_log_phase(&mut *db_transaction, event_log.id, TxLogPhase::AckRequest)
                .await
                .map_err(err_from!())?;
            db_transaction.commit().await.map_err(err_from!())?;
            Ok::<(), EngineError>(())
        }
        .await;

        if let Err(e) = write_res {
            log::error!("Confirming swap {} failed: {}", event_log.tx_hash, e);
            if !matches!(e.inner, ErrorBag::IntegrityError(_)) {
                engine
                    .emit(EngineEventContent::DbWriteFailed(e.to_string()))
                    .await;
            }
        }
    }

    Ok(event_logs.len())
}
