use super::SwapEngine;
use crate::db::ops::*;
use crate::err_from;
use crate::error::EngineError;
use crate::error::*;
use crate::events::EngineEventContent;
use crate::db::model::SwapStatus;
use chrono::Utc;
use std::sync::Arc;

pub async fn retry_loop(engine: Arc<SwapEngine>) {
    log::info!("Starting failed swap retrier");
    while !engine.is_stopped() {
        engine.idle_sleep().await;
        match retry_once(&engine).await {
            Ok(0) => {}
            Ok(count) => log::info!("Re-queued {} failed swaps for another fill attempt", count),
            Err(e) => log::error!("Retry pass failed: {}", e),
        }
    }
    log::info!("Failed swap retrier stopped");
}

/// Re-drive SendFailed swaps with bounded exponential backoff. A retried
/// swap goes back to Confirmed and the filler builds a fresh fill tx; after
/// max_retry attempts the swap stays SendFailed for good.
pub async fn retry_once(engine: &SwapEngine) -> Result<usize, EngineError> {
    let swaps = get_retryable_swaps(&engine.conn, engine.max_retry, engine.batch_size)
        .await
        .map_err(err_from!())?;
    let now = Utc::now();
    let mut retried = 0;

    for mut swap in swaps {
        if !engine.verify_swap(&swap) {
            log::error!("verify hmac of swap failed: {}", swap.start_tx_hash);
            engine
                .emit(EngineEventContent::IntegrityViolation {
                    start_tx_hash: swap.start_tx_hash.clone(),
                })
                .await;
            let reason = format!("verify hmac of swap failed: {}", swap.start_tx_hash);
            if let Err(e) = engine.reject_swap(&mut swap, &reason).await {
                log::error!("write db error: {}", e);
                engine
                    .emit(EngineEventContent::DbWriteFailed(e.to_string()))
                    .await;
            }
            continue;
        }

        let backoff_secs = engine
            .retry_backoff
            .as_secs()
            .saturating_mul(1u64 << swap.retry_count.clamp(0, 32));
        let due = swap.updated_at + chrono::Duration::seconds(backoff_secs.min(i64::MAX as u64) as i64);
        if due > now {
            continue;
        }

        swap.status = SwapStatus::Confirmed;
        swap.retry_count += 1;
        swap.log = format!("retry attempt {} of {}", swap.retry_count, engine.max_retry);
        engine.seal_swap(&mut swap);

        let write_res = async {
            let mut db_transaction = engine.conn.begin().await.map_err(err_from!())?;
            update_swap(&mut *db_transaction, &swap)
                .await
                .map_err(err_from!())?;
            db_transaction.commit().await.map_err(err_from!())?;
            Ok::<(), EngineError>(())
        }
        .await;

        match write_res {
            Ok(()) => {
                log::info!(
                    "Retrying failed swap, start tx hash {}, attempt {} of {}",
                    swap.start_tx_hash,
                    swap.retry_count,
                    engine.max_retry
                );
                retried += 1;
            }
            Err(e) => {
                log::error!("write db error: {}", e);
                engine
                    .emit(EngineEventContent::DbWriteFailed(e.to_string()))
                    .await;
            }
        }
    }

    Ok(retried)
}
