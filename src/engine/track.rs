use super::{ChainLane, SwapEngine};
use crate::db::model::*;
use crate::db::ops::*;
use crate::error::EngineError;
use crate::error::*;
use crate::events::EngineEventContent;
use crate::{err_custom_create, err_from};
use std::str::FromStr;
use std::sync::Arc;
use web3::types::{TransactionReceipt, H256, U256, U64};

pub async fn reap_missing_loop(engine: Arc<SwapEngine>) {
    log::info!("Starting missing fill tx reaper");
    while !engine.is_stopped() {
        engine.idle_sleep().await;
        if let Err(e) = reap_missing_once(&engine).await {
            log::error!("Reaper pass failed: {}", e);
        }
    }
    log::info!("Missing fill tx reaper stopped");
}

pub async fn track_sent_loop(engine: Arc<SwapEngine>) {
    log::info!("Starting sent fill tx tracker");
    while !engine.is_stopped() {
        engine.idle_sleep().await;
        if let Err(e) = track_sent_once(&engine).await {
            log::error!("Tracker pass failed: {}", e);
        }
    }
    log::info!("Sent fill tx tracker stopped");
}

/// Give up on fill txs whose receipt never materialized within the per-chain
/// poll budget. Nothing proves the tx will not land later, hence the urgent
/// alert rather than a silent state flip.
pub async fn reap_missing_once(engine: &SwapEngine) -> Result<usize, EngineError> {
    let mut reaped = 0;
    for (chain, lane) in engine.lanes() {
        let fill_txs = get_reapable_fill_txs(
            &engine.conn,
            Direction::into_dest(*chain),
            lane.max_track_retry,
            engine.track_sent_tx_batch_size,
        )
        .await
        .map_err(err_from!())?;

        if !fill_txs.is_empty() {
            log::info!(
                "{} fill tx are missing on chain {}, marking these swaps as failed",
                fill_txs.len(),
                chain
            );
        }

        for fill_tx in fill_txs {
            log::error!(
                "The fill tx was sent but after {} polls its status is still uncertain. Marking tx as missing and swap as failed, chain {}, start hash {}",
                lane.max_track_retry,
                chain,
                fill_tx.start_swap_tx_hash
            );
            engine
                .emit(EngineEventContent::FillTxMissing {
                    start_tx_hash: fill_tx.start_swap_tx_hash.clone(),
                    fill_tx_hash: fill_tx.fill_swap_tx_hash.clone(),
                })
                .await;

            let write_res = async {
                let mut db_transaction = engine.conn.begin().await.map_err(err_from!())?;
                update_fill_tx_status(&mut *db_transaction, fill_tx.id, FillTxStatus::Missing)
                    .await
                    .map_err(err_from!())?;
                let mut swap = engine
                    .load_swap_verified(&mut *db_transaction, &fill_tx.start_swap_tx_hash)
                    .await?;
                swap.status = SwapStatus::SendFailed;
                swap.log = format!(
                    "track fill tx for more than {} times, the fill tx status is still uncertain",
                    lane.max_track_retry
                );
                engine.seal_swap(&mut swap);
                update_swap(&mut *db_transaction, &swap)
                    .await
                    .map_err(err_from!())?;
                db_transaction.commit().await.map_err(err_from!())?;
                Ok::<(), EngineError>(())
            }
            .await;

            match write_res {
                Ok(()) => reaped += 1,
                Err(e) => {
                    log::error!("write db error: {}", e);
                    if !matches!(e.inner, ErrorBag::IntegrityError(_)) {
                        engine
                            .emit(EngineEventContent::DbWriteFailed(e.to_string()))
                            .await;
                    }
                }
            }
        }
    }
    Ok(reaped)
}

/// Poll receipts for sent fill txs, per destination chain, and finalize the
/// ones past the confirmation depth.
pub async fn track_sent_once(engine: &SwapEngine) -> Result<usize, EngineError> {
    let mut tracked = 0;
    for (chain, lane) in engine.lanes() {
        let fill_txs = get_trackable_fill_txs(
            &engine.conn,
            Direction::into_dest(*chain),
            lane.max_track_retry,
            engine.track_sent_tx_batch_size,
        )
        .await
        .map_err(err_from!())?;

        if !fill_txs.is_empty() {
            log::debug!(
                "Tracking {} non-finalized fill txs on chain {}",
                fill_txs.len(),
                chain
            );
        }

        for fill_tx in fill_txs {
            track_one(engine, lane, &fill_tx).await;
            tracked += 1;
        }
    }
    Ok(tracked)
}

async fn track_one(engine: &SwapEngine, lane: &ChainLane, fill_tx: &SwapFillTxDao) {
    let status_check: Result<(TransactionReceipt, i64), String> = async {
        let current_block = lane
            .client
            .block_number()
            .await
            .map_err(|e| format!("{}, query block failed: {}", lane.chain, e))?;
        let tx_hash = H256::from_str(&fill_tx.fill_swap_tx_hash).map_err(|e| {
            format!(
                "cannot parse fill tx hash {}: {:?}",
                fill_tx.fill_swap_tx_hash, e
            )
        })?;
        let receipt = lane
            .client
            .transaction_receipt(tx_hash)
            .await
            .map_err(|e| format!("{}, query tx failed: {}", lane.chain, e))?
            .ok_or_else(|| format!("{}, fill tx receipt not found", lane.chain))?;
        let receipt_block = receipt
            .block_number
            .ok_or_else(|| format!("{}, receipt without block number", lane.chain))?
            .as_u64();
        if current_block.as_u64() < receipt_block + engine.confirm_depth {
            return Err(format!("{}, swap tx is still not finalized", lane.chain));
        }
        Ok((receipt, receipt_block as i64))
    }
    .await;

    let write_res: Result<(), EngineError> = match status_check {
        Err(reason) => {
            log::debug!("{}", reason);
            bump_track_retry_counter(&engine.conn, fill_tx.id)
                .await
                .map_err(err_from!())
        }
        Ok((receipt, height)) => {
            let finalize_res = async {
                let gas_price =
                    U256::from_dec_str(&fill_tx.gas_price).map_err(err_from!())?;
                let gas_used = receipt.gas_used.ok_or_else(|| {
                    err_custom_create!(
                        "receipt for {} has no gas used",
                        fill_tx.fill_swap_tx_hash
                    )
                })?;
                let tx_fee = (gas_price * gas_used).to_string();
                let tx_ok = receipt.status == Some(U64::from(1));

                let mut db_transaction = engine.conn.begin().await.map_err(err_from!())?;
                let mut swap = engine
                    .load_swap_verified(&mut *db_transaction, &fill_tx.start_swap_tx_hash)
                    .await?;
                if tx_ok {
                    finalize_fill_tx(
                        &mut *db_transaction,
                        fill_tx.id,
                        FillTxStatus::Success,
                        height,
                        &tx_fee,
                    )
                    .await
                    .map_err(err_from!())?;
                    swap.status = SwapStatus::Success;
                } else {
                    finalize_fill_tx(
                        &mut *db_transaction,
                        fill_tx.id,
                        FillTxStatus::Failed,
                        height,
                        &tx_fee,
                    )
                    .await
                    .map_err(err_from!())?;
                    swap.status = SwapStatus::SendFailed;
                    swap.log = "fill tx is failed".to_string();
                }
                engine.seal_swap(&mut swap);
                update_swap(&mut *db_transaction, &swap)
                    .await
                    .map_err(err_from!())?;
                db_transaction.commit().await.map_err(err_from!())?;
                Ok::<(SwapDao, bool), EngineError>((swap, tx_ok))
            }
            .await;

            match finalize_res {
                Ok((swap, true)) => {
                    log::info!(
                        "fill swap tx is success, chain {}, tx hash {}",
                        lane.chain,
                        fill_tx.fill_swap_tx_hash
                    );
                    engine.emit(EngineEventContent::SwapSucceeded(swap)).await;
                    Ok(())
                }
                Ok((swap, false)) => {
                    log::error!(
                        "fill swap tx is failed, chain {}, tx hash {}",
                        lane.chain,
                        fill_tx.fill_swap_tx_hash
                    );
                    engine.emit(EngineEventContent::SwapFailed(swap)).await;
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
    };

    if let Err(e) = write_res {
        log::error!("update db failure: {}", e);
        if !matches!(e.inner, ErrorBag::IntegrityError(_)) {
            engine
                .emit(EngineEventContent::DbWriteFailed(e.to_string()))
                .await;
        }
    }
}
