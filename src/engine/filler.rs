use super::{ChainLane, SwapEngine};
use crate::client::{is_replace_underpriced, REPLACE_UNDERPRICED_SENTINEL};
use crate::db::model::*;
use crate::db::ops::*;
use crate::err_from;
use crate::error::EngineError;
use crate::error::*;
use crate::events::EngineEventContent;
use crate::transaction::build_fill_transaction;
use chrono::Utc;
use std::str::FromStr;
use std::sync::Arc;
use web3::types::{Address, U256};

pub async fn filler_loop(engine: Arc<SwapEngine>, dest: Chain) {
    log::info!("Starting filler for destination chain {}", dest);
    while !engine.is_stopped() {
        match filler_once(&engine, dest).await {
            Ok(0) => engine.idle_sleep().await,
            Ok(count) => log::debug!("Found {} fillable swaps for chain {}", count, dest),
            Err(e) => {
                log::error!("Filler pass for chain {} failed: {}", dest, e);
                engine.idle_sleep().await;
            }
        }
    }
    log::info!("Filler for destination chain {} stopped", dest);
}

/// One batch over the two directions settling on `dest`. Broadcast attempts
/// are spaced by the lane's configured wait to avoid hammering the RPC.
pub async fn filler_once(engine: &SwapEngine, dest: Chain) -> Result<usize, EngineError> {
    let lane = engine.lane(dest);
    let swaps = get_fillable_swaps(&engine.conn, Direction::into_dest(dest), engine.batch_size)
        .await
        .map_err(err_from!())?;
    let found = swaps.len();

    for swap in swaps {
        fill_one(engine, &lane, swap).await;
        tokio::time::sleep(lane.wait_between_swaps).await;
    }

    Ok(found)
}

enum ClaimOutcome {
    Claimed,
    AdoptedAsSent,
    RevertedToConfirmed,
}

enum FillFailure {
    /// RPC did not answer before the fill row exists; the swap is left
    /// untouched and re-examined on the next pass.
    Transient(EngineError),
    /// Non-RPC failure before broadcast (ABI, signing).
    Internal(EngineError),
    Db(EngineError),
    ReplaceUnderpriced(SwapFillTxDao),
    Broadcast(SwapFillTxDao, String),
}

async fn fill_one(engine: &SwapEngine, lane: &ChainLane, mut swap: SwapDao) {
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
        return;
    }

    let claim = match claim_swap(engine, &mut swap).await {
        Ok(claim) => claim,
        Err(e) => {
            log::error!("write db error: {}", e);
            engine
                .emit(EngineEventContent::DbWriteFailed(e.to_string()))
                .await;
            return;
        }
    };
    match claim {
        ClaimOutcome::AdoptedAsSent => {
            log::debug!("skip this swap, start tx hash {}", swap.start_tx_hash);
            return;
        }
        ClaimOutcome::RevertedToConfirmed => {
            log::info!(
                "retry swap, start tx hash {}, symbol {}, amount {}, direction {}",
                swap.start_tx_hash,
                swap.symbol,
                swap.amount,
                swap.direction
            );
            return;
        }
        ClaimOutcome::Claimed => {}
    }

    let parsed: Result<(U256, Address, U256), String> = (|| {
        let amount = U256::from_dec_str(&swap.amount)
            .map_err(|_err| format!("invalid swap amount: {}", swap.amount))?;
        let to_chain_id = U256::from_dec_str(&swap.to_chain_id)
            .map_err(|_err| format!("invalid chain id: {}", swap.to_chain_id))?;
        let sponsor = Address::from_str(&swap.sponsor)
            .map_err(|_err| format!("invalid sponsor address: {}", swap.sponsor))?;
        Ok((to_chain_id, sponsor, amount))
    })();
    let (to_chain_id, sponsor, amount) = match parsed {
        Ok(parsed) => parsed,
        Err(reason) => {
            log::error!("Rejecting swap {}: {}", swap.start_tx_hash, reason);
            if let Err(e) = engine.reject_swap(&mut swap, &reason).await {
                log::error!("write db error: {}", e);
                engine
                    .emit(EngineEventContent::DbWriteFailed(e.to_string()))
                    .await;
            }
            return;
        }
    };

    log::info!(
        "Filling swap, start tx {}, direction {}, sponsor {}, amount {}, decimals {}",
        swap.start_tx_hash,
        swap.direction,
        swap.sponsor,
        swap.amount,
        swap.decimals
    );
    let outcome = do_fill(engine, lane, &swap, to_chain_id, sponsor, amount).await;

    let write_res: Result<(), EngineError> = match outcome {
        Ok(fill_tx) => {
            async {
                let mut db_transaction = engine.conn.begin().await.map_err(err_from!())?;
                update_fill_tx_status(&mut *db_transaction, fill_tx.id, FillTxStatus::Sent)
                    .await
                    .map_err(err_from!())?;
                swap.status = SwapStatus::Sent;
                swap.fill_tx_hash = fill_tx.fill_swap_tx_hash.clone();
                engine.seal_swap(&mut swap);
                update_swap(&mut *db_transaction, &swap)
                    .await
                    .map_err(err_from!())?;
                db_transaction.commit().await.map_err(err_from!())?;
                Ok(())
            }
            .await
        }
        Err(FillFailure::Transient(e)) => {
            log::warn!(
                "Transient RPC failure while filling swap {}, retrying next pass: {}",
                swap.start_tx_hash,
                e
            );
            Ok(())
        }
        Err(FillFailure::Db(e)) => {
            log::error!("write db error: {}", e);
            engine
                .emit(EngineEventContent::DbWriteFailed(e.to_string()))
                .await;
            Ok(())
        }
        Err(FillFailure::Internal(e)) => {
            log::error!(
                "do swap failed: {}, start hash {}",
                e,
                swap.start_tx_hash
            );
            engine
                .emit(EngineEventContent::BroadcastFailed {
                    start_tx_hash: swap.start_tx_hash.clone(),
                    error: e.to_string(),
                })
                .await;
            async {
                let mut db_transaction = engine.conn.begin().await.map_err(err_from!())?;
                swap.status = SwapStatus::SendFailed;
                swap.log = format!("do swap failure: {}", e);
                engine.seal_swap(&mut swap);
                update_swap(&mut *db_transaction, &swap)
                    .await
                    .map_err(err_from!())?;
                db_transaction.commit().await.map_err(err_from!())?;
                Ok(())
            }
            .await
        }
        Err(FillFailure::ReplaceUnderpriced(fill_tx)) => {
            log::warn!(
                "Replace-underpriced broadcasting fill for swap {}, rebuilding with a fresh nonce next pass",
                swap.start_tx_hash
            );
            engine
                .emit(EngineEventContent::BroadcastFailed {
                    start_tx_hash: swap.start_tx_hash.clone(),
                    error: REPLACE_UNDERPRICED_SENTINEL.to_string(),
                })
                .await;
            async {
                let mut db_transaction = engine.conn.begin().await.map_err(err_from!())?;
                delete_fill_tx(&mut *db_transaction, fill_tx.id)
                    .await
                    .map_err(err_from!())?;
                swap.status = SwapStatus::Confirmed;
                swap.log = format!("do swap failure: {}", REPLACE_UNDERPRICED_SENTINEL);
                engine.seal_swap(&mut swap);
                update_swap(&mut *db_transaction, &swap)
                    .await
                    .map_err(err_from!())?;
                db_transaction.commit().await.map_err(err_from!())?;
                Ok(())
            }
            .await
        }
        Err(FillFailure::Broadcast(fill_tx, error)) => {
            log::error!(
                "do swap failed: {}, start hash {}",
                error,
                swap.start_tx_hash
            );
            engine
                .emit(EngineEventContent::BroadcastFailed {
                    start_tx_hash: swap.start_tx_hash.clone(),
                    error: error.clone(),
                })
                .await;
            async {
                let mut db_transaction = engine.conn.begin().await.map_err(err_from!())?;
                update_fill_tx_status(&mut *db_transaction, fill_tx.id, FillTxStatus::Failed)
                    .await
                    .map_err(err_from!())?;
                swap.status = SwapStatus::SendFailed;
                swap.fill_tx_hash = fill_tx.fill_swap_tx_hash.clone();
                swap.log = format!("do swap failure: {}", error);
                engine.seal_swap(&mut swap);
                update_swap(&mut *db_transaction, &swap)
                    .await
                    .map_err(err_from!())?;
                db_transaction.commit().await.map_err(err_from!())?;
                Ok(())
            }
            .await
        }
    };

    if let Err(e) = write_res {
        log::error!("write db error: {}", e);
        engine
            .emit(EngineEventContent::DbWriteFailed(e.to_string()))
            .await;
    }
}

/// Claim the swap as ours inside one transaction. A Confirmed swap moves to
/// Sending (the soft lock); a Sending leftover is either adopted as Sent
/// when an in-flight fill row proves a broadcast happened, or reverted to
/// Confirmed for a clean rebuild on the next pass.
async fn claim_swap(
    engine: &SwapEngine,
    swap: &mut SwapDao,
) -> Result<ClaimOutcome, EngineError> {
    let mut db_transaction = engine.conn.begin().await.map_err(err_from!())?;
    let outcome = if swap.status == SwapStatus::Sending {
        let in_flight = get_in_flight_fill_tx(&mut *db_transaction, &swap.start_tx_hash)
            .await
            .map_err(err_from!())?
            .filter(|fill_tx| !fill_tx.fill_swap_tx_hash.is_empty());
        match in_flight {
            None => {
                swap.status = SwapStatus::Confirmed;
                engine.seal_swap(swap);
                update_swap(&mut *db_transaction, swap)
                    .await
                    .map_err(err_from!())?;
                ClaimOutcome::RevertedToConfirmed
            }
            Some(fill_tx) => {
                log::info!(
                    "fill tx was built but its status is uncertain, marking swap {} as sent",
                    swap.id
                );
                update_fill_tx_status(&mut *db_transaction, fill_tx.id, FillTxStatus::Sent)
                    .await
                    .map_err(err_from!())?;
                swap.status = SwapStatus::Sent;
                swap.fill_tx_hash = fill_tx.fill_swap_tx_hash.clone();
                engine.seal_swap(swap);
                update_swap(&mut *db_transaction, swap)
                    .await
                    .map_err(err_from!())?;
                ClaimOutcome::AdoptedAsSent
            }
        }
    } else {
        swap.status = SwapStatus::Sending;
        engine.seal_swap(swap);
        update_swap(&mut *db_transaction, swap)
            .await
            .map_err(err_from!())?;
        ClaimOutcome::Claimed
    };
    db_transaction.commit().await.map_err(err_from!())?;
    Ok(outcome)
}

/// Build, persist and broadcast the fill transaction under the lane's
/// broadcast guard. The fill row is committed before the broadcast so a
/// crash in between is recovered by adoption, never by a double send.
async fn do_fill(
    engine: &SwapEngine,
    lane: &ChainLane,
    swap: &SwapDao,
    to_chain_id: U256,
    sponsor: Address,
    amount: U256,
) -> Result<SwapFillTxDao, FillFailure> {
    let _guard = lane.broadcast_guard.lock().await;

    let built = match build_fill_transaction(lane, to_chain_id, sponsor, amount).await {
        Ok(built) => built,
        Err(e) => {
            return Err(match e.inner {
                ErrorBag::Web3Error(_) => FillFailure::Transient(e),
                _ => FillFailure::Internal(e),
            });
        }
    };

    let now = Utc::now();
    let fill_tx = SwapFillTxDao {
        id: 0,
        direction: swap.direction,
        start_swap_tx_hash: swap.start_tx_hash.clone(),
        fill_swap_tx_hash: format!("{:#x}", built.signed.transaction_hash),
        gas_price: built.gas_price.to_string(),
        height: 0,
        consumed_fee_amount: None,
        status: FillTxStatus::Created,
        track_retry_counter: 0,
        created_at: now,
        updated_at: now,
    };
    let fill_tx = insert_fill_tx(&engine.conn, &fill_tx)
        .await
        .map_err(err_from!())
        .map_err(FillFailure::Db)?;

    match lane
        .client
        .send_raw_transaction(built.signed.raw_transaction.clone())
        .await
    {
        Ok(_tx_hash) => {
            log::info!(
                "Sent fill transaction {} to chain {}",
                fill_tx.fill_swap_tx_hash,
                lane.chain
            );
            Ok(fill_tx)
        }
        Err(e) if is_replace_underpriced(&e) => Err(FillFailure::ReplaceUnderpriced(fill_tx)),
        Err(e) => {
            log::error!("broadcast tx to chain {} error: {}", lane.chain, e);
            Err(FillFailure::Broadcast(fill_tx, e.to_string()))
        }
    }
}
