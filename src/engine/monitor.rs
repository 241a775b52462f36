use super::SwapEngine;
use crate::db::model::*;
use crate::db::ops::*;
use crate::err_from;
use crate::error::EngineError;
use crate::error::*;
use crate::events::EngineEventContent;
use chrono::Utc;
use std::str::FromStr;
use std::sync::Arc;
use web3::types::{Address, U256};

pub async fn monitor_loop(engine: Arc<SwapEngine>) {
    log::info!("Starting swap request monitor");
    while !engine.is_stopped() {
        match monitor_once(&engine).await {
            Ok(0) => engine.idle_sleep().await,
            Ok(count) => log::debug!("Promoted {} observed lock events", count),
            Err(e) => {
                log::error!("Monitor pass failed: {}", e);
                engine.idle_sleep().await;
            }
        }
    }
    log::info!("Swap request monitor stopped");
}

/// Promote newly-observed lock logs into swap rows: one transaction per log,
/// inserting the sealed swap and advancing the log phase together.
pub async fn monitor_once(engine: &SwapEngine) -> Result<usize, EngineError> {
    let event_logs = get_logs_in_phase(&engine.conn, TxLogPhase::Seen, engine.batch_size)
        .await
        .map_err(err_from!())?;

    for event_log in &event_logs {
        let mut swap = create_swap(engine, event_log);
        engine.seal_swap(&mut swap);

        let write_res = async {
            let mut db_transaction = engine.conn.begin().await.map_err(err_from!())?;
            if let Err(e) = insert_swap(&mut *db_transaction, &swap).await {
                if !is_unique_violation(&e) {
                    return Err(e).map_err(err_from!());
                }
                log::warn!(
                    "Swap for start tx {} already recorded, skipping duplicate insert",
                    event_log.tx_hash
                );
            }
            advance_log_phase(&mut *db_transaction, event_log.id, TxLogPhase::ConfirmRequest)
                .await
                .map_err(err_from!())?;
            db_transaction.commit().await.map_err(err_from!())?;
            Ok::<(), EngineError>(())
        }
        .await;

        if let Err(e) = write_res {
            log::error!("write db error: {}", e);
            engine
                .emit(EngineEventContent::DbWriteFailed(e.to_string()))
                .await;
        }
    }

    Ok(event_logs.len())
}

/// Decode a lock event into a fresh swap row. Anything that cannot be routed
/// or parsed lands in QuoteRejected with the reason in the log column.
fn create_swap(engine: &SwapEngine, event_log: &SwapStartTxLogDao) -> SwapDao {
    let now = Utc::now();
    let mut swap = SwapDao {
        id: 0,
        status: SwapStatus::QuoteRejected,
        sponsor: event_log.from_address.clone(),
        src_token_addr: String::new(),
        dst_token_addr: String::new(),
        symbol: String::new(),
        amount: event_log.amount.clone(),
        decimals: 0,
        direction: Direction::from_source(event_log.chain)[0],
        start_tx_hash: event_log.tx_hash.clone(),
        fill_tx_hash: String::new(),
        to_chain_id: event_log.to_chain_id.clone(),
        log: String::new(),
        record_hash: String::new(),
        retry_count: 0,
        created_at: now,
        updated_at: now,
    };

    let outcome: Result<(), String> = (|| {
        let direction = engine
            .route_direction(event_log.chain, &event_log.to_chain_id)
            .ok_or_else(|| {
                format!("unknown destination chain id: {}", event_log.to_chain_id)
            })?;
        swap.direction = direction;

        U256::from_dec_str(&event_log.amount)
            .map_err(|_err| format!("unrecognized swap amount: {}", event_log.amount))?;

        let token_addr = Address::from_str(&event_log.token_addr)
            .map_err(|_err| format!("unrecognized token address: {}", event_log.token_addr))?;
        let pair = engine
            .registry()
            .resolve_source(token_addr)
            .ok_or_else(|| format!("unknown swap pair: {:#x}", token_addr))?;
        swap.src_token_addr = format!("{:#x}", pair.src_token_addr);
        swap.dst_token_addr = format!("{:#x}", pair.dst_token_addr);
        swap.symbol = pair.symbol;
        swap.decimals = pair.decimals;
        Ok(())
    })();

    match outcome {
        Ok(()) => swap.status = SwapStatus::TokenReceived,
        Err(reason) => {
            log::warn!("Rejecting swap {}: {}", event_log.tx_hash, reason);
            swap.log = reason;
        }
    }

    swap
}
