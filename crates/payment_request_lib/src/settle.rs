use crate::db::model::PaymentRequestDbObj;
use crate::db::ops::*;
use crate::error::{ErrorBag, PaymentError};
use crate::eth::{
    address_to_topic, decode_transfer_log, get_current_block_number, get_erc20_transfer_logs,
    TransferEvent,
};
use crate::err_from;
use crate::runtime::SharedState;
use crate::setup::{ChainSetup, PaymentSetup};
use crate::utils::{u256_to_rust_dec, StringConvExt};
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use web3::types::Address;

#[derive(Debug, Clone, Default)]
pub struct SettlementSummary {
    pub open_requests: usize,
    pub settled_requests: usize,
}

pub fn transfer_matches_amount(
    transferred: Decimal,
    requested: Decimal,
    tolerance: Decimal,
) -> bool {
    let diff = if transferred > requested {
        transferred - requested
    } else {
        requested - transferred
    };
    diff <= tolerance
}

///Block window for one scan. The head is held back by the chain's
///confirmation depth, the window length stays scan_blocks.
pub fn scan_window(current_block: i64, scan_blocks: u64, confirmation_blocks: u64) -> (i64, i64) {
    let to_block = std::cmp::max(1, current_block - confirmation_blocks as i64);
    let from_block = std::cmp::max(1, to_block - scan_blocks as i64);
    (from_block, to_block)
}

///Applies the match rule against already-fetched transfer events.
///First matching event wins. The guarded update in the db layer is the
///re-check that the request is still open at write time.
pub async fn settle_request_with_transfers(
    conn: &SqlitePool,
    request: &PaymentRequestDbObj,
    token_decimals: u32,
    amount_tolerance: Decimal,
    events: &[TransferEvent],
) -> Result<Option<PaymentRequestDbObj>, PaymentError> {
    let requested = request.amount.to_decimal().map_err(err_from!())?;
    let requester = Address::from_str(&request.requester_addr)
        .map_err(err_from!())?;

    for event in events {
        if event.receiver_addr != requester {
            continue;
        }
        let transferred =
            u256_to_rust_dec(event.amount, Some(token_decimals)).map_err(err_from!())?;
        if !transfer_matches_amount(transferred, requested, amount_tolerance) {
            log::debug!(
                "Transfer {:#x} to {:#x} amount {} outside tolerance of requested {}",
                event.tx_hash,
                event.receiver_addr,
                transferred,
                requested
            );
            continue;
        }

        let updated = mark_request_paid(
            conn,
            &request.id,
            &format!("{:#x}", event.from_addr),
            &format!("{:#x}", event.tx_hash),
        )
        .await
        .map_err(err_from!())?;

        return match updated {
            Some(updated) => {
                log::info!(
                    "Request {} settled by {:#x} in tx {:#x}",
                    request.id,
                    event.from_addr,
                    event.tx_hash
                );
                Ok(Some(updated))
            }
            None => {
                log::warn!(
                    "Request {} no longer open, skipping duplicate settlement from tx {:#x}",
                    request.id,
                    event.tx_hash
                );
                Ok(None)
            }
        };
    }
    Ok(None)
}

async fn scan_chain_for_settlements(
    conn: &SqlitePool,
    chain_setup: &ChainSetup,
    payment_setup: &PaymentSetup,
    summary: &mut SettlementSummary,
) -> Result<(), PaymentError> {
    let open_requests = get_open_requests_for_chain(conn, chain_setup.chain_id)
        .await
        .map_err(err_from!())?;
    if open_requests.is_empty() {
        return Ok(());
    }
    summary.open_requests += open_requests.len();

    let current_block = get_current_block_number(&chain_setup.provider).await? as i64;
    let (from_block, to_block) = scan_window(
        current_block,
        payment_setup.scan_blocks,
        chain_setup.confirmation_blocks,
    );

    let mut receivers = BTreeSet::new();
    for request in &open_requests {
        receivers.insert(
            Address::from_str(&request.requester_addr).map_err(err_from!())?,
        );
    }
    let topic_receivers = receivers.into_iter().map(address_to_topic).collect();

    let logs = get_erc20_transfer_logs(
        &chain_setup.provider,
        chain_setup.token_address,
        topic_receivers,
        from_block,
        to_block,
    )
    .await?;

    let events: Vec<TransferEvent> = logs.iter().filter_map(decode_transfer_log).collect();
    log::debug!(
        "Chain {}: {} transfer events in blocks {}-{} for {} open requests",
        chain_setup.chain_id,
        events.len(),
        from_block,
        to_block,
        open_requests.len()
    );

    for request in &open_requests {
        match settle_request_with_transfers(
            conn,
            request,
            chain_setup.token_decimals,
            payment_setup.amount_tolerance,
            &events,
        )
        .await
        {
            Ok(Some(_)) => {
                summary.settled_requests += 1;
            }
            Ok(None) => {}
            Err(e) => {
                log::error!("Error settling request {}: {}", request.id, e);
                continue;
            }
        }
    }
    Ok(())
}

///One full settlement cycle over every configured chain.
///A chain failing to scan does not abort the others.
pub async fn run_settlement_cycle(
    conn: &SqlitePool,
    payment_setup: &PaymentSetup,
) -> Result<SettlementSummary, PaymentError> {
    let mut summary = SettlementSummary::default();
    for chain_setup in payment_setup.chain_setup.values() {
        if let Err(e) =
            scan_chain_for_settlements(conn, chain_setup, payment_setup, &mut summary).await
        {
            log::error!(
                "Error scanning chain {} for settlements: {}",
                chain_setup.chain_id,
                e
            );
        }
    }
    Ok(summary)
}

///Background settlement loop, one cycle per settle_interval.
///Cycles are fire-and-forget, errors are logged and retried next tick.
pub async fn settlement_loop(
    shared_state: Arc<Mutex<SharedState>>,
    conn: &SqlitePool,
    payment_setup: &PaymentSetup,
) {
    loop {
        log::debug!("Settlement loop - start cycle");
        let cycle_start = chrono::Utc::now();
        shared_state.lock().await.last_cycle_start = Some(cycle_start);

        match run_settlement_cycle(conn, payment_setup).await {
            Ok(summary) => {
                let mut state = shared_state.lock().await;
                state.cycles_completed += 1;
                state.requests_settled += summary.settled_requests as u64;
                state.last_cycle_error = None;
                state.idling = summary.open_requests == 0;
            }
            Err(e) => {
                log::error!("Error in settlement cycle: {}", e);
                shared_state.lock().await.last_cycle_error = Some(e.to_string());
            }
        }

        tokio::time::sleep(std::time::Duration::from_secs(payment_setup.settle_interval)).await;
    }
}
