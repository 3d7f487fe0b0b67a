use crate::error::*;
use crate::{err_custom_create, err_from};
use lazy_static::lazy_static;
use std::str::FromStr;
use web3::transports::Http;
use web3::types::{Address, BlockNumber, Log, H256, U256, U64};
use web3::Web3;

lazy_static! {
    pub static ref ERC20_TRANSFER_EVENT_SIGNATURE: H256 =
        H256::from_str("0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef")
            .unwrap();
}

///ERC20 Transfer log decoded into its payment-relevant parts
#[derive(Debug, Clone)]
pub struct TransferEvent {
    pub from_addr: Address,
    pub receiver_addr: Address,
    pub token_addr: Address,
    pub amount: U256,
    pub tx_hash: H256,
    pub block_number: u64,
}

pub fn address_to_topic(address: Address) -> H256 {
    let mut topic = [0u8; 32];
    topic[12..32].copy_from_slice(&address.to_fixed_bytes());
    H256::from(topic)
}

pub async fn get_current_block_number(web3: &Web3<Http>) -> Result<u64, PaymentError> {
    Ok(web3.eth().block_number().await.map_err(err_from!())?.as_u64())
}

pub async fn get_erc20_transfer_logs(
    web3: &Web3<Http>,
    erc20_address: Address,
    topic_receivers: Vec<H256>,
    from_block: i64,
    to_block: i64,
) -> Result<Vec<Log>, PaymentError> {
    if from_block < 0 || to_block < 0 {
        return Err(err_custom_create!("Block number cannot be negative"));
    }
    let filter = web3::types::FilterBuilder::default()
        .address(vec![erc20_address])
        .topics(
            Some(vec![*ERC20_TRANSFER_EVENT_SIGNATURE]),
            None,
            Some(topic_receivers),
            None,
        )
        .from_block(BlockNumber::Number(U64::from(from_block as u64)))
        .to_block(BlockNumber::Number(U64::from(to_block as u64)));
    web3.eth()
        .logs(filter.build())
        .await
        .map_err(|e| err_custom_create!("Error while getting logs: {}", e))
}

///Returns None for logs that are not well-formed Transfer events
///(wrong topic count, data not a single 32-byte word, or still pending
///without a tx hash).
pub fn decode_transfer_log(log: &Log) -> Option<TransferEvent> {
    if log.topics.len() != 3 || log.topics[0] != *ERC20_TRANSFER_EVENT_SIGNATURE {
        return None;
    }
    if log.data.0.len() != 32 {
        return None;
    }
    let from = Address::from_slice(&log.topics[1][12..]);
    let to = Address::from_slice(&log.topics[2][12..]);
    let amount = U256::from(log.data.0.as_slice());
    let (Some(tx_hash), Some(block_number)) = (log.transaction_hash, log.block_number) else {
        return None;
    };
    Some(TransferEvent {
        from_addr: from,
        receiver_addr: to,
        token_addr: log.address,
        amount,
        tx_hash,
        block_number: block_number.as_u64(),
    })
}
