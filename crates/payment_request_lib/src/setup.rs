use crate::config::Config;
use crate::error::ErrorBag;
use crate::error::PaymentError;

use crate::{err_custom_create, err_from};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use web3::transports::Http;
use web3::types::Address;
use web3::Web3;

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChainSetup {
    pub network: String,
    #[serde(skip_serializing)]
    pub provider: Web3<Http>,
    pub chain_name: String,
    pub chain_id: i64,
    pub currency_symbol: String,
    pub token_address: Address,
    pub token_symbol: String,
    pub token_decimals: u32,
    pub confirmation_blocks: u64,
    pub block_explorer_url: Option<String>,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSetup {
    pub chain_setup: BTreeMap<i64, ChainSetup>,
    pub settle_interval: u64,
    pub scan_blocks: u64,
    pub amount_tolerance: Decimal,
    pub min_request_amount: Decimal,
}

impl PaymentSetup {
    pub fn new(config: &Config) -> Result<Self, PaymentError> {
        let mut ps = PaymentSetup {
            chain_setup: BTreeMap::new(),
            settle_interval: config.engine.settle_interval,
            scan_blocks: config.engine.scan_blocks,
            amount_tolerance: config.engine.amount_tolerance,
            min_request_amount: config.engine.min_request_amount,
        };
        for (network, chain_config) in &config.chain {
            let endpoint = chain_config
                .rpc_endpoints
                .first()
                .ok_or_else(|| {
                    err_custom_create!("No rpc endpoint for chain {}", chain_config.chain_name)
                })?;
            let transport = Http::new(endpoint).map_err(err_from!())?;
            let provider = Web3::new(transport);

            ps.chain_setup.insert(
                chain_config.chain_id,
                ChainSetup {
                    network: network.clone(),
                    provider,
                    chain_name: chain_config.chain_name.clone(),
                    chain_id: chain_config.chain_id,
                    currency_symbol: chain_config.currency_symbol.clone(),
                    token_address: chain_config.token.address,
                    token_symbol: chain_config.token.symbol.clone(),
                    token_decimals: chain_config.token.decimals,
                    confirmation_blocks: chain_config.confirmation_blocks,
                    block_explorer_url: chain_config.block_explorer_url.clone(),
                },
            );
        }
        Ok(ps)
    }

    pub fn get_chain_setup(&self, chain_id: i64) -> Result<&ChainSetup, PaymentError> {
        self.chain_setup
            .get(&chain_id)
            .ok_or_else(|| err_custom_create!("No chain setup for chain id: {}", chain_id))
    }
}
