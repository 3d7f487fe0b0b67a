use serde::Deserialize;
use std::collections::btree_map::BTreeMap as Map;

use std::path::Path;

use crate::error::*;
use crate::{err_custom_create, err_from};
use rust_decimal::Decimal;
use tokio::fs;
use web3::types::Address;

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Engine {
    ///Seconds between settlement cycles
    pub settle_interval: u64,
    ///Size of the sliding block window scanned each cycle
    pub scan_blocks: u64,
    ///Absolute allowance between requested and observed transfer amount
    pub amount_tolerance: Decimal,
    ///Requests below this amount are rejected at creation
    pub min_request_amount: Decimal,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub chain: Map<String, Chain>,
    pub engine: Engine,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Chain {
    pub chain_name: String,
    pub chain_id: i64,
    pub rpc_endpoints: Vec<String>,
    pub currency_symbol: String,
    pub token: Token,
    pub confirmation_blocks: u64,
    pub block_explorer_url: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Token {
    pub symbol: String,
    pub address: Address,
    pub decimals: u32,
}

impl Config {
    pub fn load_from_str(str: &str) -> Result<Self, PaymentError> {
        match toml::from_str(str) {
            Ok(config) => Ok(config),
            Err(e) => Err(err_custom_create!("Failed to parse toml {}: {}", str, e)),
        }
    }

    pub async fn load<P: AsRef<Path> + std::fmt::Display>(path: P) -> Result<Self, PaymentError> {
        match toml::from_str(&fs::read_to_string(&path).await.map_err(err_from!())?) {
            Ok(config) => Ok(config),
            Err(e) => Err(err_custom_create!("Failed to parse toml {}: {}", path, e)),
        }
    }
}
