use crate::db::model::PaymentRequestDbObj;
use crate::db::ops::REQUEST_STATUS_OPEN;
use crate::error::*;
use crate::err_custom_create;
use crate::setup::PaymentSetup;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use web3::types::Address;

///Typed request-creation input, validated before anything touches the db
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewPaymentRequest {
    pub requester_addr: String,
    pub amount: Decimal,
    pub token_addr: String,
    pub token_symbol: String,
    pub chain_id: i64,
    pub chain_name: String,
    pub caption: Option<String>,
}

pub fn validate_new_request(
    new_request: &NewPaymentRequest,
    payment_setup: &PaymentSetup,
) -> Result<PaymentRequestDbObj, PaymentError> {
    let requester = Address::from_str(&new_request.requester_addr)
        .map_err(|_err| err_custom_create!("Cannot parse requester address"))?;
    let token = Address::from_str(&new_request.token_addr)
        .map_err(|_err| err_custom_create!("Cannot parse token address"))?;

    if new_request.amount <= Decimal::from(0) {
        return Err(err_custom_create!("Amount has to be positive"));
    }
    if new_request.amount < payment_setup.min_request_amount {
        return Err(err_custom_create!(
            "Amount {} below minimum {}",
            new_request.amount,
            payment_setup.min_request_amount
        ));
    }

    let chain_setup = payment_setup.get_chain_setup(new_request.chain_id)?;
    if token != chain_setup.token_address {
        return Err(err_custom_create!(
            "Token {:#x} not supported on chain {}, expected {:#x}",
            token,
            new_request.chain_id,
            chain_setup.token_address
        ));
    }

    Ok(PaymentRequestDbObj {
        id: uuid::Uuid::new_v4().to_string(),
        requester_addr: format!("{requester:#x}"),
        amount: new_request.amount.normalize().to_string(),
        token_addr: format!("{token:#x}"),
        token_symbol: new_request.token_symbol.clone(),
        chain_id: new_request.chain_id,
        chain_name: new_request.chain_name.clone(),
        caption: new_request.caption.clone(),
        status: REQUEST_STATUS_OPEN.to_string(),
        paid_by: None,
        tx_hash: None,
        created_date: Utc::now(),
        paid_date: None,
    })
}
