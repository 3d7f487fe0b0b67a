use payment_request_lib::config::Config;
use payment_request_lib::db::create_sqlite_connection;
use payment_request_lib::db::ops::*;
use payment_request_lib::eth::TransferEvent;
use payment_request_lib::request::{validate_new_request, NewPaymentRequest};
use payment_request_lib::settle::settle_request_with_transfers;
use payment_request_lib::setup::PaymentSetup;
use payment_request_lib::utils::rust_dec_to_u256;
use rust_decimal::Decimal;
use std::str::FromStr;
use web3::types::{Address, H256};

const TEST_CONFIG: &str = r#"
[engine]
settle-interval = 1
scan-blocks = 100
amount-tolerance = "0.01"
min-request-amount = "0.01"

[chain.base]
chain-name = "Base"
chain-id = 8453
currency-symbol = "ETH"
rpc-endpoints = ["http://127.0.0.1:8545"]
confirmation-blocks = 1
token = { address = "0x833589fcd6edb6e08f4c7c32d4f71b54bda02913", symbol = "USDC", decimals = 6 }
"#;

const USDC_BASE: &str = "0x833589fcd6edb6e08f4c7c32d4f71b54bda02913";
const USDC_DECIMALS: u32 = 6;
const REQUESTER: &str = "0xb1c4d937a1b9bfc17a2eb92d3577f8b66763bfc1";
const PAYER: &str = "0x09e4f0ae44d5e60d44a8928af7531e6a862290bc";

fn test_setup() -> PaymentSetup {
    let config = Config::load_from_str(TEST_CONFIG).unwrap();
    PaymentSetup::new(&config).unwrap()
}

fn tolerance() -> Decimal {
    Decimal::from_str("0.01").unwrap()
}

fn transfer_to(receiver: &str, amount: &str, tx_no: u64) -> TransferEvent {
    TransferEvent {
        from_addr: Address::from_str(PAYER).unwrap(),
        receiver_addr: Address::from_str(receiver).unwrap(),
        token_addr: Address::from_str(USDC_BASE).unwrap(),
        amount: rust_dec_to_u256(Decimal::from_str(amount).unwrap(), Some(USDC_DECIMALS)).unwrap(),
        tx_hash: H256::from_low_u64_be(tx_no),
        block_number: 1000 + tx_no,
    }
}

fn new_request(amount: &str) -> NewPaymentRequest {
    NewPaymentRequest {
        requester_addr: REQUESTER.to_string(),
        amount: Decimal::from_str(amount).unwrap(),
        token_addr: USDC_BASE.to_string(),
        token_symbol: "USDC".to_string(),
        chain_id: 8453,
        chain_name: "Base".to_string(),
        caption: None,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_settles_within_tolerance() -> Result<(), anyhow::Error> {
    let conn = create_sqlite_connection(None, Some("settle_ok"), true).await?;
    let setup = test_setup();

    let request = validate_new_request(&new_request("50"), &setup)?;
    let request = insert_payment_request(&conn, &request).await?;

    let events = vec![transfer_to(REQUESTER, "50.005", 7)];
    let settled =
        settle_request_with_transfers(&conn, &request, USDC_DECIMALS, tolerance(), &events)
            .await?
            .unwrap();

    assert_eq!(settled.status, REQUEST_STATUS_PAID);
    assert_eq!(settled.paid_by.as_deref(), Some(PAYER));
    assert_eq!(
        settled.tx_hash.as_deref(),
        Some(format!("{:#x}", H256::from_low_u64_be(7)).as_str())
    );
    assert!(settled.paid_date.is_some());
    //amount stays as requested, not as transferred
    assert_eq!(settled.amount, "50");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_out_of_tolerance_stays_open() -> Result<(), anyhow::Error> {
    let conn = create_sqlite_connection(None, Some("settle_tolerance"), true).await?;
    let setup = test_setup();

    let request = validate_new_request(&new_request("50"), &setup)?;
    let request = insert_payment_request(&conn, &request).await?;
    let events = vec![transfer_to(REQUESTER, "40", 1)];
    let settled =
        settle_request_with_transfers(&conn, &request, USDC_DECIMALS, tolerance(), &events)
            .await?;
    assert!(settled.is_none());

    let request = validate_new_request(&new_request("25"), &setup)?;
    let request = insert_payment_request(&conn, &request).await?;
    let events = vec![transfer_to(REQUESTER, "20", 2)];
    let settled =
        settle_request_with_transfers(&conn, &request, USDC_DECIMALS, tolerance(), &events)
            .await?;
    assert!(settled.is_none());

    let open = get_payment_requests(&conn, Some(REQUEST_STATUS_OPEN), None, None).await?;
    assert_eq!(open.len(), 2);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ignores_transfers_to_other_addresses() -> Result<(), anyhow::Error> {
    let conn = create_sqlite_connection(None, Some("settle_other_addr"), true).await?;
    let setup = test_setup();

    let request = validate_new_request(&new_request("50"), &setup)?;
    let request = insert_payment_request(&conn, &request).await?;

    //exact amount, wrong destination
    let events = vec![transfer_to(PAYER, "50", 3)];
    let settled =
        settle_request_with_transfers(&conn, &request, USDC_DECIMALS, tolerance(), &events)
            .await?;
    assert!(settled.is_none());

    let fetched = get_payment_request(&conn, &request.id).await?.unwrap();
    assert_eq!(fetched.status, REQUEST_STATUS_OPEN);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_no_duplicate_settlement() -> Result<(), anyhow::Error> {
    let conn = create_sqlite_connection(None, Some("settle_duplicate"), true).await?;
    let setup = test_setup();

    let request = validate_new_request(&new_request("50"), &setup)?;
    let request = insert_payment_request(&conn, &request).await?;

    let events = vec![transfer_to(REQUESTER, "50", 11)];
    let settled =
        settle_request_with_transfers(&conn, &request, USDC_DECIMALS, tolerance(), &events)
            .await?;
    assert!(settled.is_some());

    //a second cycle still holds the stale open row - the guarded update refuses it
    let events = vec![transfer_to(REQUESTER, "50", 12)];
    let settled_again =
        settle_request_with_transfers(&conn, &request, USDC_DECIMALS, tolerance(), &events)
            .await?;
    assert!(settled_again.is_none());

    let fetched = get_payment_request(&conn, &request.id).await?.unwrap();
    assert_eq!(
        fetched.tx_hash.as_deref(),
        Some(format!("{:#x}", H256::from_low_u64_be(11)).as_str())
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cancel_paid_request_rejected() -> Result<(), anyhow::Error> {
    let conn = create_sqlite_connection(None, Some("settle_cancel_paid"), true).await?;
    let setup = test_setup();

    let request = validate_new_request(&new_request("50"), &setup)?;
    let request = insert_payment_request(&conn, &request).await?;

    let events = vec![transfer_to(REQUESTER, "50", 21)];
    settle_request_with_transfers(&conn, &request, USDC_DECIMALS, tolerance(), &events)
        .await?
        .unwrap();

    let cancelled = cancel_payment_request(&conn, &request.id).await?;
    assert!(cancelled.is_none());

    let fetched = get_payment_request(&conn, &request.id).await?.unwrap();
    assert_eq!(fetched.status, REQUEST_STATUS_PAID);
    assert_eq!(fetched.paid_by.as_deref(), Some(PAYER));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_first_match_wins() -> Result<(), anyhow::Error> {
    let conn = create_sqlite_connection(None, Some("settle_first_match"), true).await?;
    let setup = test_setup();

    let request = validate_new_request(&new_request("50"), &setup)?;
    let request = insert_payment_request(&conn, &request).await?;

    //two candidate transfers within tolerance - the first in the list is recorded
    let events = vec![
        transfer_to(REQUESTER, "50.005", 31),
        transfer_to(REQUESTER, "49.995", 32),
    ];
    let settled =
        settle_request_with_transfers(&conn, &request, USDC_DECIMALS, tolerance(), &events)
            .await?
            .unwrap();
    assert_eq!(
        settled.tx_hash.as_deref(),
        Some(format!("{:#x}", H256::from_low_u64_be(31)).as_str())
    );
    Ok(())
}
