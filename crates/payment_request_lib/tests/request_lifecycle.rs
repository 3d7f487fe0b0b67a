use payment_request_lib::config::Config;
use payment_request_lib::db::create_sqlite_connection;
use payment_request_lib::db::ops::*;
use payment_request_lib::request::{validate_new_request, NewPaymentRequest};
use payment_request_lib::setup::PaymentSetup;
use rust_decimal::Decimal;
use std::str::FromStr;

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
const REQUESTER: &str = "0xb1c4d937a1b9bfc17a2eb92d3577f8b66763bfc1";

fn test_setup() -> PaymentSetup {
    let config = Config::load_from_str(TEST_CONFIG).unwrap();
    PaymentSetup::new(&config).unwrap()
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
async fn test_create_request_starts_open() -> Result<(), anyhow::Error> {
    let conn = create_sqlite_connection(None, Some("req_create"), true).await?;
    let setup = test_setup();

    let request = validate_new_request(&new_request("50"), &setup)?;
    let request = insert_payment_request(&conn, &request).await?;

    assert_eq!(request.status, REQUEST_STATUS_OPEN);
    assert_eq!(request.amount, "50");
    assert_eq!(request.requester_addr, REQUESTER);
    assert!(request.paid_by.is_none());
    assert!(request.tx_hash.is_none());
    assert!(request.paid_date.is_none());

    let fetched = get_payment_request(&conn, &request.id).await?.unwrap();
    assert_eq!(fetched.id, request.id);
    assert_eq!(fetched.status, REQUEST_STATUS_OPEN);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_request_validation() -> Result<(), anyhow::Error> {
    let setup = test_setup();

    let mut bad_addr = new_request("50");
    bad_addr.requester_addr = "not-an-address".to_string();
    assert!(validate_new_request(&bad_addr, &setup).is_err());

    let mut zero_amount = new_request("0");
    zero_amount.amount = Decimal::from(0);
    assert!(validate_new_request(&zero_amount, &setup).is_err());

    let below_minimum = new_request("0.001");
    assert!(validate_new_request(&below_minimum, &setup).is_err());

    let mut unknown_chain = new_request("50");
    unknown_chain.chain_id = 1;
    assert!(validate_new_request(&unknown_chain, &setup).is_err());

    let mut wrong_token = new_request("50");
    wrong_token.token_addr = "0x1c7d4b196cb0c7b01d743fbc6116a902379c7238".to_string();
    assert!(validate_new_request(&wrong_token, &setup).is_err());

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cancel_open_request() -> Result<(), anyhow::Error> {
    let conn = create_sqlite_connection(None, Some("req_cancel"), true).await?;
    let setup = test_setup();

    let request = validate_new_request(&new_request("10"), &setup)?;
    let request = insert_payment_request(&conn, &request).await?;

    let cancelled = cancel_payment_request(&conn, &request.id).await?.unwrap();
    assert_eq!(cancelled.status, REQUEST_STATUS_CANCELLED);

    //idempotent rejection - second cancel finds no open row
    let again = cancel_payment_request(&conn, &request.id).await?;
    assert!(again.is_none());

    let fetched = get_payment_request(&conn, &request.id).await?.unwrap();
    assert_eq!(fetched.status, REQUEST_STATUS_CANCELLED);

    //a cancelled request can never become paid
    let paid = mark_request_paid(&conn, &request.id, REQUESTER, "0xdead").await?;
    assert!(paid.is_none());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_requests_filters() -> Result<(), anyhow::Error> {
    let conn = create_sqlite_connection(None, Some("req_list"), true).await?;
    let setup = test_setup();

    let first = insert_payment_request(&conn, &validate_new_request(&new_request("10"), &setup)?)
        .await?;
    let _second =
        insert_payment_request(&conn, &validate_new_request(&new_request("20"), &setup)?).await?;

    let mut other = new_request("30");
    other.requester_addr = "0x09e4f0ae44d5e60d44a8928af7531e6a862290bc".to_string();
    let _third = insert_payment_request(&conn, &validate_new_request(&other, &setup)?).await?;

    cancel_payment_request(&conn, &first.id).await?.unwrap();

    let all = get_payment_requests(&conn, None, None, None).await?;
    assert_eq!(all.len(), 3);

    let open = get_payment_requests(&conn, Some(REQUEST_STATUS_OPEN), None, None).await?;
    assert_eq!(open.len(), 2);

    let by_requester = get_payment_requests(&conn, None, Some(REQUESTER), None).await?;
    assert_eq!(by_requester.len(), 2);

    let open_by_requester =
        get_payment_requests(&conn, Some(REQUEST_STATUS_OPEN), Some(REQUESTER), None).await?;
    assert_eq!(open_by_requester.len(), 1);
    assert_eq!(open_by_requester[0].amount, "20");

    let limited = get_payment_requests(&conn, None, None, Some(1)).await?;
    assert_eq!(limited.len(), 1);

    assert_eq!(get_request_count(&conn, Some(REQUEST_STATUS_OPEN)).await?, 2);
    assert_eq!(
        get_request_count(&conn, Some(REQUEST_STATUS_CANCELLED)).await?,
        1
    );
    Ok(())
}
