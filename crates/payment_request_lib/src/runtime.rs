use crate::db::create_sqlite_connection;

use crate::error::PaymentError;

use crate::config;
use crate::setup::PaymentSetup;
use sqlx::SqlitePool;

use crate::settle::settlement_loop;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

///Engine state shared between the settlement loop and the http server
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedState {
    pub cycles_completed: u64,
    pub requests_settled: u64,
    pub last_cycle_start: Option<DateTime<Utc>>,
    pub last_cycle_error: Option<String>,
    pub idling: bool,
}

impl SharedState {
    pub fn new() -> Self {
        SharedState {
            cycles_completed: 0,
            requests_settled: 0,
            last_cycle_start: None,
            last_cycle_error: None,
            idling: false,
        }
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

pub struct PaymentRuntime {
    pub runtime_handle: JoinHandle<()>,
    pub setup: PaymentSetup,
    pub shared_state: Arc<Mutex<SharedState>>,
    pub conn: SqlitePool,
}

pub async fn start_settlement_engine(
    db_filename: &str,
    config: config::Config,
    conn: Option<SqlitePool>,
) -> Result<PaymentRuntime, PaymentError> {
    let payment_setup = PaymentSetup::new(&config)?;
    log::debug!("Starting settlement engine: {:#?}", payment_setup);

    let conn = if let Some(conn) = conn {
        conn
    } else {
        log::info!("connecting to sqlite file db: {}", db_filename);
        create_sqlite_connection(Some(db_filename), None, true).await?
    };

    let ps = payment_setup.clone();

    let shared_state = Arc::new(Mutex::new(SharedState::new()));
    let shared_state_clone = shared_state.clone();
    let conn_ = conn.clone();
    let jh = tokio::spawn(async move { settlement_loop(shared_state_clone, &conn_, &ps).await });

    Ok(PaymentRuntime {
        runtime_handle: jh,
        setup: payment_setup,
        shared_state,
        conn,
    })
}
