use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize, sqlx::FromRow, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequestDbObj {
    pub id: String,
    pub requester_addr: String,
    pub amount: String,
    pub token_addr: String,
    pub token_symbol: String,
    pub chain_id: i64,
    pub chain_name: String,
    pub caption: Option<String>,
    pub status: String,
    pub paid_by: Option<String>,
    pub tx_hash: Option<String>,
    pub created_date: DateTime<Utc>,
    pub paid_date: Option<DateTime<Utc>>,
}
