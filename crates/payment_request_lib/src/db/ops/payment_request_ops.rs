use crate::db::model::*;
use sqlx::Executor;
use sqlx::Sqlite;
use sqlx::SqlitePool;

pub const REQUEST_STATUS_OPEN: &str = "open";
pub const REQUEST_STATUS_PAID: &str = "paid";
pub const REQUEST_STATUS_CANCELLED: &str = "cancelled";

pub fn is_valid_request_status(status: &str) -> bool {
    status == REQUEST_STATUS_OPEN
        || status == REQUEST_STATUS_PAID
        || status == REQUEST_STATUS_CANCELLED
}

pub async fn insert_payment_request<'c, E>(
    executor: E,
    payment_request: &PaymentRequestDbObj,
) -> Result<PaymentRequestDbObj, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    let res = sqlx::query_as::<_, PaymentRequestDbObj>(
        r"INSERT INTO payment_requests
(id, requester_addr, amount, token_addr, token_symbol, chain_id, chain_name, caption, status, paid_by, tx_hash, created_date, paid_date)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NULL, NULL, strftime('%Y-%m-%dT%H:%M:%f', 'now'), NULL) RETURNING *;
",
    )
    .bind(&payment_request.id)
    .bind(&payment_request.requester_addr)
    .bind(&payment_request.amount)
    .bind(&payment_request.token_addr)
    .bind(&payment_request.token_symbol)
    .bind(payment_request.chain_id)
    .bind(&payment_request.chain_name)
    .bind(&payment_request.caption)
    .bind(&payment_request.status)
    .fetch_one(executor)
    .await?;
    Ok(res)
}

pub async fn get_payment_request<'c, E>(
    executor: E,
    request_id: &str,
) -> Result<Option<PaymentRequestDbObj>, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, PaymentRequestDbObj>(
        r"SELECT * FROM payment_requests WHERE id = $1",
    )
    .bind(request_id)
    .fetch_optional(executor)
    .await?;
    Ok(row)
}

pub async fn get_payment_requests(
    conn: &SqlitePool,
    status: Option<&str>,
    requester: Option<&str>,
    limit: Option<i64>,
) -> Result<Vec<PaymentRequestDbObj>, sqlx::Error> {
    let limit = limit.unwrap_or(i64::MAX);
    let rows = sqlx::query_as::<_, PaymentRequestDbObj>(
        r"SELECT * FROM payment_requests
WHERE ($1 IS NULL OR status = $1)
AND ($2 IS NULL OR requester_addr = $2)
ORDER BY created_date DESC
LIMIT $3",
    )
    .bind(status)
    .bind(requester)
    .bind(limit)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

pub async fn get_open_requests_for_chain(
    conn: &SqlitePool,
    chain_id: i64,
) -> Result<Vec<PaymentRequestDbObj>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PaymentRequestDbObj>(
        r"SELECT * FROM payment_requests
WHERE status = 'open' AND chain_id = $1
ORDER BY created_date ASC",
    )
    .bind(chain_id)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

///Guarded transition open -> paid. Returns None when the request
///is no longer open (already settled or cancelled by a concurrent write).
pub async fn mark_request_paid(
    conn: &SqlitePool,
    request_id: &str,
    paid_by: &str,
    tx_hash: &str,
) -> Result<Option<PaymentRequestDbObj>, sqlx::Error> {
    let row = sqlx::query_as::<_, PaymentRequestDbObj>(
        r"UPDATE payment_requests SET
status = 'paid',
paid_by = $2,
tx_hash = $3,
paid_date = strftime('%Y-%m-%dT%H:%M:%f', 'now')
WHERE id = $1 AND status = 'open' RETURNING *;
",
    )
    .bind(request_id)
    .bind(paid_by)
    .bind(tx_hash)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

///Guarded transition open -> cancelled. Returns None when not open.
pub async fn cancel_payment_request(
    conn: &SqlitePool,
    request_id: &str,
) -> Result<Option<PaymentRequestDbObj>, sqlx::Error> {
    let row = sqlx::query_as::<_, PaymentRequestDbObj>(
        r"UPDATE payment_requests SET
status = 'cancelled'
WHERE id = $1 AND status = 'open' RETURNING *;
",
    )
    .bind(request_id)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

pub async fn get_request_count(
    conn: &SqlitePool,
    status: Option<&str>,
) -> Result<i64, sqlx::Error> {
    let count = sqlx::query_scalar::<_, i64>(
        r"SELECT COUNT(*) FROM payment_requests WHERE ($1 IS NULL OR status = $1)",
    )
    .bind(status)
    .fetch_one(conn)
    .await?;
    Ok(count)
}
