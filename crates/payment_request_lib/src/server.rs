use crate::db::ops::*;
use crate::request::{validate_new_request, NewPaymentRequest};
use crate::runtime::SharedState;
use crate::setup::PaymentSetup;
use actix_web::web::Data;
use actix_web::{web, HttpRequest, HttpResponse, Responder, Scope};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use web3::types::Address;

pub struct ServerData {
    pub shared_state: Arc<Mutex<SharedState>>,
    pub db_connection: Arc<Mutex<SqlitePool>>,
    pub payment_setup: PaymentSetup,
}

macro_rules! return_on_error {
    ( $e:expr ) => {
        match $e {
            Ok(x) => x,
            Err(err) => {
                return HttpResponse::InternalServerError().json(json!({
                    "error": err.to_string()
                }))
            },
        }
    }
}

pub async fn create_payment_request(
    data: Data<Box<ServerData>>,
    new_request: web::Json<NewPaymentRequest>,
) -> impl Responder {
    let request = match validate_new_request(&new_request, &data.payment_setup) {
        Ok(request) => request,
        Err(err) => {
            return HttpResponse::BadRequest().json(json!({
                "error": err.to_string()
            }))
        }
    };

    let request = {
        let db_conn = data.db_connection.lock().await;
        return_on_error!(insert_payment_request(&*db_conn, &request).await)
    };
    log::info!(
        "Created payment request {} for {} {} to {}",
        request.id,
        request.amount,
        request.token_symbol,
        request.requester_addr
    );

    HttpResponse::Created().json(json!({
        "request": request,
    }))
}

pub async fn payment_request_details(
    data: Data<Box<ServerData>>,
    req: HttpRequest,
) -> impl Responder {
    let request_id = req.match_info().get("request_id").unwrap_or("");

    let request = {
        let db_conn = data.db_connection.lock().await;
        return_on_error!(get_payment_request(&*db_conn, request_id).await)
    };

    match request {
        Some(request) => HttpResponse::Ok().json(json!({
            "request": request,
        })),
        None => HttpResponse::NotFound().json(json!({
            "error": format!("Payment request {request_id} not found")
        })),
    }
}

#[derive(Deserialize)]
pub struct ListRequestsQuery {
    pub status: Option<String>,
    pub requester: Option<String>,
    pub limit: Option<i64>,
}

pub async fn payment_requests_list(
    data: Data<Box<ServerData>>,
    query: web::Query<ListRequestsQuery>,
) -> impl Responder {
    if let Some(status) = &query.status {
        if !is_valid_request_status(status) {
            return HttpResponse::BadRequest().json(json!({
                "error": format!("Unknown status filter: {status}")
            }));
        }
    }
    let requester = match &query.requester {
        Some(requester) => {
            let addr = match Address::from_str(requester) {
                Ok(addr) => addr,
                Err(_err) => {
                    return HttpResponse::BadRequest().json(json!({
                        "error": "Cannot parse requester address"
                    }))
                }
            };
            Some(format!("{addr:#x}"))
        }
        None => None,
    };

    let requests = {
        let db_conn = data.db_connection.lock().await;
        return_on_error!(
            get_payment_requests(
                &db_conn,
                query.status.as_deref(),
                requester.as_deref(),
                query.limit,
            )
            .await
        )
    };

    HttpResponse::Ok().json(json!({
        "requests": requests,
    }))
}

pub async fn cancel_payment_request_endpoint(
    data: Data<Box<ServerData>>,
    req: HttpRequest,
) -> impl Responder {
    let request_id = req.match_info().get("request_id").unwrap_or("");

    let existing = {
        let db_conn = data.db_connection.lock().await;
        return_on_error!(get_payment_request(&*db_conn, request_id).await)
    };
    let Some(existing) = existing else {
        return HttpResponse::NotFound().json(json!({
            "error": format!("Payment request {request_id} not found")
        }));
    };

    let cancelled = {
        let db_conn = data.db_connection.lock().await;
        return_on_error!(cancel_payment_request(&db_conn, request_id).await)
    };

    match cancelled {
        Some(request) => {
            log::info!("Cancelled payment request {}", request.id);
            HttpResponse::Ok().json(json!({
                "request": request,
            }))
        }
        None => HttpResponse::Conflict().json(json!({
            "error": format!(
                "Payment request {request_id} is {}, only open requests can be cancelled",
                existing.status
            )
        })),
    }
}

pub async fn requests_count(data: Data<Box<ServerData>>, _req: HttpRequest) -> impl Responder {
    let open_count = {
        let db_conn = data.db_connection.lock().await;
        return_on_error!(get_request_count(&db_conn, Some(REQUEST_STATUS_OPEN)).await)
    };
    let paid_count = {
        let db_conn = data.db_connection.lock().await;
        return_on_error!(get_request_count(&db_conn, Some(REQUEST_STATUS_PAID)).await)
    };
    let cancelled_count = {
        let db_conn = data.db_connection.lock().await;
        return_on_error!(get_request_count(&db_conn, Some(REQUEST_STATUS_CANCELLED)).await)
    };

    HttpResponse::Ok().json(json!({
        "requestsOpen": open_count,
        "requestsPaid": paid_count,
        "requestsCancelled": cancelled_count,
    }))
}

pub async fn config_endpoint(data: Data<Box<ServerData>>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "config": data.payment_setup,
    }))
}

pub async fn debug_endpoint(data: Data<Box<ServerData>>) -> impl Responder {
    let shared_state = data.shared_state.lock().await.clone();

    HttpResponse::Ok().json(json!({
        "sharedState": shared_state,
    }))
}

pub async fn greet(_req: HttpRequest) -> impl Responder {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    HttpResponse::Ok().json(json!({
        "name": "payment_request_lib",
        "version": VERSION,
    }))
}

pub fn runtime_web_scope(scope: Scope, server_data: Data<Box<ServerData>>, debug: bool) -> Scope {
    let api_scope = Scope::new("/api");
    let mut api_scope = api_scope
        .app_data(server_data)
        .route(
            "/payment-requests",
            web::post().to(create_payment_request),
        )
        .route("/payment-requests", web::get().to(payment_requests_list))
        .route(
            "/payment-requests/count",
            web::get().to(requests_count),
        )
        .route(
            "/payment-requests/{request_id}",
            web::get().to(payment_request_details),
        )
        .route(
            "/payment-requests/{request_id}",
            web::delete().to(cancel_payment_request_endpoint),
        )
        .route("/config", web::get().to(config_endpoint))
        .route("/", web::get().to(greet))
        .route("/version", web::get().to(greet));

    if debug {
        log::info!("Debug endpoints enabled");
        api_scope = api_scope.route("/debug", web::get().to(debug_endpoint));
    }

    // Add version endpoint to /api, /api/ and /api/version
    let scope = scope.route("/api", web::get().to(greet));
    scope.service(api_scope)
}
