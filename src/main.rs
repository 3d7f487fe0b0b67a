mod options;

use crate::options::{PaymentCommands, PaymentOptions};
use actix_web::Scope;
use actix_web::{web, App, HttpServer};
use payment_request_lib::db::create_sqlite_connection;
use payment_request_lib::db::ops::insert_payment_request;
use payment_request_lib::request::{validate_new_request, NewPaymentRequest};
use payment_request_lib::server::*;

use payment_request_lib::{
    config, err_custom_create,
    error::PaymentError,
    runtime::start_settlement_engine,
    settle::run_settlement_cycle,
    setup::PaymentSetup,
};
use std::env;

use std::sync::Arc;
use structopt::StructOpt;
use tokio::sync::Mutex;

async fn main_internal() -> Result<(), PaymentError> {
    dotenv::dotenv().ok();
    env::set_var(
        "RUST_LOG",
        env::var("RUST_LOG").unwrap_or("info,sqlx::query=warn,web3=warn".to_string()),
    );

    env_logger::init();
    let cli: PaymentOptions = PaymentOptions::from_args();

    let config = config::Config::load("config-requests.toml").await?;

    match cli.commands {
        PaymentCommands::Run { run_options } => {
            let db_filename =
                env::var("DB_SQLITE_FILENAME").expect("Specify DB_SQLITE_FILENAME env variable");
            log::info!("connecting to sqlite file db: {}", db_filename);
            let conn = create_sqlite_connection(Some(&db_filename), None, true).await?;

            let sp = start_settlement_engine(&db_filename, config, Some(conn.clone())).await?;
            if run_options.skip_settlement_loop {
                log::warn!("Settlement loop disabled, requests will stay open");
                sp.runtime_handle.abort();
            }

            let server_data = web::Data::new(Box::new(ServerData {
                shared_state: sp.shared_state.clone(),
                db_connection: Arc::new(Mutex::new(conn)),
                payment_setup: sp.setup.clone(),
            }));

            let debug = run_options.debug;
            let server = HttpServer::new(move || {
                let cors = actix_cors::Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600);

                let scope = runtime_web_scope(Scope::new("payments"), server_data.clone(), debug);

                App::new().wrap(cors).service(scope)
            })
            .workers(run_options.http_threads as usize)
            .bind((run_options.http_addr.as_str(), run_options.http_port))
            .expect("Cannot run server")
            .run();

            log::info!(
                "http server starting on {}:{}",
                run_options.http_addr,
                run_options.http_port
            );

            server.await.map_err(|e| {
                err_custom_create!("Error while running server: {}", e)
            })?;
        }
        PaymentCommands::SettleNow { settle_now_options } => {
            let db_filename =
                env::var("DB_SQLITE_FILENAME").expect("Specify DB_SQLITE_FILENAME env variable");
            let conn = create_sqlite_connection(Some(&db_filename), None, true).await?;

            let mut payment_setup = PaymentSetup::new(&config)?;
            if let Some(chain_name) = &settle_now_options.chain_name {
                let chain_cfg = config.chain.get(chain_name).ok_or(err_custom_create!(
                    "Chain {} not found in config file",
                    chain_name
                ))?;
                payment_setup
                    .chain_setup
                    .retain(|chain_id, _| *chain_id == chain_cfg.chain_id);
            }

            let summary = run_settlement_cycle(&conn, &payment_setup).await?;
            log::info!(
                "Settlement cycle done: {} open requests scanned, {} settled",
                summary.open_requests,
                summary.settled_requests
            );
        }
        PaymentCommands::CreateRequest {
            create_request_options,
        } => {
            let chain_cfg = config
                .chain
                .get(&create_request_options.chain_name)
                .ok_or(err_custom_create!(
                    "Chain {} not found in config file",
                    create_request_options.chain_name
                ))?;

            let db_filename =
                env::var("DB_SQLITE_FILENAME").expect("Specify DB_SQLITE_FILENAME env variable");
            let conn = create_sqlite_connection(Some(&db_filename), None, true).await?;
            let payment_setup = PaymentSetup::new(&config)?;

            let new_request = NewPaymentRequest {
                requester_addr: create_request_options.requester.clone(),
                amount: create_request_options.amount,
                token_addr: format!("{:#x}", chain_cfg.token.address),
                token_symbol: chain_cfg.token.symbol.clone(),
                chain_id: chain_cfg.chain_id,
                chain_name: chain_cfg.chain_name.clone(),
                caption: create_request_options.caption.clone(),
            };
            let request = validate_new_request(&new_request, &payment_setup)?;
            let request = insert_payment_request(&conn, &request)
                .await
                .map_err(|e| err_custom_create!("Error inserting request: {}", e))?;
            println!(
                "{}",
                serde_json::to_string_pretty(&request).map_err(|err| err_custom_create!(
                    "Something went wrong when serializing to json {err}"
                ))?
            );
        }
    }

    Ok(())
}

#[actix_web::main]
async fn main() -> Result<(), PaymentError> {
    match main_internal().await {
        Ok(_) => Ok(()),
        Err(e) => {
            eprintln!("Error: {e}");
            Err(e)
        }
    }
}
