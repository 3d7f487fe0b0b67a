pub mod config;
pub mod db;
pub mod error;
pub mod eth;
pub mod request;
pub mod runtime;
pub mod server;
pub mod settle;
pub mod setup;
pub mod utils;
