// Library interface for testing

pub mod audio;
pub mod auth;
pub mod checkout;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod db;
pub mod db_postgres;
pub mod error;
pub mod log_sink;
pub mod media;
pub mod models;
pub mod outcome;
pub mod pages;
pub mod queries;
pub mod schema;
pub mod scripts;
pub mod serve;

pub use db::Storage;
pub use outcome::Outcome;
