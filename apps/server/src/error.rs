use std::io::Error as IoError;

use actix_web::ResponseError;
use pinger::ConfigError;
use pinger::monitoring::SetupError;
use pinger::reporter::ReporterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0:#}")]
    Io(#[from] IoError),
    #[error("Address parsing error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Metrics error: {0}")]
    Reporter(#[from] ReporterError),
    #[error("Check pipeline setup error: {0}")]
    Setup(#[from] SetupError),
    #[error("Metrics encoding error: {0}")]
    Encoding(#[from] prometheus::Error),
}

impl ResponseError for AppError {}
