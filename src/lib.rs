#[macro_use]
extern crate rocket;

pub mod auth;
pub mod candidate_service;
pub mod config;
pub mod database;
pub mod downstream;
pub mod env;
pub mod error;
pub mod health;
pub mod telemetry;
pub mod test_service;
pub mod validation;
#[cfg(test)]
mod test;

use error::AppError;
use thiserror::Error;

/// Startup failures of either service binary.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("{0}")]
    Figment(#[from] rocket::figment::Error),
    #[error("{0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Application error: {0}")]
    App(#[from] AppError),
    #[error("{0}")]
    Rocket(Box<rocket::Error>),
}

impl From<rocket::Error> for Error {
    fn from(value: rocket::Error) -> Self {
        Error::Rocket(Box::new(value))
    }
}
