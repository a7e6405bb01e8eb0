pub mod utils;

pub use utils::test_utils;

mod clients;
mod config;
mod sessions;
mod vacancies;
