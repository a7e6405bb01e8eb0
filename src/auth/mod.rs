pub mod authentication;
pub mod permissions;
pub mod token;
pub mod user;

pub use permissions::*;
pub use token::*;
pub use user::*;
