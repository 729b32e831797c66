pub mod authorization;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use error::AuthError;
