//! HTTP adapter for accounts.
//!
//! - `POST /api/auth/register` - Create an account
//! - `POST /api/auth/login` - Check credentials

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::account_routes;
