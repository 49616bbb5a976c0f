//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application core to external systems:
//! - `auth` - argon2 password hashing
//! - `http` - axum routers, handlers and DTOs
//! - `memory` - in-process stores for tests and local runs
//! - `paypal` - PayPal REST client and mock
//! - `postgres` - sqlx repositories and embedded migrations
//! - `stripe` - Stripe REST client and mock

pub mod auth;
pub mod http;
pub mod memory;
pub mod paypal;
pub mod postgres;
pub mod stripe;
