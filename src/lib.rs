//! PriceGuard - billing reconciliation between PriceGuard accounts and the
//! Stripe and PayPal payment processors.
//!
//! Browser-initiated billing commands call the processors and persist what
//! they return; signed processor webhooks are verified and folded into the
//! same account rows.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
