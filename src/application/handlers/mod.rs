//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations. Each one
//! takes its ports as `Arc<dyn Trait>` and exposes a single `handle` method.

pub mod account;
pub mod billing;
pub mod paypal;
pub mod webhooks;

mod lookup;

#[cfg(test)]
mod test_support;
