//! Domain layer - pure business types and rules, no I/O.

pub mod account;
pub mod billing;
pub mod foundation;
