//! Registration and login.

mod login;
mod register;

pub use login::{LoginCommand, LoginHandler};
pub use register::{RegisterCommand, RegisterHandler};
