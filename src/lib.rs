//! Plaid link and transaction endpoints with a budget summary on top.

pub mod display;
pub mod error;
pub mod server;
pub mod service;
pub mod settings;
pub mod upstream;

pub static CLIENT_NAME: &str = "plaid-budget";
