pub mod client;
pub mod commands;
pub mod config;
pub mod core;
pub mod error;
pub mod output;
pub mod prompt;
pub mod utils;
