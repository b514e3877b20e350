pub mod config;
pub mod dictionary;
