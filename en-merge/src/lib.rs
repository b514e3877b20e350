//! Keeps a merged English Rime dictionary in sync with upstream word lists.

pub mod error;
pub mod model;
pub mod parsers;
pub mod services;

pub use error::{Result, SyncError};
pub use model::dictionary::{Dictionary, KeyPolicy};
