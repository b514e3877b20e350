pub mod config_store;
pub mod encoding;
pub mod fetch;
pub mod merge;
pub mod serializer;
pub mod storage;
pub mod sync;
