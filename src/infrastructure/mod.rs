//! Infrastructure layer: configuration, logging, and file storage adapters

pub mod config;
pub mod logging;
pub mod storage;
