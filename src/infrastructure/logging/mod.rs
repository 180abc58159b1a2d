//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber. Console logs go
//! to stderr so stdout carries only results; file logs rotate via
//! tracing-appender.

pub mod logger;

pub use logger::LoggerImpl;
