//! Data models for statements, transactions and configuration.

pub mod config;
pub mod document;
pub mod transaction;
