//! Storage layer for cri
//!
//! A single SQLite file holds both the content tree and the processed-node
//! table, so one import run touches exactly one durable store.

pub mod migrations;
pub mod sqlite;

pub use sqlite::Database;
