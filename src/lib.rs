pub mod config;
pub mod database;
pub mod drafts;
pub mod error;
pub mod handlers;
pub mod listing;
pub mod message_broker;
pub mod query;
pub mod record_locks;
pub mod store;
