//! Cluster Cache - A capacity-bounded in-memory content cache
//!
//! Each process keeps its own size-bounded store, discovers peer nodes
//! through a directory service, and propagates invalidations to healthy
//! peers on a best-effort basis.

pub mod api;
pub mod cache;
pub mod cluster;
pub mod config;
pub mod error;
pub mod models;
pub mod node;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use node::CacheNode;
pub use tasks::spawn_membership_task;
