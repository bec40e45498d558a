//! Background Tasks Module
//!
//! Contains background tasks that run periodically during node operation.
//!
//! # Tasks
//! - Membership refresh: rediscovers and probes peers at configured intervals

mod membership;

pub use membership::spawn_membership_task;
