//! HTTP route handlers.

pub mod export;
pub mod groups;
pub mod health;
pub mod invites;
pub mod profiles;
pub mod stats;
pub mod transactions;
pub mod ws;
