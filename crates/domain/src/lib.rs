//! Domain layer for the ExpenseShare backend.
//!
//! This crate contains:
//! - Domain models (Group, Transaction, GroupInvite, UserProfile)
//! - Business logic services (split computation)
//! - Broadcast event names and envelope

pub mod events;
pub mod models;
pub mod services;
