//! Repository implementations for database access.

mod group;
mod invite;
mod profile;
mod transaction;

pub use group::GroupRepository;
pub use invite::InviteRepository;
pub use profile::ProfileRepository;
pub use transaction::{TransactionQuery, TransactionRepository};
