//! Domain models for ExpenseShare.

pub mod group;
pub mod invite;
pub mod profile;
pub mod transaction;

pub use group::{Group, GroupBalances, GroupMember, GroupWithMembers};
pub use invite::GroupInvite;
pub use profile::UserProfile;
pub use transaction::{Transaction, TransactionSplit, TransactionType, TransactionWithSplits};
