//! Domain services for ExpenseShare.
//!
//! Services contain business logic that operates on domain models.

pub mod split;

pub use split::{compute_splits, equal_share, SplitDraft};
