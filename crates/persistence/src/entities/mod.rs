//! Database entity definitions (row mappings).

mod group;
mod invite;
mod profile;
mod transaction;

pub use group::{GroupEntity, GroupMemberEntity};
pub use invite::{GroupInviteEntity, InviteWithGroupEntity};
pub use profile::UserProfileEntity;
pub use transaction::{
    MemberBalanceRow, TransactionEntity, TransactionSplitEntity, TransactionTypeDb,
};
