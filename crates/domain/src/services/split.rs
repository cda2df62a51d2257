//! Equal-split computation for shared transactions.

use rust_decimal::Decimal;

use crate::models::group::GroupMember;

/// A split to be persisted, one per group member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitDraft {
    pub member_name: String,
    pub amount: Decimal,
    pub is_paid: bool,
}

/// Equal share of `amount` across `count` members, rounded to cents.
/// No remainder redistribution: the shares may sum to slightly less or
/// more than `amount`.
pub fn equal_share(amount: Decimal, count: usize) -> Decimal {
    (amount / Decimal::from(count as u64)).round_dp(2)
}

/// Compute equal splits of `amount` across `members`.
///
/// Each share is `amount / member_count` rounded to two decimal
/// places, with no remainder redistribution: the sum of shares may
/// differ from `amount` by less than a cent per member. The member
/// whose name matches `paid_by` is marked paid at creation; if no
/// member matches, every split starts unpaid.
///
/// A group with zero members yields an empty split set, the degenerate
/// shared transaction case.
pub fn compute_splits(amount: Decimal, members: &[GroupMember], paid_by: &str) -> Vec<SplitDraft> {
    if members.is_empty() {
        return Vec::new();
    }

    let share = equal_share(amount, members.len());

    members
        .iter()
        .map(|member| SplitDraft {
            member_name: member.name.clone(),
            amount: share,
            is_paid: member.name == paid_by,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn member(name: &str) -> GroupMember {
        GroupMember {
            id: Uuid::new_v4(),
            group_id: Uuid::new_v4(),
            name: name.to_string(),
            email: None,
            joined_at: Utc::now(),
        }
    }

    #[test]
    fn test_three_way_even_split() {
        // Roommates scenario: 300 across A, B, C paid by A.
        let members = vec![member("A"), member("B"), member("C")];
        let splits = compute_splits(Decimal::from(300), &members, "A");

        assert_eq!(splits.len(), 3);
        for split in &splits {
            assert_eq!(split.amount, Decimal::from(100));
        }
        assert!(splits[0].is_paid);
        assert!(!splits[1].is_paid);
        assert!(!splits[2].is_paid);
    }

    #[test]
    fn test_sum_within_rounding_tolerance() {
        let members = vec![member("A"), member("B"), member("C")];
        let amount: Decimal = "100.00".parse().unwrap();
        let splits = compute_splits(amount, &members, "A");

        let total: Decimal = splits.iter().map(|s| s.amount).sum();
        let drift = (total - amount).abs();
        // Tolerance of one cent per split.
        assert!(drift <= "0.03".parse::<Decimal>().unwrap(), "drift {}", drift);
        assert_eq!(splits[0].amount, "33.33".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_exactly_one_paid_split() {
        let members = vec![member("A"), member("B"), member("C"), member("D")];
        let splits = compute_splits(Decimal::from(40), &members, "C");
        let paid: Vec<_> = splits.iter().filter(|s| s.is_paid).collect();
        assert_eq!(paid.len(), 1);
        assert_eq!(paid[0].member_name, "C");
    }

    #[test]
    fn test_payer_not_a_member_yields_zero_paid() {
        let members = vec![member("A"), member("B")];
        let splits = compute_splits(Decimal::from(50), &members, "Zed");
        assert_eq!(splits.len(), 2);
        assert!(splits.iter().all(|s| !s.is_paid));
    }

    #[test]
    fn test_zero_members_degenerate_case() {
        let splits = compute_splits(Decimal::from(100), &[], "A");
        assert!(splits.is_empty());
    }

    #[test]
    fn test_single_member_gets_full_amount() {
        let members = vec![member("Solo")];
        let amount: Decimal = "87.65".parse().unwrap();
        let splits = compute_splits(amount, &members, "Solo");
        assert_eq!(splits.len(), 1);
        assert_eq!(splits[0].amount, amount);
        assert!(splits[0].is_paid);
    }
}
