//! Property-based tests for the money-movement rules and share building.

use proptest::prelude::*;
use rust_decimal::Decimal;
use subledger_shared::Cell;
use uuid::Uuid;

use crate::distribution::{Percents, build_shares};
use crate::rules::{RuleError, ensure_covered, ensure_distinct_cells, ensure_positive};

/// Strategy to generate a valid positive amount (> 0).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    // Amounts from 0.01 to 1,000,000.00
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a zero or negative amount.
fn non_positive_amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(-cents, 2))
}

/// Strategy to generate a percent between 0 and 100 inclusive.
fn percent() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

fn cell_strategy() -> impl Strategy<Value = Cell> {
    (any::<u128>(), any::<u128>())
        .prop_map(|(card, category)| Cell::new(Uuid::from_u128(card), Uuid::from_u128(category)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every strictly positive amount passes the positivity rule.
    #[test]
    fn prop_positive_amounts_pass(amount in positive_amount()) {
        prop_assert!(ensure_positive(amount).is_ok());
    }

    /// Every zero or negative amount is rejected, echoing the offending value.
    #[test]
    fn prop_non_positive_amounts_fail(amount in non_positive_amount()) {
        prop_assert_eq!(
            ensure_positive(amount),
            Err(RuleError::NonPositiveAmount(amount))
        );
    }

    /// A cell never transfers to itself; any two distinct cells may.
    #[test]
    fn prop_distinct_cells(a in cell_strategy(), b in cell_strategy()) {
        let result = ensure_distinct_cells(a, b);
        if a == b {
            prop_assert_eq!(result, Err(RuleError::SameCell(a)));
        } else {
            prop_assert!(result.is_ok());
        }
    }

    /// Coverage holds exactly when the balance is at least the request.
    #[test]
    fn prop_coverage_matches_comparison(
        available in positive_amount(),
        requested in positive_amount(),
    ) {
        let result = ensure_covered(available, requested);
        prop_assert_eq!(result.is_ok(), available >= requested);
    }

    /// Shares are always strictly positive and keyed by the input categories.
    #[test]
    fn prop_shares_positive_and_bounded(
        total in positive_amount(),
        raw in proptest::collection::btree_map(any::<u128>(), percent(), 0..6),
    ) {
        let percents: Percents = raw
            .into_iter()
            .map(|(key, pct)| (Uuid::from_u128(key), pct))
            .collect();

        let shares = build_shares(total, &percents).unwrap();
        for (category_id, share) in &shares {
            prop_assert!(*share > Decimal::ZERO);
            prop_assert!(percents.contains_key(category_id));
        }
        prop_assert!(shares.len() <= percents.len());
    }

    /// With percents summing to 100 and a cent-scale total, nothing is lost:
    /// a single 100% share reproduces the total exactly.
    #[test]
    fn prop_full_share_is_identity(total in positive_amount()) {
        let category = Uuid::from_u128(1);
        let percents = Percents::from([(category, Decimal::ONE_HUNDRED)]);

        let shares = build_shares(total, &percents).unwrap();
        prop_assert_eq!(shares[&category], total);
    }
}
