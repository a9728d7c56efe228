//! The distribution-request builder for template-based crediting.
//!
//! A template stores a percent per category. When money arrives, the caller
//! turns the template plus the incoming total into a concrete
//! category → amount mapping and hands that to the ledger engine. The engine
//! itself never sees percents.
//!
//! Percent sums are deliberately NOT validated against 100: a user may
//! intentionally distribute only part of an incoming amount, or with
//! percents above 100 more than it.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::rules::{RuleError, ensure_positive};

/// A template's percent per category.
pub type Percents = BTreeMap<Uuid, Decimal>;

/// Share rounding scale: whole cents.
const SHARE_SCALE: u32 = 2;

/// Builds the per-category amounts for distributing `total`.
///
/// Each share is `total * percent / 100`, rounded to cents with Banker's
/// Rounding. Zero percents produce no share at all (the engine rejects
/// zero-amount entries). The shares need not sum to `total`.
///
/// # Errors
///
/// Returns `RuleError::NonPositiveAmount` if `total` is not positive or if
/// any percent is negative.
pub fn build_shares(total: Decimal, percents: &Percents) -> Result<BTreeMap<Uuid, Decimal>, RuleError> {
    ensure_positive(total)?;

    let mut shares = BTreeMap::new();
    for (&category_id, &percent) in percents {
        if percent < Decimal::ZERO {
            return Err(RuleError::NonPositiveAmount(percent));
        }
        if percent.is_zero() {
            continue;
        }

        let share = (total * percent / Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(SHARE_SCALE, RoundingStrategy::MidpointNearestEven);
        if share > Decimal::ZERO {
            shares.insert(category_id, share);
        }
    }

    Ok(shares)
}

/// Decodes a stored percent mapping (JSON object of category id → percent).
///
/// # Errors
///
/// Returns a deserialization error if the value is not an object of
/// UUID keys and decimal values.
pub fn percents_from_json(value: &serde_json::Value) -> Result<Percents, serde_json::Error> {
    serde_json::from_value(value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn category(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn test_shares_follow_percents() {
        let percents = Percents::from([(category(1), dec!(30)), (category(2), dec!(70))]);
        let shares = build_shares(dec!(100), &percents).unwrap();

        assert_eq!(shares[&category(1)], dec!(30.00));
        assert_eq!(shares[&category(2)], dec!(70.00));
    }

    #[test]
    fn test_partial_distribution_is_allowed() {
        // 40% of the incoming amount stays undistributed.
        let percents = Percents::from([(category(1), dec!(60))]);
        let shares = build_shares(dec!(250), &percents).unwrap();

        assert_eq!(shares.len(), 1);
        assert_eq!(shares[&category(1)], dec!(150.00));
    }

    #[test]
    fn test_shares_round_to_cents_bankers() {
        // 25% of 0.50 is 0.125, a cent midpoint: Banker's Rounding takes
        // the even cent, 0.12.
        let percents = Percents::from([(category(1), dec!(25))]);
        let shares = build_shares(dec!(0.50), &percents).unwrap();

        assert_eq!(shares[&category(1)], dec!(0.12));
    }

    #[test]
    fn test_zero_percent_yields_no_share() {
        let percents = Percents::from([(category(1), dec!(0)), (category(2), dec!(100))]);
        let shares = build_shares(dec!(80), &percents).unwrap();

        assert!(!shares.contains_key(&category(1)));
        assert_eq!(shares[&category(2)], dec!(80.00));
    }

    #[test]
    fn test_tiny_share_rounding_to_zero_is_dropped() {
        // 0.1% of 0.01 rounds to 0.00 and must not reach the engine.
        let percents = Percents::from([(category(1), dec!(0.1))]);
        let shares = build_shares(dec!(0.01), &percents).unwrap();

        assert!(shares.is_empty());
    }

    #[test]
    fn test_negative_percent_is_rejected() {
        let percents = Percents::from([(category(1), dec!(-10))]);
        assert_eq!(
            build_shares(dec!(100), &percents),
            Err(RuleError::NonPositiveAmount(dec!(-10)))
        );
    }

    #[test]
    fn test_non_positive_total_is_rejected() {
        let percents = Percents::from([(category(1), dec!(50))]);
        assert!(build_shares(dec!(0), &percents).is_err());
        assert!(build_shares(dec!(-5), &percents).is_err());
    }

    #[test]
    fn test_percents_from_json_round_trip() {
        let id = category(7);
        let value = serde_json::json!({ id.to_string(): "33.5" });
        let percents = percents_from_json(&value).unwrap();

        assert_eq!(percents[&id], dec!(33.5));
    }

    #[test]
    fn test_percents_from_json_rejects_non_object() {
        assert!(percents_from_json(&serde_json::json!([1, 2, 3])).is_err());
    }
}
