use crate::error::{ContractError, ContractResult};
use cosmwasm_schema::cw_serde;
use cosmwasm_std::Uint128;

/// A non-negative rational number represented as `numerator / denominator`,
/// used for thresholds (attestation, TSS) and the bridge fee.
///
/// Mirrors the `(numerator, denominator)` tuples used for `sigset_threshold`
/// in the reference bridge contract this crate descends from.
#[cw_serde]
#[derive(Copy, Eq, PartialOrd, Ord)]
pub struct Ratio {
    pub numerator: u64,
    pub denominator: u64,
}

impl Ratio {
    pub const fn new(numerator: u64, denominator: u64) -> Self {
        Ratio {
            numerator,
            denominator,
        }
    }

    /// Validates that the ratio lies in `(min, max]`, expressed as ratios
    /// themselves to avoid floating point.
    pub fn validate_bounds(&self, min_exclusive: Ratio, max_inclusive: Ratio) -> ContractResult<()> {
        if self.denominator == 0 {
            return Err(ContractError::InvalidAmount(
                "ratio denominator must be non-zero".into(),
            ));
        }
        let lhs = self.numerator as u128 * min_exclusive.denominator as u128;
        let rhs = min_exclusive.numerator as u128 * self.denominator as u128;
        if lhs <= rhs {
            return Err(ContractError::InvalidAmount(
                "ratio must be strictly greater than its lower bound".into(),
            ));
        }
        let lhs = self.numerator as u128 * max_inclusive.denominator as u128;
        let rhs = max_inclusive.numerator as u128 * self.denominator as u128;
        if lhs > rhs {
            return Err(ContractError::InvalidAmount(
                "ratio must not exceed its upper bound".into(),
            ));
        }
        Ok(())
    }

    /// `ceil(count * self)`, used to derive `required_attestations` and
    /// `required_shares` from a population size.
    pub fn apply_ceil(&self, count: u64) -> u64 {
        let num = count as u128 * self.numerator as u128;
        let denom = self.denominator as u128;
        ((num + denom - 1) / denom) as u64
    }

    /// `ceil(amount * self)`, used to derive the bridge fee from a native
    /// amount. Uses `Uint128` checked arithmetic throughout: amounts are
    /// arbitrary-precision, so a raw `u128` multiply can overflow on a large
    /// but valid input.
    pub fn apply_ceil_u128(&self, amount: Uint128) -> ContractResult<Uint128> {
        if self.denominator == 0 {
            return Err(ContractError::InvalidAmount(
                "ratio denominator must be non-zero".into(),
            ));
        }
        let denom = Uint128::from(self.denominator);
        let num = amount
            .checked_mul(Uint128::from(self.numerator))
            .map_err(|e| ContractError::InvalidAmount(e.to_string()))?;
        let rounded = num
            .checked_add(denom)
            .and_then(|v| v.checked_sub(Uint128::one()))
            .map_err(|e| ContractError::InvalidAmount(e.to_string()))?;
        Ok(rounded.checked_div(denom).map_err(|e| ContractError::InvalidAmount(e.to_string()))?)
    }

    /// `floor(amount * self)`, used to convert external amounts into native
    /// amounts at a deposit's conversion rate.
    pub fn apply_floor_u128(&self, amount: Uint128) -> ContractResult<Uint128> {
        if self.denominator == 0 {
            return Err(ContractError::InvalidAmount(
                "ratio denominator must be non-zero".into(),
            ));
        }
        let num = amount
            .checked_mul(Uint128::from(self.numerator))
            .map_err(|e| ContractError::InvalidAmount(e.to_string()))?;
        Ok(num
            .checked_div(Uint128::from(self.denominator))
            .map_err(|e| ContractError::InvalidAmount(e.to_string()))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_ceil_rounds_up() {
        let r = Ratio::new(3, 5);
        assert_eq!(r.apply_ceil(5), 3);
        assert_eq!(r.apply_ceil(4), 3);
        assert_eq!(r.apply_ceil(1), 1);
    }

    #[test]
    fn validate_bounds_rejects_at_lower_bound() {
        let r = Ratio::new(1, 2);
        let err = r
            .validate_bounds(Ratio::new(1, 2), Ratio::new(1, 1))
            .unwrap_err();
        assert!(matches!(err, ContractError::InvalidAmount(_)));
    }

    #[test]
    fn validate_bounds_accepts_upper_bound() {
        let r = Ratio::new(1, 1);
        r.validate_bounds(Ratio::new(1, 2), Ratio::new(1, 1)).unwrap();
    }

    #[test]
    fn apply_ceil_u128_rounds_up_without_panicking_on_large_amounts() {
        let r = Ratio::new(1, 1000);
        assert_eq!(
            r.apply_ceil_u128(Uint128::new(1000)).unwrap(),
            Uint128::new(1)
        );
        assert_eq!(
            r.apply_ceil_u128(Uint128::new(1001)).unwrap(),
            Uint128::new(2)
        );
        // Close to Uint128::MAX: a raw `u128` multiply by `numerator` would
        // overflow here under `overflow-checks = true`; checked arithmetic
        // must surface a clean error instead of aborting.
        let huge = Uint128::MAX - Uint128::new(1);
        assert!(Ratio::new(2, 1).apply_ceil_u128(huge).is_err());
    }

    #[test]
    fn apply_floor_u128_converts_external_to_native() {
        let r = Ratio::new(2, 1);
        assert_eq!(
            r.apply_floor_u128(Uint128::new(50)).unwrap(),
            Uint128::new(100)
        );
    }
}
