use bridge_common::Ratio;
use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Timestamp};

use crate::error::{ContractError, ContractResult};
use crate::types::Operation;

/// The read-mostly configuration knobs shared by every other component.
#[cw_serde]
pub struct Params {
    pub bridging_enabled: bool,
    /// Strictly greater than 1/2, at most 1.
    pub attestation_threshold: Ratio,
    pub min_validator_tier: u64,
    /// Seconds.
    pub withdrawal_timelock: u64,
    /// Seconds.
    pub rate_limit_window: u64,
    /// At most just under 1.
    pub bridge_fee: Ratio,
    /// Strictly greater than 1/2, at most 1.
    pub tss_threshold: Ratio,
    /// Seconds a TSS session may remain open before it is timed out.
    pub session_timeout: u64,
    pub emergency_pause_enabled: bool,
}

impl Params {
    pub fn validate(&self) -> ContractResult<()> {
        self.attestation_threshold
            .validate_bounds(Ratio::new(1, 2), Ratio::new(1, 1))?;
        self.tss_threshold
            .validate_bounds(Ratio::new(1, 2), Ratio::new(1, 1))?;
        if self.bridge_fee.denominator == 0 {
            return Err(ContractError::InvalidAmount(
                "bridge_fee denominator must be non-zero".into(),
            ));
        }
        if self.bridge_fee.numerator >= self.bridge_fee.denominator {
            return Err(ContractError::InvalidAmount(
                "bridge_fee must be less than 1".into(),
            ));
        }
        Ok(())
    }
}

/// The global safety gate, with per-operation granularity.
///
/// A breaker that is `enabled` but leaves `can_deposit`/`can_withdraw`/
/// `can_attest` all `true` is a no-op; this lets governance pre-stage a
/// breaker record without immediately pausing anything.
#[cw_serde]
pub struct CircuitBreaker {
    pub enabled: bool,
    pub reason: String,
    pub triggered_by: Addr,
    pub triggered_at: Timestamp,
    pub can_deposit: bool,
    pub can_withdraw: bool,
    pub can_attest: bool,
    pub expires_at: Option<Timestamp>,
}

impl CircuitBreaker {
    pub fn none(at: Timestamp, by: Addr) -> Self {
        CircuitBreaker {
            enabled: false,
            reason: String::new(),
            triggered_by: by,
            triggered_at: at,
            can_deposit: true,
            can_withdraw: true,
            can_attest: true,
            expires_at: None,
        }
    }

    /// `true` iff the breaker is disabled, expired, or its per-op flag
    /// permits `op`.
    pub fn is_allowed(&self, op: Operation, now: Timestamp) -> bool {
        if !self.enabled {
            return true;
        }
        if let Some(expires_at) = self.expires_at {
            if now >= expires_at {
                return true;
            }
        }
        match op {
            Operation::Deposit => self.can_deposit,
            Operation::Withdraw => self.can_withdraw,
            Operation::Attest => self.can_attest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(can_withdraw: bool) -> CircuitBreaker {
        CircuitBreaker {
            enabled: true,
            reason: "incident".into(),
            triggered_by: Addr::unchecked("gov"),
            triggered_at: Timestamp::from_seconds(0),
            can_deposit: true,
            can_withdraw,
            can_attest: true,
            expires_at: None,
        }
    }

    #[test]
    fn partial_pause_blocks_only_named_operation() {
        let cb = breaker(false);
        let now = Timestamp::from_seconds(10);
        assert!(!cb.is_allowed(Operation::Withdraw, now));
        assert!(cb.is_allowed(Operation::Deposit, now));
        assert!(cb.is_allowed(Operation::Attest, now));
    }

    #[test]
    fn breaker_auto_expires() {
        let mut cb = breaker(false);
        cb.expires_at = Some(Timestamp::from_seconds(100));
        assert!(!cb.is_allowed(Operation::Withdraw, Timestamp::from_seconds(50)));
        assert!(cb.is_allowed(Operation::Withdraw, Timestamp::from_seconds(100)));
    }

    #[test]
    fn params_reject_threshold_at_half() {
        let mut params = sample_params();
        params.attestation_threshold = Ratio::new(1, 2);
        assert!(params.validate().is_err());
    }

    #[test]
    fn params_accept_unanimous_threshold() {
        let mut params = sample_params();
        params.attestation_threshold = Ratio::new(1, 1);
        params.validate().unwrap();
    }

    fn sample_params() -> Params {
        Params {
            bridging_enabled: true,
            attestation_threshold: Ratio::new(3, 5),
            min_validator_tier: 1,
            withdrawal_timelock: 60,
            rate_limit_window: 86_400,
            bridge_fee: Ratio::new(1, 1000),
            tss_threshold: Ratio::new(2, 3),
            session_timeout: 300,
            emergency_pause_enabled: true,
        }
    }
}
