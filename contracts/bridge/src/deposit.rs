use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, CosmosMsg, Event, Storage, Timestamp, Uint128};

use crate::collaborators::{Ledger, ValidatorRegistry};
use crate::error::{ContractError, ContractResult};
use crate::events;
use crate::params::{CircuitBreaker, Params};
use crate::registry;
use crate::state::{self, ATTESTATIONS, DEPOSITS, DEPOSIT_BY_TX};
use crate::types::Operation;

#[cw_serde]
pub enum DepositStatus {
    Pending,
    Attesting,
    Completed,
    Rejected,
}

/// An external deposit under attestation.
///
/// `eligible_validators_at_creation` freezes the population `required_attestations`
/// was derived from, so the rejection-impossibility check in
/// [`attest_deposit`] stays consistent with the threshold that was actually
/// applied, even if the validator set's size later changes.
#[cw_serde]
pub struct Deposit {
    pub id: u64,
    pub chain_id: String,
    pub asset_symbol: String,
    pub external_tx_hash: String,
    pub external_block_height: u64,
    pub external_sender: String,
    pub local_recipient: Addr,
    pub external_amount: Uint128,
    pub native_amount: Uint128,
    pub status: DepositStatus,
    pub attestations_for: u64,
    pub attestations_against: u64,
    pub required_attestations: u64,
    pub eligible_validators_at_creation: u64,
    pub observed_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

#[cw_serde]
pub struct Attestation {
    pub deposit_id: u64,
    pub validator_address: Addr,
    pub approved: bool,
    pub observed_external_tx_hash: String,
    pub observed_amount: Uint128,
    pub submitted_at: Timestamp,
}

pub struct ObserveOutcome {
    pub deposit_id: u64,
    pub events: Vec<Event>,
    pub mint_msg: Option<CosmosMsg>,
}

pub struct AttestOutcome {
    pub events: Vec<Event>,
    pub mint_msg: Option<CosmosMsg>,
}

fn require_eligible_validator(
    validator_registry: &dyn ValidatorRegistry,
    params: &Params,
    validator: &Addr,
) -> ContractResult<()> {
    if !validator_registry.is_eligible(validator, params.min_validator_tier)? {
        return Err(ContractError::NotValidator {});
    }
    Ok(())
}

fn require_not_paused(breaker: &CircuitBreaker, op: Operation, now: Timestamp) -> ContractResult<()> {
    if !breaker.is_allowed(op, now) {
        return Err(ContractError::Paused {});
    }
    Ok(())
}

/// `(for, against, required, eligible)` → completion/rejection decision.
fn evaluate(deposit: &mut Deposit, now: Timestamp) -> bool {
    if deposit.attestations_for >= deposit.required_attestations {
        deposit.status = DepositStatus::Completed;
        deposit.completed_at = Some(now);
        return true;
    }
    let unreachable = deposit.attestations_against
        > deposit.eligible_validators_at_creation - deposit.required_attestations;
    if unreachable {
        deposit.status = DepositStatus::Rejected;
    }
    false
}

#[allow(clippy::too_many_arguments)]
pub fn observe_deposit(
    storage: &mut dyn Storage,
    ledger: &dyn Ledger,
    validator_registry: &dyn ValidatorRegistry,
    breaker: &CircuitBreaker,
    params: &Params,
    now: Timestamp,
    validator: &Addr,
    chain_id: &str,
    asset_symbol: &str,
    external_tx_hash: &str,
    external_block_height: u64,
    external_sender: &str,
    local_recipient: &Addr,
    external_amount: Uint128,
) -> ContractResult<ObserveOutcome> {
    require_eligible_validator(validator_registry, params, validator)?;
    require_not_paused(breaker, Operation::Attest, now)?;
    let (chain, asset) = registry::require_enabled(storage, chain_id, asset_symbol)?;
    crate::chain_kind::ops(chain.chain_kind).parse_tx_hash(external_tx_hash)?;

    if let Some(existing_id) = DEPOSIT_BY_TX.may_load(storage, (chain_id, external_tx_hash))? {
        let existing = DEPOSITS.load(storage, existing_id)?;
        if !matches!(existing.status, DepositStatus::Rejected) {
            let outcome = attest_deposit(
                storage,
                ledger,
                validator_registry,
                breaker,
                params,
                now,
                validator,
                existing_id,
                true,
                external_tx_hash,
                external_amount,
            )?;
            return Ok(ObserveOutcome {
                deposit_id: existing_id,
                events: outcome.events,
                mint_msg: outcome.mint_msg,
            });
        }
    }

    if external_amount < chain.min_deposit
        || external_amount > chain.max_deposit
        || external_amount > asset.per_tx_limit
    {
        return Err(ContractError::AmountOutOfBounds {});
    }

    let native_amount = external_amount
        .checked_mul(asset.conversion_rate)
        .map_err(|e| ContractError::InvalidAmount(e.to_string()))?;
    let eligible_count = validator_registry.list_eligible(params.min_validator_tier)?.len() as u64;
    let required_attestations = params.attestation_threshold.apply_ceil(eligible_count).max(1);

    let id = state::next_deposit_id(storage)?;
    let mut deposit = Deposit {
        id,
        chain_id: chain_id.to_string(),
        asset_symbol: asset_symbol.to_string(),
        external_tx_hash: external_tx_hash.to_string(),
        external_block_height,
        external_sender: external_sender.to_string(),
        local_recipient: local_recipient.clone(),
        external_amount,
        native_amount,
        status: DepositStatus::Attesting,
        attestations_for: 1,
        attestations_against: 0,
        required_attestations,
        eligible_validators_at_creation: eligible_count,
        observed_at: now,
        completed_at: None,
    };

    ATTESTATIONS.save(
        storage,
        (id, validator.as_str()),
        &Attestation {
            deposit_id: id,
            validator_address: validator.clone(),
            approved: true,
            observed_external_tx_hash: external_tx_hash.to_string(),
            observed_amount: external_amount,
            submitted_at: now,
        },
    )?;

    let mut evs = vec![events::deposit_observed(id, chain_id, external_tx_hash)];
    let mut mint_msg = None;
    if evaluate(&mut deposit, now) {
        mint_msg = Some(ledger.mint_msg(local_recipient, native_amount)?);
        evs.push(events::deposit_completed(
            id,
            local_recipient.as_str(),
            native_amount,
        ));
    }

    DEPOSITS.save(storage, id, &deposit)?;
    DEPOSIT_BY_TX.save(storage, (chain_id, external_tx_hash), &id)?;

    Ok(ObserveOutcome {
        deposit_id: id,
        events: evs,
        mint_msg,
    })
}

#[allow(clippy::too_many_arguments)]
pub fn attest_deposit(
    storage: &mut dyn Storage,
    ledger: &dyn Ledger,
    validator_registry: &dyn ValidatorRegistry,
    breaker: &CircuitBreaker,
    params: &Params,
    now: Timestamp,
    validator: &Addr,
    deposit_id: u64,
    approved: bool,
    observed_tx_hash: &str,
    observed_amount: Uint128,
) -> ContractResult<AttestOutcome> {
    require_eligible_validator(validator_registry, params, validator)?;
    require_not_paused(breaker, Operation::Attest, now)?;

    let mut deposit = DEPOSITS
        .may_load(storage, deposit_id)?
        .ok_or_else(|| ContractError::NotFound(format!("deposit {deposit_id}")))?;
    let chain = registry::get_chain(storage, &deposit.chain_id)?;
    crate::chain_kind::ops(chain.chain_kind).parse_tx_hash(observed_tx_hash)?;

    if !matches!(deposit.status, DepositStatus::Pending | DepositStatus::Attesting) {
        return Err(ContractError::AlreadyFinal {});
    }
    if ATTESTATIONS.has(storage, (deposit_id, validator.as_str())) {
        return Err(ContractError::DuplicateAttestation {});
    }

    let matches_canonical =
        observed_tx_hash == deposit.external_tx_hash && observed_amount == deposit.external_amount;
    let counted_approved = approved && matches_canonical;

    ATTESTATIONS.save(
        storage,
        (deposit_id, validator.as_str()),
        &Attestation {
            deposit_id,
            validator_address: validator.clone(),
            approved: counted_approved,
            observed_external_tx_hash: observed_tx_hash.to_string(),
            observed_amount,
            submitted_at: now,
        },
    )?;

    if counted_approved {
        deposit.attestations_for += 1;
    } else {
        deposit.attestations_against += 1;
    }
    if matches!(deposit.status, DepositStatus::Pending) {
        deposit.status = DepositStatus::Attesting;
    }

    let mut evs = vec![events::deposit_attested(
        deposit_id,
        validator.as_str(),
        counted_approved,
    )];
    let mut mint_msg = None;
    if evaluate(&mut deposit, now) {
        match deposit.status {
            DepositStatus::Completed => {
                mint_msg = Some(ledger.mint_msg(&deposit.local_recipient, deposit.native_amount)?);
                evs.push(events::deposit_completed(
                    deposit_id,
                    deposit.local_recipient.as_str(),
                    deposit.native_amount,
                ));
            }
            _ => unreachable!("evaluate only returns true on completion"),
        }
    } else if matches!(deposit.status, DepositStatus::Rejected) {
        evs.push(events::deposit_rejected(deposit_id));
    }

    DEPOSITS.save(storage, deposit_id, &deposit)?;

    Ok(AttestOutcome {
        events: evs,
        mint_msg,
    })
}
