use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Binary, CosmosMsg, Event, Storage, Timestamp, Uint128};

use crate::collaborators::Ledger;
use crate::error::{ContractError, ContractResult};
use crate::events;
use crate::interface::PayloadRequest;
use crate::params::{CircuitBreaker, Params};
use crate::rate_limit;
use crate::registry;
use crate::state::{self, WITHDRAWALS};
use crate::types::Operation;

#[cw_serde]
pub enum WithdrawalStatus {
    Pending,
    Timelocked,
    Ready,
    Signing,
    Signed,
    Broadcast,
    Completed,
    Cancelled,
    Failed,
    Timeout,
    Refunded,
}

#[cw_serde]
pub struct Withdrawal {
    pub id: u64,
    pub chain_id: String,
    pub asset_symbol: String,
    pub local_sender: Addr,
    pub external_recipient: String,
    pub native_burned: Uint128,
    pub external_amount: Uint128,
    pub fee_amount: Uint128,
    pub status: WithdrawalStatus,
    pub requested_at: Timestamp,
    pub timelock_expiry: Timestamp,
    pub tss_session_id: Option<u64>,
    pub external_tx_hash: Option<String>,
    pub completed_at: Option<Timestamp>,
    pub failure_reason: Option<String>,
}

pub struct RequestOutcome {
    pub withdrawal_id: u64,
    pub events: Vec<Event>,
    pub msgs: Vec<CosmosMsg>,
}

pub struct CancelOutcome {
    pub events: Vec<Event>,
    pub msgs: Vec<CosmosMsg>,
}

pub struct BroadcastOutcome {
    pub events: Vec<Event>,
    pub msgs: Vec<CosmosMsg>,
}

/// A withdrawal whose timelock has just expired, ready for TSS session creation.
pub struct ReadyForSigning {
    pub withdrawal_id: u64,
    pub chain_id: String,
    pub payload_request: PayloadRequest,
}

#[allow(clippy::too_many_arguments)]
pub fn request_withdrawal(
    storage: &mut dyn Storage,
    ledger: &dyn Ledger,
    module_addr: &Addr,
    breaker: &CircuitBreaker,
    params: &Params,
    now: Timestamp,
    sender: &Addr,
    chain_id: &str,
    asset_symbol: &str,
    external_recipient: &str,
    native_burned: Uint128,
) -> ContractResult<RequestOutcome> {
    if !params.bridging_enabled || !breaker.is_allowed(Operation::Withdraw, now) {
        return Err(ContractError::Paused {});
    }
    let (chain, asset) = registry::require_enabled(storage, chain_id, asset_symbol)?;
    crate::chain_kind::ops(chain.chain_kind).validate_external_address(external_recipient)?;

    let fee_amount = params.bridge_fee.apply_ceil_u128(native_burned)?;
    if native_burned <= fee_amount {
        return Err(ContractError::AmountTooSmall {});
    }
    let external_amount = native_burned
        .checked_sub(fee_amount)
        .map_err(|e| ContractError::InvalidAmount(e.to_string()))?
        .checked_div(asset.conversion_rate)
        .map_err(|e| ContractError::InvalidAmount(e.to_string()))?;
    // The smallest representable external unit is the "effective minimum
    // withdrawal" floor the amount rules require (see the deposit/withdrawal
    // amount rules section); assets do not separately configure a larger one.
    if external_amount.is_zero() {
        return Err(ContractError::AmountTooSmall {});
    }
    if external_amount > asset.per_tx_limit {
        return Err(ContractError::AmountOutOfBounds {});
    }

    rate_limit::reserve(
        storage,
        chain_id,
        asset_symbol,
        external_amount,
        now,
        params.rate_limit_window,
        asset.daily_limit,
    )?;

    // Escrow: debit the sender into the bridge module account. The native
    // tokens are only actually burned once the withdrawal reaches
    // `completed` (see `on_broadcast_result`), so that a cancelled, failed,
    // or timed-out withdrawal can credit the same escrowed balance back.
    let escrow_msg = match ledger.transfer_msg(sender, module_addr, native_burned) {
        Ok(msg) => msg,
        Err(e) => {
            rate_limit::release(storage, chain_id, asset_symbol, external_amount, now)?;
            return Err(e);
        }
    };

    let id = state::next_withdrawal_id(storage)?;
    let withdrawal = Withdrawal {
        id,
        chain_id: chain_id.to_string(),
        asset_symbol: asset_symbol.to_string(),
        local_sender: sender.clone(),
        external_recipient: external_recipient.to_string(),
        native_burned,
        external_amount,
        fee_amount,
        status: WithdrawalStatus::Timelocked,
        requested_at: now,
        timelock_expiry: now.plus_seconds(params.withdrawal_timelock),
        tss_session_id: None,
        external_tx_hash: None,
        completed_at: None,
        failure_reason: None,
    };
    WITHDRAWALS.save(storage, id, &withdrawal)?;

    Ok(RequestOutcome {
        withdrawal_id: id,
        events: vec![events::withdrawal_requested(id, sender.as_str(), native_burned)],
        msgs: vec![escrow_msg],
    })
}

pub fn cancel_withdrawal(
    storage: &mut dyn Storage,
    ledger: &dyn Ledger,
    module_addr: &Addr,
    now: Timestamp,
    sender: &Addr,
    withdrawal_id: u64,
) -> ContractResult<CancelOutcome> {
    let mut withdrawal = WITHDRAWALS
        .may_load(storage, withdrawal_id)?
        .ok_or_else(|| ContractError::NotFound(format!("withdrawal {withdrawal_id}")))?;

    if withdrawal.local_sender != *sender {
        return Err(ContractError::Unauthorized {});
    }
    if !matches!(withdrawal.status, WithdrawalStatus::Pending | WithdrawalStatus::Timelocked) {
        return Err(ContractError::AlreadyFinal {});
    }

    let refund_msg = ledger.transfer_msg(module_addr, sender, withdrawal.native_burned)?;
    rate_limit::release(
        storage,
        &withdrawal.chain_id,
        &withdrawal.asset_symbol,
        withdrawal.external_amount,
        now,
    )?;

    withdrawal.status = WithdrawalStatus::Cancelled;
    withdrawal.completed_at = Some(now);
    WITHDRAWALS.save(storage, withdrawal_id, &withdrawal)?;

    Ok(CancelOutcome {
        events: vec![events::withdrawal_refunded(withdrawal_id, "cancelled")],
        msgs: vec![refund_msg],
    })
}

pub fn on_tss_completed(
    storage: &mut dyn Storage,
    withdrawal_id: u64,
    _combined_signature: &Binary,
) -> ContractResult<Vec<Event>> {
    let mut withdrawal = WITHDRAWALS
        .may_load(storage, withdrawal_id)?
        .ok_or_else(|| ContractError::NotFound(format!("withdrawal {withdrawal_id}")))?;
    if !matches!(withdrawal.status, WithdrawalStatus::Signing) {
        return Err(ContractError::AlreadyFinal {});
    }
    withdrawal.status = WithdrawalStatus::Signed;
    WITHDRAWALS.save(storage, withdrawal_id, &withdrawal)?;
    Ok(vec![events::withdrawal_signed(withdrawal_id)])
}

pub fn on_tss_failed(
    storage: &mut dyn Storage,
    withdrawal_id: u64,
    reason: &str,
) -> ContractResult<Vec<Event>> {
    let mut withdrawal = WITHDRAWALS
        .may_load(storage, withdrawal_id)?
        .ok_or_else(|| ContractError::NotFound(format!("withdrawal {withdrawal_id}")))?;
    if !matches!(withdrawal.status, WithdrawalStatus::Signing) {
        return Ok(vec![]);
    }
    withdrawal.status = WithdrawalStatus::Failed;
    withdrawal.failure_reason = Some(reason.to_string());
    WITHDRAWALS.save(storage, withdrawal_id, &withdrawal)?;
    Ok(vec![])
}

pub fn on_broadcast_result(
    storage: &mut dyn Storage,
    ledger: &dyn Ledger,
    module_addr: &Addr,
    withdrawal_id: u64,
    now: Timestamp,
    result: Result<String, String>,
) -> ContractResult<BroadcastOutcome> {
    let mut withdrawal = WITHDRAWALS
        .may_load(storage, withdrawal_id)?
        .ok_or_else(|| ContractError::NotFound(format!("withdrawal {withdrawal_id}")))?;
    if !matches!(withdrawal.status, WithdrawalStatus::Signed | WithdrawalStatus::Broadcast) {
        return Err(ContractError::AlreadyFinal {});
    }

    let mut msgs = Vec::new();
    let evs = match result {
        Ok(tx_hash) => {
            if matches!(withdrawal.status, WithdrawalStatus::Signed) {
                withdrawal.status = WithdrawalStatus::Broadcast;
                withdrawal.external_tx_hash = Some(tx_hash.clone());
                vec![events::withdrawal_broadcast(withdrawal_id, &tx_hash)]
            } else {
                // Completion is the atomic step that actually removes the
                // escrowed amount from circulation: burn it out of the
                // module account the escrow transfer moved it into.
                msgs.push(ledger.burn_msg(module_addr, withdrawal.native_burned)?);
                withdrawal.status = WithdrawalStatus::Completed;
                withdrawal.completed_at = Some(now);
                vec![events::withdrawal_completed(withdrawal_id)]
            }
        }
        Err(reason) => {
            withdrawal.status = WithdrawalStatus::Failed;
            withdrawal.failure_reason = Some(reason);
            vec![]
        }
    };
    WITHDRAWALS.save(storage, withdrawal_id, &withdrawal)?;
    Ok(BroadcastOutcome { events: evs, msgs })
}

/// Step (3) of the tick sweep: moves every `timelocked` withdrawal whose
/// timelock has expired to `ready`, returning the payload request each needs
/// a TSS session opened for. The tick driver marks them `signing` once the
/// session is created (see [`mark_signing`]).
pub fn advance_timelocked_to_ready(
    storage: &mut dyn Storage,
    now: Timestamp,
) -> ContractResult<Vec<ReadyForSigning>> {
    let due: Vec<Withdrawal> = WITHDRAWALS
        .range(storage, None, None, cosmwasm_std::Order::Ascending)
        .filter_map(|item| item.ok())
        .map(|(_, w)| w)
        .filter(|w| matches!(w.status, WithdrawalStatus::Timelocked) && now >= w.timelock_expiry)
        .collect();

    let mut out = Vec::with_capacity(due.len());
    for mut withdrawal in due {
        withdrawal.status = WithdrawalStatus::Ready;
        WITHDRAWALS.save(storage, withdrawal.id, &withdrawal)?;
        out.push(ReadyForSigning {
            withdrawal_id: withdrawal.id,
            chain_id: withdrawal.chain_id.clone(),
            payload_request: PayloadRequest {
                withdrawal_id: withdrawal.id,
                chain_id: withdrawal.chain_id,
                external_recipient: withdrawal.external_recipient,
                external_amount: withdrawal.external_amount,
            },
        });
    }
    Ok(out)
}

pub fn mark_signing(storage: &mut dyn Storage, withdrawal_id: u64, session_id: u64) -> ContractResult<()> {
    let mut withdrawal = WITHDRAWALS.load(storage, withdrawal_id)?;
    withdrawal.status = WithdrawalStatus::Signing;
    withdrawal.tss_session_id = Some(session_id);
    WITHDRAWALS.save(storage, withdrawal_id, &withdrawal)?;
    Ok(())
}

/// Step (5) of the tick sweep: refunds every `failed`/`timeout` withdrawal,
/// crediting the escrowed `native_burned` back to `local_sender` and
/// releasing its rate-limit reservation.
pub fn refund_terminal_failures(
    storage: &mut dyn Storage,
    ledger: &dyn Ledger,
    module_addr: &Addr,
    now: Timestamp,
) -> ContractResult<(Vec<Event>, Vec<CosmosMsg>)> {
    let failed: Vec<Withdrawal> = WITHDRAWALS
        .range(storage, None, None, cosmwasm_std::Order::Ascending)
        .filter_map(|item| item.ok())
        .map(|(_, w)| w)
        .filter(|w| matches!(w.status, WithdrawalStatus::Failed | WithdrawalStatus::Timeout))
        .collect();

    let mut evs = Vec::new();
    let mut msgs = Vec::new();
    for mut withdrawal in failed {
        let refund_msg = ledger.transfer_msg(module_addr, &withdrawal.local_sender, withdrawal.native_burned)?;
        rate_limit::release(
            storage,
            &withdrawal.chain_id,
            &withdrawal.asset_symbol,
            withdrawal.external_amount,
            now,
        )?;
        let reason = withdrawal.failure_reason.clone().unwrap_or_default();
        withdrawal.status = WithdrawalStatus::Refunded;
        withdrawal.completed_at = Some(now);
        WITHDRAWALS.save(storage, withdrawal.id, &withdrawal)?;
        evs.push(events::withdrawal_refunded(withdrawal.id, &reason));
        msgs.push(refund_msg);
    }
    Ok((evs, msgs))
}

pub fn mark_timeout(storage: &mut dyn Storage, withdrawal_id: u64) -> ContractResult<()> {
    let mut withdrawal = WITHDRAWALS.load(storage, withdrawal_id)?;
    if matches!(withdrawal.status, WithdrawalStatus::Signing) {
        withdrawal.status = WithdrawalStatus::Timeout;
        WITHDRAWALS.save(storage, withdrawal_id, &withdrawal)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{add_asset, add_chain, Asset, Chain};
    use crate::testutil::FakeLedger;
    use crate::types::ChainKind;
    use cosmwasm_std::testing::mock_dependencies;

    fn setup(deps: &mut cosmwasm_std::OwnedDeps<
        cosmwasm_std::testing::MockStorage,
        cosmwasm_std::testing::MockApi,
        cosmwasm_std::testing::MockQuerier,
    >) {
        add_chain(
            &mut deps.storage,
            Chain {
                chain_id: "eth".into(),
                chain_kind: ChainKind::Account,
                confirmations_required: 12,
                block_time: 12,
                tss_public_key_hint: None,
                min_deposit: Uint128::new(1),
                max_deposit: Uint128::new(1_000_000),
                enabled: true,
            },
        )
        .unwrap();
        add_asset(
            &mut deps.storage,
            Asset {
                chain_id: "eth".into(),
                symbol: "USDT".into(),
                decimals: 6,
                conversion_rate: Uint128::new(1),
                daily_limit: Uint128::new(1_000_000),
                per_tx_limit: Uint128::new(500_000),
                contract_address: None,
                enabled: true,
            },
        )
        .unwrap();
    }

    fn sample_params() -> Params {
        Params {
            bridging_enabled: true,
            attestation_threshold: bridge_common::Ratio::new(3, 5),
            min_validator_tier: 1,
            withdrawal_timelock: 60,
            rate_limit_window: 86_400,
            bridge_fee: bridge_common::Ratio::new(1, 1000),
            tss_threshold: bridge_common::Ratio::new(2, 3),
            session_timeout: 300,
            emergency_pause_enabled: true,
        }
    }

    fn module_addr() -> Addr {
        Addr::unchecked("bridge-module")
    }

    #[test]
    fn request_escrows_into_module_account_and_enters_timelocked() {
        let mut deps = mock_dependencies();
        setup(&mut deps);
        let ledger = FakeLedger::default();
        let breaker = CircuitBreaker::none(Timestamp::from_seconds(0), Addr::unchecked("gov"));
        let p = sample_params();

        let outcome = request_withdrawal(
            &mut deps.storage,
            &ledger,
            &module_addr(),
            &breaker,
            &p,
            Timestamp::from_seconds(0),
            &Addr::unchecked("user"),
            "eth",
            "USDT",
            "0x000000000000000000000000000000000000aa",
            Uint128::new(1000),
        )
        .unwrap();

        assert_eq!(outcome.msgs.len(), 1);
        let withdrawal = WITHDRAWALS.load(&deps.storage, outcome.withdrawal_id).unwrap();
        assert!(matches!(withdrawal.status, WithdrawalStatus::Timelocked));
        // Escrow is a transfer into the module account, not a burn: the
        // tokens must still exist somewhere to be refundable.
        assert!(ledger.burned.borrow().is_empty());
        let transfers = ledger.transferred.borrow();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0], ("user".to_string(), module_addr().to_string(), Uint128::new(1000)));
    }

    #[test]
    fn cancel_disallowed_once_ready() {
        let mut deps = mock_dependencies();
        setup(&mut deps);
        let ledger = FakeLedger::default();
        let breaker = CircuitBreaker::none(Timestamp::from_seconds(0), Addr::unchecked("gov"));
        let p = sample_params();

        let outcome = request_withdrawal(
            &mut deps.storage,
            &ledger,
            &module_addr(),
            &breaker,
            &p,
            Timestamp::from_seconds(0),
            &Addr::unchecked("user"),
            "eth",
            "USDT",
            "0x000000000000000000000000000000000000aa",
            Uint128::new(1000),
        )
        .unwrap();

        let ready = advance_timelocked_to_ready(&mut deps.storage, Timestamp::from_seconds(60)).unwrap();
        assert_eq!(ready.len(), 1);

        let err = cancel_withdrawal(
            &mut deps.storage,
            &ledger,
            &module_addr(),
            Timestamp::from_seconds(60),
            &Addr::unchecked("user"),
            outcome.withdrawal_id,
        )
        .unwrap_err();
        assert_eq!(err, ContractError::AlreadyFinal {});
    }

    #[test]
    fn cancel_credits_escrow_back_to_sender_from_module_account() {
        let mut deps = mock_dependencies();
        setup(&mut deps);
        let ledger = FakeLedger::default();
        let breaker = CircuitBreaker::none(Timestamp::from_seconds(0), Addr::unchecked("gov"));
        let p = sample_params();

        let outcome = request_withdrawal(
            &mut deps.storage,
            &ledger,
            &module_addr(),
            &breaker,
            &p,
            Timestamp::from_seconds(0),
            &Addr::unchecked("user"),
            "eth",
            "USDT",
            "0x000000000000000000000000000000000000aa",
            Uint128::new(1000),
        )
        .unwrap();

        let cancel = cancel_withdrawal(
            &mut deps.storage,
            &ledger,
            &module_addr(),
            Timestamp::from_seconds(10),
            &Addr::unchecked("user"),
            outcome.withdrawal_id,
        )
        .unwrap();
        assert_eq!(cancel.msgs.len(), 1);

        let transfers = ledger.transferred.borrow();
        assert_eq!(transfers.len(), 2);
        assert_eq!(transfers[1], (module_addr().to_string(), "user".to_string(), Uint128::new(1000)));
        let withdrawal = WITHDRAWALS.load(&deps.storage, outcome.withdrawal_id).unwrap();
        assert!(matches!(withdrawal.status, WithdrawalStatus::Cancelled));
    }

    #[test]
    fn refund_terminal_failures_credits_sender_from_module_account() {
        let mut deps = mock_dependencies();
        setup(&mut deps);
        let ledger = FakeLedger::default();
        let breaker = CircuitBreaker::none(Timestamp::from_seconds(0), Addr::unchecked("gov"));
        let p = sample_params();

        let outcome = request_withdrawal(
            &mut deps.storage,
            &ledger,
            &module_addr(),
            &breaker,
            &p,
            Timestamp::from_seconds(0),
            &Addr::unchecked("user"),
            "eth",
            "USDT",
            "0x000000000000000000000000000000000000aa",
            Uint128::new(1000),
        )
        .unwrap();
        let mut withdrawal = WITHDRAWALS.load(&deps.storage, outcome.withdrawal_id).unwrap();
        withdrawal.status = WithdrawalStatus::Timeout;
        WITHDRAWALS.save(&mut deps.storage, outcome.withdrawal_id, &withdrawal).unwrap();

        let (events, msgs) =
            refund_terminal_failures(&mut deps.storage, &ledger, &module_addr(), Timestamp::from_seconds(20)).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(msgs.len(), 1);

        let transfers = ledger.transferred.borrow();
        assert_eq!(transfers[1], (module_addr().to_string(), "user".to_string(), Uint128::new(1000)));
        let withdrawal = WITHDRAWALS.load(&deps.storage, outcome.withdrawal_id).unwrap();
        assert!(matches!(withdrawal.status, WithdrawalStatus::Refunded));
    }

    #[test]
    fn completion_burns_escrow_from_module_account() {
        let mut deps = mock_dependencies();
        setup(&mut deps);
        let ledger = FakeLedger::default();
        let breaker = CircuitBreaker::none(Timestamp::from_seconds(0), Addr::unchecked("gov"));
        let p = sample_params();

        let outcome = request_withdrawal(
            &mut deps.storage,
            &ledger,
            &module_addr(),
            &breaker,
            &p,
            Timestamp::from_seconds(0),
            &Addr::unchecked("user"),
            "eth",
            "USDT",
            "0x000000000000000000000000000000000000aa",
            Uint128::new(1000),
        )
        .unwrap();
        let mut withdrawal = WITHDRAWALS.load(&deps.storage, outcome.withdrawal_id).unwrap();
        withdrawal.status = WithdrawalStatus::Signed;
        WITHDRAWALS.save(&mut deps.storage, outcome.withdrawal_id, &withdrawal).unwrap();

        let broadcast = on_broadcast_result(
            &mut deps.storage,
            &ledger,
            &module_addr(),
            outcome.withdrawal_id,
            Timestamp::from_seconds(30),
            Ok("0xtxhash".into()),
        )
        .unwrap();
        assert!(broadcast.msgs.is_empty());

        let completed = on_broadcast_result(
            &mut deps.storage,
            &ledger,
            &module_addr(),
            outcome.withdrawal_id,
            Timestamp::from_seconds(31),
            Ok("0xtxhash".into()),
        )
        .unwrap();
        assert_eq!(completed.msgs.len(), 1);
        assert_eq!(ledger.burned.borrow()[0], (module_addr().to_string(), Uint128::new(1000)));

        let withdrawal = WITHDRAWALS.load(&deps.storage, outcome.withdrawal_id).unwrap();
        assert!(matches!(withdrawal.status, WithdrawalStatus::Completed));
    }

    #[test]
    fn rate_limit_blocks_second_withdrawal_in_window() {
        let mut deps = mock_dependencies();
        setup(&mut deps);
        let ledger = FakeLedger::default();
        let breaker = CircuitBreaker::none(Timestamp::from_seconds(0), Addr::unchecked("gov"));
        let p = sample_params();

        request_withdrawal(
            &mut deps.storage,
            &ledger,
            &module_addr(),
            &breaker,
            &p,
            Timestamp::from_seconds(0),
            &Addr::unchecked("user"),
            "eth",
            "USDT",
            "0x000000000000000000000000000000000000aa",
            Uint128::new(600_600),
        )
        .unwrap();

        let err = request_withdrawal(
            &mut deps.storage,
            &ledger,
            &module_addr(),
            &breaker,
            &p,
            Timestamp::from_seconds(0),
            &Addr::unchecked("user"),
            "eth",
            "USDT",
            "0x000000000000000000000000000000000000aa",
            Uint128::new(500_500),
        )
        .unwrap_err();
        assert_eq!(err, ContractError::RateLimitExceeded {});
    }
}
