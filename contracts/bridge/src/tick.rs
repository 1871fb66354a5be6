use cosmwasm_std::{Addr, CosmosMsg, Event, Storage, Timestamp};

use crate::collaborators::{Ledger, PayloadFormatter, ValidatorRegistry};
use crate::error::ContractResult;
use crate::events;
use crate::params::{CircuitBreaker, Params};
use crate::rate_limit;
use crate::state::CIRCUIT_BREAKER;
use crate::tss;
use crate::withdrawal;

/// The result of one `tick()` sweep, ready to fold into the handler's
/// `Response`.
#[derive(Default)]
pub struct TickOutcome {
    pub events: Vec<Event>,
    pub msgs: Vec<CosmosMsg>,
}

/// Runs the fixed five-step sweep described in the tick driver section, in
/// order: breaker expiry, rate-limit window roll, timelock -> TSS session
/// open, TSS session timeout, and refund of terminal failures. Order matters
/// — refunds must not land in the same tick that opened a session, and no
/// session may open while the breaker still blocks withdrawals.
#[allow(clippy::too_many_arguments)]
pub fn tick(
    storage: &mut dyn Storage,
    ledger: &dyn Ledger,
    module_addr: &Addr,
    validator_registry: &dyn ValidatorRegistry,
    payload_formatter: &dyn PayloadFormatter,
    params: &Params,
    now: Timestamp,
) -> ContractResult<TickOutcome> {
    let mut out = TickOutcome::default();

    if let Some(ev) = expire_circuit_breaker(storage, now)? {
        out.events.push(ev);
    }

    rate_limit::roll_expired_windows(storage, now)?;

    let breaker = CIRCUIT_BREAKER.load(storage)?;
    if breaker.is_allowed(crate::types::Operation::Withdraw, now) {
        for ready in withdrawal::advance_timelocked_to_ready(storage, now)? {
            let chain = crate::registry::get_chain(storage, &ready.chain_id)?;
            let payload = payload_formatter.build_payload(chain.chain_kind, &ready.payload_request)?;
            let participants = validator_registry.list_eligible(params.min_validator_tier)?;

            let session = tss::open_session(
                storage,
                params,
                now,
                ready.withdrawal_id,
                &ready.chain_id,
                participants,
                payload,
            )?;
            withdrawal::mark_signing(storage, ready.withdrawal_id, session.id)?;
            out.events
                .push(events::withdrawal_ready(ready.withdrawal_id, session.id));
        }
    }

    for withdrawal_id in tss::expire_sessions(storage, now)? {
        withdrawal::mark_timeout(storage, withdrawal_id)?;
    }

    let (refund_events, refund_msgs) = withdrawal::refund_terminal_failures(storage, ledger, module_addr, now)?;
    out.events.extend(refund_events);
    out.msgs.extend(refund_msgs);

    Ok(out)
}

/// Step (1): resets an expired breaker to its disabled state so later reads
/// in the same tick (and subsequent ticks) don't keep re-deriving
/// `is_allowed` from a stale `expires_at`.
fn expire_circuit_breaker(storage: &mut dyn Storage, now: Timestamp) -> ContractResult<Option<Event>> {
    let breaker = CIRCUIT_BREAKER.load(storage)?;
    if breaker.enabled {
        if let Some(expires_at) = breaker.expires_at {
            if now >= expires_at {
                let cleared = CircuitBreaker::none(now, breaker.triggered_by.clone());
                CIRCUIT_BREAKER.save(storage, &cleared)?;
                return Ok(Some(events::circuit_breaker_updated(false, "expired")));
            }
        }
    }
    Ok(None)
}
