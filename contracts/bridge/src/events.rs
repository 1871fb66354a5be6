use cosmwasm_std::{Event, Uint128};

/// Builds the 12 event kinds named in the external-interfaces section, each
/// as a `cosmwasm_std::Event` appended to the handler's `Response` via
/// `add_event`, in the order side effects occur (ledger call before event).
pub fn deposit_observed(deposit_id: u64, chain_id: &str, external_tx_hash: &str) -> Event {
    Event::new("bridge.deposit_observed")
        .add_attribute("deposit_id", deposit_id.to_string())
        .add_attribute("chain_id", chain_id)
        .add_attribute("external_tx_hash", external_tx_hash)
}

pub fn deposit_attested(deposit_id: u64, validator: &str, approved: bool) -> Event {
    Event::new("bridge.deposit_attested")
        .add_attribute("deposit_id", deposit_id.to_string())
        .add_attribute("validator", validator)
        .add_attribute("approved", approved.to_string())
}

pub fn deposit_completed(deposit_id: u64, local_recipient: &str, native_amount: Uint128) -> Event {
    Event::new("bridge.deposit_completed")
        .add_attribute("deposit_id", deposit_id.to_string())
        .add_attribute("local_recipient", local_recipient)
        .add_attribute("native_amount", native_amount.to_string())
}

pub fn deposit_rejected(deposit_id: u64) -> Event {
    Event::new("bridge.deposit_rejected").add_attribute("deposit_id", deposit_id.to_string())
}

pub fn withdrawal_requested(withdrawal_id: u64, sender: &str, native_burned: Uint128) -> Event {
    Event::new("bridge.withdrawal_requested")
        .add_attribute("withdrawal_id", withdrawal_id.to_string())
        .add_attribute("sender", sender)
        .add_attribute("native_burned", native_burned.to_string())
}

pub fn withdrawal_ready(withdrawal_id: u64, session_id: u64) -> Event {
    Event::new("bridge.withdrawal_ready")
        .add_attribute("withdrawal_id", withdrawal_id.to_string())
        .add_attribute("tss_session_id", session_id.to_string())
}

pub fn withdrawal_signed(withdrawal_id: u64) -> Event {
    Event::new("bridge.withdrawal_signed").add_attribute("withdrawal_id", withdrawal_id.to_string())
}

pub fn withdrawal_broadcast(withdrawal_id: u64, external_tx_hash: &str) -> Event {
    Event::new("bridge.withdrawal_broadcast")
        .add_attribute("withdrawal_id", withdrawal_id.to_string())
        .add_attribute("external_tx_hash", external_tx_hash)
}

pub fn withdrawal_completed(withdrawal_id: u64) -> Event {
    Event::new("bridge.withdrawal_completed").add_attribute("withdrawal_id", withdrawal_id.to_string())
}

pub fn withdrawal_refunded(withdrawal_id: u64, reason: &str) -> Event {
    Event::new("bridge.withdrawal_refunded")
        .add_attribute("withdrawal_id", withdrawal_id.to_string())
        .add_attribute("reason", reason)
}

pub fn circuit_breaker_updated(enabled: bool, reason: &str) -> Event {
    Event::new("bridge.circuit_breaker_updated")
        .add_attribute("enabled", enabled.to_string())
        .add_attribute("reason", reason)
}

#[allow(dead_code)]
pub fn rate_limit_exceeded(chain_id: &str, asset_symbol: &str) -> Event {
    Event::new("bridge.rate_limit_exceeded")
        .add_attribute("chain_id", chain_id)
        .add_attribute("asset_symbol", asset_symbol)
}
