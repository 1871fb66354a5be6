use cw_storage_plus::{Item, Map};

use crate::deposit::{Attestation, Deposit};
use crate::interface::Config;
use crate::params::{CircuitBreaker, Params};
use crate::rate_limit::RateLimitWindow;
use crate::registry::{Asset, Chain};
use crate::tss::TssSession;
use crate::withdrawal::Withdrawal;

pub const CONFIG: Item<Config> = Item::new("config");
pub const PARAMS: Item<Params> = Item::new("params");
pub const CIRCUIT_BREAKER: Item<CircuitBreaker> = Item::new("circuit_breaker");

pub const CHAINS: Map<&str, Chain> = Map::new("chains");
pub const ASSETS: Map<(&str, &str), Asset> = Map::new("assets");

pub const NEXT_DEPOSIT_ID: Item<u64> = Item::new("next_deposit_id");
pub const NEXT_WITHDRAWAL_ID: Item<u64> = Item::new("next_withdrawal_id");
pub const NEXT_SESSION_ID: Item<u64> = Item::new("next_session_id");

pub const DEPOSITS: Map<u64, Deposit> = Map::new("deposits");
/// Secondary lookup for the `(chain_id, external_tx_hash)` idempotency key.
pub const DEPOSIT_BY_TX: Map<(&str, &str), u64> = Map::new("deposit_by_tx");
pub const ATTESTATIONS: Map<(u64, &str), Attestation> = Map::new("attestations");

pub const WITHDRAWALS: Map<u64, Withdrawal> = Map::new("withdrawals");
pub const TSS_SESSIONS: Map<u64, TssSession> = Map::new("tss_sessions");

pub const RATE_LIMIT_WINDOWS: Map<(&str, &str), RateLimitWindow> = Map::new("rate_limit_windows");

pub fn next_deposit_id(storage: &mut dyn cosmwasm_std::Storage) -> cosmwasm_std::StdResult<u64> {
    let id = NEXT_DEPOSIT_ID.may_load(storage)?.unwrap_or(0) + 1;
    NEXT_DEPOSIT_ID.save(storage, &id)?;
    Ok(id)
}

pub fn next_withdrawal_id(storage: &mut dyn cosmwasm_std::Storage) -> cosmwasm_std::StdResult<u64> {
    let id = NEXT_WITHDRAWAL_ID.may_load(storage)?.unwrap_or(0) + 1;
    NEXT_WITHDRAWAL_ID.save(storage, &id)?;
    Ok(id)
}

pub fn next_session_id(storage: &mut dyn cosmwasm_std::Storage) -> cosmwasm_std::StdResult<u64> {
    let id = NEXT_SESSION_ID.may_load(storage)?.unwrap_or(0) + 1;
    NEXT_SESSION_ID.save(storage, &id)?;
    Ok(id)
}
