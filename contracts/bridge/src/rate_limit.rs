use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Storage, Timestamp, Uint128};

use crate::error::{ContractError, ContractResult};
use crate::state::RATE_LIMIT_WINDOWS;

/// A windowed per-(chain, asset) withdrawal accumulator.
#[cw_serde]
pub struct RateLimitWindow {
    pub chain_id: String,
    pub asset_symbol: String,
    pub window_start: Timestamp,
    pub window_end: Timestamp,
    pub amount_used: Uint128,
    pub tx_count: u64,
    pub max_amount: Uint128,
}

impl RateLimitWindow {
    fn fresh(chain_id: &str, asset_symbol: &str, now: Timestamp, window_len: u64, max_amount: Uint128) -> Self {
        RateLimitWindow {
            chain_id: chain_id.to_string(),
            asset_symbol: asset_symbol.to_string(),
            window_start: now,
            window_end: now.plus_seconds(window_len),
            amount_used: Uint128::zero(),
            tx_count: 0,
            max_amount,
        }
    }
}

fn load_or_roll(
    storage: &mut dyn Storage,
    chain_id: &str,
    asset_symbol: &str,
    now: Timestamp,
    window_len: u64,
    max_amount: Uint128,
) -> ContractResult<RateLimitWindow> {
    let key = (chain_id, asset_symbol);
    let existing = RATE_LIMIT_WINDOWS.may_load(storage, key)?;
    let window = match existing {
        Some(mut w) if now < w.window_end => {
            w.max_amount = max_amount;
            w
        }
        _ => RateLimitWindow::fresh(chain_id, asset_symbol, now, window_len, max_amount),
    };
    Ok(window)
}

/// Reserves `amount` against the `(chain, asset)` window, rolling it first if
/// it has expired. Fails with no side effects if the reservation would
/// exceed `max_amount`.
pub fn reserve(
    storage: &mut dyn Storage,
    chain_id: &str,
    asset_symbol: &str,
    amount: Uint128,
    now: Timestamp,
    window_len: u64,
    max_amount: Uint128,
) -> ContractResult<()> {
    let mut window = load_or_roll(storage, chain_id, asset_symbol, now, window_len, max_amount)?;
    let new_used = window
        .amount_used
        .checked_add(amount)
        .map_err(|e| ContractError::InvalidAmount(e.to_string()))?;
    if new_used > window.max_amount {
        return Err(ContractError::RateLimitExceeded {});
    }
    window.amount_used = new_used;
    window.tx_count += 1;
    RATE_LIMIT_WINDOWS.save(storage, (chain_id, asset_symbol), &window)?;
    Ok(())
}

/// Releases a previously reserved `amount`, e.g. on cancellation or refund.
/// A no-op if the window has since rolled (the reservation no longer
/// applies to the current window).
pub fn release(
    storage: &mut dyn Storage,
    chain_id: &str,
    asset_symbol: &str,
    amount: Uint128,
    reserved_at: Timestamp,
) -> ContractResult<()> {
    let key = (chain_id, asset_symbol);
    if let Some(mut window) = RATE_LIMIT_WINDOWS.may_load(storage, key)? {
        if reserved_at < window.window_start {
            return Ok(());
        }
        window.amount_used = Uint128::from(window.amount_used.u128().saturating_sub(amount.u128()));
        window.tx_count = window.tx_count.saturating_sub(1);
        RATE_LIMIT_WINDOWS.save(storage, key, &window)?;
    }
    Ok(())
}

/// Rolls every stored window whose `window_end` has passed. Invoked once per
/// tick, before any admission logic runs in that same tick.
pub fn roll_expired_windows(storage: &mut dyn Storage, now: Timestamp) -> ContractResult<()> {
    let expired: Vec<(String, String)> = RATE_LIMIT_WINDOWS
        .range(storage, None, None, cosmwasm_std::Order::Ascending)
        .filter_map(|item| {
            let (key, window) = item.ok()?;
            (now >= window.window_end).then_some(key)
        })
        .collect();

    for (chain_id, asset_symbol) in expired {
        let key = (chain_id.as_str(), asset_symbol.as_str());
        if let Some(window) = RATE_LIMIT_WINDOWS.may_load(storage, key)? {
            let rolled = RateLimitWindow::fresh(
                &chain_id,
                &asset_symbol,
                now,
                window.window_end.seconds() - window.window_start.seconds(),
                window.max_amount,
            );
            RATE_LIMIT_WINDOWS.save(storage, key, &rolled)?;
        }
    }
    Ok(())
}
