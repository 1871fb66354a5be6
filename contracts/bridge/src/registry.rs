use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Storage, Uint128};

use crate::error::{ContractError, ContractResult};
use crate::state::{ASSETS, CHAINS};
use crate::types::ChainKind;

/// An external chain enabled for bridging.
///
/// Owned exclusively by the registry: no other component may flip `enabled`.
#[cw_serde]
pub struct Chain {
    pub chain_id: String,
    pub chain_kind: ChainKind,
    pub confirmations_required: u32,
    pub block_time: u64,
    pub tss_public_key_hint: Option<String>,
    pub min_deposit: Uint128,
    pub max_deposit: Uint128,
    pub enabled: bool,
}

impl Chain {
    pub fn validate(&self) -> ContractResult<()> {
        if self.min_deposit > self.max_deposit {
            return Err(ContractError::InvalidAmount(
                "min_deposit must not exceed max_deposit".into(),
            ));
        }
        if self.confirmations_required < 1 {
            return Err(ContractError::InvalidAmount(
                "confirmations_required must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// An asset bridgeable on a given [`Chain`].
#[cw_serde]
pub struct Asset {
    pub chain_id: String,
    pub symbol: String,
    pub decimals: u8,
    /// external-unit -> native-unit conversion rate.
    pub conversion_rate: Uint128,
    pub daily_limit: Uint128,
    pub per_tx_limit: Uint128,
    pub contract_address: Option<String>,
    pub enabled: bool,
}

impl Asset {
    pub fn validate(&self) -> ContractResult<()> {
        if !(1..=18).contains(&self.decimals) {
            return Err(ContractError::InvalidAmount(
                "decimals must be between 1 and 18".into(),
            ));
        }
        if self.conversion_rate.is_zero() {
            return Err(ContractError::InvalidAmount(
                "conversion_rate must be positive".into(),
            ));
        }
        if self.daily_limit.is_zero() {
            return Err(ContractError::InvalidAmount(
                "daily_limit must be positive".into(),
            ));
        }
        if self.per_tx_limit.is_zero() {
            return Err(ContractError::InvalidAmount(
                "per_tx_limit must be positive".into(),
            ));
        }
        if self.per_tx_limit > self.daily_limit {
            return Err(ContractError::InvalidAmount(
                "per_tx_limit must not exceed daily_limit".into(),
            ));
        }
        Ok(())
    }
}

/// Checks the caller against the governance authority recorded in `Config`.
///
/// Registry and parameter mutations are the only operations gated this way;
/// everything else is gated by validator eligibility (see
/// [`crate::collaborators::ValidatorRegistry`]).
pub fn require_authority(authority: &Addr, sender: &Addr) -> ContractResult<()> {
    if authority != sender {
        return Err(ContractError::Unauthorized {});
    }
    Ok(())
}

pub fn add_chain(storage: &mut dyn Storage, chain: Chain) -> ContractResult<()> {
    chain.validate()?;
    if CHAINS.has(storage, &chain.chain_id) {
        return Err(ContractError::AlreadyExists {});
    }
    CHAINS.save(storage, &chain.chain_id, &chain)?;
    Ok(())
}

pub fn add_asset(storage: &mut dyn Storage, asset: Asset) -> ContractResult<()> {
    if !CHAINS.has(storage, &asset.chain_id) {
        return Err(ContractError::UnknownChain(asset.chain_id.clone()));
    }
    asset.validate()?;
    let key = (asset.chain_id.as_str(), asset.symbol.as_str());
    if ASSETS.has(storage, key) {
        return Err(ContractError::AlreadyExists {});
    }
    ASSETS.save(storage, key, &asset)?;
    Ok(())
}

pub fn set_chain_enabled(
    storage: &mut dyn Storage,
    chain_id: &str,
    enabled: bool,
) -> ContractResult<()> {
    let mut chain = get_chain(storage, chain_id)?;
    chain.enabled = enabled;
    CHAINS.save(storage, chain_id, &chain)?;
    Ok(())
}

pub fn set_asset_enabled(
    storage: &mut dyn Storage,
    chain_id: &str,
    symbol: &str,
    enabled: bool,
) -> ContractResult<()> {
    let mut asset = get_asset(storage, chain_id, symbol)?;
    asset.enabled = enabled;
    ASSETS.save(storage, (chain_id, symbol), &asset)?;
    Ok(())
}

pub fn get_chain(storage: &dyn Storage, chain_id: &str) -> ContractResult<Chain> {
    CHAINS
        .may_load(storage, chain_id)?
        .ok_or_else(|| ContractError::UnknownChain(chain_id.to_string()))
}

pub fn get_asset(storage: &dyn Storage, chain_id: &str, symbol: &str) -> ContractResult<Asset> {
    ASSETS
        .may_load(storage, (chain_id, symbol))?
        .ok_or_else(|| ContractError::UnknownAsset(chain_id.to_string(), symbol.to_string()))
}

/// Re-validates that both the chain and asset are currently enabled.
///
/// Deposit and withdrawal admission MUST call this at entry: enabling or
/// disabling a chain/asset never retroactively invalidates in-flight records.
pub fn require_enabled(storage: &dyn Storage, chain_id: &str, symbol: &str) -> ContractResult<(Chain, Asset)> {
    let chain = get_chain(storage, chain_id)?;
    let asset = get_asset(storage, chain_id, symbol)?;
    if !chain.enabled || !asset.enabled {
        return Err(ContractError::Disabled(format!("{chain_id}/{symbol}")));
    }
    Ok((chain, asset))
}
