use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Binary, Uint128};

use crate::deposit::{Attestation, Deposit};
use crate::params::{CircuitBreaker, Params};
use crate::rate_limit::RateLimitWindow;
use crate::registry::{Asset, Chain};
use crate::tss::TssSession;
use crate::withdrawal::Withdrawal;

#[cw_serde]
pub struct InstantiateMsg {
    pub governance: Addr,
    pub ledger_addr: Addr,
    pub validator_registry_addr: Addr,
    pub tss_combiner_addr: Addr,
    pub outbound_broadcaster_addr: Addr,
    pub payload_formatters: Vec<(crate::types::ChainKind, Addr)>,
    pub params: Params,
}

#[cw_serde]
pub enum ExecuteMsg {
    // --- governance ---
    AddChain {
        chain: Chain,
    },
    AddAsset {
        asset: Asset,
    },
    SetParams {
        params: Params,
    },
    SetCircuitBreaker {
        circuit_breaker: CircuitBreakerInput,
    },
    SetChainEnabled {
        chain_id: String,
        enabled: bool,
    },
    SetAssetEnabled {
        chain_id: String,
        symbol: String,
        enabled: bool,
    },

    // --- validator traffic ---
    ObserveDeposit {
        chain_id: String,
        asset_symbol: String,
        external_tx_hash: String,
        external_block_height: u64,
        external_sender: String,
        local_recipient: Addr,
        external_amount: Uint128,
    },
    AttestDeposit {
        deposit_id: u64,
        approved: bool,
        observed_tx_hash: String,
        observed_amount: Uint128,
    },
    SubmitTssShare {
        session_id: u64,
        share: Binary,
    },

    // --- user traffic ---
    RequestWithdrawal {
        chain_id: String,
        asset_symbol: String,
        external_recipient: String,
        native_burned: Uint128,
    },
    CancelWithdrawal {
        withdrawal_id: u64,
    },

    // --- outbound broadcaster collaborator ---
    BroadcastResult {
        withdrawal_id: u64,
        result: BroadcastResultInput,
    },
}

/// Mirrors `CircuitBreaker` minus the fields the contract derives itself
/// (`triggered_by`/`triggered_at` are stamped from `info.sender`/`env.block`).
#[cw_serde]
pub struct CircuitBreakerInput {
    pub enabled: bool,
    pub reason: String,
    pub can_deposit: bool,
    pub can_withdraw: bool,
    pub can_attest: bool,
    pub expires_at: Option<cosmwasm_std::Timestamp>,
}

#[cw_serde]
pub enum BroadcastResultInput {
    Success { external_tx_hash: String },
    Failure { reason: String },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(Chain)]
    Chain { chain_id: String },
    #[returns(Asset)]
    Asset { chain_id: String, symbol: String },
    #[returns(Params)]
    Params {},
    #[returns(CircuitBreaker)]
    CircuitBreaker {},
    #[returns(Deposit)]
    Deposit { deposit_id: u64 },
    #[returns(Option<Attestation>)]
    Attestation { deposit_id: u64, validator: Addr },
    #[returns(Withdrawal)]
    Withdrawal { withdrawal_id: u64 },
    #[returns(TssSession)]
    TssSession { session_id: u64 },
    #[returns(RateLimitWindow)]
    RateLimitWindow { chain_id: String, asset_symbol: String },
}

#[cw_serde]
pub enum SudoMsg {
    /// Invoked once per chain-tick by the surrounding consensus layer; runs
    /// the fixed five-step sweep described in the tick driver section.
    ClockEndBlock {},
}

#[cw_serde]
pub struct MigrateMsg {}
