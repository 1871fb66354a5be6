use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Binary, Uint128};

use crate::types::ChainKind;

/// Contract-level collaborator wiring, set at `instantiate` and updatable by
/// governance. Mirrors the reference contract's `Config { owner,
/// token_factory_addr, bridge_wasm_addr }`, generalized to the bridge's full
/// set of external collaborators.
#[cw_serde]
pub struct Config {
    pub governance: Addr,
    pub ledger_addr: Addr,
    pub validator_registry_addr: Addr,
    pub tss_combiner_addr: Addr,
    /// The outbound broadcaster collaborator; the only sender authorized to
    /// submit `BroadcastResult`.
    pub outbound_broadcaster_addr: Addr,
    pub payload_formatters: Vec<(ChainKind, Addr)>,
}

impl Config {
    pub fn payload_formatter(&self, kind: ChainKind) -> Option<&Addr> {
        self.payload_formatters
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, addr)| addr)
    }
}

/// The request a withdrawal makes of the `PayloadFormatter` collaborator.
#[cw_serde]
pub struct PayloadRequest {
    pub withdrawal_id: u64,
    pub chain_id: String,
    pub external_recipient: String,
    pub external_amount: Uint128,
}

/// Wire messages sent to the `Ledger` collaborator contract.
///
/// The ledger is trusted by the bridge to hold the native token's mint
/// authority and to let the bridge module account act on escrowed balances;
/// establishing that trust relationship is out of scope here (external
/// collaborator, see the purpose/scope section).
#[cw_serde]
pub enum LedgerExecuteMsg {
    Mint { to: Addr, amount: Uint128 },
    Burn { from_module: Addr, amount: Uint128 },
    Transfer {
        from: Addr,
        to_module: Addr,
        amount: Uint128,
    },
}

#[cw_serde]
pub enum LedgerQueryMsg {
    Balance { address: Addr },
}

#[cw_serde]
pub enum ValidatorRegistryQueryMsg {
    IsEligible { address: Addr, min_tier: u64 },
    ListEligible { min_tier: u64 },
    Tier { address: Addr },
}

#[cw_serde]
pub enum PayloadFormatterQueryMsg {
    BuildPayload { request: PayloadRequest },
}

#[cw_serde]
pub enum TssCombinerQueryMsg {
    Combine {
        message: Binary,
        shares: Vec<(Addr, Binary)>,
    },
    VerifyShare {
        message: Binary,
        validator: Addr,
        share: Binary,
    },
}
