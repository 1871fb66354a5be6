use cosmwasm_std::{to_json_binary, Addr, Binary, CosmosMsg, QuerierWrapper, Uint128, WasmMsg};

use crate::error::{ContractError, ContractResult};
use crate::interface::{
    Config, LedgerExecuteMsg, LedgerQueryMsg, PayloadFormatterQueryMsg, PayloadRequest,
    TssCombinerQueryMsg, ValidatorRegistryQueryMsg,
};
use crate::types::ChainKind;

/// The native ledger: mint on deposit completion, burn/escrow on withdrawal.
///
/// Mutating operations return the `CosmosMsg` to append to the handler's
/// `Response` rather than performing the effect themselves — CosmWasm already
/// guarantees that message and the state transition that produced it commit
/// or revert together, which is what gives the Deposit/Withdrawal machines
/// their atomic mint/burn semantics (see the withdrawal and deposit modules).
pub trait Ledger {
    fn get_balance(&self, addr: &Addr) -> ContractResult<Uint128>;
    fn mint_msg(&self, to: &Addr, amount: Uint128) -> ContractResult<CosmosMsg>;
    fn burn_msg(&self, from_module: &Addr, amount: Uint128) -> ContractResult<CosmosMsg>;
    fn transfer_msg(&self, from: &Addr, to_module: &Addr, amount: Uint128) -> ContractResult<CosmosMsg>;
}

/// The external validator set: eligibility is `tier >= min_validator_tier`.
pub trait ValidatorRegistry {
    fn is_eligible(&self, addr: &Addr, min_tier: u64) -> ContractResult<bool>;
    fn list_eligible(&self, min_tier: u64) -> ContractResult<Vec<Addr>>;
    fn tier(&self, addr: &Addr) -> ContractResult<u64>;
}

/// Builds the external-chain payload a TSS session must sign.
pub trait PayloadFormatter {
    fn build_payload(&self, kind: ChainKind, request: &PayloadRequest) -> ContractResult<Binary>;
}

/// The abstract threshold-signature combiner (§ Non-goals: the cryptographic
/// scheme itself is out of scope).
pub trait TssCombiner {
    fn combine(&self, message: &Binary, shares: &[(Addr, Binary)]) -> ContractResult<Binary>;
    fn verify_share(&self, message: &Binary, validator: &Addr, share: &Binary) -> ContractResult<bool>;
}

/// CosmWasm-backed collaborator set: every call is a smart query or a
/// `WasmMsg::Execute` against the addresses recorded in `Config`.
pub struct WasmCollaborators<'a> {
    pub querier: QuerierWrapper<'a>,
    pub config: &'a Config,
}

impl<'a> WasmCollaborators<'a> {
    pub fn new(querier: QuerierWrapper<'a>, config: &'a Config) -> Self {
        WasmCollaborators { querier, config }
    }
}

impl<'a> Ledger for WasmCollaborators<'a> {
    fn get_balance(&self, addr: &Addr) -> ContractResult<Uint128> {
        let balance: Uint128 = self.querier.query_wasm_smart(
            self.config.ledger_addr.clone(),
            &LedgerQueryMsg::Balance {
                address: addr.clone(),
            },
        )?;
        Ok(balance)
    }

    fn mint_msg(&self, to: &Addr, amount: Uint128) -> ContractResult<CosmosMsg> {
        Ok(WasmMsg::Execute {
            contract_addr: self.config.ledger_addr.to_string(),
            msg: to_json_binary(&LedgerExecuteMsg::Mint {
                to: to.clone(),
                amount,
            })?,
            funds: vec![],
        }
        .into())
    }

    fn burn_msg(&self, from_module: &Addr, amount: Uint128) -> ContractResult<CosmosMsg> {
        Ok(WasmMsg::Execute {
            contract_addr: self.config.ledger_addr.to_string(),
            msg: to_json_binary(&LedgerExecuteMsg::Burn {
                from_module: from_module.clone(),
                amount,
            })?,
            funds: vec![],
        }
        .into())
    }

    fn transfer_msg(&self, from: &Addr, to_module: &Addr, amount: Uint128) -> ContractResult<CosmosMsg> {
        Ok(WasmMsg::Execute {
            contract_addr: self.config.ledger_addr.to_string(),
            msg: to_json_binary(&LedgerExecuteMsg::Transfer {
                from: from.clone(),
                to_module: to_module.clone(),
                amount,
            })?,
            funds: vec![],
        }
        .into())
    }
}

impl<'a> ValidatorRegistry for WasmCollaborators<'a> {
    fn is_eligible(&self, addr: &Addr, min_tier: u64) -> ContractResult<bool> {
        Ok(self.tier(addr)? >= min_tier)
    }

    fn list_eligible(&self, min_tier: u64) -> ContractResult<Vec<Addr>> {
        let addrs: Vec<Addr> = self.querier.query_wasm_smart(
            self.config.validator_registry_addr.clone(),
            &ValidatorRegistryQueryMsg::ListEligible { min_tier },
        )?;
        Ok(addrs)
    }

    fn tier(&self, addr: &Addr) -> ContractResult<u64> {
        let tier: u64 = self.querier.query_wasm_smart(
            self.config.validator_registry_addr.clone(),
            &ValidatorRegistryQueryMsg::Tier {
                address: addr.clone(),
            },
        )?;
        Ok(tier)
    }
}

impl<'a> PayloadFormatter for WasmCollaborators<'a> {
    fn build_payload(&self, kind: ChainKind, request: &PayloadRequest) -> ContractResult<Binary> {
        let addr = self
            .config
            .payload_formatter(kind)
            .ok_or_else(|| ContractError::LedgerFailure("no payload formatter configured".into()))?;
        let payload: Binary = self.querier.query_wasm_smart(
            addr.clone(),
            &PayloadFormatterQueryMsg::BuildPayload {
                request: request.clone(),
            },
        )?;
        Ok(payload)
    }
}

impl<'a> TssCombiner for WasmCollaborators<'a> {
    fn combine(&self, message: &Binary, shares: &[(Addr, Binary)]) -> ContractResult<Binary> {
        let sig: Binary = self.querier.query_wasm_smart(
            self.config.tss_combiner_addr.clone(),
            &TssCombinerQueryMsg::Combine {
                message: message.clone(),
                shares: shares.to_vec(),
            },
        )?;
        Ok(sig)
    }

    fn verify_share(&self, message: &Binary, validator: &Addr, share: &Binary) -> ContractResult<bool> {
        let ok: bool = self.querier.query_wasm_smart(
            self.config.tss_combiner_addr.clone(),
            &TssCombinerQueryMsg::VerifyShare {
                message: message.clone(),
                validator: validator.clone(),
                share: share.clone(),
            },
        )?;
        Ok(ok)
    }
}
