//! In-memory fakes for the collaborator traits, used only by unit tests so
//! the control-plane state machines can be exercised without a live chain.

use std::cell::RefCell;
use std::collections::HashMap;

use cosmwasm_std::{Addr, Binary, CosmosMsg, Empty, Uint128};

use crate::collaborators::{Ledger, PayloadFormatter, TssCombiner, ValidatorRegistry};
use crate::error::{ContractError, ContractResult};
use crate::interface::PayloadRequest;
use crate::types::ChainKind;

#[derive(Default)]
pub struct FakeLedger {
    balances: RefCell<HashMap<String, Uint128>>,
    pub minted: RefCell<Vec<(String, Uint128)>>,
    pub burned: RefCell<Vec<(String, Uint128)>>,
    pub transferred: RefCell<Vec<(String, String, Uint128)>>,
    fail_insufficient: RefCell<bool>,
}

impl FakeLedger {
    pub fn with_balance(addr: &str, amount: Uint128) -> Self {
        let ledger = FakeLedger::default();
        ledger.balances.borrow_mut().insert(addr.to_string(), amount);
        ledger
    }

    pub fn set_insufficient(&self, fail: bool) {
        *self.fail_insufficient.borrow_mut() = fail;
    }
}

impl Ledger for FakeLedger {
    fn get_balance(&self, addr: &Addr) -> ContractResult<Uint128> {
        Ok(self
            .balances
            .borrow()
            .get(addr.as_str())
            .copied()
            .unwrap_or_else(Uint128::zero))
    }

    fn mint_msg(&self, to: &Addr, amount: Uint128) -> ContractResult<CosmosMsg> {
        self.minted.borrow_mut().push((to.to_string(), amount));
        Ok(CosmosMsg::Custom(Empty {}))
    }

    fn burn_msg(&self, from_module: &Addr, amount: Uint128) -> ContractResult<CosmosMsg> {
        if *self.fail_insufficient.borrow() {
            return Err(ContractError::InsufficientFunds {});
        }
        self.burned.borrow_mut().push((from_module.to_string(), amount));
        Ok(CosmosMsg::Custom(Empty {}))
    }

    fn transfer_msg(&self, from: &Addr, to_module: &Addr, amount: Uint128) -> ContractResult<CosmosMsg> {
        if *self.fail_insufficient.borrow() {
            return Err(ContractError::InsufficientFunds {});
        }
        self.transferred
            .borrow_mut()
            .push((from.to_string(), to_module.to_string(), amount));
        Ok(CosmosMsg::Custom(Empty {}))
    }
}

pub struct FakeValidatorRegistry {
    tiers: HashMap<String, u64>,
}

impl FakeValidatorRegistry {
    pub fn with_tiers(entries: Vec<(&str, u64)>) -> Self {
        FakeValidatorRegistry {
            tiers: entries.into_iter().map(|(a, t)| (a.to_string(), t)).collect(),
        }
    }
}

impl ValidatorRegistry for FakeValidatorRegistry {
    fn is_eligible(&self, addr: &Addr, min_tier: u64) -> ContractResult<bool> {
        Ok(self.tier(addr)? >= min_tier)
    }

    fn list_eligible(&self, min_tier: u64) -> ContractResult<Vec<Addr>> {
        Ok(self
            .tiers
            .iter()
            .filter(|(_, tier)| **tier >= min_tier)
            .map(|(addr, _)| Addr::unchecked(addr.as_str()))
            .collect())
    }

    fn tier(&self, addr: &Addr) -> ContractResult<u64> {
        Ok(self.tiers.get(addr.as_str()).copied().unwrap_or(0))
    }
}

#[derive(Default)]
pub struct FakeTssCombiner {
    pub fail: RefCell<bool>,
}

impl TssCombiner for FakeTssCombiner {
    fn combine(&self, message: &Binary, shares: &[(Addr, Binary)]) -> ContractResult<Binary> {
        if *self.fail.borrow() {
            return Err(ContractError::CombineFailed("fake combiner failure".into()));
        }
        let mut combined = message.to_vec();
        for (_, share) in shares {
            combined.extend_from_slice(share.as_slice());
        }
        Ok(Binary::from(combined))
    }

    fn verify_share(&self, _message: &Binary, _validator: &Addr, _share: &Binary) -> ContractResult<bool> {
        Ok(true)
    }
}

#[derive(Default)]
pub struct FakePayloadFormatter;

impl PayloadFormatter for FakePayloadFormatter {
    fn build_payload(&self, _kind: ChainKind, request: &PayloadRequest) -> ContractResult<Binary> {
        Ok(Binary::from(
            format!("{}:{}:{}", request.withdrawal_id, request.chain_id, request.external_recipient)
                .into_bytes(),
        ))
    }
}
