use crate::error::{ContractError, ContractResult};
use crate::types::ChainKind;

/// Structural (not business-logic) capabilities that differ by chain kind.
///
/// `build_payload` is deliberately absent here: constructing a real
/// external-chain signing payload needs chain-specific transaction rules the
/// core does not own, so it is always delegated to the
/// [`crate::collaborators::PayloadFormatter`] collaborator. This dispatch
/// only covers checks simple and structural enough for the core to make
/// directly, without ever branching on a specific `chain_id`.
pub trait ChainKindOps {
    fn validate_external_address(&self, address: &str) -> ContractResult<()>;
    fn parse_tx_hash(&self, hash: &str) -> ContractResult<()>;
}

struct Utxo;
struct Account;
struct Other;

impl ChainKindOps for Utxo {
    fn validate_external_address(&self, address: &str) -> ContractResult<()> {
        if address.is_empty() || address.len() > 90 {
            return Err(ContractError::InvalidAddress(address.to_string()));
        }
        Ok(())
    }

    fn parse_tx_hash(&self, hash: &str) -> ContractResult<()> {
        if hash.len() != 64 || !hash.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ContractError::InvalidTxHash(hash.to_string()));
        }
        Ok(())
    }
}

impl ChainKindOps for Account {
    fn validate_external_address(&self, address: &str) -> ContractResult<()> {
        let hex = address
            .strip_prefix("0x")
            .ok_or_else(|| ContractError::InvalidAddress(address.to_string()))?;
        if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ContractError::InvalidAddress(address.to_string()));
        }
        Ok(())
    }

    fn parse_tx_hash(&self, hash: &str) -> ContractResult<()> {
        let hex = hash
            .strip_prefix("0x")
            .ok_or_else(|| ContractError::InvalidTxHash(hash.to_string()))?;
        if hex.len() != 64 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ContractError::InvalidTxHash(hash.to_string()));
        }
        Ok(())
    }
}

impl ChainKindOps for Other {
    fn validate_external_address(&self, address: &str) -> ContractResult<()> {
        if address.is_empty() {
            return Err(ContractError::InvalidAddress(address.to_string()));
        }
        Ok(())
    }

    fn parse_tx_hash(&self, hash: &str) -> ContractResult<()> {
        if hash.is_empty() {
            return Err(ContractError::InvalidTxHash(hash.to_string()));
        }
        Ok(())
    }
}

/// Dispatches to the `ChainKindOps` implementation for `kind`.
pub fn ops(kind: ChainKind) -> Box<dyn ChainKindOps> {
    match kind {
        ChainKind::Utxo => Box::new(Utxo),
        ChainKind::Account => Box::new(Account),
        ChainKind::Other => Box::new(Other),
    }
}
