use cosmwasm_schema::cw_serde;

/// The operation kinds the circuit breaker gates independently.
///
/// Mirrors the `can_deposit` / `can_withdraw` / `can_attest` flags on
/// [`crate::params::CircuitBreaker`].
#[cw_serde]
#[derive(Copy, Eq, Hash)]
pub enum Operation {
    Deposit,
    Withdraw,
    Attest,
}

/// The structural family an external chain belongs to.
///
/// The core never branches on a specific `chain_id`; instead every
/// chain-kind-dependent decision (address validation, tx-hash parsing,
/// payload construction) is dispatched through [`crate::chain_kind::ChainKindOps`].
#[cw_serde]
#[derive(Copy, Eq, Hash)]
pub enum ChainKind {
    Utxo,
    Account,
    Other,
}
