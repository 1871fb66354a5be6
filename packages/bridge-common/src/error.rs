use cosmwasm_std::StdError;

/// The error taxonomy shared by every entry point of the bridge contract.
///
/// Variants are grouped by concern: input validation, authorization,
/// state/idempotency, ledger, and TSS.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    // --- input validation ---
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid external tx hash: {0}")]
    InvalidTxHash(String),
    #[error("Unknown chain: {0}")]
    UnknownChain(String),
    #[error("Unknown asset: {0}/{1}")]
    UnknownAsset(String, String),
    #[error("Chain or asset is disabled: {0}")]
    Disabled(String),
    #[error("Amount is out of bounds")]
    AmountOutOfBounds {},
    #[error("Amount is too small after fees")]
    AmountTooSmall {},

    // --- authorization ---
    #[error("Sender is not an eligible validator")]
    NotValidator {},
    #[error("Validator tier is below the configured minimum")]
    InsufficientTier {},
    #[error("Sender is not a participant in this TSS session")]
    NotParticipant {},
    #[error("Sender is not authorized to perform this action")]
    Unauthorized {},

    // --- state / idempotency ---
    #[error("{0} not found")]
    NotFound(String),
    #[error("Entity is already in a terminal state")]
    AlreadyFinal {},
    #[error("Validator has already attested to this deposit")]
    DuplicateAttestation {},
    #[error("Validator has already submitted a share for this session")]
    AlreadySubmitted {},
    #[error("TSS session is already in a terminal state")]
    SessionFinal {},
    #[error("Operation is paused by the circuit breaker")]
    Paused {},
    #[error("Rate limit exceeded for this chain/asset window")]
    RateLimitExceeded {},
    #[error("A chain or asset with this key already exists")]
    AlreadyExists {},

    // --- ledger ---
    #[error("Insufficient funds")]
    InsufficientFunds {},
    #[error("Ledger collaborator refused the operation: {0}")]
    LedgerFailure(String),

    // --- TSS ---
    #[error("Signature share is invalid")]
    InvalidShare {},
    #[error("Threshold signature combination failed: {0}")]
    CombineFailed(String),
    #[error("TSS session timed out")]
    TssTimeout {},
}

impl From<ContractError> for StdError {
    fn from(source: ContractError) -> Self {
        Self::generic_err(source.to_string())
    }
}

pub type ContractResult<T> = std::result::Result<T, ContractError>;
