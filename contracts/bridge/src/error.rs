pub use bridge_common::error::{ContractError, ContractResult};
