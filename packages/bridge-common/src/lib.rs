pub mod error;
pub mod ratio;

pub use error::{ContractError, ContractResult};
pub use ratio::Ratio;
