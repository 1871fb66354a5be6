mod chain_kind;
mod collaborators;
mod deposit;
mod error;
mod events;
mod interface;
mod msg;
mod params;
mod rate_limit;
mod registry;
mod state;
#[cfg(test)]
mod testutil;
mod tick;
mod tss;
mod types;
mod withdrawal;

pub mod contract;
pub use msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg, SudoMsg};
