#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{to_json_binary, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult};
use cw2::set_contract_version;

use crate::collaborators::WasmCollaborators;
use crate::deposit;
use crate::error::ContractError;
use crate::interface::Config;
use crate::msg::{BroadcastResultInput, CircuitBreakerInput, ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg, SudoMsg};
use crate::params::{CircuitBreaker, Params};
use crate::registry::{self, require_authority};
use crate::state::{ASSETS, ATTESTATIONS, CHAINS, CIRCUIT_BREAKER, CONFIG, DEPOSITS, PARAMS, RATE_LIMIT_WINDOWS, TSS_SESSIONS, WITHDRAWALS};
use crate::tick;
use crate::tss;
use crate::withdrawal;

const CONTRACT_NAME: &str = "crates.io:cw-bridge";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    msg.params.validate()?;

    CONFIG.save(
        deps.storage,
        &Config {
            governance: msg.governance,
            ledger_addr: msg.ledger_addr,
            validator_registry_addr: msg.validator_registry_addr,
            tss_combiner_addr: msg.tss_combiner_addr,
            outbound_broadcaster_addr: msg.outbound_broadcaster_addr,
            payload_formatters: msg.payload_formatters,
        },
    )?;
    PARAMS.save(deps.storage, &msg.params)?;
    CIRCUIT_BREAKER.save(
        deps.storage,
        &CircuitBreaker::none(env.block.time, info.sender),
    )?;

    Ok(Response::new().add_attribute("action", "instantiate"))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    let now = env.block.time;
    match msg {
        ExecuteMsg::AddChain { chain } => {
            let config = CONFIG.load(deps.storage)?;
            require_authority(&config.governance, &info.sender)?;
            registry::add_chain(deps.storage, chain)?;
            Ok(Response::new().add_attribute("action", "add_chain"))
        }
        ExecuteMsg::AddAsset { asset } => {
            let config = CONFIG.load(deps.storage)?;
            require_authority(&config.governance, &info.sender)?;
            registry::add_asset(deps.storage, asset)?;
            Ok(Response::new().add_attribute("action", "add_asset"))
        }
        ExecuteMsg::SetParams { params } => {
            let config = CONFIG.load(deps.storage)?;
            require_authority(&config.governance, &info.sender)?;
            params.validate()?;
            PARAMS.save(deps.storage, &params)?;
            Ok(Response::new().add_attribute("action", "set_params"))
        }
        ExecuteMsg::SetCircuitBreaker { circuit_breaker } => {
            let config = CONFIG.load(deps.storage)?;
            require_authority(&config.governance, &info.sender)?;
            let cb = CircuitBreaker {
                enabled: circuit_breaker.enabled,
                reason: circuit_breaker.reason.clone(),
                triggered_by: info.sender,
                triggered_at: now,
                can_deposit: circuit_breaker.can_deposit,
                can_withdraw: circuit_breaker.can_withdraw,
                can_attest: circuit_breaker.can_attest,
                expires_at: circuit_breaker.expires_at,
            };
            CIRCUIT_BREAKER.save(deps.storage, &cb)?;
            Ok(Response::new()
                .add_attribute("action", "set_circuit_breaker")
                .add_event(crate::events::circuit_breaker_updated(
                    cb.enabled,
                    &circuit_breaker.reason,
                )))
        }
        ExecuteMsg::SetChainEnabled { chain_id, enabled } => {
            let config = CONFIG.load(deps.storage)?;
            require_authority(&config.governance, &info.sender)?;
            registry::set_chain_enabled(deps.storage, &chain_id, enabled)?;
            Ok(Response::new().add_attribute("action", "set_chain_enabled"))
        }
        ExecuteMsg::SetAssetEnabled {
            chain_id,
            symbol,
            enabled,
        } => {
            let config = CONFIG.load(deps.storage)?;
            require_authority(&config.governance, &info.sender)?;
            registry::set_asset_enabled(deps.storage, &chain_id, &symbol, enabled)?;
            Ok(Response::new().add_attribute("action", "set_asset_enabled"))
        }

        ExecuteMsg::ObserveDeposit {
            chain_id,
            asset_symbol,
            external_tx_hash,
            external_block_height,
            external_sender,
            local_recipient,
            external_amount,
        } => {
            let config = CONFIG.load(deps.storage)?;
            let collaborators = WasmCollaborators::new(deps.querier, &config);
            let params = PARAMS.load(deps.storage)?;
            let breaker = CIRCUIT_BREAKER.load(deps.storage)?;
            let outcome = deposit::observe_deposit(
                deps.storage,
                &collaborators,
                &collaborators,
                &breaker,
                &params,
                now,
                &info.sender,
                &chain_id,
                &asset_symbol,
                &external_tx_hash,
                external_block_height,
                &external_sender,
                &local_recipient,
                external_amount,
            )?;
            let mut resp = Response::new()
                .add_attribute("action", "observe_deposit")
                .add_attribute("deposit_id", outcome.deposit_id.to_string())
                .add_events(outcome.events);
            if let Some(mint) = outcome.mint_msg {
                resp = resp.add_message(mint);
            }
            Ok(resp)
        }
        ExecuteMsg::AttestDeposit {
            deposit_id,
            approved,
            observed_tx_hash,
            observed_amount,
        } => {
            let config = CONFIG.load(deps.storage)?;
            let collaborators = WasmCollaborators::new(deps.querier, &config);
            let params = PARAMS.load(deps.storage)?;
            let breaker = CIRCUIT_BREAKER.load(deps.storage)?;
            let outcome = deposit::attest_deposit(
                deps.storage,
                &collaborators,
                &collaborators,
                &breaker,
                &params,
                now,
                &info.sender,
                deposit_id,
                approved,
                &observed_tx_hash,
                observed_amount,
            )?;
            let mut resp = Response::new()
                .add_attribute("action", "attest_deposit")
                .add_events(outcome.events);
            if let Some(mint) = outcome.mint_msg {
                resp = resp.add_message(mint);
            }
            Ok(resp)
        }
        ExecuteMsg::SubmitTssShare { session_id, share } => {
            let config = CONFIG.load(deps.storage)?;
            let collaborators = WasmCollaborators::new(deps.querier, &config);
            let outcome =
                tss::submit_share(deps.storage, &collaborators, now, &info.sender, session_id, share)?;
            let mut resp = Response::new().add_attribute("action", "submit_tss_share");
            match outcome {
                tss::SubmitOutcome::Pending => {}
                tss::SubmitOutcome::Completed {
                    combined_signature,
                    events,
                } => {
                    let session = TSS_SESSIONS.load(deps.storage, session_id)?;
                    let signed_events =
                        withdrawal::on_tss_completed(deps.storage, session.withdrawal_id, &combined_signature)?;
                    resp = resp.add_events(events).add_events(signed_events);
                }
                tss::SubmitOutcome::Failed { reason, events } => {
                    let session = TSS_SESSIONS.load(deps.storage, session_id)?;
                    let failed_events = withdrawal::on_tss_failed(deps.storage, session.withdrawal_id, &reason)?;
                    resp = resp.add_events(events).add_events(failed_events);
                }
            }
            Ok(resp)
        }

        ExecuteMsg::RequestWithdrawal {
            chain_id,
            asset_symbol,
            external_recipient,
            native_burned,
        } => {
            let config = CONFIG.load(deps.storage)?;
            let collaborators = WasmCollaborators::new(deps.querier, &config);
            let params = PARAMS.load(deps.storage)?;
            let breaker = CIRCUIT_BREAKER.load(deps.storage)?;
            let outcome = withdrawal::request_withdrawal(
                deps.storage,
                &collaborators,
                &env.contract.address,
                &breaker,
                &params,
                now,
                &info.sender,
                &chain_id,
                &asset_symbol,
                &external_recipient,
                native_burned,
            )?;
            Ok(Response::new()
                .add_attribute("action", "request_withdrawal")
                .add_attribute("withdrawal_id", outcome.withdrawal_id.to_string())
                .add_events(outcome.events)
                .add_messages(outcome.msgs))
        }
        ExecuteMsg::CancelWithdrawal { withdrawal_id } => {
            let config = CONFIG.load(deps.storage)?;
            let collaborators = WasmCollaborators::new(deps.querier, &config);
            let outcome = withdrawal::cancel_withdrawal(
                deps.storage,
                &collaborators,
                &env.contract.address,
                now,
                &info.sender,
                withdrawal_id,
            )?;
            Ok(Response::new()
                .add_attribute("action", "cancel_withdrawal")
                .add_events(outcome.events)
                .add_messages(outcome.msgs))
        }
        ExecuteMsg::BroadcastResult {
            withdrawal_id,
            result,
        } => {
            let config = CONFIG.load(deps.storage)?;
            require_authority(&config.outbound_broadcaster_addr, &info.sender)?;
            let collaborators = WasmCollaborators::new(deps.querier, &config);
            let result = match result {
                BroadcastResultInput::Success { external_tx_hash } => Ok(external_tx_hash),
                BroadcastResultInput::Failure { reason } => Err(reason),
            };
            let outcome = withdrawal::on_broadcast_result(
                deps.storage,
                &collaborators,
                &env.contract.address,
                withdrawal_id,
                now,
                result,
            )?;
            Ok(Response::new()
                .add_attribute("action", "broadcast_result")
                .add_events(outcome.events)
                .add_messages(outcome.msgs))
        }
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn sudo(deps: DepsMut, env: Env, msg: SudoMsg) -> Result<Response, ContractError> {
    match msg {
        SudoMsg::ClockEndBlock {} => {
            let config = CONFIG.load(deps.storage)?;
            let collaborators = WasmCollaborators::new(deps.querier, &config);
            let params = PARAMS.load(deps.storage)?;
            let outcome = tick::tick(
                deps.storage,
                &collaborators,
                &env.contract.address,
                &collaborators,
                &collaborators,
                &params,
                env.block.time,
            )?;
            Ok(Response::new()
                .add_attribute("action", "tick")
                .add_events(outcome.events)
                .add_messages(outcome.msgs))
        }
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Chain { chain_id } => to_json_binary(&CHAINS.load(deps.storage, &chain_id)?),
        QueryMsg::Asset { chain_id, symbol } => {
            to_json_binary(&ASSETS.load(deps.storage, (&chain_id, &symbol))?)
        }
        QueryMsg::Params {} => to_json_binary(&PARAMS.load(deps.storage)?),
        QueryMsg::CircuitBreaker {} => to_json_binary(&CIRCUIT_BREAKER.load(deps.storage)?),
        QueryMsg::Deposit { deposit_id } => to_json_binary(&DEPOSITS.load(deps.storage, deposit_id)?),
        QueryMsg::Attestation { deposit_id, validator } => to_json_binary(
            &ATTESTATIONS.may_load(deps.storage, (deposit_id, validator.as_str()))?,
        ),
        QueryMsg::Withdrawal { withdrawal_id } => {
            to_json_binary(&WITHDRAWALS.load(deps.storage, withdrawal_id)?)
        }
        QueryMsg::TssSession { session_id } => to_json_binary(&TSS_SESSIONS.load(deps.storage, session_id)?),
        QueryMsg::RateLimitWindow {
            chain_id,
            asset_symbol,
        } => to_json_binary(&RATE_LIMIT_WINDOWS.load(deps.storage, (&chain_id, &asset_symbol))?),
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let original_version = cw2::ensure_from_older_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    Ok(Response::new().add_attribute("new_version", original_version.to_string()))
}
