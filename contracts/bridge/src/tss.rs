use std::collections::BTreeSet;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Binary, Event, Storage, Timestamp};

use crate::collaborators::TssCombiner;
use crate::error::{ContractError, ContractResult};
use crate::params::Params;
use crate::state::{self, TSS_SESSIONS};

#[cw_serde]
pub enum TssSessionStatus {
    Active,
    Completed,
    Failed,
    Timeout,
}

/// A bounded coordination instance in which `participants` exchange shares
/// for `message`, bound 1:1 to the withdrawal that requested it.
///
/// `shares` is an ordered `Vec` only because `cw_serde` needs something
/// serializable; determinism of the produced signature does not depend on
/// this order (see `submit_share`) — duplicate detection and the combiner
/// itself are keyed by `validator_address`, not position.
#[cw_serde]
pub struct TssSession {
    pub id: u64,
    pub withdrawal_id: u64,
    pub chain_id: String,
    pub status: TssSessionStatus,
    pub participants: Vec<Addr>,
    pub required_shares: u64,
    pub message: Binary,
    pub shares: Vec<TssShare>,
    pub combined_signature: Option<Binary>,
    pub created_at: Timestamp,
    pub timeout_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

#[cw_serde]
pub struct TssShare {
    pub validator: Addr,
    pub share: Binary,
}

impl TssSession {
    fn has_share_from(&self, validator: &Addr) -> bool {
        self.shares.iter().any(|s| &s.validator == validator)
    }
}

pub enum SubmitOutcome {
    Pending,
    Completed {
        combined_signature: Binary,
        events: Vec<Event>,
    },
    Failed {
        reason: String,
        events: Vec<Event>,
    },
}

/// Opens a session for `withdrawal_id`: participants are every validator
/// with tier >= `min_validator_tier`, `required_shares` is derived from
/// `tss_threshold` over that population at session-creation time.
pub fn open_session(
    storage: &mut dyn Storage,
    params: &Params,
    now: Timestamp,
    withdrawal_id: u64,
    chain_id: &str,
    participants: Vec<Addr>,
    message: Binary,
) -> ContractResult<TssSession> {
    let required_shares = params.tss_threshold.apply_ceil(participants.len() as u64).max(1);
    if required_shares > participants.len() as u64 {
        return Err(ContractError::CombineFailed(
            "not enough eligible validators to reach the TSS threshold".into(),
        ));
    }
    let id = state::next_session_id(storage)?;
    let session = TssSession {
        id,
        withdrawal_id,
        chain_id: chain_id.to_string(),
        status: TssSessionStatus::Active,
        participants,
        required_shares,
        message,
        shares: Vec::new(),
        combined_signature: None,
        created_at: now,
        timeout_at: now.plus_seconds(params.session_timeout),
        completed_at: None,
    };
    TSS_SESSIONS.save(storage, id, &session)?;
    Ok(session)
}

/// Appends `validator`'s share and, once `required_shares` is met, invokes
/// the combiner. The first submission that satisfies the threshold wins;
/// later submissions from other participants in the same block are simply
/// rejected with `SESSION_FINAL`, matching the "first message that
/// satisfies the threshold triggers combine" ordering guarantee.
pub fn submit_share(
    storage: &mut dyn Storage,
    combiner: &dyn TssCombiner,
    now: Timestamp,
    validator: &Addr,
    session_id: u64,
    share_bytes: Binary,
) -> ContractResult<SubmitOutcome> {
    let mut session = TSS_SESSIONS
        .may_load(storage, session_id)?
        .ok_or_else(|| ContractError::NotFound(format!("tss session {session_id}")))?;

    if !matches!(session.status, TssSessionStatus::Active) {
        return Err(ContractError::SessionFinal {});
    }
    if !session.participants.iter().any(|p| p == validator) {
        return Err(ContractError::NotParticipant {});
    }
    if session.has_share_from(validator) {
        return Err(ContractError::AlreadySubmitted {});
    }
    if !combiner.verify_share(&session.message, validator, &share_bytes)? {
        return Err(ContractError::InvalidShare {});
    }

    session.shares.push(TssShare {
        validator: validator.clone(),
        share: share_bytes,
    });

    let outcome = if (session.shares.len() as u64) < session.required_shares {
        TSS_SESSIONS.save(storage, session_id, &session)?;
        SubmitOutcome::Pending
    } else {
        let distinct: BTreeSet<&str> = session.shares.iter().map(|s| s.validator.as_str()).collect();
        debug_assert_eq!(distinct.len(), session.shares.len(), "duplicate shares slipped past has_share_from");

        let shares: Vec<(Addr, Binary)> = session
            .shares
            .iter()
            .map(|s| (s.validator.clone(), s.share.clone()))
            .collect();
        match combiner.combine(&session.message, &shares) {
            Ok(signature) => {
                session.status = TssSessionStatus::Completed;
                session.combined_signature = Some(signature.clone());
                session.completed_at = Some(now);
                TSS_SESSIONS.save(storage, session_id, &session)?;
                SubmitOutcome::Completed {
                    combined_signature: signature,
                    events: vec![],
                }
            }
            Err(ContractError::CombineFailed(reason)) => {
                session.status = TssSessionStatus::Failed;
                session.completed_at = Some(now);
                TSS_SESSIONS.save(storage, session_id, &session)?;
                SubmitOutcome::Failed { reason, events: vec![] }
            }
            Err(e) => return Err(e),
        }
    };
    Ok(outcome)
}

/// Step (4) of the tick sweep: times out every active session whose
/// `timeout_at` has passed, returning the withdrawal ids that must be
/// failed-and-refunded.
pub fn expire_sessions(storage: &mut dyn Storage, now: Timestamp) -> ContractResult<Vec<u64>> {
    let expired: Vec<TssSession> = TSS_SESSIONS
        .range(storage, None, None, cosmwasm_std::Order::Ascending)
        .filter_map(|item| item.ok())
        .map(|(_, s)| s)
        .filter(|s| matches!(s.status, TssSessionStatus::Active) && now >= s.timeout_at)
        .collect();

    let mut withdrawal_ids = Vec::with_capacity(expired.len());
    for mut session in expired {
        session.status = TssSessionStatus::Timeout;
        session.completed_at = Some(now);
        withdrawal_ids.push(session.withdrawal_id);
        TSS_SESSIONS.save(storage, session.id, &session)?;
    }
    Ok(withdrawal_ids)
}
