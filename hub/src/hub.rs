//! The hub: identity registry, trust upserts, settlement dispatch.

use crate::error::HubError;
use crate::event::HubEvent;
use halo_settlement::{build_hops, PathSettled};
use halo_token::PersonalToken;
use halo_trust::TrustGraph;
use halo_types::{HubParams, Timestamp, TokenId, UserAddress};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The system facade: one token per user, one shared parameter set.
///
/// Every mutating operation takes the caller's identity and the current time
/// explicitly; the hub holds no clock and spawns no tasks. The hosting
/// environment serializes calls, so interior mutability is unnecessary.
#[derive(Debug, Serialize, Deserialize)]
pub struct Hub {
    params: HubParams,
    tokens: HashMap<UserAddress, PersonalToken>,
    owners: HashMap<TokenId, UserAddress>,
    graph: TrustGraph,
    events: Vec<HubEvent>,
}

impl Hub {
    pub fn new(params: HubParams) -> Self {
        Self {
            params,
            tokens: HashMap::new(),
            owners: HashMap::new(),
            graph: TrustGraph::new(),
            events: Vec::new(),
        }
    }

    /// System-wide parameters (issuance rate, inflation, period, symbol, ...).
    pub fn params(&self) -> &HubParams {
        &self.params
    }

    pub fn is_registered(&self, user: &UserAddress) -> bool {
        self.tokens.contains_key(user)
    }

    /// The personal token owned by `user`, if registered.
    pub fn token(&self, user: &UserAddress) -> Option<&PersonalToken> {
        self.tokens.get(user)
    }

    /// Resolve a token identifier back to its owner.
    pub fn resolve_token(&self, token: &TokenId) -> Option<&UserAddress> {
        self.owners.get(token)
    }

    pub fn trust_graph(&self) -> &TrustGraph {
        &self.graph
    }

    // ── Registration ────────────────────────────────────────────────────

    /// Register the caller: deploy their personal token, credit the signup
    /// payout, and seed the immutable self-trust edge. Re-signup is
    /// rejected, never silently ignored.
    pub fn signup(
        &mut self,
        caller: &UserAddress,
        name: &str,
        now: Timestamp,
    ) -> Result<TokenId, HubError> {
        if self.tokens.contains_key(caller) {
            return Err(HubError::AlreadyRegistered(caller.clone()));
        }
        let mut params = self.params.clone();
        if !name.is_empty() {
            params.name = name.to_string();
        }
        let token = PersonalToken::new(caller.clone(), &params, now);
        let token_id = TokenId::for_owner(caller);
        self.tokens.insert(caller.clone(), token);
        self.owners.insert(token_id.clone(), caller.clone());
        self.graph
            .seed_self_trust(caller, self.params.initial_trust_percent);
        tracing::info!(user = %caller, token = %token_id, "user signed up");
        self.events.push(HubEvent::Signup {
            user: caller.clone(),
            token: token_id.clone(),
        });
        Ok(token_id)
    }

    // ── Trust ───────────────────────────────────────────────────────────

    /// Upsert the caller's outgoing trust edge toward `trustee`.
    pub fn trust(
        &mut self,
        caller: &UserAddress,
        trustee: &UserAddress,
        percent: u8,
    ) -> Result<(), HubError> {
        if caller != trustee && !self.tokens.contains_key(trustee) {
            return Err(HubError::UnknownUser(trustee.clone()));
        }
        self.graph.set_limit(caller, trustee, percent)?;
        self.events.push(HubEvent::TrustUpdated {
            truster: caller.clone(),
            trustee: trustee.clone(),
            percent,
        });
        Ok(())
    }

    /// Maximum amount of `token_owner`'s token that may flow so that `dest`
    /// ends up holding it. Never fails; unknown inputs read as zero.
    pub fn check_send_limit(
        &self,
        token_owner: &UserAddress,
        src: &UserAddress,
        dest: &UserAddress,
        now: Timestamp,
    ) -> u128 {
        halo_settlement::send_limit(&self.tokens, &self.graph, token_owner, src, dest, now)
    }

    // ── Path settlement ─────────────────────────────────────────────────

    /// Validate and execute a (possibly forking) path through the trust
    /// graph as one atomic unit, journaling a single aggregate event.
    pub fn transfer_through(
        &mut self,
        token_owners: &[UserAddress],
        srcs: &[UserAddress],
        dests: &[UserAddress],
        amounts: &[u128],
        now: Timestamp,
    ) -> Result<PathSettled, HubError> {
        let hops = build_hops(token_owners, srcs, dests, amounts)?;
        let settled = halo_settlement::settle(&mut self.tokens, &self.graph, &hops, now)?;
        self.events.push(HubEvent::PathSettled {
            src: settled.src.clone(),
            dest: settled.dest.clone(),
            amount: settled.amount,
        });
        Ok(settled)
    }

    // ── Token pass-throughs ─────────────────────────────────────────────

    /// Realize pending issuance on `token_owner`'s token. Anyone may call;
    /// only the owner is ever credited.
    pub fn update(&mut self, token_owner: &UserAddress, now: Timestamp) -> Result<u128, HubError> {
        let token = self.token_mut(token_owner)?;
        Ok(token.update(now)?)
    }

    /// Pending-inclusive balance of a token's owner; zero for unknown users.
    pub fn look(&self, token_owner: &UserAddress, now: Timestamp) -> u128 {
        self.tokens
            .get(token_owner)
            .map(|t| t.look(now))
            .unwrap_or(0)
    }

    /// Balance of `holder` in `token_owner`'s token; zero for unknown inputs.
    pub fn balance_of(
        &self,
        token_owner: &UserAddress,
        holder: &UserAddress,
        now: Timestamp,
    ) -> u128 {
        self.tokens
            .get(token_owner)
            .map(|t| t.balance_of(holder, now))
            .unwrap_or(0)
    }

    /// Permanently stop issuance on the caller's own token.
    pub fn stop(&mut self, caller: &UserAddress, now: Timestamp) -> Result<(), HubError> {
        let token = self.token_mut(caller)?;
        Ok(token.stop(caller, now)?)
    }

    /// Direct transfer of `token_owner`'s token from the caller.
    pub fn transfer(
        &mut self,
        token_owner: &UserAddress,
        caller: &UserAddress,
        to: &UserAddress,
        amount: u128,
    ) -> Result<(), HubError> {
        let owner = token_owner.clone();
        let token = self.token_mut(&owner)?;
        token.transfer(caller, to, amount)?;
        self.events.push(HubEvent::TokenTransfer {
            token_owner: owner,
            from: caller.clone(),
            to: to.clone(),
            amount,
        });
        Ok(())
    }

    /// Allowance-funded transfer of `token_owner`'s token.
    pub fn transfer_from(
        &mut self,
        token_owner: &UserAddress,
        caller: &UserAddress,
        from: &UserAddress,
        to: &UserAddress,
        amount: u128,
    ) -> Result<(), HubError> {
        let owner = token_owner.clone();
        let token = self.token_mut(&owner)?;
        token.transfer_from(caller, from, to, amount)?;
        self.events.push(HubEvent::TokenTransfer {
            token_owner: owner,
            from: from.clone(),
            to: to.clone(),
            amount,
        });
        Ok(())
    }

    pub fn approve(
        &mut self,
        token_owner: &UserAddress,
        caller: &UserAddress,
        spender: &UserAddress,
        amount: u128,
    ) -> Result<(), HubError> {
        let owner = token_owner.clone();
        let token = self.token_mut(&owner)?;
        token.approve(caller, spender, amount);
        self.events.push(HubEvent::Approval {
            token_owner: owner,
            owner: caller.clone(),
            spender: spender.clone(),
            amount,
        });
        Ok(())
    }

    pub fn increase_allowance(
        &mut self,
        token_owner: &UserAddress,
        caller: &UserAddress,
        spender: &UserAddress,
        added: u128,
    ) -> Result<u128, HubError> {
        let owner = token_owner.clone();
        let token = self.token_mut(&owner)?;
        let next = token.increase_allowance(caller, spender, added)?;
        self.events.push(HubEvent::Approval {
            token_owner: owner,
            owner: caller.clone(),
            spender: spender.clone(),
            amount: next,
        });
        Ok(next)
    }

    pub fn decrease_allowance(
        &mut self,
        token_owner: &UserAddress,
        caller: &UserAddress,
        spender: &UserAddress,
        removed: u128,
    ) -> Result<u128, HubError> {
        let owner = token_owner.clone();
        let token = self.token_mut(&owner)?;
        let next = token.decrease_allowance(caller, spender, removed)?;
        self.events.push(HubEvent::Approval {
            token_owner: owner,
            owner: caller.clone(),
            spender: spender.clone(),
            amount: next,
        });
        Ok(next)
    }

    // ── Events & snapshot ───────────────────────────────────────────────

    pub fn events(&self) -> &[HubEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<HubEvent> {
        std::mem::take(&mut self.events)
    }

    /// Serialize the whole hub state (parameters, tokens, trust graph,
    /// journal) for persistence.
    pub fn save_state(&self) -> Vec<u8> {
        bincode::serialize(self).unwrap_or_default()
    }

    /// Restore a hub from a snapshot.
    pub fn load_state(data: &[u8]) -> Result<Self, HubError> {
        bincode::deserialize(data).map_err(|e| HubError::Snapshot(e.to_string()))
    }

    fn token_mut(&mut self, owner: &UserAddress) -> Result<&mut PersonalToken, HubError> {
        self.tokens
            .get_mut(owner)
            .ok_or_else(|| HubError::UnknownUser(owner.clone()))
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new(HubParams::halo_defaults())
    }
}
