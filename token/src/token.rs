//! The personal token: ledger, allowances, lazy issuance, stop switch.

use crate::error::TokenError;
use crate::schedule::IssuanceSchedule;
use halo_types::{HubParams, Timestamp, UserAddress};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One user's personal currency.
///
/// Supply accrues virtually according to the [`IssuanceSchedule`] and is
/// realized into the owner's ledger balance lazily on [`PersonalToken::update`].
/// Transfers and approvals move realized balance only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersonalToken {
    owner: UserAddress,
    name: String,
    symbol: String,
    schedule: IssuanceSchedule,
    /// Last time pending issuance was realized.
    last_touched: Timestamp,
    /// Seconds already elapsed into the current period at `last_touched`.
    inflation_offset: u64,
    /// Set once by the owner; issuance halts permanently.
    stopped: bool,
    /// Realized supply: signup payout plus every realized issuance.
    total_issued: u128,
    balances: HashMap<UserAddress, u128>,
    allowances: HashMap<(UserAddress, UserAddress), u128>,
}

impl PersonalToken {
    /// Deploy a new personal token for `owner` at `now`, crediting the
    /// signup payout as realized supply.
    pub fn new(owner: UserAddress, params: &HubParams, now: Timestamp) -> Self {
        let mut balances = HashMap::new();
        if params.signup_payout > 0 {
            balances.insert(owner.clone(), params.signup_payout);
        }
        Self {
            owner,
            name: params.name.clone(),
            symbol: params.symbol.clone(),
            schedule: IssuanceSchedule::new(params, now),
            last_touched: now,
            inflation_offset: 0,
            stopped: false,
            total_issued: params.signup_payout,
            balances,
            allowances: HashMap::new(),
        }
    }

    pub fn owner(&self) -> &UserAddress {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn stopped(&self) -> bool {
        self.stopped
    }

    pub fn deployed_at(&self) -> Timestamp {
        self.schedule.deployed_at
    }

    pub fn schedule(&self) -> &IssuanceSchedule {
        &self.schedule
    }

    /// Issuance accrued since `last_touched` but not yet realized.
    ///
    /// Zero once the token is stopped, regardless of elapsed time.
    pub fn pending_issuance(&self, now: Timestamp) -> Result<u128, TokenError> {
        if self.stopped {
            return Ok(0);
        }
        self.schedule
            .accrued_between(self.last_touched, self.inflation_offset, now)
            .ok_or(TokenError::Overflow)
    }

    /// Realize pending issuance into the owner's ledger balance and advance
    /// the bookkeeping checkpoints. Returns the realized amount.
    ///
    /// Callable with any clock; it never credits anyone but the owner and is
    /// an explicit zero-effect `Ok(0)` when stopped or when no time has
    /// elapsed.
    pub fn update(&mut self, now: Timestamp) -> Result<u128, TokenError> {
        if self.stopped || now <= self.last_touched {
            return Ok(0);
        }
        let owed = self.pending_issuance(now)?;
        self.inflation_offset = self.schedule.offset_at(now);
        self.last_touched = now;
        if owed > 0 {
            let entry = self.balances.entry(self.owner.clone()).or_insert(0);
            *entry = entry.checked_add(owed).ok_or(TokenError::Overflow)?;
            self.total_issued = self
                .total_issued
                .checked_add(owed)
                .ok_or(TokenError::Overflow)?;
        }
        Ok(owed)
    }

    /// Pending-inclusive balance of the owner (read-only, never fails;
    /// pending issuance counts as zero on arithmetic exhaustion).
    pub fn look(&self, now: Timestamp) -> u128 {
        self.balance_of(&self.owner, now)
    }

    /// Ledger balance of `addr`, plus pending issuance iff `addr` is the owner.
    pub fn balance_of(&self, addr: &UserAddress, now: Timestamp) -> u128 {
        let realized = self.balances.get(addr).copied().unwrap_or(0);
        if addr == &self.owner {
            realized.saturating_add(self.pending_issuance(now).unwrap_or(0))
        } else {
            realized
        }
    }

    /// Live total supply: realized supply plus pending issuance.
    pub fn total_supply(&self, now: Timestamp) -> u128 {
        self.total_issued
            .saturating_add(self.pending_issuance(now).unwrap_or(0))
    }

    /// Realized supply only (excludes pending issuance).
    pub fn total_issued(&self) -> u128 {
        self.total_issued
    }

    /// Permanently halt issuance. Owner-only; a second call is rejected.
    ///
    /// Pending issuance at stop time is forfeited, not realized: `look`
    /// equals the realized balance immediately after.
    pub fn stop(&mut self, caller: &UserAddress, now: Timestamp) -> Result<(), TokenError> {
        if caller != &self.owner {
            return Err(TokenError::NotOwner {
                expected: self.owner.clone(),
                actual: caller.clone(),
            });
        }
        if self.stopped {
            return Err(TokenError::AlreadyStopped);
        }
        self.stopped = true;
        self.inflation_offset = self.schedule.offset_at(now);
        self.last_touched = now;
        tracing::info!(owner = %self.owner, at = %now, "token stopped");
        Ok(())
    }

    /// Standard transfer of realized balance from the caller.
    pub fn transfer(
        &mut self,
        caller: &UserAddress,
        to: &UserAddress,
        amount: u128,
    ) -> Result<(), TokenError> {
        self.move_balance(caller, to, amount)
    }

    /// Transfer on behalf of `from`, consuming the caller's allowance.
    pub fn transfer_from(
        &mut self,
        caller: &UserAddress,
        from: &UserAddress,
        to: &UserAddress,
        amount: u128,
    ) -> Result<(), TokenError> {
        let key = (from.clone(), caller.clone());
        let approved = self.allowances.get(&key).copied().unwrap_or(0);
        if approved < amount {
            return Err(TokenError::InsufficientAllowance {
                needed: amount,
                approved,
            });
        }
        self.move_balance(from, to, amount)?;
        self.allowances.insert(key, approved - amount);
        Ok(())
    }

    /// Settlement-engine entry point: move realized balance with no
    /// allowance check. Hop-level authorization is the trust check performed
    /// by the path settlement engine before execution.
    pub fn hub_transfer(
        &mut self,
        src: &UserAddress,
        dest: &UserAddress,
        amount: u128,
    ) -> Result<(), TokenError> {
        self.move_balance(src, dest, amount)
    }

    /// Set the spender's allowance to an exact value (zero clears it).
    pub fn approve(&mut self, caller: &UserAddress, spender: &UserAddress, amount: u128) {
        self.allowances
            .insert((caller.clone(), spender.clone()), amount);
    }

    pub fn allowance(&self, owner: &UserAddress, spender: &UserAddress) -> u128 {
        self.allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0)
    }

    pub fn increase_allowance(
        &mut self,
        caller: &UserAddress,
        spender: &UserAddress,
        added: u128,
    ) -> Result<u128, TokenError> {
        let key = (caller.clone(), spender.clone());
        let current = self.allowances.get(&key).copied().unwrap_or(0);
        let next = current.checked_add(added).ok_or(TokenError::Overflow)?;
        self.allowances.insert(key, next);
        Ok(next)
    }

    pub fn decrease_allowance(
        &mut self,
        caller: &UserAddress,
        spender: &UserAddress,
        removed: u128,
    ) -> Result<u128, TokenError> {
        let key = (caller.clone(), spender.clone());
        let current = self.allowances.get(&key).copied().unwrap_or(0);
        let next = current
            .checked_sub(removed)
            .ok_or(TokenError::InsufficientAllowance {
                needed: removed,
                approved: current,
            })?;
        self.allowances.insert(key, next);
        Ok(next)
    }

    fn move_balance(
        &mut self,
        src: &UserAddress,
        dest: &UserAddress,
        amount: u128,
    ) -> Result<(), TokenError> {
        if amount == 0 {
            return Err(TokenError::ZeroAmount);
        }
        let available = self.balances.get(src).copied().unwrap_or(0);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        let dest_balance = self.balances.get(dest).copied().unwrap_or(0);
        let credited = dest_balance
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.balances.insert(src.clone(), available - amount);
        self.balances.insert(dest.clone(), credited);
        Ok(())
    }
}
