//! Hop representation and transient per-call validation bookkeeping.

use crate::error::SettlementError;
use halo_types::UserAddress;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One unit of a path settlement: move `amount` of the personal token owned
/// by `token_owner`, debiting `src` and crediting `dest`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hop {
    pub token_owner: UserAddress,
    pub src: UserAddress,
    pub dest: UserAddress,
    pub amount: u128,
}

/// The aggregate settlement event: overall originating `src` (first hop's
/// src), overall terminal `dest` (last hop's dest), and the total delivered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSettled {
    pub src: UserAddress,
    pub dest: UserAddress,
    pub amount: u128,
}

/// Zip the four parallel input sequences into hops.
///
/// Rejects mismatched lengths and empty input before any other validation.
pub fn build_hops(
    token_owners: &[UserAddress],
    srcs: &[UserAddress],
    dests: &[UserAddress],
    amounts: &[u128],
) -> Result<Vec<Hop>, SettlementError> {
    let n = token_owners.len();
    if srcs.len() != n || dests.len() != n || amounts.len() != n {
        return Err(SettlementError::LengthMismatch {
            owners: n,
            srcs: srcs.len(),
            dests: dests.len(),
            amounts: amounts.len(),
        });
    }
    if n == 0 {
        return Err(SettlementError::EmptyPath);
    }
    Ok((0..n)
        .map(|i| Hop {
            token_owner: token_owners[i].clone(),
            src: srcs[i].clone(),
            dest: dests[i].clone(),
            amount: amounts[i],
        })
        .collect())
}

/// Per-address in-flight state during one settlement call.
#[derive(Clone, Debug)]
pub struct ValidationRecord {
    /// The token currently attributed to this address mid-path (set when the
    /// address is first touched, re-attributed on each credit).
    pub token: UserAddress,
    /// Cumulative amount this address forwards across hops.
    pub sent: u128,
    /// Cumulative amount this address is owed across hops.
    pub received: u128,
}

impl ValidationRecord {
    /// Amount received and not yet forwarded.
    pub fn remaining(&self) -> u128 {
        self.received.saturating_sub(self.sent)
    }
}

/// Transient per-call bookkeeping: the seen set and per-address validation
/// records.
///
/// Constructed on the stack at the start of a settlement call and consumed
/// by [`PathValidator::finish`] on the success path (or dropped on error),
/// so no state can leak between calls.
#[derive(Debug, Default)]
pub struct PathValidator {
    seen: Vec<UserAddress>,
    records: HashMap<UserAddress, ValidationRecord>,
}

impl PathValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one validated hop into the cumulative accounting.
    pub fn record_hop(&mut self, hop: &Hop) -> Result<(), SettlementError> {
        let src = self.touch(&hop.src, &hop.token_owner);
        src.sent = src
            .sent
            .checked_add(hop.amount)
            .ok_or(SettlementError::Overflow)?;
        let dest = self.touch(&hop.dest, &hop.token_owner);
        dest.received = dest
            .received
            .checked_add(hop.amount)
            .ok_or(SettlementError::Overflow)?;
        dest.token = hop.token_owner.clone();
        Ok(())
    }

    /// The token currently attributed to `addr`, if the address has been
    /// touched during this call.
    pub fn attributed_token(&self, addr: &UserAddress) -> Option<&UserAddress> {
        self.records.get(addr).map(|r| &r.token)
    }

    pub fn record(&self, addr: &UserAddress) -> Option<&ValidationRecord> {
        self.records.get(addr)
    }

    /// Addresses touched during this call, in first-touch order.
    pub fn seen(&self) -> &[UserAddress] {
        &self.seen
    }

    fn touch(&mut self, addr: &UserAddress, token: &UserAddress) -> &mut ValidationRecord {
        match self.records.entry(addr.clone()) {
            std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::hash_map::Entry::Vacant(entry) => {
                self.seen.push(addr.clone());
                entry.insert(ValidationRecord {
                    token: token.clone(),
                    sent: 0,
                    received: 0,
                })
            }
        }
    }

    /// Check conservation across the whole path and consume the validator.
    ///
    /// Every intermediate address must forward exactly what it receives; the
    /// originator's net outflow must equal the terminal's net inflow. Taking
    /// `self` by value guarantees the seen set and records are torn down
    /// before the settlement call returns, on success and failure alike.
    pub fn finish(
        self,
        first_src: &UserAddress,
        last_dest: &UserAddress,
    ) -> Result<PathSettled, SettlementError> {
        for (addr, record) in &self.records {
            if addr == first_src || addr == last_dest {
                continue;
            }
            if record.sent != record.received {
                return Err(SettlementError::ConservationViolation {
                    address: addr.clone(),
                });
            }
        }
        if first_src == last_dest {
            // A full cycle: nothing is delivered, so every address must net
            // to zero, the endpoints included.
            let record = self.records.get(first_src);
            if record.map_or(false, |r| r.sent != r.received) {
                return Err(SettlementError::ConservationViolation {
                    address: first_src.clone(),
                });
            }
            return Ok(PathSettled {
                src: first_src.clone(),
                dest: last_dest.clone(),
                amount: 0,
            });
        }
        let net_out = self
            .records
            .get(first_src)
            .and_then(|r| r.sent.checked_sub(r.received))
            .ok_or(SettlementError::ConservationViolation {
                address: first_src.clone(),
            })?;
        let net_in = self
            .records
            .get(last_dest)
            .and_then(|r| r.received.checked_sub(r.sent))
            .ok_or(SettlementError::ConservationViolation {
                address: last_dest.clone(),
            })?;
        if net_out != net_in {
            return Err(SettlementError::ConservationViolation {
                address: last_dest.clone(),
            });
        }
        Ok(PathSettled {
            src: first_src.clone(),
            dest: last_dest.clone(),
            amount: net_in,
        })
    }
}
