//! The directed trust-limit graph and capacity arithmetic.

use crate::error::TrustError;
use halo_types::UserAddress;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Directed trust graph: `truster -> trustee -> percent in [0, 100]`.
///
/// Lookups on missing edges return 0, never an error. Edges are overwritten
/// on repeat calls, not accumulated.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TrustGraph {
    limits: HashMap<UserAddress, HashMap<UserAddress, u8>>,
}

impl TrustGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert the truster's outgoing edge toward `trustee`.
    ///
    /// Rejects self-edges (the self-trust seeded at signup is immutable) and
    /// percentages above 100.
    pub fn set_limit(
        &mut self,
        truster: &UserAddress,
        trustee: &UserAddress,
        percent: u8,
    ) -> Result<(), TrustError> {
        if truster == trustee {
            return Err(TrustError::SelfTrust);
        }
        if percent > 100 {
            return Err(TrustError::InvalidPercent(percent));
        }
        self.limits
            .entry(truster.clone())
            .or_default()
            .insert(trustee.clone(), percent);
        tracing::debug!(truster = %truster, trustee = %trustee, percent, "trust edge updated");
        Ok(())
    }

    /// Write the self-trust edge. Called exactly once per user, by the hub
    /// at signup; there is no public path that mutates it afterwards.
    pub fn seed_self_trust(&mut self, user: &UserAddress, percent: u8) {
        debug_assert!(percent <= 100);
        self.limits
            .entry(user.clone())
            .or_default()
            .insert(user.clone(), percent);
    }

    /// The trust limit `truster` extends toward `trustee`'s token (0 if no
    /// edge is recorded).
    pub fn limit(&self, truster: &UserAddress, trustee: &UserAddress) -> u8 {
        self.limits
            .get(truster)
            .and_then(|edges| edges.get(trustee))
            .copied()
            .unwrap_or(0)
    }

    /// Iterate the truster's outgoing edges.
    pub fn outgoing(&self, truster: &UserAddress) -> impl Iterator<Item = (&UserAddress, u8)> {
        self.limits
            .get(truster)
            .into_iter()
            .flat_map(|edges| edges.iter().map(|(trustee, p)| (trustee, *p)))
    }
}

/// Maximum amount of a token `dest` may still end up holding:
/// `floor(total_supply * limit_percent / 100)` net of what `dest` already
/// holds, floored at zero.
pub fn tradeable_capacity(total_supply: u128, limit_percent: u8, dest_balance: u128) -> u128 {
    let max = total_supply.saturating_mul(limit_percent as u128) / 100;
    max.saturating_sub(dest_balance)
}
