//! Protocol events journaled by the hub.

use halo_types::{TokenId, UserAddress};
use serde::{Deserialize, Serialize};

/// One entry in the hub's event journal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HubEvent {
    /// A user registered and received a personal token.
    Signup { user: UserAddress, token: TokenId },

    /// A truster created or overwrote an outgoing trust edge.
    TrustUpdated {
        truster: UserAddress,
        trustee: UserAddress,
        percent: u8,
    },

    /// Aggregate path settlement: net effective sender, final receiver, and
    /// the total amount delivered.
    PathSettled {
        src: UserAddress,
        dest: UserAddress,
        amount: u128,
    },

    /// A direct (non-path) transfer on one personal token.
    TokenTransfer {
        token_owner: UserAddress,
        from: UserAddress,
        to: UserAddress,
        amount: u128,
    },

    /// An allowance was set or adjusted on one personal token.
    Approval {
        token_owner: UserAddress,
        owner: UserAddress,
        spender: UserAddress,
        amount: u128,
    },
}
