//! Hub-level errors; lower-layer errors convert at this seam.

use halo_settlement::SettlementError;
use halo_token::TokenError;
use halo_trust::TrustError;
use halo_types::UserAddress;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HubError {
    #[error("{0} already owns a personal token")]
    AlreadyRegistered(UserAddress),

    #[error("{0} is not registered")]
    UnknownUser(UserAddress),

    #[error(transparent)]
    Trust(#[from] TrustError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Settlement(#[from] SettlementError),

    #[error("snapshot decode failed: {0}")]
    Snapshot(String),
}
