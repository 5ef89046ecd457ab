//! Settlement errors. Every variant aborts the whole batch.

use halo_token::TokenError;
use halo_types::UserAddress;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("input sequences differ in length: {owners} owners, {srcs} srcs, {dests} dests, {amounts} amounts")]
    LengthMismatch {
        owners: usize,
        srcs: usize,
        dests: usize,
        amounts: usize,
    },

    #[error("path contains no hops")]
    EmptyPath,

    #[error("hop {hop} transfers from an address to itself")]
    SelfHop { hop: usize },

    #[error("hop {hop} has a zero amount")]
    ZeroAmount { hop: usize },

    #[error("hop {hop} amount {amount} exceeds trust capacity {capacity}")]
    TrustExceeded {
        hop: usize,
        amount: u128,
        capacity: u128,
    },

    #[error("address {address} does not forward what it receives")]
    ConservationViolation { address: UserAddress },

    #[error("no personal token registered for {0}")]
    UnknownToken(UserAddress),

    #[error("arithmetic overflow in path accounting")]
    Overflow,

    #[error(transparent)]
    Token(#[from] TokenError),
}
