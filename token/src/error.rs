//! Personal-token errors.

use halo_types::UserAddress;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("insufficient balance: need {needed}, available {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("insufficient allowance: need {needed}, approved {approved}")]
    InsufficientAllowance { needed: u128, approved: u128 },

    #[error("caller {actual} is not the token owner {expected}")]
    NotOwner {
        expected: UserAddress,
        actual: UserAddress,
    },

    #[error("token has already been stopped")]
    AlreadyStopped,

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("arithmetic overflow in issuance computation")]
    Overflow,
}
