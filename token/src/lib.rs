//! Personal token engine — one user's currency.
//!
//! Every participant owns exactly one personal token that continuously
//! issues new supply to its owner. Issuance is a deterministic function of
//! time, computed lazily from stored checkpoints:
//!
//! `rate(p) = initial * (inflation / divisor) ^ p` per full period `p`,
//! accrued second-by-second within a period with truncating division.
//!
//! This crate handles:
//! - The compounding issuance schedule and pending-issuance accrual
//! - The balance and allowance ledgers (realized amounts only)
//! - Realizing pending issuance into the owner's balance (`update`)
//! - The irreversible stop switch

pub mod error;
pub mod schedule;
pub mod token;

pub use error::TokenError;
pub use schedule::IssuanceSchedule;
pub use token::PersonalToken;
