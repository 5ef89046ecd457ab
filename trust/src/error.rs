//! Trust-registry errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrustError {
    #[error("cannot modify trust toward yourself")]
    SelfTrust,

    #[error("trust limit {0} is outside [0, 100]")]
    InvalidPercent(u8),
}
