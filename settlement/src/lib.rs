//! Path settlement engine.
//!
//! A payment between parties with no direct trust relationship is routed as
//! a sequence of hops across the trust graph. Each hop moves one personal
//! token from a `src` to a `dest`, bounded by the receiving side's trust
//! limit; intermediaries advance their own currency against the previous
//! hop's currency. Paths may fork at a shared intermediate address and
//! rejoin later.
//!
//! The engine validates the whole hop batch in a single pass with transient
//! per-call bookkeeping, then executes all debits and credits against staged
//! clones of the affected tokens, committing only if every hop succeeds.
//! Nothing persists between calls and no partial settlement is ever
//! observable.

pub mod engine;
pub mod error;
pub mod path;

pub use engine::{send_limit, settle};
pub use error::SettlementError;
pub use path::{build_hops, Hop, PathSettled, PathValidator, ValidationRecord};
