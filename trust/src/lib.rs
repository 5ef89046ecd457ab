//! Trust registry — the directed trust-limit graph.
//!
//! A trust edge `truster -> trustee` declares the maximum percentage of the
//! trustee's token supply the truster is willing to end up holding. Edges
//! are upserted by the truster only; the self-edge is seeded once at signup
//! and immutable afterwards.

pub mod error;
pub mod graph;

pub use error::TrustError;
pub use graph::{tradeable_capacity, TrustGraph};
