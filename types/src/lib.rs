//! Fundamental types for the Halo protocol.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: user addresses, token identifiers, timestamps, and the
//! system-wide hub parameters.

pub mod address;
pub mod params;
pub mod time;

pub use address::{TokenId, UserAddress};
pub use params::{HubParams, UNIT};
pub use time::Timestamp;
