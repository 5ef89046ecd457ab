//! Registry/hub facade for the Halo protocol.
//!
//! The hub maps user identity to token identity (one token per user),
//! exposes the system-wide parameters, and fronts the trust registry and the
//! path settlement engine. It also journals protocol events and supports
//! bincode snapshot/restore of the whole system state.

pub mod error;
pub mod event;
pub mod hub;

pub use error::HubError;
pub use event::HubEvent;
pub use hub::Hub;
