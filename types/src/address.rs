//! User address and token identifier types with `halo_` prefixes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Halo user address, always prefixed with `halo_`.
///
/// One address identifies one participant; each participant owns at most one
/// personal token.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserAddress(String);

impl UserAddress {
    /// The standard prefix for all Halo user addresses.
    pub const PREFIX: &'static str = "halo_";

    /// Create a new user address from a raw string.
    ///
    /// # Panics
    /// Panics if the string does not start with `halo_`.
    pub fn new(raw: impl Into<String>) -> Self {
        let s = raw.into();
        assert!(s.starts_with(Self::PREFIX), "address must start with halo_");
        Self(s)
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate that this address is well-formed.
    pub fn is_valid(&self) -> bool {
        self.0.starts_with(Self::PREFIX) && self.0.len() > Self::PREFIX.len()
    }
}

impl fmt::Display for UserAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserAddress {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Identifier of a personal token, handed out by the hub at signup.
///
/// Derived deterministically from the owning user's address, so the same
/// user always receives the same token identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId(String);

impl TokenId {
    /// The standard prefix for all Halo token identifiers.
    pub const PREFIX: &'static str = "halotok_";

    /// Derive the token identifier for a given owner address.
    pub fn for_owner(owner: &UserAddress) -> Self {
        let suffix = &owner.as_str()[UserAddress::PREFIX.len()..];
        Self(format!("{}{}", Self::PREFIX, suffix))
    }

    /// Return the raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
