//! Token creation, signing, and verification.
//! Used by: state, main.

pub mod claims;
pub mod engine;
pub mod sign;
pub mod verify;

pub use claims::{ClaimSet, Profile};
pub use engine::{Policy, TokenEngine};
