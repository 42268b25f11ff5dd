//! Concrete signer implementations.

pub mod callback;
pub mod secret_key;
