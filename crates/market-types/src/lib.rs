//! Shared types for the prediction market operator service.
//!
//! This crate defines the vocabulary the rest of the workspace speaks:
//! transaction envelopes bound to a network, ledger-reported transaction
//! statuses, and the market domain types mirrored from the contract binding.

pub mod envelope;
pub mod market;
pub mod status;

pub use envelope::{EnvelopeError, NetworkId, TransactionEnvelope};
pub use market::{BetInfo, Direction, RoundInfo};
pub use status::{BroadcastAck, TransactionRecord, TransactionStatus};
