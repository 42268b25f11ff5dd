//! Signing capabilities for transaction envelopes.
//!
//! The transaction submitter is parameterized over one [`Signer`] trait. Two
//! concrete implementations cover the cases the surrounding system needs: a
//! server-held secret key, and a caller-supplied signing callback standing in
//! for a connected wallet.

pub mod implementations;

use async_trait::async_trait;
use market_types::TransactionEnvelope;
use thiserror::Error;

pub use implementations::callback::{CallbackSigner, SigningRequest};
pub use implementations::secret_key::SecretKeySigner;

#[derive(Debug, Error)]
pub enum SignerError {
	#[error("invalid key: {0}")]
	InvalidKey(String),

	#[error("signer returned an empty signature")]
	EmptySignature,

	#[error("signer returned an invalid envelope: {0}")]
	InvalidEnvelope(String),

	#[error("signing rejected: {0}")]
	Rejected(String),
}

/// A capability that can authorize a prepared envelope.
#[async_trait]
pub trait Signer: Send + Sync {
	/// Account identifier the produced signatures authorize for.
	fn address(&self) -> &str;

	/// Produces a signed envelope from a prepared one.
	///
	/// The input is never mutated. A failure here is permanent for the
	/// submission attempt; the ledger itself enforces whether the signature
	/// actually authorizes the transaction.
	async fn sign(
		&self,
		envelope: &TransactionEnvelope,
	) -> Result<TransactionEnvelope, SignerError>;
}
