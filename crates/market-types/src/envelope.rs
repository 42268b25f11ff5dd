//! Transaction envelope types.
//!
//! An envelope is the opaque, serialized form of a not-yet-broadcast ledger
//! operation, bound to the network it was built for. Envelopes are immutable:
//! preparation and signing both derive new envelopes rather than mutating the
//! one they were given.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvelopeError {
	#[error("invalid base64 envelope: {0}")]
	InvalidBase64(String),

	#[error("empty envelope payload")]
	Empty,
}

/// Identifier of the network an envelope is bound to.
///
/// Modeled as the network passphrase. Envelopes built for different networks
/// are never interchangeable, and signatures commit to the network digest so
/// a transaction signed for one network cannot be replayed on another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkId(String);

impl NetworkId {
	pub fn new(passphrase: impl Into<String>) -> Self {
		Self(passphrase.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// SHA-256 digest of the passphrase, used as the domain separator in
	/// signature payloads.
	pub fn digest(&self) -> [u8; 32] {
		Sha256::digest(self.0.as_bytes()).into()
	}
}

impl std::fmt::Display for NetworkId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Opaque serialized transaction, bound to a network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionEnvelope {
	network: NetworkId,
	payload: Vec<u8>,
}

impl TransactionEnvelope {
	pub fn new(network: NetworkId, payload: Vec<u8>) -> Self {
		Self { network, payload }
	}

	pub fn network(&self) -> &NetworkId {
		&self.network
	}

	pub fn payload(&self) -> &[u8] {
		&self.payload
	}

	/// Derives a new envelope on the same network with a different payload.
	///
	/// Preparation (fees and footprints) and signing (appended signatures)
	/// both go through here; the source envelope is left untouched.
	pub fn with_payload(&self, payload: Vec<u8>) -> Self {
		Self {
			network: self.network.clone(),
			payload,
		}
	}

	/// Wire form of the envelope payload.
	pub fn to_base64(&self) -> String {
		BASE64.encode(&self.payload)
	}

	/// Decodes a wire-form envelope onto the given network.
	pub fn from_base64(network: NetworkId, encoded: &str) -> Result<Self, EnvelopeError> {
		let payload = BASE64
			.decode(encoded)
			.map_err(|e| EnvelopeError::InvalidBase64(e.to_string()))?;

		if payload.is_empty() {
			return Err(EnvelopeError::Empty);
		}

		Ok(Self { network, payload })
	}

	/// The digest a signer commits to: SHA-256 over the network digest
	/// followed by the payload bytes.
	pub fn signature_payload(&self) -> [u8; 32] {
		let mut hasher = Sha256::new();
		hasher.update(self.network.digest());
		hasher.update(&self.payload);
		hasher.finalize().into()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn testnet() -> NetworkId {
		NetworkId::new("Test Network ; August 2026")
	}

	#[test]
	fn base64_round_trip() {
		let envelope = TransactionEnvelope::new(testnet(), vec![1, 2, 3, 4]);
		let decoded =
			TransactionEnvelope::from_base64(testnet(), &envelope.to_base64()).unwrap();

		assert_eq!(decoded, envelope);
	}

	#[test]
	fn rejects_invalid_base64() {
		let result = TransactionEnvelope::from_base64(testnet(), "not-valid!!");
		assert!(matches!(result, Err(EnvelopeError::InvalidBase64(_))));
	}

	#[test]
	fn rejects_empty_payload() {
		let result = TransactionEnvelope::from_base64(testnet(), "");
		assert!(matches!(result, Err(EnvelopeError::Empty)));
	}

	#[test]
	fn signature_payload_commits_to_network() {
		let payload = b"same operation".to_vec();
		let testnet_envelope = TransactionEnvelope::new(testnet(), payload.clone());
		let mainnet_envelope =
			TransactionEnvelope::new(NetworkId::new("Public Network ; August 2026"), payload);

		assert_ne!(
			testnet_envelope.signature_payload(),
			mainnet_envelope.signature_payload()
		);
	}

	#[test]
	fn with_payload_preserves_network() {
		let envelope = TransactionEnvelope::new(testnet(), vec![1]);
		let derived = envelope.with_payload(vec![1, 2]);

		assert_eq!(derived.network(), envelope.network());
		assert_eq!(derived.payload(), &[1, 2]);
		assert_eq!(envelope.payload(), &[1]);
	}
}
