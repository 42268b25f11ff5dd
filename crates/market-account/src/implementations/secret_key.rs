//! Server-held secret key signer.

use crate::{Signer, SignerError};
use async_trait::async_trait;
use ed25519_dalek::{Signer as _, SigningKey, VerifyingKey};
use market_types::TransactionEnvelope;

/// Signs envelopes with an ed25519 secret key held in process memory.
///
/// The signature commits to the envelope's signature payload (network digest
/// plus payload bytes) and is appended to the payload, which is the decorated
/// form the ledger expects signed envelopes to arrive in.
pub struct SecretKeySigner {
	key: SigningKey,
	address: String,
}

impl SecretKeySigner {
	/// Creates a signer from a hex-encoded 32-byte secret key.
	pub fn from_hex(secret_hex: &str) -> Result<Self, SignerError> {
		let stripped = secret_hex.strip_prefix("0x").unwrap_or(secret_hex);
		let bytes = hex::decode(stripped)
			.map_err(|e| SignerError::InvalidKey(format!("not hexadecimal: {}", e)))?;
		let bytes: [u8; 32] = bytes
			.try_into()
			.map_err(|_| SignerError::InvalidKey("secret key must be 32 bytes".to_string()))?;

		let key = SigningKey::from_bytes(&bytes);
		let address = hex::encode(key.verifying_key().to_bytes());

		Ok(Self { key, address })
	}

	pub fn verifying_key(&self) -> VerifyingKey {
		self.key.verifying_key()
	}
}

#[async_trait]
impl Signer for SecretKeySigner {
	fn address(&self) -> &str {
		&self.address
	}

	async fn sign(
		&self,
		envelope: &TransactionEnvelope,
	) -> Result<TransactionEnvelope, SignerError> {
		let signature = self.key.sign(&envelope.signature_payload());

		let mut signed = envelope.payload().to_vec();
		signed.extend_from_slice(&signature.to_bytes());

		Ok(envelope.with_payload(signed))
	}
}
