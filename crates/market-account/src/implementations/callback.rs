//! Callback-backed signer for externally held keys.

use crate::{Signer, SignerError};
use async_trait::async_trait;
use futures::future::BoxFuture;
use market_types::TransactionEnvelope;

/// Request handed to the signing callback.
#[derive(Debug, Clone)]
pub struct SigningRequest {
	pub address: String,
	pub network_passphrase: String,
	/// Wire form of the prepared envelope to sign.
	pub envelope: String,
}

type SignFn = dyn Fn(SigningRequest) -> BoxFuture<'static, Result<String, String>> + Send + Sync;

/// Delegates signing to an async callback, typically a wallet round-trip on
/// the other side of a connection.
///
/// The callback receives the prepared envelope in wire form and must return
/// the fully signed envelope, also in wire form. An empty or undecodable
/// result is a permanent failure for the attempt.
pub struct CallbackSigner {
	address: String,
	callback: Box<SignFn>,
}

impl CallbackSigner {
	pub fn new<F>(address: impl Into<String>, callback: F) -> Self
	where
		F: Fn(SigningRequest) -> BoxFuture<'static, Result<String, String>>
			+ Send
			+ Sync
			+ 'static,
	{
		Self {
			address: address.into(),
			callback: Box::new(callback),
		}
	}
}

#[async_trait]
impl Signer for CallbackSigner {
	fn address(&self) -> &str {
		&self.address
	}

	async fn sign(
		&self,
		envelope: &TransactionEnvelope,
	) -> Result<TransactionEnvelope, SignerError> {
		let request = SigningRequest {
			address: self.address.clone(),
			network_passphrase: envelope.network().as_str().to_string(),
			envelope: envelope.to_base64(),
		};

		let signed = (self.callback)(request).await.map_err(SignerError::Rejected)?;

		if signed.is_empty() {
			return Err(SignerError::EmptySignature);
		}

		TransactionEnvelope::from_base64(envelope.network().clone(), &signed)
			.map_err(|e| SignerError::InvalidEnvelope(e.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use futures::FutureExt;
	use market_types::NetworkId;

	fn envelope() -> TransactionEnvelope {
		TransactionEnvelope::new(
			NetworkId::new("Test Network ; August 2026"),
			b"bet_bull".to_vec(),
		)
	}

	#[tokio::test]
	async fn passes_request_through_and_decodes_result() {
		let signer = CallbackSigner::new("GWALLET", |request: SigningRequest| {
			async move {
				assert_eq!(request.address, "GWALLET");
				assert_eq!(request.network_passphrase, "Test Network ; August 2026");
				// Echo the envelope back with a fake signature attached.
				let mut payload =
					TransactionEnvelope::from_base64(NetworkId::new("unused"), &request.envelope)
						.unwrap()
						.payload()
						.to_vec();
				payload.extend_from_slice(&[0u8; 64]);
				Ok(TransactionEnvelope::new(NetworkId::new("unused"), payload).to_base64())
			}
			.boxed()
		});

		let signed = signer.sign(&envelope()).await.unwrap();
		assert_eq!(signed.payload().len(), envelope().payload().len() + 64);
		assert_eq!(signed.network(), envelope().network());
	}

	#[tokio::test]
	async fn empty_result_is_a_permanent_failure() {
		let signer =
			CallbackSigner::new("GWALLET", |_| async { Ok(String::new()) }.boxed());

		let result = signer.sign(&envelope()).await;
		assert!(matches!(result, Err(SignerError::EmptySignature)));
	}

	#[tokio::test]
	async fn rejection_carries_the_reason() {
		let signer = CallbackSigner::new("GWALLET", |_| {
			async { Err("user declined in wallet".to_string()) }.boxed()
		});

		let result = signer.sign(&envelope()).await;
		match result {
			Err(SignerError::Rejected(reason)) => {
				assert_eq!(reason, "user declined in wallet")
			}
			other => panic!("unexpected result: {:?}", other.map(|_| ())),
		}
	}

	#[tokio::test]
	async fn undecodable_result_is_rejected() {
		let signer =
			CallbackSigner::new("GWALLET", |_| async { Ok("%%%".to_string()) }.boxed());

		let result = signer.sign(&envelope()).await;
		assert!(matches!(result, Err(SignerError::InvalidEnvelope(_))));
	}
}
