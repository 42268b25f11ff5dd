//! HTTP JSON-RPC implementation of the ledger endpoint.

use crate::{LedgerRpc, RpcError};
use async_trait::async_trait;
use market_types::{BroadcastAck, NetworkId, TransactionEnvelope, TransactionRecord};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

#[derive(Debug, Serialize)]
struct RpcRequest<'a, P: Serialize> {
	jsonrpc: &'static str,
	id: u64,
	method: &'a str,
	params: P,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "R: Deserialize<'de>"))]
struct RpcResponse<R> {
	#[serde(default)]
	result: Option<R>,
	#[serde(default)]
	error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
	code: i64,
	message: String,
}

#[derive(Debug, Deserialize)]
struct PreparedTransaction {
	/// Wire form of the prepared envelope.
	transaction: String,
}

/// JSON-RPC 2.0 client for a ledger endpoint.
pub struct HttpLedgerRpc {
	client: reqwest::Client,
	url: String,
	network: NetworkId,
	next_id: AtomicU64,
}

impl HttpLedgerRpc {
	pub fn new(url: impl Into<String>, network: NetworkId) -> Self {
		Self {
			client: reqwest::Client::new(),
			url: url.into(),
			network,
			next_id: AtomicU64::new(1),
		}
	}

	pub fn network(&self) -> &NetworkId {
		&self.network
	}

	/// Issues a raw JSON-RPC call.
	///
	/// Exposed so higher layers (the contract client) can reach endpoint
	/// methods outside the submitter's narrow surface.
	pub async fn call<P, R>(&self, method: &str, params: P) -> Result<R, RpcError>
	where
		P: Serialize + Send + Sync,
		R: DeserializeOwned,
	{
		let request = RpcRequest {
			jsonrpc: "2.0",
			id: self.next_id.fetch_add(1, Ordering::Relaxed),
			method,
			params,
		};

		debug!("Calling {} on {}", method, self.url);

		let response = self
			.client
			.post(&self.url)
			.json(&request)
			.send()
			.await
			.map_err(|e| RpcError::Transport(e.to_string()))?;

		let body: RpcResponse<R> = response
			.json()
			.await
			.map_err(|e| RpcError::Transport(e.to_string()))?;

		if let Some(error) = body.error {
			return Err(RpcError::Rpc {
				code: error.code,
				message: error.message,
			});
		}

		body.result
			.ok_or_else(|| RpcError::Malformed("response carried neither result nor error".to_string()))
	}
}

#[async_trait]
impl LedgerRpc for HttpLedgerRpc {
	async fn prepare(
		&self,
		envelope: &TransactionEnvelope,
	) -> Result<TransactionEnvelope, RpcError> {
		let prepared: PreparedTransaction = self
			.call(
				"prepareTransaction",
				json!({ "transaction": envelope.to_base64() }),
			)
			.await?;

		TransactionEnvelope::from_base64(envelope.network().clone(), &prepared.transaction)
			.map_err(|e| RpcError::Malformed(e.to_string()))
	}

	async fn submit(&self, envelope: &TransactionEnvelope) -> Result<BroadcastAck, RpcError> {
		self.call(
			"sendTransaction",
			json!({ "transaction": envelope.to_base64() }),
		)
		.await
	}

	async fn fetch_status(&self, hash: &str) -> Result<TransactionRecord, RpcError> {
		self.call("getTransaction", json!({ "hash": hash })).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use market_types::TransactionStatus;

	#[test]
	fn parses_result_response() {
		let body: RpcResponse<BroadcastAck> = serde_json::from_str(
			r#"{"jsonrpc":"2.0","id":1,"result":{"hash":"cafe","status":"PENDING"}}"#,
		)
		.unwrap();

		let ack = body.result.unwrap();
		assert_eq!(ack.hash, "cafe");
		assert_eq!(ack.status, TransactionStatus::Pending);
		assert!(body.error.is_none());
	}

	#[test]
	fn parses_error_response() {
		let body: RpcResponse<BroadcastAck> = serde_json::from_str(
			r#"{"jsonrpc":"2.0","id":2,"error":{"code":-32602,"message":"invalid envelope"}}"#,
		)
		.unwrap();

		assert!(body.result.is_none());
		let error = body.error.unwrap();
		assert_eq!(error.code, -32602);
		assert_eq!(error.message, "invalid envelope");
	}

	#[test]
	fn request_serializes_with_version_tag() {
		let request = RpcRequest {
			jsonrpc: "2.0",
			id: 7,
			method: "getTransaction",
			params: json!({ "hash": "cafe" }),
		};

		let encoded = serde_json::to_value(&request).unwrap();
		assert_eq!(encoded["jsonrpc"], "2.0");
		assert_eq!(encoded["method"], "getTransaction");
		assert_eq!(encoded["params"]["hash"], "cafe");
	}
}
