//! Ledger RPC access for the prediction market operator.
//!
//! Defines the narrow endpoint surface the transaction submitter depends on
//! (prepare, submit, fetch status) together with an HTTP JSON-RPC
//! implementation and a bounded-retry helper for read-only queries.

pub mod http;
pub mod retry;

use async_trait::async_trait;
use market_types::{BroadcastAck, TransactionEnvelope, TransactionRecord};
use thiserror::Error;

pub use http::HttpLedgerRpc;
pub use retry::{retry_query, retry_with_backoff};

#[derive(Debug, Error)]
pub enum RpcError {
	#[error("transport error: {0}")]
	Transport(String),

	#[error("rpc error {code}: {message}")]
	Rpc { code: i64, message: String },

	#[error("malformed response: {0}")]
	Malformed(String),
}

/// The ledger endpoint operations the submitter drives.
///
/// `prepare` simulates the envelope and returns a prepared copy with resource
/// fees attached; `submit` broadcasts a signed envelope; `fetch_status` looks
/// a transaction up by hash. Implementations are shared read-only across
/// concurrent submissions.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
	async fn prepare(
		&self,
		envelope: &TransactionEnvelope,
	) -> Result<TransactionEnvelope, RpcError>;

	async fn submit(&self, envelope: &TransactionEnvelope) -> Result<BroadcastAck, RpcError>;

	async fn fetch_status(&self, hash: &str) -> Result<TransactionRecord, RpcError>;
}
