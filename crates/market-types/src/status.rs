//! Ledger-reported transaction status types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a transaction as reported by the ledger RPC endpoint.
///
/// The wire format is an upper-case string. Anything unrecognized lands in
/// `Other` so a new status introduced by the endpoint never breaks
/// deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionStatus {
	/// Accepted into the transaction pool, not yet applied.
	Pending,
	/// Not indexed yet; common right after broadcast.
	NotFound,
	Success,
	Failed,
	Other(String),
}

impl TransactionStatus {
	/// Terminal statuses end the confirmation wait immediately.
	pub fn is_terminal(&self) -> bool {
		matches!(self, Self::Success | Self::Failed)
	}

	pub fn as_str(&self) -> &str {
		match self {
			Self::Pending => "PENDING",
			Self::NotFound => "NOT_FOUND",
			Self::Success => "SUCCESS",
			Self::Failed => "FAILED",
			Self::Other(status) => status,
		}
	}
}

impl From<String> for TransactionStatus {
	fn from(value: String) -> Self {
		match value.as_str() {
			"PENDING" => Self::Pending,
			"NOT_FOUND" => Self::NotFound,
			"SUCCESS" => Self::Success,
			"FAILED" => Self::Failed,
			_ => Self::Other(value),
		}
	}
}

impl From<TransactionStatus> for String {
	fn from(value: TransactionStatus) -> Self {
		value.as_str().to_string()
	}
}

impl fmt::Display for TransactionStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// Response to broadcasting a signed envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastAck {
	/// Ledger-assigned transaction hash, fixed for the life of the
	/// transaction.
	pub hash: String,
	pub status: TransactionStatus,
	/// Raw error payload when the network rejected the transaction outright.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error_result: Option<serde_json::Value>,
}

/// Polled transaction record.
///
/// Carries the ledger metadata callers may need alongside the bare status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
	pub status: TransactionStatus,
	/// Ledger sequence the transaction was applied in, once known.
	#[serde(default)]
	pub ledger: Option<u64>,
	#[serde(default)]
	pub created_at: Option<i64>,
	/// Raw result payload as returned by the endpoint.
	#[serde(default)]
	pub result: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_known_statuses() {
		assert_eq!(
			TransactionStatus::from("PENDING".to_string()),
			TransactionStatus::Pending
		);
		assert_eq!(
			TransactionStatus::from("NOT_FOUND".to_string()),
			TransactionStatus::NotFound
		);
		assert_eq!(
			TransactionStatus::from("SUCCESS".to_string()),
			TransactionStatus::Success
		);
		assert_eq!(
			TransactionStatus::from("FAILED".to_string()),
			TransactionStatus::Failed
		);
	}

	#[test]
	fn unknown_status_round_trips_through_other() {
		let status = TransactionStatus::from("TRY_AGAIN_LATER".to_string());
		assert_eq!(status, TransactionStatus::Other("TRY_AGAIN_LATER".to_string()));
		assert_eq!(String::from(status), "TRY_AGAIN_LATER");
	}

	#[test]
	fn only_success_and_failed_are_terminal() {
		assert!(TransactionStatus::Success.is_terminal());
		assert!(TransactionStatus::Failed.is_terminal());
		assert!(!TransactionStatus::Pending.is_terminal());
		assert!(!TransactionStatus::NotFound.is_terminal());
		assert!(!TransactionStatus::Other("DUPLICATE".to_string()).is_terminal());
	}

	#[test]
	fn deserializes_record_with_partial_metadata() {
		let record: TransactionRecord =
			serde_json::from_str(r#"{"status":"NOT_FOUND"}"#).unwrap();

		assert_eq!(record.status, TransactionStatus::NotFound);
		assert_eq!(record.ledger, None);
		assert!(record.result.is_none());
	}

	#[test]
	fn deserializes_full_record() {
		let record: TransactionRecord = serde_json::from_str(
			r#"{"status":"SUCCESS","ledger":123456,"createdAt":1754400000,"result":{"retval":true}}"#,
		)
		.unwrap();

		assert_eq!(record.status, TransactionStatus::Success);
		assert_eq!(record.ledger, Some(123456));
		assert_eq!(record.created_at, Some(1754400000));
	}

	#[test]
	fn deserializes_ack_with_error_payload() {
		let ack: BroadcastAck = serde_json::from_str(
			r#"{"hash":"deadbeef","status":"ERROR","errorResult":{"code":"txBadSeq"}}"#,
		)
		.unwrap();

		assert_eq!(ack.hash, "deadbeef");
		assert_eq!(ack.status, TransactionStatus::Other("ERROR".to_string()));
		assert!(ack.error_result.is_some());
	}
}
