//! Configuration types for the operator service.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketConfig {
	#[serde(default = "default_log_level")]
	pub log_level: String,
	pub network: NetworkSettings,
	pub contract: ContractSettings,
	#[serde(default)]
	pub submitter: SubmitterSettings,
	#[serde(default)]
	pub scheduler: SchedulerSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkSettings {
	/// Network passphrase transactions are bound to.
	pub passphrase: String,
	/// Ledger RPC endpoint URL.
	pub rpc_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContractSettings {
	/// Prediction market contract id.
	pub id: String,
	/// Hex-encoded operator secret key.
	///
	/// Usually supplied as `${MARKET_OPERATOR_SECRET}` in the file and
	/// substituted from the environment; never commit the raw value.
	pub operator_secret: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmitterSettings {
	/// Status-fetch attempts per submission.
	pub max_attempts: u32,
	/// Pause between consecutive status fetches.
	pub poll_interval_ms: u64,
}

impl Default for SubmitterSettings {
	fn default() -> Self {
		Self {
			max_attempts: 10,
			poll_interval_ms: 1_000,
		}
	}
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchedulerSettings {
	/// Slack added to the contract's round interval between ticks.
	pub tick_buffer_secs: u64,
}

impl Default for SchedulerSettings {
	fn default() -> Self {
		Self { tick_buffer_secs: 5 }
	}
}

fn default_log_level() -> String {
	"info".to_string()
}
