//! Prediction market domain types mirrored from the contract binding.

use serde::{Deserialize, Serialize};

/// Bet direction: price goes up (bull) or down (bear).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
	Bull,
	Bear,
}

/// Snapshot of one prediction round as stored by the contract.
///
/// Amounts are in the token's smallest unit; prices carry the oracle's fixed
/// decimal scaling. Both are contract concerns, mirrored here untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundInfo {
	pub epoch: u64,
	pub start_timestamp: u64,
	pub lock_timestamp: u64,
	pub close_timestamp: u64,
	pub lock_price: i128,
	pub close_price: i128,
	pub total_amount: i128,
	pub bull_amount: i128,
	pub bear_amount: i128,
	pub reward_amount: i128,
	pub reward_base_cal_amount: i128,
}

/// A user's bet within one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetInfo {
	pub direction: Direction,
	pub amount: i128,
	pub claimed: bool,
}
