//! Transaction submission and confirmation.
//!
//! Drives one transaction from "built, unsigned" to a settled outcome:
//! prepare, sign, broadcast, then poll for finality under a bounded attempt
//! budget. Preparation, signing and broadcast rejections are permanent for
//! the attempt; only the pending-to-settled wait is polled, because that
//! transition is asynchronous on the ledger side.
//!
//! A failed transaction is never resubmitted here. It consumed a sequence
//! number, so the caller has to rebuild a fresh envelope before trying again.

use market_account::{Signer, SignerError};
use market_rpc::{LedgerRpc, RpcError};
use market_types::{TransactionEnvelope, TransactionRecord, TransactionStatus};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Attempt budget used when a submission does not override it.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
/// Larger budget for submissions signed through a wallet round-trip, which
/// tend to land later relative to when polling starts.
pub const WALLET_CONFIRM_ATTEMPTS: u32 = 20;
/// Delay between consecutive status fetches.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct SubmitterConfig {
	/// Maximum status-fetch attempts per submission. At least 1.
	pub max_attempts: u32,
	/// Pause between consecutive status fetches.
	pub poll_interval: Duration,
}

impl Default for SubmitterConfig {
	fn default() -> Self {
		Self {
			max_attempts: DEFAULT_MAX_ATTEMPTS,
			poll_interval: DEFAULT_POLL_INTERVAL,
		}
	}
}

/// Per-submission overrides and control signals.
#[derive(Default)]
pub struct SubmitOptions {
	/// Overrides the configured attempt budget for this submission.
	pub max_attempts: Option<u32>,
	/// Hard wall-clock bound on the confirmation wait.
	pub deadline: Option<Duration>,
	/// Stops the confirmation wait promptly when the host shuts down or the
	/// caller abandons interest. Any activity on the channel, including its
	/// sender going away, counts as the signal.
	pub cancel: Option<broadcast::Receiver<()>>,
}

/// Terminal success of a submission.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
	/// Ledger-assigned hash, fixed at broadcast time and unchanged by
	/// polling.
	pub hash: String,
	/// Full status payload from the final fetch; carries the ledger
	/// metadata callers may need.
	pub record: TransactionRecord,
}

#[derive(Debug, Error)]
pub enum SubmitError {
	/// The ledger rejected or could not simulate the envelope. The
	/// transaction itself is invalid; never retried.
	#[error("transaction preparation failed: {0}")]
	PrepareFailed(RpcError),

	/// The signer declined or produced an unusable signature. Never
	/// retried.
	#[error("signing failed: {0}")]
	SigningFailed(#[from] SignerError),

	/// Broadcast returned a non-pending status; the network already
	/// evaluated and rejected the transaction (bad sequence number, fee too
	/// low, ...). Polling never starts.
	#[error("transaction {hash} rejected at submit with status {status}")]
	RejectedAtSubmit {
		hash: String,
		status: TransactionStatus,
		details: Option<serde_json::Value>,
	},

	/// A polled status came back failed.
	#[error("transaction {hash} failed on ledger")]
	SettlementFailed { hash: String, record: TransactionRecord },

	/// Attempt budget or deadline exhausted with no terminal status. The
	/// transaction may still settle later; callers must not assume it never
	/// happened.
	#[error("transaction {hash} unconfirmed after {attempts} attempts")]
	TimedOut {
		hash: String,
		attempts: u32,
		last_status: Option<TransactionStatus>,
	},

	/// The caller's cancellation signal fired during the confirmation wait.
	#[error("submission cancelled")]
	Cancelled { hash: String },

	/// Transport failure talking to the endpoint after preparation.
	#[error(transparent)]
	Rpc(#[from] RpcError),
}

/// Drives envelopes through prepare, sign, broadcast and confirmation.
///
/// Holds no per-submission state; one submitter may be shared across
/// concurrent submissions of different envelopes.
pub struct TransactionSubmitter<R: LedgerRpc> {
	rpc: Arc<R>,
	config: SubmitterConfig,
}

impl<R: LedgerRpc> TransactionSubmitter<R> {
	pub fn new(rpc: Arc<R>) -> Self {
		Self {
			rpc,
			config: SubmitterConfig::default(),
		}
	}

	pub fn with_config(rpc: Arc<R>, config: SubmitterConfig) -> Self {
		Self { rpc, config }
	}

	/// Submits with the configured defaults.
	pub async fn submit(
		&self,
		envelope: &TransactionEnvelope,
		signer: &dyn Signer,
	) -> Result<SubmissionOutcome, SubmitError> {
		self.submit_with(envelope, signer, SubmitOptions::default())
			.await
	}

	/// Submits with per-call overrides.
	pub async fn submit_with(
		&self,
		envelope: &TransactionEnvelope,
		signer: &dyn Signer,
		options: SubmitOptions,
	) -> Result<SubmissionOutcome, SubmitError> {
		let max_attempts = options
			.max_attempts
			.unwrap_or(self.config.max_attempts)
			.max(1);

		let prepared = self
			.rpc
			.prepare(envelope)
			.await
			.map_err(SubmitError::PrepareFailed)?;

		let signed = signer.sign(&prepared).await?;

		let ack = self.rpc.submit(&signed).await?;
		info!("Transaction sent, hash: {}", ack.hash);

		if ack.status != TransactionStatus::Pending {
			warn!(
				"Transaction {} not pending at submit: {}",
				ack.hash, ack.status
			);
			return Err(SubmitError::RejectedAtSubmit {
				hash: ack.hash,
				status: ack.status,
				details: ack.error_result,
			});
		}

		self.wait_for_settlement(ack.hash, max_attempts, options.deadline, options.cancel)
			.await
	}

	/// Confirmation wait: strictly sequential status fetches under an
	/// attempt budget, one poll-interval pause between consecutive fetches.
	async fn wait_for_settlement(
		&self,
		hash: String,
		max_attempts: u32,
		deadline: Option<Duration>,
		mut cancel: Option<broadcast::Receiver<()>>,
	) -> Result<SubmissionOutcome, SubmitError> {
		let started = Instant::now();
		let mut last_status = None;

		for attempt in 1..=max_attempts {
			if attempt > 1 {
				self.pause_between_polls(&hash, cancel.as_mut()).await?;
			}

			if deadline.is_some_and(|limit| started.elapsed() >= limit) {
				warn!("Transaction {} hit its confirmation deadline", hash);
				return Err(SubmitError::TimedOut {
					hash,
					attempts: attempt - 1,
					last_status,
				});
			}

			debug!("Polling attempt {}/{} for {}", attempt, max_attempts, hash);
			let record = self.rpc.fetch_status(&hash).await?;
			debug!("Poll result for {}: {}", hash, record.status);

			match record.status {
				TransactionStatus::Success => {
					info!("Transaction {} succeeded after {} attempts", hash, attempt);
					return Ok(SubmissionOutcome { hash, record });
				}
				TransactionStatus::Failed => {
					warn!("Transaction {} failed on ledger", hash);
					return Err(SubmitError::SettlementFailed { hash, record });
				}
				status => {
					// Pending, NotFound and anything unrecognized all mean
					// "not settled yet": consume the attempt and keep going.
					last_status = Some(status);
				}
			}
		}

		warn!(
			"Transaction {} unconfirmed after {} attempts",
			hash, max_attempts
		);
		Err(SubmitError::TimedOut {
			hash,
			attempts: max_attempts,
			last_status,
		})
	}

	async fn pause_between_polls(
		&self,
		hash: &str,
		cancel: Option<&mut broadcast::Receiver<()>>,
	) -> Result<(), SubmitError> {
		match cancel {
			Some(receiver) => {
				tokio::select! {
					_ = tokio::time::sleep(self.config.poll_interval) => Ok(()),
					_ = receiver.recv() => {
						info!("Submission of {} cancelled during confirmation wait", hash);
						Err(SubmitError::Cancelled {
							hash: hash.to_string(),
						})
					}
				}
			}
			None => {
				tokio::time::sleep(self.config.poll_interval).await;
				Ok(())
			}
		}
	}
}
