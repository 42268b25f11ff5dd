//! Prediction market service layer.
//!
//! Wraps the external contract binding: operator operations build an
//! envelope, push it through the transaction submitter and report the hash
//! together with the epoch they acted on. Read queries are safe to repeat
//! and go through the bounded-retry helper; submissions never do.

use async_trait::async_trait;
use market_account::Signer;
use market_rpc::{retry_query, LedgerRpc, RpcError};
use market_submitter::{SubmitOptions, TransactionSubmitter, WALLET_CONFIRM_ATTEMPTS};
use market_types::{BetInfo, Direction, RoundInfo, TransactionEnvelope};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::CoreError;

#[derive(Debug, Error)]
pub enum ContractError {
	#[error("rpc error: {0}")]
	Rpc(#[from] RpcError),

	#[error("simulation failed: {0}")]
	Simulation(String),

	#[error("malformed contract value: {0}")]
	Malformed(String),

	#[error("round {0} not found")]
	RoundNotFound(u64),
}

/// Surface of the generated contract binding the service consumes.
///
/// Builder methods return unsigned envelopes for the submitter; query
/// methods read contract state without touching the ledger.
#[async_trait]
pub trait ContractClient: Send + Sync {
	async fn genesis_start_round(&self) -> Result<TransactionEnvelope, ContractError>;
	async fn genesis_lock_round(&self) -> Result<TransactionEnvelope, ContractError>;
	async fn execute_round(&self) -> Result<TransactionEnvelope, ContractError>;
	async fn bet(
		&self,
		direction: Direction,
		epoch: u64,
		user: &str,
		amount: i128,
	) -> Result<TransactionEnvelope, ContractError>;

	async fn is_genesis_started(&self) -> Result<bool, ContractError>;
	async fn is_genesis_locked(&self) -> Result<bool, ContractError>;
	async fn current_epoch(&self) -> Result<u64, ContractError>;
	async fn round(&self, epoch: u64) -> Result<RoundInfo, ContractError>;
	async fn oracle_price(&self) -> Result<i128, ContractError>;
	async fn min_bet_amount(&self) -> Result<i128, ContractError>;
	async fn interval_seconds(&self) -> Result<u64, ContractError>;
	async fn bet_info(&self, epoch: u64, user: &str) -> Result<Option<BetInfo>, ContractError>;
	async fn user_rounds(&self, user: &str) -> Result<Vec<u64>, ContractError>;
}

/// Receipt for a confirmed operator operation.
#[derive(Debug, Clone)]
pub struct OperationReceipt {
	pub hash: String,
	/// Epoch observed right after the operation settled.
	pub epoch: u64,
}

/// Operator-side view of the prediction market.
pub struct PredictionMarket<C, R>
where
	C: ContractClient,
	R: LedgerRpc,
{
	contract: Arc<C>,
	submitter: TransactionSubmitter<R>,
	signer: Arc<dyn Signer>,
}

impl<C, R> PredictionMarket<C, R>
where
	C: ContractClient,
	R: LedgerRpc,
{
	pub fn new(
		contract: Arc<C>,
		submitter: TransactionSubmitter<R>,
		signer: Arc<dyn Signer>,
	) -> Self {
		Self {
			contract,
			submitter,
			signer,
		}
	}

	pub async fn genesis_start_round(&self) -> Result<OperationReceipt, CoreError> {
		let envelope = self.contract.genesis_start_round().await?;
		self.run_operation("genesis_start_round", envelope).await
	}

	pub async fn genesis_lock_round(&self) -> Result<OperationReceipt, CoreError> {
		let envelope = self.contract.genesis_lock_round().await?;
		self.run_operation("genesis_lock_round", envelope).await
	}

	pub async fn execute_round(&self) -> Result<OperationReceipt, CoreError> {
		let envelope = self.contract.execute_round().await?;
		self.run_operation("execute_round", envelope).await
	}

	/// Places a bet with a caller-held signer (a connected wallet).
	///
	/// Wallet round-trips delay broadcast relative to when the envelope was
	/// prepared, so the confirmation wait gets the larger attempt budget.
	pub async fn place_bet(
		&self,
		direction: Direction,
		epoch: u64,
		amount: i128,
		signer: &dyn Signer,
	) -> Result<OperationReceipt, CoreError> {
		let envelope = self
			.contract
			.bet(direction, epoch, signer.address(), amount)
			.await?;

		let options = SubmitOptions {
			max_attempts: Some(WALLET_CONFIRM_ATTEMPTS),
			..Default::default()
		};
		let outcome = self.submitter.submit_with(&envelope, signer, options).await?;

		info!(
			"Bet confirmed, hash: {}, epoch: {}, direction: {:?}",
			outcome.hash, epoch, direction
		);
		Ok(OperationReceipt {
			hash: outcome.hash,
			epoch,
		})
	}

	async fn run_operation(
		&self,
		name: &str,
		envelope: TransactionEnvelope,
	) -> Result<OperationReceipt, CoreError> {
		let outcome = self
			.submitter
			.submit(&envelope, self.signer.as_ref())
			.await?;
		let epoch = self.current_epoch().await?;

		info!(
			"{} confirmed, hash: {}, epoch: {}",
			name, outcome.hash, epoch
		);
		Ok(OperationReceipt {
			hash: outcome.hash,
			epoch,
		})
	}

	pub async fn is_genesis_started(&self) -> Result<bool, CoreError> {
		Ok(retry_query(|| self.contract.is_genesis_started()).await?)
	}

	pub async fn is_genesis_locked(&self) -> Result<bool, CoreError> {
		Ok(retry_query(|| self.contract.is_genesis_locked()).await?)
	}

	pub async fn current_epoch(&self) -> Result<u64, CoreError> {
		Ok(retry_query(|| self.contract.current_epoch()).await?)
	}

	/// Round lookups are not retried: a missing round is the common case for
	/// future epochs, not a transient failure.
	pub async fn round(&self, epoch: u64) -> Result<RoundInfo, CoreError> {
		Ok(self.contract.round(epoch).await?)
	}

	pub async fn oracle_price(&self) -> Result<i128, CoreError> {
		Ok(retry_query(|| self.contract.oracle_price()).await?)
	}

	pub async fn min_bet_amount(&self) -> Result<i128, CoreError> {
		Ok(retry_query(|| self.contract.min_bet_amount()).await?)
	}

	pub async fn interval_seconds(&self) -> Result<u64, CoreError> {
		Ok(retry_query(|| self.contract.interval_seconds()).await?)
	}

	pub async fn bet_info(
		&self,
		epoch: u64,
		user: &str,
	) -> Result<Option<BetInfo>, CoreError> {
		Ok(retry_query(|| self.contract.bet_info(epoch, user)).await?)
	}

	pub async fn user_rounds(&self, user: &str) -> Result<Vec<u64>, CoreError> {
		Ok(retry_query(|| self.contract.user_rounds(user)).await?)
	}
}
