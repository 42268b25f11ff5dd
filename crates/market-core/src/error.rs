//! Core service errors.

use crate::market::ContractError;
use market_submitter::SubmitError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
	#[error("contract error: {0}")]
	Contract(#[from] ContractError),

	#[error("submission error: {0}")]
	Submit(#[from] SubmitError),

	#[error("scheduler error: {0}")]
	Scheduler(String),
}
