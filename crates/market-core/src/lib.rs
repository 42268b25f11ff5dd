//! Core orchestration for the prediction market operator.
//!
//! Wraps the external contract binding behind [`ContractClient`], drives
//! operator operations through the transaction submitter, and schedules
//! periodic round execution under an explicit, host-owned lifecycle.

pub mod error;
pub mod market;
pub mod scheduler;

pub use error::CoreError;
pub use market::{ContractClient, ContractError, OperationReceipt, PredictionMarket};
pub use scheduler::{RoundScheduler, SchedulerStatus, DEFAULT_TICK_BUFFER};
