//! Periodic round execution.
//!
//! Drives `execute_round` on the contract's cadence. The scheduler is an
//! explicit lifecycle object owned by the host process: started and paused
//! under caller control, stopped through a broadcast channel rather than by
//! killing the task mid-operation. A tick that fails leaves the schedule
//! running; the next tick tries again.

use crate::market::{ContractClient, PredictionMarket};
use crate::CoreError;
use market_rpc::LedgerRpc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Extra slack added to the contract's round interval so a tick never fires
/// before the round is actually executable.
pub const DEFAULT_TICK_BUFFER: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStatus {
	pub running: bool,
	pub interval_seconds: u64,
}

#[derive(Default)]
struct SchedulerState {
	running: bool,
	interval_seconds: u64,
	task: Option<JoinHandle<()>>,
}

pub struct RoundScheduler<C, R>
where
	C: ContractClient + 'static,
	R: LedgerRpc + 'static,
{
	market: Arc<PredictionMarket<C, R>>,
	tick_buffer: Duration,
	state: Arc<RwLock<SchedulerState>>,
	shutdown_tx: broadcast::Sender<()>,
}

impl<C, R> RoundScheduler<C, R>
where
	C: ContractClient + 'static,
	R: LedgerRpc + 'static,
{
	pub fn new(market: Arc<PredictionMarket<C, R>>, tick_buffer: Duration) -> Self {
		let (shutdown_tx, _) = broadcast::channel(4);

		Self {
			market,
			tick_buffer,
			state: Arc::new(RwLock::new(SchedulerState::default())),
			shutdown_tx,
		}
	}

	/// Starts periodic round execution.
	///
	/// Refuses when already running, and when the market's genesis rounds
	/// have not been started and locked yet — there is nothing to execute
	/// before that point.
	pub async fn start(&self) -> Result<SchedulerStatus, CoreError> {
		if self.state.read().await.running {
			return Err(CoreError::Scheduler(
				"scheduler is already running".to_string(),
			));
		}

		if !self.market.is_genesis_started().await? || !self.market.is_genesis_locked().await? {
			return Err(CoreError::Scheduler(
				"genesis rounds must be started and locked before scheduling".to_string(),
			));
		}

		let interval_seconds = self.market.interval_seconds().await?;
		let period = Duration::from_secs(interval_seconds) + self.tick_buffer;

		info!(
			"Starting round scheduler, executing every {}s",
			period.as_secs()
		);

		let market = self.market.clone();
		let state = self.state.clone();
		let mut shutdown_rx = self.shutdown_tx.subscribe();

		let task = tokio::spawn(async move {
			let mut ticker = tokio::time::interval(period);
			ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
			// The first tick of an interval fires immediately; the schedule
			// starts one full period out.
			ticker.tick().await;

			loop {
				tokio::select! {
					_ = shutdown_rx.recv() => {
						info!("Round scheduler stopping");
						break;
					}
					_ = ticker.tick() => {
						if !run_tick(market.as_ref()).await {
							state.write().await.running = false;
							break;
						}
					}
				}
			}
		});

		let mut state = self.state.write().await;
		state.running = true;
		state.interval_seconds = interval_seconds;
		state.task = Some(task);

		Ok(SchedulerStatus {
			running: true,
			interval_seconds,
		})
	}

	/// Stops the schedule. An in-flight round execution finishes first; no
	/// new ticks run after that.
	pub async fn pause(&self) -> Result<SchedulerStatus, CoreError> {
		let mut state = self.state.write().await;
		if !state.running {
			return Err(CoreError::Scheduler(
				"scheduler is not running".to_string(),
			));
		}

		let _ = self.shutdown_tx.send(());
		state.running = false;
		state.task.take();

		info!("Round scheduler paused");
		Ok(SchedulerStatus {
			running: false,
			interval_seconds: state.interval_seconds,
		})
	}

	pub async fn status(&self) -> SchedulerStatus {
		let state = self.state.read().await;
		SchedulerStatus {
			running: state.running,
			interval_seconds: state.interval_seconds,
		}
	}
}

/// One scheduled tick. Returns false when the scheduler should pause itself.
async fn run_tick<C, R>(market: &PredictionMarket<C, R>) -> bool
where
	C: ContractClient,
	R: LedgerRpc,
{
	let flags = tokio::try_join!(market.is_genesis_started(), market.is_genesis_locked());
	match flags {
		Ok((true, true)) => {}
		Ok(_) => {
			warn!("Genesis rounds no longer started and locked, pausing scheduler");
			return false;
		}
		Err(err) => {
			// Transient read failure; the next tick re-checks.
			error!("Failed to check genesis flags: {}", err);
			return true;
		}
	}

	match market.execute_round().await {
		Ok(receipt) => {
			info!(
				"Round executed, hash: {}, epoch: {}",
				receipt.hash, receipt.epoch
			);
		}
		Err(err) => {
			// Keep the schedule alive; the next tick tries again.
			error!("Round execution failed: {}", err);
		}
	}

	true
}
