//! Bounded retry with exponential backoff for read-only queries.
//!
//! Kept separate from the transaction submitter on purpose: the submission
//! path has its own fixed-cadence confirmation wait, while transient read
//! failures (epoch, round and price lookups) are retried here.

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Extra attempts a read query gets before its error is surfaced.
pub const DEFAULT_QUERY_RETRIES: u32 = 3;
/// First retry delay; doubled on every subsequent retry.
pub const DEFAULT_QUERY_DELAY: Duration = Duration::from_secs(1);

/// Retries an async operation up to `max_retries` extra attempts, doubling
/// the delay between attempts starting from `initial_delay`.
pub async fn retry_with_backoff<T, E, F, Fut>(
	mut operation: F,
	max_retries: u32,
	initial_delay: Duration,
) -> Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
	E: std::fmt::Display,
{
	let mut backoff = ExponentialBackoff {
		current_interval: initial_delay,
		initial_interval: initial_delay,
		randomization_factor: 0.0,
		multiplier: 2.0,
		max_elapsed_time: None,
		..Default::default()
	};

	let mut attempt = 0;
	loop {
		match operation().await {
			Ok(value) => return Ok(value),
			Err(error) if attempt < max_retries => {
				attempt += 1;
				let delay = backoff.next_backoff().unwrap_or(initial_delay);
				warn!(
					"Query failed (attempt {}/{}): {}, retrying in {:?}",
					attempt, max_retries, error, delay
				);
				tokio::time::sleep(delay).await;
			}
			Err(error) => return Err(error),
		}
	}
}

/// [`retry_with_backoff`] with the default query budget.
pub async fn retry_query<T, E, F, Fut>(operation: F) -> Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
	E: std::fmt::Display,
{
	retry_with_backoff(operation, DEFAULT_QUERY_RETRIES, DEFAULT_QUERY_DELAY).await
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicU32, Ordering};
	use tokio::time::Instant;

	#[tokio::test]
	async fn returns_first_success_without_delay() {
		let calls = AtomicU32::new(0);

		let result: Result<u32, String> = retry_with_backoff(
			|| {
				calls.fetch_add(1, Ordering::SeqCst);
				async { Ok(42) }
			},
			3,
			Duration::from_secs(1),
		)
		.await;

		assert_eq!(result.unwrap(), 42);
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn doubles_delay_between_retries() {
		let calls = AtomicU32::new(0);
		let started = Instant::now();

		let result: Result<u32, String> = retry_with_backoff(
			|| {
				let call = calls.fetch_add(1, Ordering::SeqCst);
				async move {
					if call < 2 {
						Err("unavailable".to_string())
					} else {
						Ok(7)
					}
				}
			},
			3,
			Duration::from_secs(1),
		)
		.await;

		assert_eq!(result.unwrap(), 7);
		assert_eq!(calls.load(Ordering::SeqCst), 3);
		// 1s after the first failure, 2s after the second.
		assert_eq!(started.elapsed(), Duration::from_secs(3));
	}

	#[tokio::test(start_paused = true)]
	async fn surfaces_error_after_budget() {
		let calls = AtomicU32::new(0);

		let result: Result<u32, String> = retry_with_backoff(
			|| {
				calls.fetch_add(1, Ordering::SeqCst);
				async { Err("still down".to_string()) }
			},
			2,
			Duration::from_millis(100),
		)
		.await;

		assert_eq!(result.unwrap_err(), "still down");
		// Initial attempt plus two retries.
		assert_eq!(calls.load(Ordering::SeqCst), 3);
	}
}
