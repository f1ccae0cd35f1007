// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Retry logic with exponential backoff for HTTP requests.
//!
//! Only the transport call is wrapped. Whether an error is worth another
//! attempt is decided by a predicate, usually [`RetryableError::is_retryable`].

use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Backoff policy: `base_delay * backoff_factor^n`, capped at `max_delay`.
#[derive(Debug, Clone)]
pub struct RetryConfig {
	/// Total attempts, including the first one.
	pub max_attempts: u32,
	pub base_delay: Duration,
	pub max_delay: Duration,
	pub backoff_factor: f64,
	pub jitter: bool,
}

impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_attempts: 3,
			base_delay: Duration::from_secs(1),
			max_delay: Duration::from_secs(10),
			backoff_factor: 2.0,
			jitter: false,
		}
	}
}

impl RetryConfig {
	/// A policy that never retries.
	pub fn single_attempt() -> Self {
		Self {
			max_attempts: 1,
			..Self::default()
		}
	}

	/// Delay slept after the `retry_index`-th failed attempt (zero based).
	pub fn delay_for(&self, retry_index: u32) -> Duration {
		let exponential_delay =
			self.base_delay.as_secs_f64() * self.backoff_factor.powi(retry_index as i32);
		let capped_delay = exponential_delay.min(self.max_delay.as_secs_f64());

		let final_delay = if self.jitter {
			let jitter_factor = 0.5 + fastrand::f64();
			capped_delay * jitter_factor
		} else {
			capped_delay
		};

		Duration::from_secs_f64(final_delay)
	}
}

pub trait RetryableError {
	fn is_retryable(&self) -> bool;
}

/// Timeouts and connection failures are transient. Anything else, including
/// status errors, is reported to the caller as-is.
impl RetryableError for reqwest::Error {
	fn is_retryable(&self) -> bool {
		self.is_timeout() || self.is_connect()
	}
}

/// Runs `f` until it succeeds, returns a non-retryable error, or
/// `cfg.max_attempts` is reached. The last error is returned unchanged.
pub async fn retry<F, Fut, T, E>(cfg: &RetryConfig, f: F) -> Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
	E: RetryableError + Debug,
{
	retry_when(cfg, |err: &E| err.is_retryable(), f).await
}

/// Like [`retry`], with an explicit retryability predicate.
pub async fn retry_when<F, Fut, T, E, P>(cfg: &RetryConfig, is_retryable: P, mut f: F) -> Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
	E: Debug,
	P: Fn(&E) -> bool,
{
	let mut attempt = 0;

	loop {
		match f().await {
			Ok(result) => return Ok(result),
			Err(err) => {
				attempt += 1;

				if !is_retryable(&err) {
					warn!(
						error = ?err,
						attempt = attempt,
						"non-retryable error encountered"
					);
					return Err(err);
				}

				if attempt >= cfg.max_attempts {
					warn!(
						error = ?err,
						attempt = attempt,
						max_attempts = cfg.max_attempts,
						"max retry attempts exhausted"
					);
					return Err(err);
				}

				let delay = cfg.delay_for(attempt - 1);
				warn!(
					error = ?err,
					attempt = attempt,
					max_attempts = cfg.max_attempts,
					delay_ms = delay.as_millis() as u64,
					"retrying after error"
				);

				tokio::time::sleep(delay).await;
			}
		}
	}
}
