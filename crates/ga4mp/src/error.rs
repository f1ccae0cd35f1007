// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the Measurement Protocol client.
//!
//! These are the hard failures of a send. Validation problems and non-2xx
//! responses are reported through [`crate::SendOutcome`] instead.

use ga4mp_common_http::RetryableError;
use thiserror::Error;

/// Measurement Protocol client errors.
#[derive(Debug, Error)]
pub enum MeasurementError {
	/// Measurement id is missing or blank.
	#[error("missing measurement id")]
	MissingMeasurementId,

	/// API secret is missing or blank.
	#[error("missing API secret")]
	MissingApiSecret,

	/// Base URL override is not an http(s) URL.
	#[error("invalid base URL: {0}")]
	InvalidBaseUrl(String),

	/// More events than one collect request may carry.
	#[error("batch of {count} events exceeds the maximum of {max} per request")]
	BatchTooLarge { count: usize, max: usize },

	/// Transport failure, including timeouts once retries are exhausted.
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[from] reqwest::Error),

	/// Response body could not be decoded.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl RetryableError for MeasurementError {
	fn is_retryable(&self) -> bool {
		match self {
			MeasurementError::RequestFailed(e) => e.is_retryable(),
			_ => false,
		}
	}
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, MeasurementError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn batch_too_large_is_not_retryable() {
		let err = MeasurementError::BatchTooLarge { count: 26, max: 25 };
		assert!(!err.is_retryable());
		assert_eq!(
			err.to_string(),
			"batch of 26 events exceeds the maximum of 25 per request"
		);
	}

	#[test]
	fn configuration_errors_are_not_retryable() {
		assert!(!MeasurementError::MissingMeasurementId.is_retryable());
		assert!(!MeasurementError::MissingApiSecret.is_retryable());
		assert!(!MeasurementError::InvalidBaseUrl("ftp://x".to_string()).is_retryable());
	}

	#[test]
	fn json_errors_are_not_retryable() {
		let err: MeasurementError = serde_json::from_str::<serde_json::Value>("{")
			.unwrap_err()
			.into();
		assert!(!err.is_retryable());
	}
}
