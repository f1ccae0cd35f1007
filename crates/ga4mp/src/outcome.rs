// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Result of a send that reached a verdict.

use ga4mp_core::{validation_messages, ValidationMessage};
use serde_json::Value;

/// What happened to a send.
///
/// Hard failures (transport errors after retries, batch-size violations) are
/// returned as [`crate::MeasurementError`] instead.
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
	/// The endpoint answered 2xx. On the debug endpoint `response` holds the
	/// full decoded body, which may carry `validationMessages`.
	Accepted { response: Option<Value> },

	/// Local validation failed and nothing was sent.
	Invalid { errors: Vec<String> },

	/// The endpoint answered with a non-2xx status.
	Rejected {
		status: u16,
		error: String,
		body: Option<String>,
	},
}

impl SendOutcome {
	pub fn is_success(&self) -> bool {
		matches!(self, SendOutcome::Accepted { .. })
	}

	/// The debug response body, if any.
	pub fn response(&self) -> Option<&Value> {
		match self {
			SendOutcome::Accepted { response } => response.as_ref(),
			_ => None,
		}
	}

	/// Human-readable reasons for an unsuccessful send.
	pub fn errors(&self) -> Vec<String> {
		match self {
			SendOutcome::Accepted { .. } => Vec::new(),
			SendOutcome::Invalid { errors } => errors.clone(),
			SendOutcome::Rejected { error, body, .. } => match body {
				Some(body) => vec![error.clone(), body.clone()],
				None => vec![error.clone()],
			},
		}
	}

	/// Schema feedback from the debug endpoint; empty otherwise.
	pub fn validation_messages(&self) -> Vec<ValidationMessage> {
		self.response().map(validation_messages).unwrap_or_default()
	}
}
