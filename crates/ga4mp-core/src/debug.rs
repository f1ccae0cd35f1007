// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Feedback returned by the debug endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key of the feedback array in a debug response body.
pub const VALIDATION_MESSAGES_KEY: &str = "validationMessages";

/// One schema problem reported by the debug endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationMessage {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub field_path: Option<String>,
	#[serde(default)]
	pub description: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub validation_code: Option<String>,
}

/// Reads the `validationMessages` array out of a debug response body.
///
/// Entries that do not match the expected shape are skipped; a body without
/// the key yields an empty list.
pub fn validation_messages(body: &Value) -> Vec<ValidationMessage> {
	body
		.get(VALIDATION_MESSAGES_KEY)
		.and_then(Value::as_array)
		.map(|entries| {
			entries
				.iter()
				.filter_map(|entry| serde_json::from_value(entry.clone()).ok())
				.collect()
		})
		.unwrap_or_default()
}
