// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Redacting wrapper for the Measurement Protocol API secret.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The redaction placeholder used in all output.
pub const REDACTED: &str = "[REDACTED]";

/// The `api_secret` query parameter value.
///
/// Debug, Display and Serialize never print the value; it is zeroed on drop.
/// Call [`ApiSecret::expose`] where the raw value is genuinely needed.
///
/// ```
/// use ga4mp_core::ApiSecret;
///
/// let secret = ApiSecret::new("abc123");
/// assert_eq!(format!("{secret}"), "[REDACTED]");
/// assert_eq!(secret.expose(), "abc123");
/// ```
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct ApiSecret {
	inner: String,
}

impl ApiSecret {
	pub fn new(inner: impl Into<String>) -> Self {
		Self {
			inner: inner.into(),
		}
	}

	pub fn expose(&self) -> &str {
		&self.inner
	}

	pub fn is_empty(&self) -> bool {
		self.inner.trim().is_empty()
	}
}

impl fmt::Debug for ApiSecret {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ApiSecret").field(&REDACTED).finish()
	}
}

impl fmt::Display for ApiSecret {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl Serialize for ApiSecret {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(REDACTED)
	}
}

impl<'de> Deserialize<'de> for ApiSecret {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		String::deserialize(deserializer).map(ApiSecret::new)
	}
}

impl From<String> for ApiSecret {
	fn from(inner: String) -> Self {
		Self::new(inner)
	}
}

impl From<&str> for ApiSecret {
	fn from(inner: &str) -> Self {
		Self::new(inner)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn debug_is_redacted() {
		let secret = ApiSecret::new("super-secret");
		let output = format!("{secret:?}");
		assert!(!output.contains("super-secret"));
		assert!(output.contains(REDACTED));
	}

	#[test]
	fn option_debug_is_redacted() {
		let secret = Some(ApiSecret::new("super-secret"));
		assert!(!format!("{secret:?}").contains("super-secret"));
	}

	#[test]
	fn serialize_is_redacted() {
		let json = serde_json::to_string(&ApiSecret::new("super-secret")).unwrap();
		assert_eq!(json, format!("\"{REDACTED}\""));
	}

	#[test]
	fn deserialize_keeps_value() {
		let secret: ApiSecret = serde_json::from_str("\"abc\"").unwrap();
		assert_eq!(secret.expose(), "abc");
	}

	#[test]
	fn whitespace_counts_as_empty() {
		assert!(ApiSecret::new("  ").is_empty());
		assert!(!ApiSecret::new("x").is_empty());
	}

	proptest! {
		#[test]
		fn display_never_contains_secret(inner in "[a-zA-Z0-9_-]{3,40}") {
			prop_assume!(!REDACTED.contains(&inner));
			let secret = ApiSecret::new(inner.clone());
			let shown = secret.to_string();
			prop_assert!(!shown.contains(&inner));
		}

		#[test]
		fn expose_round_trips(inner in ".*") {
			let secret = ApiSecret::new(inner.clone());
			prop_assert_eq!(secret.expose(), inner.as_str());
		}
	}
}
