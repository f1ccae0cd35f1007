// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Collection endpoints.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Production collection host.
pub const PRODUCTION_BASE_URL: &str = "https://www.google-analytics.com";

/// Validation host; echoes schema feedback instead of recording events.
pub const DEBUG_BASE_URL: &str = "https://www.google-analytics.com/debug";

/// Path appended to the base URL for every send.
pub const COLLECT_PATH: &str = "/mp/collect";

/// Which collection endpoint a client talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
	#[default]
	Production,
	Debug,
}

impl Endpoint {
	pub fn from_debug_flag(debug: bool) -> Self {
		if debug {
			Endpoint::Debug
		} else {
			Endpoint::Production
		}
	}

	pub fn base_url(&self) -> &'static str {
		match self {
			Endpoint::Production => PRODUCTION_BASE_URL,
			Endpoint::Debug => DEBUG_BASE_URL,
		}
	}

	/// Only the debug endpoint answers with a `validationMessages` body.
	pub fn is_debug(&self) -> bool {
		matches!(self, Endpoint::Debug)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Endpoint::Production => "production",
			Endpoint::Debug => "debug",
		}
	}
}

impl fmt::Display for Endpoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Endpoint {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"production" | "prod" => Ok(Endpoint::Production),
			"debug" | "validation" => Ok(Endpoint::Debug),
			other => Err(format!("unknown endpoint: {other} (expected production or debug)")),
		}
	}
}

/// Builds the full collect URL for a base URL, ignoring a trailing slash.
pub fn collect_url(base_url: &str) -> String {
	format!("{}{COLLECT_PATH}", base_url.trim_end_matches('/'))
}
