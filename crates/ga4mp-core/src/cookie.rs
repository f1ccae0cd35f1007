// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client id helpers for the `_ga` browser cookie.
//!
//! A `_ga` value looks like `GA1.<domain-parts>.<random>.<timestamp>`; the
//! client id is the last two of the first four segments joined by a dot.

use chrono::Utc;

/// Name of the cookie carrying the client id.
pub const GA_COOKIE_NAME: &str = "_ga";

/// Extracts the client id from a `_ga` cookie value.
///
/// Accepts either the bare value or a `_ga=...` pair. Returns `None` for
/// anything that does not have at least four dot-separated segments.
///
/// ```
/// use ga4mp_core::extract_client_id;
///
/// assert_eq!(extract_client_id("GA1.2.12345.67890").as_deref(), Some("12345.67890"));
/// assert_eq!(extract_client_id("malformed"), None);
/// ```
pub fn extract_client_id(cookie: &str) -> Option<String> {
	let value = cookie.trim();
	let value = value
		.strip_prefix(GA_COOKIE_NAME)
		.and_then(|rest| rest.strip_prefix('='))
		.unwrap_or(value);

	let segments: Vec<&str> = value.split('.').collect();
	if segments.len() < 4 {
		return None;
	}

	Some(format!("{}.{}", segments[2], segments[3]))
}

/// Generates a client id in the `_ga` format, for visitors without a cookie.
///
/// The result is `<10 random digits>.<unix seconds>`.
pub fn generate_client_id() -> String {
	let random = fastrand::u32(1_000_000_000..=2_147_483_647);
	format!("{random}.{}", Utc::now().timestamp())
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn extracts_standard_cookie() {
		assert_eq!(
			extract_client_id("GA1.2.12345.67890"),
			Some("12345.67890".to_string())
		);
	}

	#[test]
	fn extra_segments_are_ignored() {
		assert_eq!(
			extract_client_id("GA1.2.12345.67890.extra"),
			Some("12345.67890".to_string())
		);
	}

	#[test]
	fn accepts_cookie_pair() {
		assert_eq!(
			extract_client_id("_ga=GA1.1.987654321.1700000000"),
			Some("987654321.1700000000".to_string())
		);
	}

	#[test]
	fn malformed_values_yield_none() {
		assert_eq!(extract_client_id("malformed"), None);
		assert_eq!(extract_client_id(""), None);
		assert_eq!(extract_client_id("GA1.2.12345"), None);
	}

	#[test]
	fn generated_ids_round_trip_through_cookie_format() {
		let id = generate_client_id();
		let (random, seconds) = id.split_once('.').unwrap();

		assert_eq!(random.len(), 10);
		assert!(random.chars().all(|c| c.is_ascii_digit()));
		assert!(seconds.parse::<i64>().unwrap() > 1_600_000_000);

		let cookie = format!("GA1.1.{id}");
		assert_eq!(extract_client_id(&cookie), Some(id));
	}

	proptest! {
		#[test]
		fn extraction_joins_third_and_fourth_segments(
			a in "[0-9]{1,12}",
			b in "[0-9]{1,12}",
			domain in "[0-9]{1,2}",
		) {
			let cookie = format!("GA1.{domain}.{a}.{b}");
			prop_assert_eq!(extract_client_id(&cookie), Some(format!("{a}.{b}")));
		}

		#[test]
		fn values_without_enough_dots_yield_none(value in "[A-Za-z0-9]{0,20}(\\.[A-Za-z0-9]{0,5}){0,2}") {
			prop_assert_eq!(extract_client_id(&value), None);
		}
	}
}
