// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request body for the `/mp/collect` endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::event::Event;

/// Maximum number of events in one collect request.
pub const MAX_BATCH_EVENTS: usize = 25;

/// Engagement time injected alongside a session id.
pub const ENGAGEMENT_TIME_MSEC: u64 = 100;

/// Optional request-level fields for a send.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SendOptions {
	/// Injected into every event's params together with the engagement time.
	pub session_id: Option<String>,
	/// Top-level user id for cross-device attribution.
	pub user_id: Option<String>,
	pub timestamp_micros: Option<i64>,
	pub non_personalized_ads: Option<bool>,
}

impl SendOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
		self.session_id = Some(session_id.into());
		self
	}

	pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
		self.user_id = Some(user_id.into());
		self
	}

	/// Backdates the events to `timestamp`.
	pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
		self.timestamp_micros = Some(timestamp.timestamp_micros());
		self
	}

	pub fn non_personalized_ads(mut self, enabled: bool) -> Self {
		self.non_personalized_ads = Some(enabled);
		self
	}

	pub(crate) fn from_parts(session_id: Option<&str>, user_id: Option<&str>) -> Self {
		Self {
			session_id: session_id.map(str::to_string),
			user_id: user_id.map(str::to_string),
			..Self::default()
		}
	}
}

/// JSON body of a collect request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectPayload {
	pub client_id: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub user_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub timestamp_micros: Option<i64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub non_personalized_ads: Option<bool>,
	pub events: Vec<PayloadEvent>,
}

/// One entry of the `events` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadEvent {
	pub name: String,
	pub params: Map<String, Value>,
}

impl CollectPayload {
	/// Builds the request body from copies of `events`.
	///
	/// When a session id is set, `session_id` and `engagement_time_msec` are
	/// written into every event's params. The events themselves are untouched.
	/// Empty session and user ids count as absent.
	pub fn build<'a, I>(client_id: &str, events: I, options: &SendOptions) -> Self
	where
		I: IntoIterator<Item = &'a Event>,
	{
		let session_id = options.session_id.as_deref().filter(|s| !s.is_empty());
		let user_id = options.user_id.as_deref().filter(|s| !s.is_empty());

		let events = events
			.into_iter()
			.map(|event| {
				let mut params = event.params().as_map().clone();
				if let Some(session_id) = session_id {
					params.insert("session_id".to_string(), Value::from(session_id));
					params.insert(
						"engagement_time_msec".to_string(),
						Value::from(ENGAGEMENT_TIME_MSEC),
					);
				}
				PayloadEvent {
					name: event.name().to_string(),
					params,
				}
			})
			.collect();

		Self {
			client_id: client_id.to_string(),
			user_id: user_id.map(str::to_string),
			timestamp_micros: options.timestamp_micros,
			non_personalized_ads: options.non_personalized_ads,
			events,
		}
	}

	/// Body for a single event, as sent by `send_event`.
	pub fn single(
		event: &Event,
		client_id: &str,
		session_id: Option<&str>,
		user_id: Option<&str>,
	) -> Self {
		Self::build(
			client_id,
			std::iter::once(event),
			&SendOptions::from_parts(session_id, user_id),
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::params::Params;
	use chrono::TimeZone;
	use serde_json::json;

	#[test]
	fn minimal_payload_shape() {
		let event = Event::new("page_view", Params::new().insert("page", "/"));
		let payload = CollectPayload::single(&event, "12345.67890", None, None);

		assert_eq!(
			serde_json::to_value(&payload).unwrap(),
			json!({
				"client_id": "12345.67890",
				"events": [{"name": "page_view", "params": {"page": "/"}}]
			})
		);
	}

	#[test]
	fn session_id_injects_engagement_time() {
		let event = Event::named("login");
		let payload = CollectPayload::single(&event, "c1", Some("1234567890"), None);
		let params = &payload.events[0].params;

		assert_eq!(params["session_id"], json!("1234567890"));
		assert_eq!(params["engagement_time_msec"], json!(100));
	}

	#[test]
	fn session_injection_leaves_event_untouched() {
		let event = Event::new("login", Params::new().insert("method", "sso"));
		let before = event.clone();

		let _ = CollectPayload::single(&event, "c1", Some("s1"), Some("u1"));

		assert_eq!(event, before);
		assert!(!event.params().contains_key("session_id"));
	}

	#[test]
	fn user_id_is_top_level() {
		let event = Event::named("login");
		let value =
			serde_json::to_value(CollectPayload::single(&event, "c1", None, Some("user_42"))).unwrap();

		assert_eq!(value["user_id"], json!("user_42"));
		assert!(value["events"][0]["params"].get("user_id").is_none());
	}

	#[test]
	fn empty_session_and_user_ids_are_absent() {
		let event = Event::named("login");
		let value = serde_json::to_value(CollectPayload::single(&event, "c1", Some(""), Some(""))).unwrap();

		assert_eq!(
			value,
			json!({"client_id": "c1", "events": [{"name": "login", "params": {}}]})
		);
	}

	#[test]
	fn batch_injects_session_into_every_event() {
		let events = vec![Event::named("a"), Event::named("b"), Event::named("c")];
		let options = SendOptions::new().session_id("s1");
		let payload = CollectPayload::build("c1", &events, &options);

		assert_eq!(payload.events.len(), 3);
		for entry in &payload.events {
			assert_eq!(entry.params["session_id"], json!("s1"));
			assert_eq!(entry.params["engagement_time_msec"], json!(100));
		}
	}

	#[test]
	fn optional_fields_are_omitted() {
		let value =
			serde_json::to_value(CollectPayload::build("c1", &[Event::named("a")], &SendOptions::new()))
				.unwrap();
		let object = value.as_object().unwrap();

		assert!(!object.contains_key("user_id"));
		assert!(!object.contains_key("timestamp_micros"));
		assert!(!object.contains_key("non_personalized_ads"));
	}

	#[test]
	fn timestamp_is_encoded_in_micros() {
		let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
		let options = SendOptions::new().timestamp(at).non_personalized_ads(true);
		let payload = CollectPayload::build("c1", &[Event::named("a")], &options);

		assert_eq!(payload.timestamp_micros, Some(1_704_067_200_000_000));
		assert_eq!(payload.non_personalized_ads, Some(true));
	}
}
