// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Measurement Protocol client for sending single events and batches.

use std::sync::Arc;
use std::time::Duration;

use ga4mp_common_http::RetryConfig;
use ga4mp_core::{
	collect_url, ApiSecret, CollectPayload, Endpoint, Event, SendOptions, MAX_BATCH_EVENTS,
	VALIDATION_MESSAGES_KEY,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::error::{MeasurementError, Result};
use crate::outcome::SendOutcome;

/// Configuration for the measurement client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
	/// Timeout for each HTTP attempt.
	pub request_timeout: Duration,
	/// Backoff policy for timeouts and connection failures.
	pub retry_config: RetryConfig,
	/// Whether `send_batch` retries like `send_event` does.
	pub retry_batches: bool,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			request_timeout: Duration::from_secs(5),
			retry_config: RetryConfig::default(),
			retry_batches: true,
		}
	}
}

/// Builder for constructing a MeasurementClient.
pub struct MeasurementClientBuilder {
	measurement_id: Option<String>,
	api_secret: Option<ApiSecret>,
	endpoint: Endpoint,
	base_url: Option<String>,
	config: ClientConfig,
}

impl MeasurementClientBuilder {
	/// Creates a new builder with default settings.
	pub fn new() -> Self {
		Self {
			measurement_id: None,
			api_secret: None,
			endpoint: Endpoint::default(),
			base_url: None,
			config: ClientConfig::default(),
		}
	}

	/// Sets the GA4 measurement id, e.g. `G-XXXXXXXXX`.
	pub fn measurement_id(mut self, id: impl Into<String>) -> Self {
		self.measurement_id = Some(id.into());
		self
	}

	/// Sets the Measurement Protocol API secret.
	pub fn api_secret(mut self, secret: impl Into<ApiSecret>) -> Self {
		self.api_secret = Some(secret.into());
		self
	}

	/// Selects the production or debug endpoint.
	pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
		self.endpoint = endpoint;
		self
	}

	/// Shorthand for `endpoint(Endpoint::from_debug_flag(debug))`.
	pub fn debug(self, debug: bool) -> Self {
		self.endpoint(Endpoint::from_debug_flag(debug))
	}

	/// Overrides the endpoint host, e.g. for a proxy.
	///
	/// The endpoint mode still decides how responses are interpreted.
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = Some(url.into());
		self
	}

	/// Sets the per-attempt HTTP timeout.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.config.request_timeout = timeout;
		self
	}

	/// Sets the retry configuration.
	pub fn retry_config(mut self, config: RetryConfig) -> Self {
		self.config.retry_config = config;
		self
	}

	/// Enables or disables retries on the batch path.
	pub fn retry_batches(mut self, enabled: bool) -> Self {
		self.config.retry_batches = enabled;
		self
	}

	/// Builds the MeasurementClient.
	pub fn build(self) -> Result<MeasurementClient> {
		let measurement_id = self
			.measurement_id
			.filter(|id| !id.trim().is_empty())
			.ok_or(MeasurementError::MissingMeasurementId)?;
		let api_secret = self
			.api_secret
			.filter(|secret| !secret.is_empty())
			.ok_or(MeasurementError::MissingApiSecret)?;

		let base_url = match self.base_url {
			Some(url) => {
				if !(url.starts_with("http://") || url.starts_with("https://")) {
					return Err(MeasurementError::InvalidBaseUrl(url));
				}
				url.trim_end_matches('/').to_string()
			}
			None => self.endpoint.base_url().to_string(),
		};

		let http_client = ga4mp_common_http::new_client_with_timeout(self.config.request_timeout)
			.map_err(MeasurementError::RequestFailed)?;

		let inner = Arc::new(MeasurementClientInner {
			measurement_id,
			api_secret,
			endpoint: self.endpoint,
			collect_url: collect_url(&base_url),
			http_client,
			config: self.config,
		});

		info!(
			base_url = %base_url,
			endpoint = %inner.endpoint,
			measurement_id = %inner.measurement_id,
			"Measurement Protocol client initialized"
		);

		Ok(MeasurementClient { inner })
	}
}

impl Default for MeasurementClientBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Internal client state.
struct MeasurementClientInner {
	measurement_id: String,
	api_secret: ApiSecret,
	endpoint: Endpoint,
	collect_url: String,
	http_client: Client,
	config: ClientConfig,
}

/// Client for the GA4 Measurement Protocol.
///
/// Cloning is cheap; clones share configuration and the connection pool.
///
/// # Example
///
/// ```ignore
/// use ga4mp::{Event, MeasurementClient, Params};
///
/// let client = MeasurementClient::builder()
///     .measurement_id("G-XXXXXXXXX")
///     .api_secret("your_api_secret")
///     .debug(true)
///     .build()?;
///
/// let event = Event::new("sign_up", Params::new().insert("method", "email"));
/// let outcome = client
///     .send_event(&event, "12345.67890", Some("1234567890"), None)
///     .await?;
///
/// for message in outcome.validation_messages() {
///     eprintln!("{}", message.description);
/// }
/// ```
#[derive(Clone)]
pub struct MeasurementClient {
	inner: Arc<MeasurementClientInner>,
}

impl MeasurementClient {
	/// Creates a new builder for constructing a MeasurementClient.
	pub fn builder() -> MeasurementClientBuilder {
		MeasurementClientBuilder::new()
	}

	pub fn endpoint(&self) -> Endpoint {
		self.inner.endpoint
	}

	pub fn measurement_id(&self) -> &str {
		&self.inner.measurement_id
	}

	/// Full collect URL, without authentication parameters.
	pub fn collect_url(&self) -> &str {
		&self.inner.collect_url
	}

	pub fn config(&self) -> &ClientConfig {
		&self.inner.config
	}

	/// Sends one event.
	///
	/// Invalid events return [`SendOutcome::Invalid`] without any network
	/// call. Timeouts and connection failures are retried per the client's
	/// retry policy; once exhausted the transport error is returned.
	pub async fn send_event(
		&self,
		event: &Event,
		client_id: &str,
		session_id: Option<&str>,
		user_id: Option<&str>,
	) -> Result<SendOutcome> {
		let options = SendOptions {
			session_id: session_id.map(str::to_string),
			user_id: user_id.map(str::to_string),
			..SendOptions::default()
		};
		self.send_event_with(event, client_id, &options).await
	}

	/// Sends one event with explicit request options.
	pub async fn send_event_with(
		&self,
		event: &Event,
		client_id: &str,
		options: &SendOptions,
	) -> Result<SendOutcome> {
		let errors = event.validate();
		if !errors.is_empty() {
			error!(event_name = %event.name(), errors = ?errors, "Event validation failed");
			return Ok(SendOutcome::Invalid { errors });
		}

		let payload = CollectPayload::build(client_id, std::iter::once(event), options);
		let outcome = self
			.dispatch(&payload, &self.inner.config.retry_config)
			.await?;

		if outcome.is_success() {
			info!(event_name = %event.name(), "Event sent successfully");
		}

		Ok(outcome)
	}

	/// Sends up to [`MAX_BATCH_EVENTS`] events in one request.
	///
	/// More events than that is a hard error raised before validation. If any
	/// event is invalid nothing is sent and the per-event errors are returned.
	pub async fn send_batch(
		&self,
		events: &[Event],
		client_id: &str,
		session_id: Option<&str>,
	) -> Result<SendOutcome> {
		let options = SendOptions {
			session_id: session_id.map(str::to_string),
			..SendOptions::default()
		};
		self.send_batch_with(events, client_id, &options).await
	}

	/// Sends a batch with explicit request options.
	pub async fn send_batch_with(
		&self,
		events: &[Event],
		client_id: &str,
		options: &SendOptions,
	) -> Result<SendOutcome> {
		if events.len() > MAX_BATCH_EVENTS {
			error!(
				count = events.len(),
				max = MAX_BATCH_EVENTS,
				"Batch exceeds the per-request event limit"
			);
			return Err(MeasurementError::BatchTooLarge {
				count: events.len(),
				max: MAX_BATCH_EVENTS,
			});
		}

		let errors: Vec<String> = events
			.iter()
			.enumerate()
			.filter_map(|(index, event)| {
				let event_errors = event.validate();
				(!event_errors.is_empty()).then(|| {
					format!(
						"Event {index} ({}): {}",
						event.name(),
						event_errors.join("; ")
					)
				})
			})
			.collect();

		if !errors.is_empty() {
			error!(errors = ?errors, "Batch validation failed");
			return Ok(SendOutcome::Invalid { errors });
		}

		let retry_config = if self.inner.config.retry_batches {
			self.inner.config.retry_config.clone()
		} else {
			RetryConfig::single_attempt()
		};

		let payload = CollectPayload::build(client_id, events, options);
		let outcome = self.dispatch(&payload, &retry_config).await?;

		if outcome.is_success() {
			info!(count = events.len(), "Batch sent successfully");
		}

		Ok(outcome)
	}

	async fn dispatch(&self, payload: &CollectPayload, retry_config: &RetryConfig) -> Result<SendOutcome> {
		debug!(
			url = %self.inner.collect_url,
			count = payload.events.len(),
			"Sending collect request"
		);

		let response = ga4mp_common_http::retry(retry_config, || async {
			self
				.inner
				.http_client
				.post(&self.inner.collect_url)
				.query(&[
					("measurement_id", self.inner.measurement_id.as_str()),
					("api_secret", self.inner.api_secret.expose()),
				])
				.header(CONTENT_TYPE, "application/json")
				.json(payload)
				.send()
				.await
				// The URL carries the API secret; keep it out of errors and logs.
				.map_err(reqwest::Error::without_url)
		})
		.await
		.map_err(|e| {
			error!(error = %e, "Error sending collect request");
			MeasurementError::RequestFailed(e)
		})?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.ok().filter(|body| !body.is_empty());
			error!(
				status = status.as_u16(),
				response = body.as_deref().unwrap_or("No response"),
				"HTTP error sending collect request"
			);
			return Ok(SendOutcome::Rejected {
				status: status.as_u16(),
				error: format!("HTTP {status} from collect endpoint"),
				body,
			});
		}

		if !self.inner.endpoint.is_debug() {
			return Ok(SendOutcome::Accepted { response: None });
		}

		let text = response.text().await.map_err(|e| {
			error!(error = %e, "Error reading debug response");
			MeasurementError::RequestFailed(e.without_url())
		})?;
		let body: Value = serde_json::from_str(&text).map_err(|e| {
			error!(error = %e, "Error decoding debug response");
			MeasurementError::Json(e)
		})?;

		if let Some(messages) = body
			.get(VALIDATION_MESSAGES_KEY)
			.filter(|messages| messages.as_array().is_some_and(|m| !m.is_empty()))
		{
			warn!(validation_messages = %messages, "Validation warnings");
		}

		Ok(SendOutcome::Accepted {
			response: Some(body),
		})
	}
}
