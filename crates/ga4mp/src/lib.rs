// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Async client for the GA4 Measurement Protocol.
//!
//! Events are validated locally, serialized into the `/mp/collect` body and
//! POSTed with the measurement id and API secret as query parameters.
//!
//! # Quick Start
//!
//! ```ignore
//! use ga4mp::{extract_client_id, Event, Item, MeasurementClient, Params, SendOutcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MeasurementClient::builder()
//!         .measurement_id("G-XXXXXXXXX")
//!         .api_secret("your_api_secret")
//!         .build()?;
//!
//!     let client_id = extract_client_id("GA1.2.12345.67890").unwrap_or_default();
//!
//!     let purchase = Event::new("purchase", Params::new()
//!         .insert("transaction_id", "T_12345")
//!         .insert("value", 99.99)
//!         .insert("currency", "USD")
//!         .with_items([Item::new("SKU123", "Product Name", 99.99, 1)]));
//!
//!     match client.send_event(&purchase, &client_id, Some("1234567890"), None).await? {
//!         SendOutcome::Accepted { .. } => println!("sent"),
//!         SendOutcome::Invalid { errors } => eprintln!("invalid: {errors:?}"),
//!         SendOutcome::Rejected { status, .. } => eprintln!("rejected with {status}"),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Outcomes and errors
//!
//! Every send that reaches a verdict returns a [`SendOutcome`]: accepted,
//! invalid (nothing sent) or rejected by the endpoint. Failures the caller
//! must handle are returned as [`MeasurementError`]:
//!
//! - more than 25 events in a batch
//! - timeouts or connection failures still failing after the retry policy
//! - undecodable debug responses
//!
//! # Retries
//!
//! Only timeouts and connection failures are retried, with exponential
//! backoff (1s, 2s, ... capped at 10s, 3 attempts by default). HTTP error
//! statuses are never retried. Batches follow the same policy unless
//! [`MeasurementClientBuilder::retry_batches`] turns it off.
//!
//! # Debug endpoint
//!
//! With `.debug(true)` events go to the validation endpoint, which records
//! nothing and answers with `validationMessages`. Those are logged as
//! warnings and returned in [`SendOutcome::Accepted`]'s `response`.
//!
//! # Logging
//!
//! The client only emits `tracing` events. Install a subscriber to see them;
//! the API secret is never part of a log line.

mod client;
mod error;
mod outcome;

pub use client::{ClientConfig, MeasurementClient, MeasurementClientBuilder};
pub use error::{MeasurementError, Result};
pub use outcome::SendOutcome;

pub use ga4mp_common_http::RetryConfig;
pub use ga4mp_core::{
	extract_client_id, generate_client_id, ApiSecret, Endpoint, Event, Item, Params, SendOptions,
	ValidationMessage, MAX_BATCH_EVENTS, MAX_EVENT_NAME_LENGTH,
};
