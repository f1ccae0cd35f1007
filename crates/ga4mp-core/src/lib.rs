// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the GA4 Measurement Protocol client.
//!
//! This crate holds everything that does not touch the network: events and
//! their validation rules, the collect request body, endpoint selection,
//! `_ga` cookie helpers, debug-endpoint feedback, and the redacting API
//! secret type. The async client lives in the `ga4mp` crate.
//!
//! # Example
//!
//! ```
//! use ga4mp_core::{CollectPayload, Event, Item, Params};
//!
//! let event = Event::new(
//!     "purchase",
//!     Params::new()
//!         .insert("transaction_id", "T_12345")
//!         .insert("value", 99.99)
//!         .insert("currency", "USD")
//!         .with_items([Item::new("SKU123", "Product Name", 99.99, 1)]),
//! );
//! assert!(event.validate().is_empty());
//!
//! let payload = CollectPayload::single(&event, "12345.67890", Some("1234567890"), None);
//! assert_eq!(payload.events[0].params["engagement_time_msec"], 100);
//! ```

pub mod cookie;
pub mod debug;
pub mod endpoint;
pub mod event;
pub mod params;
pub mod payload;
pub mod secret;

pub use cookie::{extract_client_id, generate_client_id, GA_COOKIE_NAME};
pub use debug::{validation_messages, ValidationMessage, VALIDATION_MESSAGES_KEY};
pub use endpoint::{collect_url, Endpoint, COLLECT_PATH, DEBUG_BASE_URL, PRODUCTION_BASE_URL};
pub use event::{
	validate_event, Event, ITEM_REQUIRED_FIELDS, MAX_EVENT_NAME_LENGTH, PURCHASE_EVENT,
	PURCHASE_REQUIRED_PARAMS,
};
pub use params::{Item, Params};
pub use payload::{CollectPayload, PayloadEvent, SendOptions, ENGAGEMENT_TIME_MSEC, MAX_BATCH_EVENTS};
pub use secret::{ApiSecret, REDACTED};
