// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Reading events from command-line arguments and JSON files.

use std::path::Path;

use anyhow::{bail, Context, Result};
use ga4mp::{Event, Params};
use serde::Deserialize;
use serde_json::Value;

/// Parses `key=value`. The value is read as JSON when it parses, so
/// `value=9.99` is a number and `currency=USD` stays a string.
pub fn parse_param(raw: &str) -> Result<(String, Value), String> {
	let (key, value) = raw
		.split_once('=')
		.ok_or_else(|| format!("expected key=value, got {raw:?}"))?;

	let key = key.trim();
	if key.is_empty() {
		return Err(format!("parameter name is empty in {raw:?}"));
	}

	let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
	Ok((key.to_string(), value))
}

pub fn event_from_args(name: &str, params: Vec<(String, Value)>) -> Event {
	let params = params
		.into_iter()
		.fold(Params::new(), |params, (key, value)| params.insert(key, value));
	Event::new(name, params)
}

/// Either a bare array of events or a collect-style body with `events`.
#[derive(Deserialize)]
#[serde(untagged)]
enum EventsDocument {
	List(Vec<Event>),
	Body { events: Vec<Event> },
}

pub fn parse_events(content: &str) -> Result<Vec<Event>> {
	let document: EventsDocument = serde_json::from_str(content)
		.context("expected a JSON array of events or an object with an \"events\" array")?;

	Ok(match document {
		EventsDocument::List(events) => events,
		EventsDocument::Body { events } => events,
	})
}

pub fn read_events(path: &Path) -> Result<Vec<Event>> {
	let content = std::fs::read_to_string(path)
		.with_context(|| format!("failed to read events file {}", path.display()))?;
	let events =
		parse_events(&content).with_context(|| format!("invalid events file {}", path.display()))?;

	if events.is_empty() {
		bail!("events file {} contains no events", path.display());
	}
	Ok(events)
}
