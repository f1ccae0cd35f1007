// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Events and their structural validation.
//!
//! Validation is purely structural: it checks that required names and keys
//! are present and that `items` is a non-empty array. It never inspects value
//! types beyond that.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::params::Params;

/// Maximum allowed length for event names, in characters.
pub const MAX_EVENT_NAME_LENGTH: usize = 40;

/// The ecommerce event with extra required parameters.
pub const PURCHASE_EVENT: &str = "purchase";

/// Parameters every `purchase` event must carry, besides `items`.
pub const PURCHASE_REQUIRED_PARAMS: [&str; 3] = ["transaction_id", "value", "currency"];

/// Fields every item record of a `purchase` event must carry.
pub const ITEM_REQUIRED_FIELDS: [&str; 4] = ["item_id", "item_name", "price", "quantity"];

/// A named analytics event.
///
/// Events are immutable once built; sending one never alters it.
///
/// # Example
///
/// ```
/// use ga4mp_core::{Event, Params};
///
/// let event = Event::new("sign_up", Params::new().insert("method", "email"));
/// assert!(event.validate().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
	name: String,
	#[serde(default)]
	params: Params,
}

impl Event {
	pub fn new(name: impl Into<String>, params: Params) -> Self {
		Self {
			name: name.into(),
			params,
		}
	}

	/// Creates an event without parameters.
	pub fn named(name: impl Into<String>) -> Self {
		Self::new(name, Params::new())
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn params(&self) -> &Params {
		&self.params
	}

	/// Returns every structural problem with this event; empty when valid.
	pub fn validate(&self) -> Vec<String> {
		validate_event(&self.name, &self.params)
	}

	pub fn is_valid(&self) -> bool {
		self.validate().is_empty()
	}
}

/// Validates an event name and its parameters.
///
/// All rules run; errors are collected rather than short-circuited.
pub fn validate_event(name: &str, params: &Params) -> Vec<String> {
	let mut errors = Vec::new();

	if name.is_empty() {
		errors.push("Event name is required".to_string());
	}

	let length = name.chars().count();
	if length > MAX_EVENT_NAME_LENGTH {
		errors.push(format!(
			"Event name too long: {length} chars (max {MAX_EVENT_NAME_LENGTH})"
		));
	}

	if name == PURCHASE_EVENT {
		validate_purchase(params, &mut errors);
	}

	errors
}

fn validate_purchase(params: &Params, errors: &mut Vec<String>) {
	for param in PURCHASE_REQUIRED_PARAMS {
		if !params.contains_key(param) {
			errors.push(format!("Purchase event missing required param: {param}"));
		}
	}

	match params.get("items") {
		None => errors.push("Purchase event missing items array".to_string()),
		Some(Value::Array(items)) => {
			if items.is_empty() {
				errors.push("Items array cannot be empty".to_string());
			}

			for (index, item) in items.iter().enumerate() {
				for field in ITEM_REQUIRED_FIELDS {
					let present = item
						.as_object()
						.is_some_and(|record| record.contains_key(field));
					if !present {
						errors.push(format!("Item {index} missing required field: {field}"));
					}
				}
			}
		}
		Some(_) => errors.push("Items must be array".to_string()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::params::Item;
	use proptest::prelude::*;
	use serde_json::json;

	fn valid_purchase() -> Params {
		Params::new()
			.insert("transaction_id", "T_12345")
			.insert("value", 99.99)
			.insert("currency", "USD")
			.with_items([Item::new("SKU123", "Product Name", 99.99, 1)])
	}

	#[test]
	fn empty_name_is_required() {
		let errors = Event::named("").validate();
		assert_eq!(errors, vec!["Event name is required".to_string()]);
	}

	#[test]
	fn forty_character_name_is_accepted() {
		let name = "a".repeat(MAX_EVENT_NAME_LENGTH);
		assert!(Event::named(name).is_valid());
	}

	#[test]
	fn long_name_reports_length() {
		let errors = Event::named("a".repeat(41)).validate();
		assert_eq!(errors, vec!["Event name too long: 41 chars (max 40)".to_string()]);
	}

	#[test]
	fn name_length_counts_characters() {
		let name = "é".repeat(40);
		assert!(name.len() > MAX_EVENT_NAME_LENGTH);
		assert!(Event::named(name).is_valid());
	}

	#[test]
	fn valid_purchase_passes() {
		assert!(Event::new("purchase", valid_purchase()).validate().is_empty());
	}

	#[test]
	fn purchase_reports_each_missing_param() {
		let params = Params::new().with_items([Item::new("SKU1", "Widget", 1.0, 1)]);
		let errors = Event::new("purchase", params).validate();

		assert_eq!(
			errors,
			vec![
				"Purchase event missing required param: transaction_id".to_string(),
				"Purchase event missing required param: value".to_string(),
				"Purchase event missing required param: currency".to_string(),
			]
		);
	}

	#[test]
	fn purchase_without_items() {
		let params = Params::new()
			.insert("transaction_id", "T1")
			.insert("value", 1)
			.insert("currency", "USD");
		let errors = Event::new("purchase", params).validate();
		assert_eq!(errors, vec!["Purchase event missing items array".to_string()]);
	}

	#[test]
	fn purchase_with_empty_items() {
		let params = valid_purchase().insert("items", json!([]));
		let errors = Event::new("purchase", params).validate();
		assert_eq!(errors, vec!["Items array cannot be empty".to_string()]);
	}

	#[test]
	fn purchase_with_non_array_items() {
		let params = valid_purchase().insert("items", json!({"item_id": "SKU1"}));
		let errors = Event::new("purchase", params).validate();
		assert_eq!(errors, vec!["Items must be array".to_string()]);
	}

	#[test]
	fn purchase_reports_item_fields_by_index() {
		let params = valid_purchase().insert(
			"items",
			json!([
				{"item_id": "SKU1", "item_name": "Widget", "price": 1.0, "quantity": 1},
				{"item_id": "SKU2", "price": 2.0},
			]),
		);
		let errors = Event::new("purchase", params).validate();

		assert_eq!(
			errors,
			vec![
				"Item 1 missing required field: item_name".to_string(),
				"Item 1 missing required field: quantity".to_string(),
			]
		);
	}

	#[test]
	fn non_object_item_misses_every_field() {
		let params = valid_purchase().insert("items", json!(["SKU1"]));
		let errors = Event::new("purchase", params).validate();
		assert_eq!(errors.len(), ITEM_REQUIRED_FIELDS.len());
		assert!(errors.iter().all(|e| e.starts_with("Item 0 missing")));
	}

	#[test]
	fn errors_are_collected_not_short_circuited() {
		// Not "purchase", so only the name rules apply.
		let errors = Event::named("x".repeat(50)).validate();
		assert_eq!(errors.len(), 1);

		let params = Params::new().insert("items", "nope");
		let errors = Event::new("purchase", params).validate();
		assert_eq!(errors.len(), 4);
	}

	#[test]
	fn validation_does_not_check_value_types() {
		let params = Params::new()
			.insert("transaction_id", 42)
			.insert("value", "not a number")
			.insert("currency", json!(null))
			.insert("items", json!([{"item_id": 1, "item_name": 2, "price": "x", "quantity": "y"}]));
		assert!(Event::new("purchase", params).is_valid());
	}

	#[test]
	fn deserializes_without_params() {
		let event: Event = serde_json::from_value(json!({"name": "page_view"})).unwrap();
		assert_eq!(event.name(), "page_view");
		assert!(event.params().is_empty());
	}

	proptest! {
		#[test]
		fn non_purchase_events_with_valid_names_pass(
			name in "[a-z_]{1,40}",
			key in "[a-z_]{1,20}",
			value in any::<i64>(),
		) {
			prop_assume!(name != PURCHASE_EVENT);
			let event = Event::new(name, Params::new().insert(key, value));
			prop_assert!(event.validate().is_empty());
		}

		#[test]
		fn long_names_report_exact_length(len in 41usize..200) {
			let errors = Event::named("e".repeat(len)).validate();
			prop_assert_eq!(errors.len(), 1);
			let expected = format!("{len} chars");
			prop_assert!(errors[0].contains(&expected));
		}
	}
}
