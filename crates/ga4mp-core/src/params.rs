// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Builders for event parameters and ecommerce item records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Event parameters, keyed by parameter name.
///
/// # Example
///
/// ```
/// use ga4mp_core::{Item, Params};
///
/// let params = Params::new()
///     .insert("transaction_id", "T_12345")
///     .insert("value", 99.99)
///     .insert("currency", "USD")
///     .with_items([Item::new("SKU123", "Product Name", 99.99, 1)]);
///
/// assert_eq!(params.len(), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params {
	inner: Map<String, Value>,
}

impl Params {
	/// Creates a new empty Params builder.
	pub fn new() -> Self {
		Self { inner: Map::new() }
	}

	/// Inserts a key-value pair.
	///
	/// The value can be anything that converts into a `serde_json::Value`:
	/// strings, numbers, booleans, arrays, and nested objects.
	pub fn insert<K, V>(mut self, key: K, value: V) -> Self
	where
		K: Into<String>,
		V: Into<Value>,
	{
		self.inner.insert(key.into(), value.into());
		self
	}

	/// Sets the `items` array from item records.
	pub fn with_items<I>(self, items: I) -> Self
	where
		I: IntoIterator<Item = Item>,
	{
		let items: Vec<Value> = items.into_iter().map(Item::into_value).collect();
		self.insert("items", items)
	}

	/// Merges another Params into this one. Keys in `other` win.
	pub fn merge(mut self, other: Params) -> Self {
		for (k, v) in other.inner {
			self.inner.insert(k, v);
		}
		self
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	pub fn len(&self) -> usize {
		self.inner.len()
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.inner.get(key)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.inner.contains_key(key)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
		self.inner.iter()
	}

	/// Borrows the underlying JSON map.
	pub fn as_map(&self) -> &Map<String, Value> {
		&self.inner
	}

	/// Builds params from a JSON value. Only objects are accepted.
	pub fn from_value(value: Value) -> Option<Self> {
		match value {
			Value::Object(inner) => Some(Self { inner }),
			_ => None,
		}
	}

	pub fn into_value(self) -> Value {
		Value::Object(self.inner)
	}
}

impl From<Map<String, Value>> for Params {
	fn from(inner: Map<String, Value>) -> Self {
		Self { inner }
	}
}

impl From<Params> for Value {
	fn from(params: Params) -> Self {
		params.into_value()
	}
}

/// A single ecommerce item record.
///
/// The constructor takes the four fields every `purchase` item must carry;
/// optional fields such as `item_category` are added with [`Item::insert`].
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
	inner: Map<String, Value>,
}

impl Item {
	pub fn new(
		item_id: impl Into<String>,
		item_name: impl Into<String>,
		price: f64,
		quantity: u32,
	) -> Self {
		let mut inner = Map::new();
		inner.insert("item_id".to_string(), Value::String(item_id.into()));
		inner.insert("item_name".to_string(), Value::String(item_name.into()));
		inner.insert("price".to_string(), Value::from(price));
		inner.insert("quantity".to_string(), Value::from(quantity));
		Self { inner }
	}

	pub fn insert<K, V>(mut self, key: K, value: V) -> Self
	where
		K: Into<String>,
		V: Into<Value>,
	{
		self.inner.insert(key.into(), value.into());
		self
	}

	pub fn into_value(self) -> Value {
		Value::Object(self.inner)
	}
}

impl From<Item> for Value {
	fn from(item: Item) -> Self {
		item.into_value()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn insert_accepts_mixed_value_types() {
		let params = Params::new()
			.insert("page", "/cart")
			.insert("value", 12.5)
			.insert("quantity", 3)
			.insert("logged_in", true);

		assert_eq!(params.len(), 4);
		assert_eq!(params.get("page"), Some(&json!("/cart")));
		assert_eq!(params.get("logged_in"), Some(&json!(true)));
	}

	#[test]
	fn later_insert_overwrites() {
		let params = Params::new().insert("currency", "USD").insert("currency", "EUR");
		assert_eq!(params.get("currency"), Some(&json!("EUR")));
	}

	#[test]
	fn merge_prefers_other() {
		let base = Params::new().insert("a", 1).insert("b", 2);
		let merged = base.merge(Params::new().insert("b", 3).insert("c", 4));

		assert_eq!(merged.len(), 3);
		assert_eq!(merged.get("b"), Some(&json!(3)));
	}

	#[test]
	fn with_items_builds_item_array() {
		let params = Params::new().with_items([
			Item::new("SKU1", "Widget", 9.99, 2).insert("item_category", "tools"),
			Item::new("SKU2", "Gadget", 5.0, 1),
		]);

		let items = params.get("items").and_then(Value::as_array).unwrap();
		assert_eq!(items.len(), 2);
		assert_eq!(items[0]["item_id"], json!("SKU1"));
		assert_eq!(items[0]["quantity"], json!(2));
		assert_eq!(items[0]["item_category"], json!("tools"));
	}

	#[test]
	fn from_value_rejects_non_objects() {
		assert!(Params::from_value(json!([1, 2])).is_none());
		assert!(Params::from_value(json!("x")).is_none());
		let params = Params::from_value(json!({"k": "v"})).unwrap();
		assert!(params.contains_key("k"));
	}

	#[test]
	fn serializes_as_plain_object() {
		let params = Params::new().insert("k", "v");
		assert_eq!(serde_json::to_value(&params).unwrap(), json!({"k": "v"}));
	}
}
