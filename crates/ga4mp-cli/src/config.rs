// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration: defaults < TOML file < environment < CLI flags.
//!
//! Every source produces a [`ConfigLayer`] of optional values. Layers are
//! merged in precedence order and then finalized into a [`RuntimeConfig`].
//!
//! ```toml
//! measurement_id = "G-XXXXXXXXX"
//! api_secret = "..."
//! debug = false
//! request_timeout_secs = 5
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//!
//! [retry]
//! max_attempts = 3
//! base_delay_ms = 1000
//! max_delay_ms = 10000
//! batches = true
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;
use ga4mp::{MeasurementClient, MeasurementClientBuilder, RetryConfig};
use ga4mp_core::{ApiSecret, Endpoint};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, trace};

use crate::env::{load_secret_with, SecretEnvError};

pub const ENV_MEASUREMENT_ID: &str = "GA4MP_MEASUREMENT_ID";
pub const ENV_API_SECRET: &str = "GA4MP_API_SECRET";
pub const ENV_DEBUG: &str = "GA4MP_DEBUG";
pub const ENV_LOG_LEVEL: &str = "GA4MP_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "GA4MP_LOG_FORMAT";
pub const ENV_RETRY_MAX_ATTEMPTS: &str = "GA4MP_RETRY_MAX_ATTEMPTS";

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to read config file {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse config file {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error(transparent)]
	SecretEnv(#[from] SecretEnvError),

	#[error("invalid value for {key}: {value:?}")]
	InvalidValue { key: String, value: String },

	#[error("measurement id is not configured (set GA4MP_MEASUREMENT_ID or --measurement-id)")]
	MissingMeasurementId,

	#[error("API secret is not configured (set GA4MP_API_SECRET, GA4MP_API_SECRET_FILE or --api-secret)")]
	MissingApiSecret,

	#[error("invalid client settings: {0}")]
	Client(#[from] ga4mp::MeasurementError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
	Error,
	Warn,
	#[default]
	Info,
	Debug,
	Trace,
}

impl LogLevel {
	pub fn as_str(&self) -> &'static str {
		match self {
			LogLevel::Error => "error",
			LogLevel::Warn => "warn",
			LogLevel::Info => "info",
			LogLevel::Debug => "debug",
			LogLevel::Trace => "trace",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	#[default]
	Pretty,
	Json,
	Compact,
}

/// Partial configuration; every field is optional so layers can be merged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
	#[serde(default)]
	pub measurement_id: Option<String>,
	#[serde(default)]
	pub api_secret: Option<ApiSecret>,
	#[serde(default)]
	pub debug: Option<bool>,
	#[serde(default)]
	pub base_url: Option<String>,
	#[serde(default)]
	pub request_timeout_secs: Option<u64>,
	#[serde(default)]
	pub logging: Option<LoggingLayer>,
	#[serde(default)]
	pub retry: Option<RetryLayer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingLayer {
	#[serde(default)]
	pub level: Option<LogLevel>,
	#[serde(default)]
	pub format: Option<LogFormat>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryLayer {
	#[serde(default)]
	pub max_attempts: Option<u32>,
	#[serde(default)]
	pub base_delay_ms: Option<u64>,
	#[serde(default)]
	pub max_delay_ms: Option<u64>,
	#[serde(default)]
	pub batches: Option<bool>,
}

impl ConfigLayer {
	/// Overwrites every value `other` sets.
	pub fn merge(&mut self, other: ConfigLayer) {
		if other.measurement_id.is_some() {
			self.measurement_id = other.measurement_id;
		}
		if other.api_secret.is_some() {
			self.api_secret = other.api_secret;
		}
		if other.debug.is_some() {
			self.debug = other.debug;
		}
		if other.base_url.is_some() {
			self.base_url = other.base_url;
		}
		if other.request_timeout_secs.is_some() {
			self.request_timeout_secs = other.request_timeout_secs;
		}
		merge_option(&mut self.logging, other.logging, LoggingLayer::merge);
		merge_option(&mut self.retry, other.retry, RetryLayer::merge);
	}

	/// Parses a TOML file. A missing file is an error only when `required`.
	pub fn from_file(path: &Path, required: bool) -> Result<Self, ConfigError> {
		if !required && !path.exists() {
			debug!(path = %path.display(), "config file not found, skipping");
			return Ok(Self::default());
		}

		debug!(path = %path.display(), "loading config file");
		let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
			path: path.to_path_buf(),
			source: e,
		})?;

		toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
			path: path.to_path_buf(),
			source: e,
		})
	}

	/// Reads `GA4MP_*` variables through `lookup`. Blank values are ignored.
	pub fn from_env_with<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let get = |key: &str| {
			lookup(key)
				.map(|value| value.trim().to_string())
				.filter(|value| !value.is_empty())
		};

		let mut layer = ConfigLayer {
			measurement_id: get(ENV_MEASUREMENT_ID),
			api_secret: load_secret_with(ENV_API_SECRET, &lookup)?
				.filter(|secret| !secret.is_empty()),
			..Self::default()
		};

		if let Some(value) = get(ENV_DEBUG) {
			layer.debug = Some(parse_bool(ENV_DEBUG, &value)?);
		}
		if let Some(value) = get(ENV_LOG_LEVEL) {
			layer.logging.get_or_insert_with(LoggingLayer::default).level =
				Some(parse_value_enum(ENV_LOG_LEVEL, &value)?);
		}
		if let Some(value) = get(ENV_LOG_FORMAT) {
			layer.logging.get_or_insert_with(LoggingLayer::default).format =
				Some(parse_value_enum(ENV_LOG_FORMAT, &value)?);
		}
		if let Some(value) = get(ENV_RETRY_MAX_ATTEMPTS) {
			let attempts = value
				.parse::<u32>()
				.map_err(|_| invalid(ENV_RETRY_MAX_ATTEMPTS, &value))?;
			layer.retry.get_or_insert_with(RetryLayer::default).max_attempts = Some(attempts);
		}

		trace!(
			measurement_id = layer.measurement_id.is_some(),
			api_secret = layer.api_secret.is_some(),
			"loaded environment layer"
		);
		Ok(layer)
	}

	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_env_with(|key| std::env::var(key).ok())
	}
}

impl LoggingLayer {
	fn merge(&mut self, other: LoggingLayer) {
		if other.level.is_some() {
			self.level = other.level;
		}
		if other.format.is_some() {
			self.format = other.format;
		}
	}
}

impl RetryLayer {
	fn merge(&mut self, other: RetryLayer) {
		if other.max_attempts.is_some() {
			self.max_attempts = other.max_attempts;
		}
		if other.base_delay_ms.is_some() {
			self.base_delay_ms = other.base_delay_ms;
		}
		if other.max_delay_ms.is_some() {
			self.max_delay_ms = other.max_delay_ms;
		}
		if other.batches.is_some() {
			self.batches = other.batches;
		}
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}

fn invalid(key: &str, value: &str) -> ConfigError {
	ConfigError::InvalidValue {
		key: key.to_string(),
		value: value.to_string(),
	}
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
	match value.to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(invalid(key, value)),
	}
}

fn parse_value_enum<T: ValueEnum>(key: &str, value: &str) -> Result<T, ConfigError> {
	T::from_str(value, true).map_err(|_| invalid(key, value))
}

/// Flags given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
	pub config_file: Option<PathBuf>,
	pub measurement_id: Option<String>,
	pub api_secret: Option<String>,
	pub debug: bool,
	pub base_url: Option<String>,
	pub log_level: Option<LogLevel>,
	pub log_format: Option<LogFormat>,
}

impl CliOverrides {
	fn into_layer(self) -> ConfigLayer {
		let logging = (self.log_level.is_some() || self.log_format.is_some()).then_some(LoggingLayer {
			level: self.log_level,
			format: self.log_format,
		});

		ConfigLayer {
			measurement_id: self.measurement_id,
			api_secret: self.api_secret.map(ApiSecret::new),
			// `--debug` can only switch the debug endpoint on.
			debug: self.debug.then_some(true),
			base_url: self.base_url,
			logging,
			..ConfigLayer::default()
		}
	}
}

/// `~/.config/ga4mp/config.toml`, when a config directory exists.
pub fn user_config_file() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join("ga4mp").join("config.toml"))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoggingConfig {
	pub level: LogLevel,
	pub format: LogFormat,
}

/// Fully merged configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
	pub measurement_id: Option<String>,
	pub api_secret: Option<ApiSecret>,
	pub endpoint: Endpoint,
	pub base_url: Option<String>,
	pub request_timeout: Duration,
	pub retry: RetryConfig,
	pub retry_batches: bool,
	pub logging: LoggingConfig,
}

impl RuntimeConfig {
	/// Applies defaults to a merged layer.
	pub fn finalize(layer: ConfigLayer) -> Self {
		let defaults = ga4mp::ClientConfig::default();
		let logging = layer.logging.unwrap_or_default();
		let retry = layer.retry.unwrap_or_default();

		let retry_config = RetryConfig {
			max_attempts: retry.max_attempts.unwrap_or(defaults.retry_config.max_attempts),
			base_delay: retry
				.base_delay_ms
				.map(Duration::from_millis)
				.unwrap_or(defaults.retry_config.base_delay),
			max_delay: retry
				.max_delay_ms
				.map(Duration::from_millis)
				.unwrap_or(defaults.retry_config.max_delay),
			..defaults.retry_config
		};

		Self {
			measurement_id: layer.measurement_id,
			api_secret: layer.api_secret,
			endpoint: Endpoint::from_debug_flag(layer.debug.unwrap_or(false)),
			base_url: layer.base_url,
			request_timeout: layer
				.request_timeout_secs
				.map(Duration::from_secs)
				.unwrap_or(defaults.request_timeout),
			retry: retry_config,
			retry_batches: retry.batches.unwrap_or(defaults.retry_batches),
			logging: LoggingConfig {
				level: logging.level.unwrap_or_default(),
				format: logging.format.unwrap_or_default(),
			},
		}
	}

	/// Builder populated from this configuration.
	pub fn client_builder(&self) -> Result<MeasurementClientBuilder, ConfigError> {
		let measurement_id = self
			.measurement_id
			.clone()
			.ok_or(ConfigError::MissingMeasurementId)?;
		let api_secret = self
			.api_secret
			.clone()
			.filter(|secret| !secret.is_empty())
			.ok_or(ConfigError::MissingApiSecret)?;

		let mut builder = MeasurementClient::builder()
			.measurement_id(measurement_id)
			.api_secret(api_secret)
			.endpoint(self.endpoint)
			.request_timeout(self.request_timeout)
			.retry_config(self.retry.clone())
			.retry_batches(self.retry_batches);
		if let Some(base_url) = &self.base_url {
			builder = builder.base_url(base_url.clone());
		}
		Ok(builder)
	}

	pub fn client(&self) -> Result<MeasurementClient, ConfigError> {
		Ok(self.client_builder()?.build()?)
	}
}

/// Loads every layer from the process environment and the file system.
pub fn load_config(overrides: CliOverrides) -> Result<RuntimeConfig, ConfigError> {
	let file_layer = match &overrides.config_file {
		Some(path) => ConfigLayer::from_file(path, true)?,
		None => match user_config_file() {
			Some(path) => ConfigLayer::from_file(&path, false)?,
			None => ConfigLayer::default(),
		},
	};

	load_layers(file_layer, ConfigLayer::from_env()?, overrides)
}

fn load_layers(
	file_layer: ConfigLayer,
	env_layer: ConfigLayer,
	overrides: CliOverrides,
) -> Result<RuntimeConfig, ConfigError> {
	let mut layer = ConfigLayer::default();
	layer.merge(file_layer);
	layer.merge(env_layer);
	layer.merge(overrides.into_layer());
	Ok(RuntimeConfig::finalize(layer))
}
