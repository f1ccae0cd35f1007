// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Loading the API secret from environment variables.
//!
//! Supports the `VAR` / `VAR_FILE` convention used by Docker and Kubernetes
//! secrets: when `VAR_FILE` is set the secret is read from that path, with a
//! single trailing newline stripped.

use std::fs;
use std::path::PathBuf;

use ga4mp_core::ApiSecret;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecretEnvError {
	#[error("failed to read secret file at {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("secret file path in {var} is empty")]
	EmptyPath { var: String },
}

/// Loads `var` through an arbitrary lookup. `{var}_FILE` wins over `{var}`.
pub fn load_secret_with<F>(var: &str, lookup: F) -> Result<Option<ApiSecret>, SecretEnvError>
where
	F: Fn(&str) -> Option<String>,
{
	let file_var = format!("{var}_FILE");

	if let Some(path_str) = lookup(&file_var) {
		if path_str.is_empty() {
			return Err(SecretEnvError::EmptyPath { var: file_var });
		}

		let path = PathBuf::from(&path_str);
		let content = fs::read_to_string(&path).map_err(|e| SecretEnvError::Io {
			path: path.clone(),
			source: e,
		})?;

		let secret = content.strip_suffix('\n').unwrap_or(&content);
		return Ok(Some(ApiSecret::new(secret)));
	}

	Ok(lookup(var).map(ApiSecret::new))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;
	use std::io::Write;
	use tempfile::NamedTempFile;

	fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let vars: HashMap<String, String> = vars
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		move |key| vars.get(key).cloned()
	}

	#[test]
	fn returns_none_when_not_set() {
		let result = load_secret_with("GA4MP_API_SECRET", lookup(&[])).unwrap();
		assert!(result.is_none());
	}

	#[test]
	fn reads_direct_value() {
		let result =
			load_secret_with("GA4MP_API_SECRET", lookup(&[("GA4MP_API_SECRET", "direct")])).unwrap();
		assert_eq!(result.unwrap().expose(), "direct");
	}

	#[test]
	fn file_var_takes_precedence_and_strips_one_newline() {
		let mut file = NamedTempFile::new().unwrap();
		write!(file, "from-file\n\n").unwrap();
		let path = file.path().to_str().unwrap().to_string();

		let result = load_secret_with(
			"GA4MP_API_SECRET",
			lookup(&[
				("GA4MP_API_SECRET", "direct"),
				("GA4MP_API_SECRET_FILE", path.as_str()),
			]),
		)
		.unwrap();

		assert_eq!(result.unwrap().expose(), "from-file\n");
	}

	#[test]
	fn empty_file_path_is_an_error() {
		let result = load_secret_with("GA4MP_API_SECRET", lookup(&[("GA4MP_API_SECRET_FILE", "")]));
		assert!(matches!(result, Err(SecretEnvError::EmptyPath { var }) if var == "GA4MP_API_SECRET_FILE"));
	}

	#[test]
	fn missing_file_is_an_io_error() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("absent");

		let result = load_secret_with(
			"GA4MP_API_SECRET",
			lookup(&[("GA4MP_API_SECRET_FILE", path.to_str().unwrap())]),
		);
		assert!(matches!(result, Err(SecretEnvError::Io { .. })));
	}
}
