// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! ga4mp - send GA4 Measurement Protocol events from the command line.
//!
//! Command output goes to stdout; logs go to stderr. The exit code is
//! non-zero when an event is invalid or the endpoint rejects it.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ga4mp::{
	extract_client_id, generate_client_id, MeasurementClient, SendOptions, SendOutcome,
	MAX_BATCH_EVENTS,
};

mod config;
mod env;
mod events;

use config::{load_config, CliOverrides, LogFormat, LogLevel, LoggingConfig};

/// ga4mp - GA4 Measurement Protocol sender
#[derive(Parser, Debug)]
#[command(name = "ga4mp", version, about, long_about = None)]
struct Args {
	/// Path to a TOML configuration file
	#[arg(short, long, global = true)]
	config: Option<PathBuf>,

	/// GA4 measurement id (overrides config and GA4MP_MEASUREMENT_ID)
	#[arg(long, global = true)]
	measurement_id: Option<String>,

	/// Measurement Protocol API secret (prefer GA4MP_API_SECRET or GA4MP_API_SECRET_FILE)
	#[arg(long, global = true)]
	api_secret: Option<String>,

	/// Send to the validation endpoint instead of production
	#[arg(long, global = true)]
	debug: bool,

	/// Override the endpoint host, e.g. a local proxy
	#[arg(long, global = true)]
	base_url: Option<String>,

	/// Log level (overrides config)
	#[arg(short, long, global = true, value_enum)]
	log_level: Option<LogLevel>,

	/// Log output format (overrides config)
	#[arg(long, global = true, value_enum)]
	log_format: Option<LogFormat>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Send a single event
	Send {
		/// Event name
		#[arg(short, long)]
		name: String,

		/// Event parameter as key=value; values are parsed as JSON when possible
		#[arg(short, long = "param", value_parser = events::parse_param)]
		params: Vec<(String, Value)>,

		#[command(flatten)]
		target: TargetArgs,

		/// Signed-in user id
		#[arg(long)]
		user_id: Option<String>,
	},

	/// Send up to 25 events from a JSON file in one request
	Batch {
		/// JSON file: an array of events or an object with an "events" array
		file: PathBuf,

		#[command(flatten)]
		target: TargetArgs,

		/// Signed-in user id
		#[arg(long)]
		user_id: Option<String>,
	},

	/// Validate events from a JSON file without sending them
	Validate {
		/// JSON file: an array of events or an object with an "events" array
		file: PathBuf,
	},

	/// Extract a client id from a _ga cookie, or generate a new one
	ClientId {
		/// Value of the _ga cookie, e.g. GA1.2.12345.67890
		#[arg(long)]
		cookie: Option<String>,
	},
}

#[derive(clap::Args, Debug)]
struct TargetArgs {
	/// Client id; taken from --cookie or generated when omitted
	#[arg(long)]
	client_id: Option<String>,

	/// Value of the _ga cookie to derive the client id from
	#[arg(long, conflicts_with = "client_id")]
	cookie: Option<String>,

	/// Session id attached to every event
	#[arg(long)]
	session_id: Option<String>,

	/// Event time in microseconds since the epoch
	#[arg(long)]
	timestamp_micros: Option<i64>,

	/// Mark the events as non-personalized for ads
	#[arg(long)]
	non_personalized_ads: bool,
}

impl TargetArgs {
	fn client_id(&self) -> Result<String> {
		if let Some(client_id) = &self.client_id {
			return Ok(client_id.clone());
		}
		if let Some(cookie) = &self.cookie {
			return extract_client_id(cookie)
				.with_context(|| format!("no client id in cookie {cookie:?}"));
		}

		let client_id = generate_client_id();
		info!(client_id = %client_id, "generated client id");
		Ok(client_id)
	}

	fn options(&self, user_id: Option<String>) -> SendOptions {
		let mut options = SendOptions::new();
		if let Some(session_id) = &self.session_id {
			options = options.session_id(session_id.clone());
		}
		if let Some(user_id) = user_id {
			options = options.user_id(user_id);
		}
		options.timestamp_micros = self.timestamp_micros;
		if self.non_personalized_ads {
			options = options.non_personalized_ads(true);
		}
		options
	}
}

impl From<&Args> for CliOverrides {
	fn from(args: &Args) -> Self {
		CliOverrides {
			config_file: args.config.clone(),
			measurement_id: args.measurement_id.clone(),
			api_secret: args.api_secret.clone(),
			debug: args.debug,
			base_url: args.base_url.clone(),
			log_level: args.log_level,
			log_format: args.log_format,
		}
	}
}

fn init_tracing(logging: &LoggingConfig) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		let level = logging.level.as_str();
		EnvFilter::new(format!(
			"ga4mp={level},ga4mp_cli={level},ga4mp_common_http={level}"
		))
	});

	match logging.format {
		LogFormat::Json => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().json().with_writer(std::io::stderr))
				.init();
		}
		LogFormat::Compact => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().compact().with_writer(std::io::stderr))
				.init();
		}
		LogFormat::Pretty => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().with_writer(std::io::stderr))
				.init();
		}
	}
}

/// Prints the outcome; true when the endpoint accepted it.
fn report(outcome: &SendOutcome) -> Result<bool> {
	match outcome {
		SendOutcome::Accepted { response } => {
			match response {
				Some(body) => println!("{}", serde_json::to_string_pretty(body)?),
				None => println!("accepted"),
			}
			for message in outcome.validation_messages() {
				eprintln!(
					"warning: {}{}",
					message
						.field_path
						.as_deref()
						.map(|path| format!("{path}: "))
						.unwrap_or_default(),
					message.description
				);
			}
			Ok(true)
		}
		SendOutcome::Invalid { errors } => {
			for error in errors {
				eprintln!("invalid: {error}");
			}
			Ok(false)
		}
		SendOutcome::Rejected { error, body, .. } => {
			eprintln!("rejected: {error}");
			if let Some(body) = body {
				eprintln!("{body}");
			}
			Ok(false)
		}
	}
}

async fn run_send(
	client: &MeasurementClient,
	name: &str,
	params: Vec<(String, Value)>,
	target: &TargetArgs,
	user_id: Option<String>,
) -> Result<bool> {
	let event = events::event_from_args(name, params);
	let client_id = target.client_id()?;

	let outcome = client
		.send_event_with(&event, &client_id, &target.options(user_id))
		.await
		.context("failed to send event")?;
	report(&outcome)
}

async fn run_batch(
	client: &MeasurementClient,
	file: &Path,
	target: &TargetArgs,
	user_id: Option<String>,
) -> Result<bool> {
	let events = events::read_events(file)?;
	let client_id = target.client_id()?;

	let outcome = client
		.send_batch_with(&events, &client_id, &target.options(user_id))
		.await
		.context("failed to send batch")?;
	report(&outcome)
}

fn run_validate(file: &Path) -> Result<bool> {
	let events = events::read_events(file)?;
	let mut valid = true;

	if events.len() > MAX_BATCH_EVENTS {
		eprintln!(
			"too many events for one request: {} (max {MAX_BATCH_EVENTS})",
			events.len()
		);
		valid = false;
	}

	for (index, event) in events.iter().enumerate() {
		let errors = event.validate();
		if errors.is_empty() {
			debug!(index, event_name = %event.name(), "event is valid");
			continue;
		}
		valid = false;
		eprintln!("Event {index} ({}): {}", event.name(), errors.join("; "));
	}

	if valid {
		println!("{} event(s) valid", events.len());
	}
	Ok(valid)
}

fn run_client_id(cookie: Option<&str>) -> Result<bool> {
	let client_id = match cookie {
		Some(cookie) => match extract_client_id(cookie) {
			Some(client_id) => client_id,
			None => bail!("no client id in cookie {cookie:?}"),
		},
		None => generate_client_id(),
	};
	println!("{client_id}");
	Ok(true)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
	let args = Args::parse();

	let config = load_config(CliOverrides::from(&args)).context("failed to load configuration")?;
	init_tracing(&config.logging);

	debug!(endpoint = %config.endpoint, "configuration loaded");

	let succeeded = match &args.command {
		Command::Validate { file } => run_validate(file),
		Command::ClientId { cookie } => run_client_id(cookie.as_deref()),
		Command::Send {
			name,
			params,
			target,
			user_id,
		} => {
			let client = config.client().context("failed to create client")?;
			run_send(&client, name, params.clone(), target, user_id.clone()).await
		}
		Command::Batch {
			file,
			target,
			user_id,
		} => {
			let client = config.client().context("failed to create client")?;
			run_batch(&client, file, target, user_id.clone()).await
		}
	}?;

	Ok(if succeeded {
		ExitCode::SUCCESS
	} else {
		ExitCode::FAILURE
	})
}
