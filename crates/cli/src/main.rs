//! Folio page session driver.
//!
//! Reads commands from stdin, one per line, and prints every fragment write
//! the router performs as `push <fragment>` or `replace <fragment>`.

mod command;
mod session;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use folio_router::RouterConfig;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::command::Command;
use crate::session::Session;

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "Simulates a Folio browse page synchronizing its state with the URL fragment")]
struct Args {
	/// Router configuration (TOML)
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Override the configured debounce window
	#[arg(long, value_name = "MS")]
	debounce_ms: Option<u64>,

	/// Fragment the page is opened on
	#[arg(value_name = "FRAGMENT", default_value = "")]
	fragment: String,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	setup_tracing(args.verbose);

	let mut config = match &args.config {
		Some(path) => RouterConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
		None => RouterConfig::default(),
	};
	if let Some(debounce_ms) = args.debounce_ms {
		config.debounce_ms = debounce_ms;
	}
	info!(?config, "starting folio session");

	let mut session = Session::open(&config, &args.fragment);
	let mut lines = BufReader::new(tokio::io::stdin()).lines();

	loop {
		let deadline = session.next_deadline();
		tokio::select! {
			line = lines.next_line() => {
				let Some(line) = line.context("reading stdin")? else {
					break;
				};
				if line.trim().is_empty() {
					continue;
				}
				match line.parse::<Command>() {
					Ok(command) => {
						for output in session.execute(command) {
							println!("{output}");
						}
					}
					Err(error) => warn!(%error, "ignored input"),
				}
			}
			() = sleep_until(deadline) => {
				if let Some(write) = session.flush_due(Instant::now()) {
					println!("{} {}", write.mode, write.fragment);
				}
			}
		}
	}

	// Input closed: persist whatever is still pending.
	if let Some(deadline) = session.next_deadline()
		&& let Some(write) = session.flush_due(deadline.max(Instant::now()))
	{
		println!("{} {}", write.mode, write.fragment);
	}
	info!("stdin closed, exiting");
	Ok(())
}

async fn sleep_until(deadline: Option<Instant>) {
	match deadline {
		Some(deadline) => tokio::time::sleep_until(deadline).await,
		None => std::future::pending().await,
	}
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_env("FOLIO_LOG")
		.or_else(|_| EnvFilter::try_from_default_env())
		.unwrap_or_else(|_| {
			if verbose {
				EnvFilter::new("folio=debug,folio_router=debug,folio_bus=trace,info")
			} else {
				EnvFilter::new("warn")
			}
		});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(true)
		.init();
}
