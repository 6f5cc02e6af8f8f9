// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `forge-authz`: evaluate repository authorization decisions offline.
//!
//! Exit status: 0 allowed, 1 denied, 2 usage or fixture error.

use anyhow::Context;
use clap::{Parser, Subcommand};
use forge_authz_core::{RepoPermission, RepoRole, UserId};
use std::net::IpAddr;
use std::path::PathBuf;
use std::process::ExitCode;

mod check;
mod fixture;

use check::{requirement_from, run_check, CheckArgs};
use fixture::Fixture;

#[derive(Parser, Debug)]
#[command(
	name = "forge-authz",
	about = "Evaluate Forge repository authorization against a fixture",
	version
)]
struct Args {
	/// Server config file (defaults to /etc/forge/server.toml)
	#[arg(long, global = true, env = "FORGE_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Decide whether a user may act on a repository
	Check {
		/// TOML fixture with actors, repositories, grants and tenants
		#[arg(long)]
		fixture: PathBuf,

		#[arg(long = "repo")]
		repo_id: String,

		#[arg(long = "user")]
		user_id: String,

		/// Request origin, checked against tenant IP allowlists
		#[arg(long)]
		ip: Option<IpAddr>,

		/// Required level: READ, TRIAGE, WRITE, MAINTAIN or ADMIN
		#[arg(long, conflicts_with = "capability")]
		level: Option<RepoRole>,

		/// Required capability, e.g. manage_webhooks
		#[arg(long)]
		capability: Option<RepoPermission>,
	},
}

const EXIT_DENIED: u8 = 1;
const EXIT_ERROR: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
	let args = Args::parse();

	match run(args).await {
		Ok(code) => code,
		Err(err) => {
			eprintln!("error: {err:#}");
			ExitCode::from(EXIT_ERROR)
		}
	}
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
	let config = match &args.config {
		Some(path) => forge_server_config::load_config_with_file(path),
		None => forge_server_config::load_config(),
	}
	.context("failed to load configuration")?;

	forge_server_config::init_tracing(&config.logging)?;
	tracing::info!(
		repo_id_param = %config.authz.repo_id_param,
		trust_forwarded_for = config.authz.trust_forwarded_for,
		trusted_proxy_hops = config.authz.trusted_proxy_hops,
		log_format = %config.logging.format,
		"server configuration loaded"
	);

	match args.command {
		Command::Check {
			fixture,
			repo_id,
			user_id,
			ip,
			level,
			capability,
		} => {
			let loaded = Fixture::load(&fixture)?;
			let check_args = CheckArgs {
				repo_id,
				user_id: UserId::new(user_id),
				client_ip: ip,
				requirement: requirement_from(level, capability),
			};

			tracing::debug!(
				fixture = %fixture.display(),
				repo_id = %check_args.repo_id,
				requirement = %check_args.requirement,
				"evaluating authorization"
			);

			let report = run_check(&loaded, &check_args).await;
			println!("{}", serde_json::to_string_pretty(&report)?);

			Ok(if report.allowed {
				ExitCode::SUCCESS
			} else {
				ExitCode::from(EXIT_DENIED)
			})
		}
	}
}
