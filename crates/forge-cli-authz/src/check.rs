// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! One authorization decision evaluated against a fixture.

use forge_authz_core::{RepoPermission, RepoRole, UserId};
use forge_server_authz::{AuthzRequest, RepoRequirement};
use serde::Serialize;
use std::net::IpAddr;

use crate::fixture::Fixture;

#[derive(Debug, Clone)]
pub struct CheckArgs {
	pub repo_id: String,
	pub user_id: UserId,
	pub client_ip: Option<IpAddr>,
	pub requirement: RepoRequirement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
	pub allowed: bool,
	pub status: u16,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub effective_role: Option<RepoRole>,
}

/// Users absent from the fixture are treated as unauthenticated.
pub async fn run_check(fixture: &Fixture, args: &CheckArgs) -> CheckReport {
	let authorizer = fixture.authorizer().await;

	let mut request = AuthzRequest::new().with_repo_id(args.repo_id.clone());
	request.client_ip = args.client_ip;
	request.session_actor = fixture.actor(&args.user_id).cloned();

	let outcome = match args.requirement {
		RepoRequirement::Level(role) => authorizer.authorize(&request, role).await,
		RepoRequirement::Capability(capability) => {
			authorizer.authorize_capability(&request, capability).await
		}
	};

	match outcome {
		Ok(access) => CheckReport {
			allowed: true,
			status: 200,
			error: None,
			message: None,
			effective_role: access.effective_role,
		},
		Err(err) => CheckReport {
			allowed: false,
			status: err.status().as_u16(),
			error: Some(err.kind().to_string()),
			message: Some(err.message()),
			effective_role: None,
		},
	}
}

/// `--level` and `--capability` are mutually exclusive; neither means READ.
pub fn requirement_from(
	level: Option<RepoRole>,
	capability: Option<RepoPermission>,
) -> RepoRequirement {
	match (level, capability) {
		(_, Some(capability)) => RepoRequirement::Capability(capability),
		(Some(level), None) => RepoRequirement::Level(level),
		(None, None) => RepoRequirement::Level(RepoRole::Read),
	}
}
