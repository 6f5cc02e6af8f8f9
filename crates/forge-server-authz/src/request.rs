// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The slice of an incoming request the authorizer looks at.

use forge_authz_core::Actor;
use std::net::IpAddr;

#[derive(Debug, Clone, Default)]
pub struct AuthzRequest {
	/// Repository identifier taken from the request path.
	pub repo_id: Option<String>,
	/// Request origin used for IP allowlist policies.
	pub client_ip: Option<IpAddr>,
	/// Actor attached by the session layer, if any.
	pub session_actor: Option<Actor>,
}

impl AuthzRequest {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder: set repo_id.
	pub fn with_repo_id(mut self, repo_id: impl Into<String>) -> Self {
		self.repo_id = Some(repo_id.into());
		self
	}

	/// Builder: set client_ip.
	pub fn with_client_ip(mut self, ip: IpAddr) -> Self {
		self.client_ip = Some(ip);
		self
	}

	/// Builder: set session_actor.
	pub fn with_actor(mut self, actor: Actor) -> Self {
		self.session_actor = Some(actor);
		self
	}

	/// Repository id with surrounding whitespace removed; blank counts as absent.
	pub fn trimmed_repo_id(&self) -> Option<&str> {
		self
			.repo_id
			.as_deref()
			.map(str::trim)
			.filter(|id| !id.is_empty())
	}
}

/// Picks the client address out of a forwarded-for style header value.
///
/// Each trusted proxy appends the address it received the request from, so
/// only the last `trusted_hops` entries are trustworthy and the client is the
/// entry `trusted_hops` places from the right. Anything the client wrote
/// further left is ignored. Returns `None` when that entry is missing or is
/// not an IP address.
pub fn parse_forwarded_for(value: &str, trusted_hops: usize) -> Option<IpAddr> {
	let index = trusted_hops.checked_sub(1)?;
	value.rsplit(',').nth(index)?.trim().parse().ok()
}
