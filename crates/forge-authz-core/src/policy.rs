// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tenant policy request and decision types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// Tenant policies enforced ahead of repository roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyType {
	IpAllowlist,
	TwoFactorRequired,
}

impl PolicyType {
	pub fn as_str(&self) -> &'static str {
		match self {
			PolicyType::IpAllowlist => "ip_allowlist",
			PolicyType::TwoFactorRequired => "two_factor_required",
		}
	}
}

impl fmt::Display for PolicyType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Facts handed to the policy gateway for a single evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyContext {
	/// Request origin; `None` when the origin could not be determined.
	Ip { ip: Option<IpAddr> },
	TwoFactor { two_factor_enabled: bool },
}

/// Allow/deny answer from the policy gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecision {
	pub allowed: bool,
	pub reason: String,
}

impl PolicyDecision {
	pub fn allow() -> Self {
		Self {
			allowed: true,
			reason: String::new(),
		}
	}

	pub fn deny(reason: impl Into<String>) -> Self {
		Self {
			allowed: false,
			reason: reason.into(),
		}
	}
}
