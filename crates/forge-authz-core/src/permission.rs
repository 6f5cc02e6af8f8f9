// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Platform permissions and fine-grained repository capabilities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platform-wide capabilities granted through a [`crate::SystemRole`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
	ManageUsers,
	ManageRepos,
	ManageTeams,
	ManagePolicies,
	ViewAuditLogs,
	EditRoles,
	ViewAdminPanel,
	ModerateContent,
}

impl Permission {
	pub fn all() -> &'static [Permission] {
		&[
			Permission::ManageUsers,
			Permission::ManageRepos,
			Permission::ManageTeams,
			Permission::ManagePolicies,
			Permission::ViewAuditLogs,
			Permission::EditRoles,
			Permission::ViewAdminPanel,
			Permission::ModerateContent,
		]
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Permission::ManageUsers => "manage_users",
			Permission::ManageRepos => "manage_repos",
			Permission::ManageTeams => "manage_teams",
			Permission::ManagePolicies => "manage_policies",
			Permission::ViewAuditLogs => "view_audit_logs",
			Permission::EditRoles => "edit_roles",
			Permission::ViewAdminPanel => "view_admin_panel",
			Permission::ModerateContent => "moderate_content",
		}
	}
}

impl fmt::Display for Permission {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Fine-grained capabilities on a single repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepoPermission {
	PullCode,
	TriageIssues,
	PushCode,
	ManageWebhooks,
	AdministerRepo,
	DeleteRepo,
}

impl RepoPermission {
	pub fn all() -> &'static [RepoPermission] {
		&[
			RepoPermission::PullCode,
			RepoPermission::TriageIssues,
			RepoPermission::PushCode,
			RepoPermission::ManageWebhooks,
			RepoPermission::AdministerRepo,
			RepoPermission::DeleteRepo,
		]
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			RepoPermission::PullCode => "pull_code",
			RepoPermission::TriageIssues => "triage_issues",
			RepoPermission::PushCode => "push_code",
			RepoPermission::ManageWebhooks => "manage_webhooks",
			RepoPermission::AdministerRepo => "administer_repo",
			RepoPermission::DeleteRepo => "delete_repo",
		}
	}
}

impl fmt::Display for RepoPermission {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Error returned when a capability name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown repository capability: {0}")]
pub struct UnknownCapability(pub String);

impl FromStr for RepoPermission {
	type Err = UnknownCapability;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		RepoPermission::all()
			.iter()
			.copied()
			.find(|p| p.as_str() == s.trim())
			.ok_or_else(|| UnknownCapability(s.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn capability_names_match_wire_format() {
		for cap in RepoPermission::all() {
			let json = serde_json::to_string(cap).unwrap();
			assert_eq!(json, format!("\"{}\"", cap.as_str()));
		}
	}

	#[test]
	fn parses_known_capability() {
		assert_eq!(
			"manage_webhooks".parse::<RepoPermission>(),
			Ok(RepoPermission::ManageWebhooks)
		);
	}

	#[test]
	fn rejects_unknown_capability() {
		assert_eq!(
			"force_push".parse::<RepoPermission>(),
			Err(UnknownCapability("force_push".to_string()))
		);
	}
}
