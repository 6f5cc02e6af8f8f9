// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Platform and repository roles.
//!
//! [`SystemRole`] is a key into the platform permission matrix and is never
//! compared numerically. [`RepoRole`] is linearly ordered and drives the
//! "at least as privileged as" check in the authorization pipeline.
//!
//! Both parse from strings through [`std::str::FromStr`] and reject unknown
//! names with [`RoleParseError`]; there is no conversion between the two.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a role name does not match any known role.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoleParseError {
	#[error("unknown system role: {0}")]
	UnknownSystemRole(String),

	#[error("unknown repository role: {0}")]
	UnknownRepoRole(String),
}

// =============================================================================
// System Roles
// =============================================================================

/// Platform-wide roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemRole {
	SuperAdmin,
	OrgAdmin,
	TeamAdmin,
	Moderator,
	Developer,
	Viewer,
}

impl SystemRole {
	/// Returns all system roles, most privileged first.
	pub fn all() -> &'static [SystemRole] {
		&[
			SystemRole::SuperAdmin,
			SystemRole::OrgAdmin,
			SystemRole::TeamAdmin,
			SystemRole::Moderator,
			SystemRole::Developer,
			SystemRole::Viewer,
		]
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			SystemRole::SuperAdmin => "super_admin",
			SystemRole::OrgAdmin => "org_admin",
			SystemRole::TeamAdmin => "team_admin",
			SystemRole::Moderator => "moderator",
			SystemRole::Developer => "developer",
			SystemRole::Viewer => "viewer",
		}
	}
}

impl fmt::Display for SystemRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for SystemRole {
	type Err = RoleParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		SystemRole::all()
			.iter()
			.copied()
			.find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
			.ok_or_else(|| RoleParseError::UnknownSystemRole(s.to_string()))
	}
}

// =============================================================================
// Repository Roles
// =============================================================================

/// Repository-scoped roles, ordered from least to most privileged.
///
/// The derived `Ord` follows declaration order: `Read < Triage < Write <
/// Maintain < Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RepoRole {
	Read,
	Triage,
	Write,
	Maintain,
	Admin,
}

/// Repository roles from most to least privileged. Position in this list is
/// the comparison index used by the authorization pipeline.
pub const REPO_ROLE_HIERARCHY: [RepoRole; 5] = [
	RepoRole::Admin,
	RepoRole::Maintain,
	RepoRole::Write,
	RepoRole::Triage,
	RepoRole::Read,
];

impl RepoRole {
	/// Returns all repository roles, least privileged first.
	pub fn all() -> &'static [RepoRole] {
		&[
			RepoRole::Read,
			RepoRole::Triage,
			RepoRole::Write,
			RepoRole::Maintain,
			RepoRole::Admin,
		]
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			RepoRole::Read => "READ",
			RepoRole::Triage => "TRIAGE",
			RepoRole::Write => "WRITE",
			RepoRole::Maintain => "MAINTAIN",
			RepoRole::Admin => "ADMIN",
		}
	}

	/// Index of this role in [`REPO_ROLE_HIERARCHY`]; lower is more privileged.
	pub fn hierarchy_index(&self) -> usize {
		REPO_ROLE_HIERARCHY
			.iter()
			.position(|role| role == self)
			.unwrap_or(REPO_ROLE_HIERARCHY.len())
	}

	/// Returns true if this role is at least as privileged as `required`.
	pub fn has_permission_of(&self, required: &RepoRole) -> bool {
		self.hierarchy_index() <= required.hierarchy_index()
	}
}

/// Returns true if `effective` satisfies `required`.
///
/// An absent effective role has no position in the hierarchy and never
/// satisfies any requirement.
pub fn satisfies_level(effective: Option<RepoRole>, required: RepoRole) -> bool {
	match effective {
		Some(role) => role.has_permission_of(&required),
		None => false,
	}
}

impl fmt::Display for RepoRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for RepoRole {
	type Err = RoleParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		RepoRole::all()
			.iter()
			.copied()
			.find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
			.ok_or_else(|| RoleParseError::UnknownRepoRole(s.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_role_hierarchy() {
		assert!(RepoRole::Admin.has_permission_of(&RepoRole::Read));
		assert!(RepoRole::Admin.has_permission_of(&RepoRole::Admin));
		assert!(RepoRole::Maintain.has_permission_of(&RepoRole::Write));
		assert!(!RepoRole::Maintain.has_permission_of(&RepoRole::Admin));
		assert!(RepoRole::Triage.has_permission_of(&RepoRole::Read));
		assert!(!RepoRole::Triage.has_permission_of(&RepoRole::Maintain));
		assert!(RepoRole::Read.has_permission_of(&RepoRole::Read));
		assert!(!RepoRole::Read.has_permission_of(&RepoRole::Triage));
	}

	#[test]
	fn hierarchy_indices_are_most_privileged_first() {
		assert_eq!(RepoRole::Admin.hierarchy_index(), 0);
		assert_eq!(RepoRole::Maintain.hierarchy_index(), 1);
		assert_eq!(RepoRole::Write.hierarchy_index(), 2);
		assert_eq!(RepoRole::Triage.hierarchy_index(), 3);
		assert_eq!(RepoRole::Read.hierarchy_index(), 4);
	}

	#[test]
	fn absent_role_never_satisfies() {
		for required in RepoRole::all() {
			assert!(!satisfies_level(None, *required));
		}
	}

	#[test]
	fn parses_repo_roles_case_insensitively() {
		assert_eq!("write".parse::<RepoRole>(), Ok(RepoRole::Write));
		assert_eq!("MAINTAIN".parse::<RepoRole>(), Ok(RepoRole::Maintain));
		assert_eq!(" Triage ".parse::<RepoRole>(), Ok(RepoRole::Triage));
	}

	#[test]
	fn unknown_repo_role_is_typed_error() {
		assert_eq!(
			"owner".parse::<RepoRole>(),
			Err(RoleParseError::UnknownRepoRole("owner".to_string()))
		);
	}

	#[test]
	fn system_role_names_do_not_parse_as_repo_roles() {
		for role in SystemRole::all() {
			assert!(role.as_str().parse::<RepoRole>().is_err());
		}
	}

	#[test]
	fn parses_system_roles() {
		assert_eq!("org_admin".parse::<SystemRole>(), Ok(SystemRole::OrgAdmin));
		assert!(matches!(
			"root".parse::<SystemRole>(),
			Err(RoleParseError::UnknownSystemRole(_))
		));
	}

	#[test]
	fn repo_role_serializes_uppercase() {
		assert_eq!(serde_json::to_string(&RepoRole::Maintain).unwrap(), "\"MAINTAIN\"");
	}

	fn arb_repo_role() -> impl Strategy<Value = RepoRole> {
		prop_oneof![
			Just(RepoRole::Read),
			Just(RepoRole::Triage),
			Just(RepoRole::Write),
			Just(RepoRole::Maintain),
			Just(RepoRole::Admin),
		]
	}

	proptest! {
		#[test]
		fn hierarchy_agrees_with_declared_order(a in arb_repo_role(), b in arb_repo_role()) {
			prop_assert_eq!(a.has_permission_of(&b), a >= b);
		}
	}
}
