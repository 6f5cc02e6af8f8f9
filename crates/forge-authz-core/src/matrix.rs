// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Static permission matrices.
//!
//! Two compiled-in tables:
//!
//! - [`system_permissions`]: [`SystemRole`] → platform [`Permission`]s
//! - [`repo_permissions`]: [`RepoRole`] → [`RepoPermission`]s
//!
//! Both are total over their role enums. Every repository role's capability
//! set contains the set of the role directly below it.
//!
//! The `*_named` variants accept raw role names as they arrive from storage
//! or request payloads and return `false` for names that do not parse.

use crate::permission::{Permission, RepoPermission};
use crate::role::{RepoRole, SystemRole};

const SUPER_ADMIN_PERMISSIONS: &[Permission] = &[
	Permission::ManageUsers,
	Permission::ManageRepos,
	Permission::ManageTeams,
	Permission::ManagePolicies,
	Permission::ViewAuditLogs,
	Permission::EditRoles,
	Permission::ViewAdminPanel,
	Permission::ModerateContent,
];

const ORG_ADMIN_PERMISSIONS: &[Permission] = &[
	Permission::ManageUsers,
	Permission::ManageRepos,
	Permission::ManageTeams,
	Permission::ManagePolicies,
	Permission::ViewAuditLogs,
	Permission::EditRoles,
	Permission::ViewAdminPanel,
];

const TEAM_ADMIN_PERMISSIONS: &[Permission] = &[
	Permission::ManageRepos,
	Permission::ManageTeams,
	Permission::ViewAdminPanel,
];

const MODERATOR_PERMISSIONS: &[Permission] =
	&[Permission::ModerateContent, Permission::ViewAuditLogs];

const READ_CAPABILITIES: &[RepoPermission] = &[RepoPermission::PullCode];

const TRIAGE_CAPABILITIES: &[RepoPermission] =
	&[RepoPermission::PullCode, RepoPermission::TriageIssues];

const WRITE_CAPABILITIES: &[RepoPermission] = &[
	RepoPermission::PullCode,
	RepoPermission::TriageIssues,
	RepoPermission::PushCode,
];

const MAINTAIN_CAPABILITIES: &[RepoPermission] = &[
	RepoPermission::PullCode,
	RepoPermission::TriageIssues,
	RepoPermission::PushCode,
	RepoPermission::ManageWebhooks,
];

const ADMIN_CAPABILITIES: &[RepoPermission] = &[
	RepoPermission::PullCode,
	RepoPermission::TriageIssues,
	RepoPermission::PushCode,
	RepoPermission::ManageWebhooks,
	RepoPermission::AdministerRepo,
	RepoPermission::DeleteRepo,
];

/// Returns the platform permissions held by a system role.
pub fn system_permissions(role: SystemRole) -> &'static [Permission] {
	match role {
		SystemRole::SuperAdmin => SUPER_ADMIN_PERMISSIONS,
		SystemRole::OrgAdmin => ORG_ADMIN_PERMISSIONS,
		SystemRole::TeamAdmin => TEAM_ADMIN_PERMISSIONS,
		SystemRole::Moderator => MODERATOR_PERMISSIONS,
		SystemRole::Developer | SystemRole::Viewer => &[],
	}
}

/// Returns the capabilities held by a repository role.
pub fn repo_permissions(role: RepoRole) -> &'static [RepoPermission] {
	match role {
		RepoRole::Read => READ_CAPABILITIES,
		RepoRole::Triage => TRIAGE_CAPABILITIES,
		RepoRole::Write => WRITE_CAPABILITIES,
		RepoRole::Maintain => MAINTAIN_CAPABILITIES,
		RepoRole::Admin => ADMIN_CAPABILITIES,
	}
}

pub fn has_permission(role: SystemRole, permission: Permission) -> bool {
	system_permissions(role).contains(&permission)
}

/// Returns true if the role may reach the admin surface.
///
/// This is an explicit allow-list and is not derived from the permission
/// table: `Moderator` lacks most admin permissions but still counts.
pub fn is_admin(role: SystemRole) -> bool {
	matches!(
		role,
		SystemRole::SuperAdmin | SystemRole::OrgAdmin | SystemRole::TeamAdmin | SystemRole::Moderator
	)
}

pub fn has_repo_permission(role: RepoRole, permission: RepoPermission) -> bool {
	repo_permissions(role).contains(&permission)
}

/// [`has_permission`] for a raw role name; unknown names hold nothing.
pub fn has_permission_named(role: &str, permission: Permission) -> bool {
	role
		.parse::<SystemRole>()
		.map(|role| has_permission(role, permission))
		.unwrap_or(false)
}

/// [`is_admin`] for a raw role name; unknown names are not admins.
pub fn is_admin_named(role: &str) -> bool {
	role.parse::<SystemRole>().map(is_admin).unwrap_or(false)
}

/// [`has_repo_permission`] for a raw role name; unknown names hold nothing.
pub fn has_repo_permission_named(role: &str, permission: RepoPermission) -> bool {
	role
		.parse::<RepoRole>()
		.map(|role| has_repo_permission(role, permission))
		.unwrap_or(false)
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	mod system_matrix {
		use super::*;

		#[test]
		fn super_admin_is_superset_of_every_role() {
			for role in SystemRole::all() {
				for permission in system_permissions(*role) {
					assert!(
						has_permission(SystemRole::SuperAdmin, *permission),
						"super_admin lacks {permission} held by {role}"
					);
				}
			}
		}

		#[test]
		fn developer_and_viewer_hold_nothing() {
			assert!(system_permissions(SystemRole::Developer).is_empty());
			assert!(system_permissions(SystemRole::Viewer).is_empty());
			for permission in Permission::all() {
				assert!(!has_permission(SystemRole::Developer, *permission));
				assert!(!has_permission(SystemRole::Viewer, *permission));
			}
		}

		#[test]
		fn org_admin_can_manage_users_but_not_moderate() {
			assert!(has_permission(SystemRole::OrgAdmin, Permission::ManageUsers));
			assert!(!has_permission(SystemRole::OrgAdmin, Permission::ModerateContent));
		}

		#[test]
		fn admin_allow_list_is_explicit() {
			assert!(is_admin(SystemRole::SuperAdmin));
			assert!(is_admin(SystemRole::OrgAdmin));
			assert!(is_admin(SystemRole::TeamAdmin));
			assert!(is_admin(SystemRole::Moderator));
			assert!(!is_admin(SystemRole::Developer));
			assert!(!is_admin(SystemRole::Viewer));
		}

		#[test]
		fn moderator_is_admin_without_admin_panel_permission() {
			assert!(is_admin(SystemRole::Moderator));
			assert!(!has_permission(SystemRole::Moderator, Permission::ViewAdminPanel));
			assert!(!has_permission(SystemRole::Moderator, Permission::ManageUsers));
		}

		#[test]
		fn unknown_role_names_are_denied() {
			assert!(!has_permission_named("root", Permission::ManageUsers));
			assert!(!has_permission_named("", Permission::ViewAdminPanel));
			assert!(!is_admin_named("administrator"));
			assert!(has_permission_named("super_admin", Permission::EditRoles));
			assert!(is_admin_named("moderator"));
		}
	}

	mod repo_matrix {
		use super::*;

		#[test]
		fn read_only_pulls_code() {
			assert_eq!(repo_permissions(RepoRole::Read), &[RepoPermission::PullCode]);
		}

		#[test]
		fn admin_holds_every_capability() {
			for cap in RepoPermission::all() {
				assert!(has_repo_permission(RepoRole::Admin, *cap));
			}
		}

		#[test]
		fn capabilities_grow_strictly_with_role() {
			for pair in RepoRole::all().windows(2) {
				let (lower, higher) = (pair[0], pair[1]);
				let lower_caps = repo_permissions(lower);
				let higher_caps = repo_permissions(higher);
				for cap in lower_caps {
					assert!(
						higher_caps.contains(cap),
						"{higher} is missing {cap} held by {lower}"
					);
				}
				assert!(
					higher_caps.len() > lower_caps.len(),
					"{higher} does not add a capability over {lower}"
				);
			}
		}

		#[test]
		fn write_cannot_manage_webhooks_but_maintain_can() {
			assert!(!has_repo_permission(RepoRole::Write, RepoPermission::ManageWebhooks));
			assert!(has_repo_permission(RepoRole::Maintain, RepoPermission::ManageWebhooks));
		}

		#[test]
		fn only_admin_can_delete() {
			for role in RepoRole::all() {
				assert_eq!(
					has_repo_permission(*role, RepoPermission::DeleteRepo),
					*role == RepoRole::Admin
				);
			}
		}

		#[test]
		fn unknown_repo_role_names_are_denied() {
			assert!(!has_repo_permission_named("owner", RepoPermission::PullCode));
			assert!(has_repo_permission_named("maintain", RepoPermission::ManageWebhooks));
		}
	}

	fn arb_repo_role() -> impl Strategy<Value = RepoRole> {
		proptest::sample::select(RepoRole::all().to_vec())
	}

	fn arb_system_role() -> impl Strategy<Value = SystemRole> {
		proptest::sample::select(SystemRole::all().to_vec())
	}

	fn arb_repo_permission() -> impl Strategy<Value = RepoPermission> {
		proptest::sample::select(RepoPermission::all().to_vec())
	}

	fn arb_permission() -> impl Strategy<Value = Permission> {
		proptest::sample::select(Permission::all().to_vec())
	}

	proptest! {
		#[test]
		fn more_privileged_role_holds_every_capability_of_less_privileged(
			a in arb_repo_role(),
			b in arb_repo_role(),
			cap in arb_repo_permission(),
		) {
			prop_assume!(a.has_permission_of(&b));
			if has_repo_permission(b, cap) {
				prop_assert!(has_repo_permission(a, cap));
			}
		}

		#[test]
		fn lookups_are_pure(role in arb_system_role(), permission in arb_permission()) {
			prop_assert_eq!(has_permission(role, permission), has_permission(role, permission));
			prop_assert_eq!(is_admin(role), is_admin(role));
		}

		#[test]
		fn arbitrary_unknown_names_never_grant(name in "[a-z]{1,12}", cap in arb_repo_permission()) {
			prop_assume!(name.parse::<RepoRole>().is_err());
			prop_assert!(!has_repo_permission_named(&name, cap));
		}
	}
}
