// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Context handed to downstream handlers once a request is authorized.

use serde::Serialize;

use crate::matrix::has_repo_permission;
use crate::permission::RepoPermission;
use crate::role::RepoRole;
use crate::types::{Repository, TenantId};

/// Result of a successful repository authorization.
///
/// `effective_role` is `None` when access was granted through the public
/// read bypass or the super-admin override without an explicit role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoAccess {
	pub repository: Repository,
	pub effective_role: Option<RepoRole>,
	pub tenant_id: Option<TenantId>,
}

impl RepoAccess {
	pub fn new(repository: Repository, effective_role: Option<RepoRole>) -> Self {
		let tenant_id = repository.tenant_id.clone();
		Self {
			repository,
			effective_role,
			tenant_id,
		}
	}

	/// Returns true if the resolved role grants `capability`.
	pub fn can(&self, capability: RepoPermission) -> bool {
		self
			.effective_role
			.map(|role| has_repo_permission(role, capability))
			.unwrap_or(false)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tenant_is_copied_from_repository() {
		let access = RepoAccess::new(Repository::new("r2", "docs").with_tenant("t1"), None);
		assert_eq!(access.tenant_id, Some(TenantId::new("t1")));
	}

	#[test]
	fn no_role_grants_no_capability() {
		let access = RepoAccess::new(Repository::new("r1", "core"), None);
		assert!(!access.can(RepoPermission::PullCode));
	}

	#[test]
	fn role_capabilities_are_exposed() {
		let access = RepoAccess::new(Repository::new("r1", "core"), Some(RepoRole::Write));
		assert!(access.can(RepoPermission::PushCode));
		assert!(!access.can(RepoPermission::ManageWebhooks));
	}
}
