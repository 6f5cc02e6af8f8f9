// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identifier newtypes and the read-only entities the authorizer consumes.
//!
//! - **ID newtypes**: opaque string identifiers for users, repositories and
//!   tenants ([`UserId`], [`RepoId`], [`TenantId`]) so they cannot be mixed up
//! - **Entities**: [`Actor`] (the authenticated principal) and [`Repository`]
//!   (the target of the request), both fetched fresh per request
//!
//! All ID types serialize transparently as strings.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::role::SystemRole;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(String);

		impl $name {
			/// Create a new ID from any string-like value.
			pub fn new(id: impl Into<String>) -> Self {
				Self(id.into())
			}

			/// Get the ID as a string slice.
			pub fn as_str(&self) -> &str {
				&self.0
			}

			/// Consume the ID, returning the inner string.
			pub fn into_inner(self) -> String {
				self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(&self.0)
			}
		}

		impl From<&str> for $name {
			fn from(id: &str) -> Self {
				Self(id.to_string())
			}
		}

		impl From<String> for $name {
			fn from(id: String) -> Self {
				Self(id)
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for a user.");
define_id_type!(RepoId, "Opaque identifier for a repository.");
define_id_type!(
	TenantId,
	"Identifier for the enterprise or organization that scopes tenant policies."
);

// =============================================================================
// Entities
// =============================================================================

/// The authenticated principal making a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
	pub user_id: UserId,
	pub system_role: SystemRole,
	#[serde(default)]
	pub two_factor_enabled: bool,
}

impl Actor {
	pub fn new(user_id: impl Into<UserId>, system_role: SystemRole) -> Self {
		Self {
			user_id: user_id.into(),
			system_role,
			two_factor_enabled: false,
		}
	}

	/// Builder: set two_factor_enabled.
	pub fn with_two_factor(mut self, enabled: bool) -> Self {
		self.two_factor_enabled = enabled;
		self
	}

	/// Returns true if the actor holds the platform super-admin role.
	pub fn is_super_admin(&self) -> bool {
		self.system_role == SystemRole::SuperAdmin
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
	#[default]
	Private,
	Public,
}

impl Visibility {
	pub fn as_str(&self) -> &'static str {
		match self {
			Visibility::Private => "private",
			Visibility::Public => "public",
		}
	}
}

/// A repository as seen by the authorizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
	pub id: RepoId,
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub visibility: Visibility,
	#[serde(default)]
	pub tenant_id: Option<TenantId>,
}

impl Repository {
	/// Creates a private repository with no tenant scope.
	pub fn new(id: impl Into<RepoId>, name: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
			visibility: Visibility::Private,
			tenant_id: None,
		}
	}

	/// Builder: set visibility.
	pub fn with_visibility(mut self, visibility: Visibility) -> Self {
		self.visibility = visibility;
		self
	}

	/// Builder: set tenant_id.
	pub fn with_tenant(mut self, tenant_id: impl Into<TenantId>) -> Self {
		self.tenant_id = Some(tenant_id.into());
		self
	}

	pub fn is_public(&self) -> bool {
		self.visibility == Visibility::Public
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ids_serialize_transparently() {
		let id = RepoId::new("r1");
		assert_eq!(serde_json::to_string(&id).unwrap(), "\"r1\"");
		assert_eq!(id.to_string(), "r1");
	}

	#[test]
	fn repository_defaults_to_private_without_tenant() {
		let repo = Repository::new("r1", "core");
		assert!(!repo.is_public());
		assert!(repo.tenant_id.is_none());
	}

	#[test]
	fn repository_builder() {
		let repo = Repository::new("r2", "docs")
			.with_visibility(Visibility::Public)
			.with_tenant("t1");
		assert!(repo.is_public());
		assert_eq!(repo.tenant_id, Some(TenantId::new("t1")));
	}

	#[test]
	fn actor_super_admin_detection() {
		assert!(Actor::new("u1", SystemRole::SuperAdmin).is_super_admin());
		assert!(!Actor::new("u1", SystemRole::OrgAdmin).is_super_admin());
	}

	#[test]
	fn actor_deserializes_with_default_two_factor() {
		let actor: Actor =
			serde_json::from_str(r#"{"user_id":"u1","system_role":"developer"}"#).unwrap();
		assert_eq!(actor.system_role, SystemRole::Developer);
		assert!(!actor.two_factor_enabled);
	}
}
