// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! TOML fixtures describing actors, repositories, grants and tenant policies.
//!
//! ```toml
//! [[actors]]
//! user_id = "u1"
//! system_role = "developer"
//! two_factor_enabled = false
//!
//! [[repositories]]
//! id = "r1"
//! name = "core"
//! visibility = "private"
//! tenant_id = "t1"
//!
//! [[grants]]
//! user_id = "u1"
//! repo_id = "r1"
//! role = "WRITE"
//!
//! [tenants.t1]
//! ip_allowlist = ["198.51.100.10"]
//! require_two_factor = true
//! ```

use forge_authz_core::{Actor, RepoId, Repository, TenantId, UserId};
use forge_server_authz::{
	ExtensionAuthenticator, InMemoryPermissionResolver, InMemoryRepoStore, RepoAuthorizer,
	StaticPolicyGateway, TenantPolicy,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FixtureError {
	#[error("failed to read fixture {path}: {source}")]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse fixture {path}: {source}")]
	Parse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("duplicate {kind} '{id}' in fixture")]
	Duplicate { kind: &'static str, id: String },
}

/// A stored role assignment. The role is kept as written so unknown names
/// surface at lookup time, the way a corrupted database row would.
#[derive(Debug, Clone, Deserialize)]
pub struct Grant {
	pub user_id: UserId,
	pub repo_id: RepoId,
	pub role: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixture {
	#[serde(default)]
	pub actors: Vec<Actor>,
	#[serde(default)]
	pub repositories: Vec<Repository>,
	#[serde(default)]
	pub grants: Vec<Grant>,
	#[serde(default)]
	pub tenants: HashMap<TenantId, TenantPolicy>,
}

impl Fixture {
	pub fn load(path: &Path) -> Result<Self, FixtureError> {
		let content = std::fs::read_to_string(path).map_err(|e| FixtureError::Read {
			path: path.to_path_buf(),
			source: e,
		})?;
		Self::parse(&content).map_err(|e| match e {
			ParseFailure::Toml(source) => FixtureError::Parse {
				path: path.to_path_buf(),
				source,
			},
			ParseFailure::Invalid(err) => err,
		})
	}

	fn parse(content: &str) -> Result<Self, ParseFailure> {
		let fixture: Fixture = toml::from_str(content).map_err(ParseFailure::Toml)?;
		fixture.check_unique().map_err(ParseFailure::Invalid)?;
		Ok(fixture)
	}

	fn check_unique(&self) -> Result<(), FixtureError> {
		let mut users = std::collections::HashSet::new();
		for actor in &self.actors {
			if !users.insert(&actor.user_id) {
				return Err(FixtureError::Duplicate {
					kind: "actor",
					id: actor.user_id.to_string(),
				});
			}
		}

		let mut repos = std::collections::HashSet::new();
		for repo in &self.repositories {
			if !repos.insert(&repo.id) {
				return Err(FixtureError::Duplicate {
					kind: "repository",
					id: repo.id.to_string(),
				});
			}
		}

		Ok(())
	}

	pub fn actor(&self, user_id: &UserId) -> Option<&Actor> {
		self.actors.iter().find(|a| &a.user_id == user_id)
	}

	/// Wires the fixture into in-memory collaborators.
	pub async fn authorizer(&self) -> RepoAuthorizer {
		let repos = InMemoryRepoStore::with_repos(self.repositories.iter().cloned());
		let resolver = InMemoryPermissionResolver::new();
		for grant in &self.grants {
			resolver
				.grant(
					grant.user_id.clone(),
					grant.repo_id.clone(),
					grant.role.clone(),
				)
				.await;
		}
		let policies = StaticPolicyGateway::with_policies(
			self
				.tenants
				.iter()
				.map(|(id, policy)| (id.clone(), policy.clone())),
		);

		RepoAuthorizer::new(
			Arc::new(ExtensionAuthenticator),
			Arc::new(repos),
			Arc::new(resolver),
			Arc::new(policies),
		)
	}
}

enum ParseFailure {
	Toml(toml::de::Error),
	Invalid(FixtureError),
}
