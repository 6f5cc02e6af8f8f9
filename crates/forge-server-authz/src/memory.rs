// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory collaborators.
//!
//! Used by the test suite and by `forge-authz check`, which loads them from a
//! fixture file. Role grants are kept as the raw strings a database would
//! hold and go through the typed [`RepoRole`] parser on every lookup.

use async_trait::async_trait;
use forge_authz_core::{
	Actor, PolicyContext, PolicyDecision, PolicyType, RepoId, RepoRole, Repository, TenantId,
	UserId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::collaborators::{
	Authenticator, CollaboratorResult, PermissionResolver, PolicyGateway, RepoStore,
};
use crate::request::AuthzRequest;

/// Trusts the actor the session layer attached to the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionAuthenticator;

#[async_trait]
impl Authenticator for ExtensionAuthenticator {
	async fn authenticate(&self, request: &AuthzRequest) -> CollaboratorResult<Option<Actor>> {
		Ok(request.session_actor.clone())
	}
}

#[derive(Debug, Default)]
pub struct InMemoryRepoStore {
	repos: RwLock<HashMap<RepoId, Repository>>,
}

impl InMemoryRepoStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_repos(repos: impl IntoIterator<Item = Repository>) -> Self {
		Self {
			repos: RwLock::new(repos.into_iter().map(|r| (r.id.clone(), r)).collect()),
		}
	}

	pub async fn insert(&self, repo: Repository) {
		self.repos.write().await.insert(repo.id.clone(), repo);
	}
}

#[async_trait]
impl RepoStore for InMemoryRepoStore {
	async fn find_by_id(&self, id: &RepoId) -> CollaboratorResult<Option<Repository>> {
		Ok(self.repos.read().await.get(id).cloned())
	}
}

/// Role grants keyed by `(user, repository)`.
#[derive(Debug, Default)]
pub struct InMemoryPermissionResolver {
	grants: RwLock<HashMap<(UserId, RepoId), String>>,
	lookups: AtomicUsize,
}

impl InMemoryPermissionResolver {
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores a grant by raw role name, as persisted.
	pub async fn grant(
		&self,
		user_id: impl Into<UserId>,
		repo_id: impl Into<RepoId>,
		role: impl Into<String>,
	) {
		self
			.grants
			.write()
			.await
			.insert((user_id.into(), repo_id.into()), role.into());
	}

	/// Number of lookups served so far.
	pub fn lookup_count(&self) -> usize {
		self.lookups.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl PermissionResolver for InMemoryPermissionResolver {
	async fn effective_repo_role(
		&self,
		user_id: &UserId,
		repo_id: &RepoId,
	) -> CollaboratorResult<Option<RepoRole>> {
		self.lookups.fetch_add(1, Ordering::SeqCst);
		let grants = self.grants.read().await;
		match grants.get(&(user_id.clone(), repo_id.clone())) {
			Some(raw) => Ok(Some(raw.parse::<RepoRole>()?)),
			None => Ok(None),
		}
	}
}

/// Policies configured for one tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantPolicy {
	/// Allowed origins; `None` or empty disables the check.
	#[serde(default)]
	pub ip_allowlist: Option<Vec<IpAddr>>,
	#[serde(default)]
	pub require_two_factor: bool,
}

impl TenantPolicy {
	fn evaluate(&self, policy: PolicyType, context: &PolicyContext) -> PolicyDecision {
		match (policy, context) {
			(PolicyType::IpAllowlist, PolicyContext::Ip { ip }) => {
				let Some(allowlist) = self.ip_allowlist.as_ref().filter(|l| !l.is_empty()) else {
					return PolicyDecision::allow();
				};
				match ip {
					Some(ip) if allowlist.contains(ip) => PolicyDecision::allow(),
					Some(ip) => PolicyDecision::deny(format!(
						"IP address {ip} is not in your organization's allowlist"
					)),
					None => PolicyDecision::deny("Request origin could not be determined"),
				}
			}
			(
				PolicyType::TwoFactorRequired,
				PolicyContext::TwoFactor { two_factor_enabled },
			) => {
				if self.require_two_factor && !two_factor_enabled {
					PolicyDecision::deny("Your organization requires two-factor authentication")
				} else {
					PolicyDecision::allow()
				}
			}
			(policy, _) => PolicyDecision::deny(format!("Malformed context for {policy} policy")),
		}
	}
}

/// Policy gateway backed by a fixed per-tenant table.
///
/// Tenants without an entry have no policies and are always allowed.
#[derive(Debug, Default)]
pub struct StaticPolicyGateway {
	tenants: RwLock<HashMap<TenantId, TenantPolicy>>,
}

impl StaticPolicyGateway {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_policies(policies: impl IntoIterator<Item = (TenantId, TenantPolicy)>) -> Self {
		Self {
			tenants: RwLock::new(policies.into_iter().collect()),
		}
	}

	pub async fn set_policy(&self, tenant_id: impl Into<TenantId>, policy: TenantPolicy) {
		self.tenants.write().await.insert(tenant_id.into(), policy);
	}
}

#[async_trait]
impl PolicyGateway for StaticPolicyGateway {
	async fn evaluate(
		&self,
		tenant_id: &TenantId,
		policy: PolicyType,
		context: &PolicyContext,
	) -> CollaboratorResult<PolicyDecision> {
		let tenants = self.tenants.read().await;
		Ok(match tenants.get(tenant_id) {
			Some(tenant) => tenant.evaluate(policy, context),
			None => PolicyDecision::allow(),
		})
	}
}
