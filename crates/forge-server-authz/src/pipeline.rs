// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Repository authorization pipeline.
//!
//! [`RepoAuthorizer::authorize`] runs the stages in [`STAGES`] strictly in
//! order for one request:
//!
//! ```text
//! Authenticate → ResolveRepository → EnforceTenantPolicy → PublicReadBypass
//!              → ResolveEffectiveRole → CompareLevel → RepoAccess
//! ```
//!
//! Tenant policy runs before the public bypass, so a public repository never
//! escapes its tenant's IP allowlist or two-factor rule. Each stage is also
//! callable on its own.
//!
//! [`RepoAuthorizer::authorize_capability`] re-runs the whole pipeline at
//! [`RepoRole::Read`] and then checks one capability against the resolved
//! role.

use forge_authz_core::error::NO_EFFECTIVE_ROLE_MESSAGE;
use forge_authz_core::{
	has_repo_permission, satisfies_level, Actor, AuthzError, PolicyContext, PolicyType, RepoAccess,
	RepoId, RepoPermission, RepoRole, Repository,
};
use std::fmt;
use std::sync::Arc;
use tracing::instrument;

use crate::collaborators::{Authenticator, PermissionResolver, PolicyGateway, RepoStore};
use crate::request::AuthzRequest;

/// A named step of the authorization pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
	Authenticate,
	ResolveRepository,
	EnforceTenantPolicy,
	PublicReadBypass,
	ResolveEffectiveRole,
	CompareLevel,
}

impl Stage {
	pub fn as_str(&self) -> &'static str {
		match self {
			Stage::Authenticate => "authenticate",
			Stage::ResolveRepository => "resolve_repository",
			Stage::EnforceTenantPolicy => "enforce_tenant_policy",
			Stage::PublicReadBypass => "public_read_bypass",
			Stage::ResolveEffectiveRole => "resolve_effective_role",
			Stage::CompareLevel => "compare_level",
		}
	}
}

impl fmt::Display for Stage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Execution order of the pipeline. Reordering changes security posture.
pub const STAGES: [Stage; 6] = [
	Stage::Authenticate,
	Stage::ResolveRepository,
	Stage::EnforceTenantPolicy,
	Stage::PublicReadBypass,
	Stage::ResolveEffectiveRole,
	Stage::CompareLevel,
];

enum Flow {
	Continue,
	Granted,
}

/// Facts accumulated while stages run for one request.
struct Evaluation {
	required: RepoRole,
	actor: Option<Actor>,
	repository: Option<Repository>,
	effective_role: Option<RepoRole>,
}

impl Evaluation {
	fn actor(&self) -> Result<&Actor, AuthzError> {
		self.actor.as_ref().ok_or(AuthzError::Unauthenticated)
	}

	fn repository(&self) -> Result<&Repository, AuthzError> {
		self
			.repository
			.as_ref()
			.ok_or_else(|| AuthzError::upstream("pipeline", "repository used before it was resolved"))
	}

	fn into_access(self) -> Result<RepoAccess, AuthzError> {
		let repository = self.repository.ok_or_else(|| {
			AuthzError::upstream("pipeline", "repository used before it was resolved")
		})?;
		Ok(RepoAccess::new(repository, self.effective_role))
	}
}

/// Decides whether a request may act on a repository.
///
/// Shared across requests behind an `Arc`; holds no per-request state.
#[derive(Clone)]
pub struct RepoAuthorizer {
	authenticator: Arc<dyn Authenticator>,
	repos: Arc<dyn RepoStore>,
	resolver: Arc<dyn PermissionResolver>,
	policies: Arc<dyn PolicyGateway>,
}

impl RepoAuthorizer {
	pub fn new(
		authenticator: Arc<dyn Authenticator>,
		repos: Arc<dyn RepoStore>,
		resolver: Arc<dyn PermissionResolver>,
		policies: Arc<dyn PolicyGateway>,
	) -> Self {
		Self {
			authenticator,
			repos,
			resolver,
			policies,
		}
	}

	/// Authorizes baseline read access.
	pub async fn authorize_read(&self, request: &AuthzRequest) -> Result<RepoAccess, AuthzError> {
		self.authorize(request, RepoRole::Read).await
	}

	/// Runs every stage for `request` against `required`.
	#[instrument(
		level = "debug",
		skip(self, request),
		fields(repo_id = ?request.repo_id, required = %required)
	)]
	pub async fn authorize(
		&self,
		request: &AuthzRequest,
		required: RepoRole,
	) -> Result<RepoAccess, AuthzError> {
		let mut eval = Evaluation {
			required,
			actor: None,
			repository: None,
			effective_role: None,
		};

		for stage in STAGES {
			match self.run_stage(stage, request, &mut eval).await {
				Ok(Flow::Continue) => {}
				Ok(Flow::Granted) => {
					tracing::debug!(stage = %stage, "repository access granted early");
					break;
				}
				Err(err) => {
					log_denial(stage, &eval, &err);
					return Err(err);
				}
			}
		}

		let access = eval.into_access()?;
		tracing::debug!(
			repo_id = %access.repository.id,
			effective_role = ?access.effective_role,
			"repository access granted"
		);
		Ok(access)
	}

	/// Authorizes baseline read access, then checks a single capability.
	#[instrument(
		level = "debug",
		skip(self, request),
		fields(repo_id = ?request.repo_id, capability = %capability)
	)]
	pub async fn authorize_capability(
		&self,
		request: &AuthzRequest,
		capability: RepoPermission,
	) -> Result<RepoAccess, AuthzError> {
		let access = self.authorize(request, RepoRole::Read).await?;

		let Some(role) = access.effective_role else {
			tracing::info!(
				repo_id = %access.repository.id,
				capability = %capability,
				"capability denied: no effective role"
			);
			return Err(AuthzError::NoRepositoryAccess {
				message: NO_EFFECTIVE_ROLE_MESSAGE.to_string(),
			});
		};

		if !has_repo_permission(role, capability) {
			tracing::info!(
				repo_id = %access.repository.id,
				role = %role,
				capability = %capability,
				"capability denied: role lacks capability"
			);
			return Err(AuthzError::MissingCapability { capability });
		}

		Ok(access)
	}

	async fn run_stage(
		&self,
		stage: Stage,
		request: &AuthzRequest,
		eval: &mut Evaluation,
	) -> Result<Flow, AuthzError> {
		match stage {
			Stage::Authenticate => {
				eval.actor = Some(self.authenticate(request).await?);
			}
			Stage::ResolveRepository => {
				eval.repository = Some(self.resolve_repository(request).await?);
			}
			Stage::EnforceTenantPolicy => {
				self
					.enforce_tenant_policy(request, eval.actor()?, eval.repository()?)
					.await?;
			}
			Stage::PublicReadBypass => {
				if public_read_bypass(eval.repository()?, eval.required) {
					return Ok(Flow::Granted);
				}
			}
			Stage::ResolveEffectiveRole => {
				let role = self
					.resolve_effective_role(eval.actor()?, eval.repository()?)
					.await?;
				eval.effective_role = role;
			}
			Stage::CompareLevel => {
				compare_level(eval.actor()?, eval.effective_role, eval.required)?;
			}
		}
		Ok(Flow::Continue)
	}

	/// Stage 1: identify the actor.
	pub async fn authenticate(&self, request: &AuthzRequest) -> Result<Actor, AuthzError> {
		self
			.authenticator
			.authenticate(request)
			.await
			.map_err(|e| AuthzError::upstream("authenticator", e.to_string()))?
			.ok_or(AuthzError::Unauthenticated)
	}

	/// Stage 2: load the repository named in the request path.
	pub async fn resolve_repository(&self, request: &AuthzRequest) -> Result<Repository, AuthzError> {
		let repo_id = request
			.trimmed_repo_id()
			.map(RepoId::new)
			.ok_or(AuthzError::MissingRepositoryId)?;

		let repository = self
			.repos
			.find_by_id(&repo_id)
			.await
			.map_err(|e| AuthzError::upstream("repository store", e.to_string()))?;

		repository.ok_or(AuthzError::RepositoryNotFound { repo_id })
	}

	/// Stage 3: apply the repository tenant's IP allowlist, then its
	/// two-factor rule. Repositories without a tenant have no policies.
	pub async fn enforce_tenant_policy(
		&self,
		request: &AuthzRequest,
		actor: &Actor,
		repository: &Repository,
	) -> Result<(), AuthzError> {
		let Some(tenant_id) = repository.tenant_id.as_ref() else {
			return Ok(());
		};

		let checks = [
			(
				PolicyType::IpAllowlist,
				PolicyContext::Ip {
					ip: request.client_ip,
				},
			),
			(
				PolicyType::TwoFactorRequired,
				PolicyContext::TwoFactor {
					two_factor_enabled: actor.two_factor_enabled,
				},
			),
		];

		for (policy, context) in checks {
			let decision = self
				.policies
				.evaluate(tenant_id, policy, &context)
				.await
				.map_err(|e| AuthzError::upstream("policy gateway", e.to_string()))?;

			if !decision.allowed {
				return Err(AuthzError::PolicyViolation {
					policy,
					reason: decision.reason,
				});
			}
		}

		Ok(())
	}

	/// Stage 5: look up the actor's role. Only the super-admin may continue
	/// without one.
	pub async fn resolve_effective_role(
		&self,
		actor: &Actor,
		repository: &Repository,
	) -> Result<Option<RepoRole>, AuthzError> {
		let role = self
			.resolver
			.effective_repo_role(&actor.user_id, &repository.id)
			.await
			.map_err(|e| AuthzError::upstream("permission resolver", e.to_string()))?;

		if role.is_none() && !actor.is_super_admin() {
			return Err(AuthzError::no_repository_access());
		}

		Ok(role)
	}
}

/// Stage 4: public repositories are readable without resolving a role.
/// Any level above READ goes through full resolution.
pub fn public_read_bypass(repository: &Repository, required: RepoRole) -> bool {
	repository.is_public() && required == RepoRole::Read
}

/// Stage 6: the effective role must sit at or above `required` in the
/// hierarchy. The super-admin skips the comparison.
pub fn compare_level(
	actor: &Actor,
	effective: Option<RepoRole>,
	required: RepoRole,
) -> Result<(), AuthzError> {
	if actor.is_super_admin() || satisfies_level(effective, required) {
		return Ok(());
	}

	Err(AuthzError::InsufficientLevel {
		required,
		actual: effective,
	})
}

fn log_denial(stage: Stage, eval: &Evaluation, err: &AuthzError) {
	let user_id = eval.actor.as_ref().map(|a| a.user_id.as_str());
	let repo_id = eval.repository.as_ref().map(|r| r.id.as_str());

	if let AuthzError::Upstream { .. } = err {
		tracing::warn!(
			stage = %stage,
			user_id = ?user_id,
			repo_id = ?repo_id,
			error = %err,
			"repository authorization failed closed"
		);
	} else {
		tracing::info!(
			stage = %stage,
			user_id = ?user_id,
			repo_id = ?repo_id,
			required = %eval.required,
			kind = err.kind(),
			"repository access denied"
		);
	}
}
