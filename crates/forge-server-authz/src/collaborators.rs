// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Interfaces the authorizer consumes.
//!
//! Implementations are injected into [`crate::RepoAuthorizer::new`]. Any
//! `Err` returned from these traits aborts the authorization with
//! [`forge_authz_core::AuthzError::Upstream`]; an unreachable collaborator
//! is never treated as an allow.

use async_trait::async_trait;
use forge_authz_core::{
	Actor, PolicyContext, PolicyDecision, PolicyType, RepoId, RepoRole, Repository, RoleParseError,
	TenantId, UserId,
};
use thiserror::Error;

use crate::request::AuthzRequest;

#[derive(Debug, Error)]
pub enum CollaboratorError {
	#[error("backend unavailable: {0}")]
	Unavailable(String),

	#[error(transparent)]
	RoleParse(#[from] RoleParseError),
}

pub type CollaboratorResult<T> = Result<T, CollaboratorError>;

/// Identifies the actor behind a request.
#[async_trait]
pub trait Authenticator: Send + Sync {
	/// Returns `None` when the request is not authenticated.
	async fn authenticate(&self, request: &AuthzRequest) -> CollaboratorResult<Option<Actor>>;
}

#[async_trait]
pub trait RepoStore: Send + Sync {
	async fn find_by_id(&self, id: &RepoId) -> CollaboratorResult<Option<Repository>>;
}

/// Resolves the role an actor holds on a repository.
#[async_trait]
pub trait PermissionResolver: Send + Sync {
	async fn effective_repo_role(
		&self,
		user_id: &UserId,
		repo_id: &RepoId,
	) -> CollaboratorResult<Option<RepoRole>>;
}

/// Evaluates tenant-scoped policies.
#[async_trait]
pub trait PolicyGateway: Send + Sync {
	async fn evaluate(
		&self,
		tenant_id: &TenantId,
		policy: PolicyType,
		context: &PolicyContext,
	) -> CollaboratorResult<PolicyDecision>;
}
