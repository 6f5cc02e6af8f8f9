// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Terminal authorization failures.
//!
//! Every variant maps to exactly one HTTP status and a stable snake_case
//! kind. None of them are retried; a caller holding an [`AuthzError`] must
//! not run the guarded operation.

use http::StatusCode;
use thiserror::Error;

use crate::permission::RepoPermission;
use crate::policy::PolicyType;
use crate::role::RepoRole;
use crate::types::RepoId;

pub const NO_REPOSITORY_ACCESS_MESSAGE: &str = "You do not have permission to access this repository";
pub const NO_EFFECTIVE_ROLE_MESSAGE: &str = "No repository access";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthzError {
	#[error("Repository ID required")]
	MissingRepositoryId,

	#[error("Authentication required")]
	Unauthenticated,

	#[error("Repository not found: {repo_id}")]
	RepositoryNotFound { repo_id: RepoId },

	#[error("{reason}")]
	PolicyViolation { policy: PolicyType, reason: String },

	#[error("{message}")]
	NoRepositoryAccess { message: String },

	#[error(
		"Insufficient repository permissions. Required: {required}, Actual: {}",
		.actual.map(|r| r.as_str()).unwrap_or("None")
	)]
	InsufficientLevel {
		required: RepoRole,
		actual: Option<RepoRole>,
	},

	#[error("Missing capability: {capability}")]
	MissingCapability { capability: RepoPermission },

	/// A collaborator failed or was unreachable; treated as a denial.
	#[error("{collaborator} unavailable: {message}")]
	Upstream {
		collaborator: &'static str,
		message: String,
	},
}

impl AuthzError {
	pub fn no_repository_access() -> Self {
		AuthzError::NoRepositoryAccess {
			message: NO_REPOSITORY_ACCESS_MESSAGE.to_string(),
		}
	}

	pub fn upstream(collaborator: &'static str, message: impl Into<String>) -> Self {
		AuthzError::Upstream {
			collaborator,
			message: message.into(),
		}
	}

	pub fn status(&self) -> StatusCode {
		match self {
			AuthzError::MissingRepositoryId => StatusCode::BAD_REQUEST,
			AuthzError::Unauthenticated => StatusCode::UNAUTHORIZED,
			AuthzError::RepositoryNotFound { .. } => StatusCode::NOT_FOUND,
			AuthzError::PolicyViolation { .. }
			| AuthzError::NoRepositoryAccess { .. }
			| AuthzError::InsufficientLevel { .. }
			| AuthzError::MissingCapability { .. } => StatusCode::FORBIDDEN,
			AuthzError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// Stable machine-readable error kind.
	pub fn kind(&self) -> &'static str {
		match self {
			AuthzError::MissingRepositoryId => "missing_repository_id",
			AuthzError::Unauthenticated => "unauthenticated",
			AuthzError::RepositoryNotFound { .. } => "repository_not_found",
			AuthzError::PolicyViolation { .. } => "policy_violation",
			AuthzError::NoRepositoryAccess { .. } => "no_repository_access",
			AuthzError::InsufficientLevel { .. } => "insufficient_level",
			AuthzError::MissingCapability { .. } => "missing_capability",
			AuthzError::Upstream { .. } => "upstream_failure",
		}
	}

	/// Human-readable message safe to return to the client.
	///
	/// Upstream failures are reported generically; the collaborator detail
	/// stays in the logs.
	pub fn message(&self) -> String {
		match self {
			AuthzError::Upstream { .. } => "Authorization could not be completed".to_string(),
			other => other.to_string(),
		}
	}
}
